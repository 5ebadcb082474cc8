use checklist_core::model::{TestId, TestStatus};
use dioxus::prelude::*;
use services::SessionPhase;
use storage::repository::DocumentHandle;

use super::LoadDialog;
use super::loading::load_file;
use super::test_harness::{ViewKind, seeded_repo, setup_view_harness, setup_view_harness_in};

const SAVED: &str = r#"{"status": {"WSTG-INFO-01": "done", "WSTG-CONF-01": "in-progress"}, "notes": {"WSTG-INFO-01": "<p>robots.txt lists /admin</p>"}}"#;

#[tokio::test(flavor = "current_thread")]
async fn chrome_shows_progress_and_file_label() {
    let repo = seeded_repo(Some(("audit.json", SAVED))).await;
    let mut harness = setup_view_harness(ViewKind::Chrome, repo).await;

    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("25.0%"), "missing percentage in {html}");
    assert!(html.contains("band-low"), "missing band in {html}");
    assert!(html.contains("audit.json"), "missing label in {html}");
    assert!(!html.contains("dirty-marker"), "clean session marked dirty: {html}");
    assert!(html.contains("1 done"), "missing counts in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn chrome_marks_unsaved_changes() {
    let repo = seeded_repo(None).await;
    let mut harness = setup_view_harness(ViewKind::Chrome, repo).await;
    let ids = [TestId::new("WSTG-INFO-01"), TestId::new("WSTG-INFO-02")];
    assert_eq!(harness.session.set_many_status(ids, TestStatus::Done), 2);

    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("No file loaded"), "missing placeholder label in {html}");
    assert!(html.contains("dirty-marker"), "missing dirty marker in {html}");
    assert!(html.contains("50.0%"), "missing percentage in {html}");
    assert!(html.contains("band-medium"), "missing band in {html}");
    assert!(harness.shell.is_dirty());
}

#[tokio::test(flavor = "current_thread")]
async fn checklist_renders_tree_with_rollups() {
    let repo = seeded_repo(Some(("audit.json", SAVED))).await;
    let mut harness = setup_view_harness(ViewKind::Checklist, repo).await;

    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("Information Gathering"), "missing category in {html}");
    assert!(html.contains("Configuration Testing"), "missing category in {html}");
    assert!(html.contains("WSTG-CONF-02"), "missing test id in {html}");
    assert!(html.contains("1/2"), "missing category counter in {html}");
    assert!(html.contains("category-progress"), "missing rollup class in {html}");
    assert!(html.contains("robots.txt lists /admin"), "missing note preview in {html}");
    assert!(html.contains("Select a test"), "missing detail placeholder in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn checklist_without_catalog_says_so() {
    let repo = storage::repository::InMemoryRepository::new();
    let mut harness = setup_view_harness(ViewKind::Checklist, repo).await;

    harness.rebuild();
    let html = harness.render();
    assert!(
        html.contains("No checklist is available"),
        "missing empty catalog text in {html}"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn sessions_lists_saved_documents() {
    let repo = seeded_repo(Some(("audit.json", SAVED))).await;
    let mut harness = setup_view_harness(ViewKind::Sessions, repo).await;
    harness
        .repo
        .insert_raw(&DocumentHandle::new("/saves/older.json"), "{}")
        .expect("insert document");

    harness.rebuild();
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("older.json"), "missing document in {html}");
    assert!(html.contains("audit.json"), "missing document in {html}");
    assert!(html.contains("Reopen"), "missing current marker in {html}");
    assert!(html.contains("2023-11-14"), "missing modified date in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn sessions_view_handles_empty_store() {
    let repo = seeded_repo(None).await;
    let mut harness = setup_view_harness(ViewKind::Sessions, repo).await;

    harness.rebuild();
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("No saved sessions yet."), "missing empty text in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn window_close_with_unsaved_changes_opens_exit_dialog() {
    let repo = seeded_repo(None).await;
    let mut harness = setup_view_harness(ViewKind::Chrome, repo).await;
    harness
        .session
        .set_status(TestId::new("WSTG-INFO-01"), TestStatus::Done);

    harness.rebuild();
    assert!(!harness.render().contains("Save and Quit"));

    harness.shell.request_close();
    harness.drive_async().await;
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("Save and Quit"), "missing exit dialog in {html}");
    assert!(html.contains("Quit Without Saving"), "missing discard in {html}");
    assert!(html.contains("Keep Working"), "missing cancel in {html}");
    assert_eq!(harness.session.phase(), SessionPhase::ConfirmingExit);
    assert_eq!(harness.terminations(), 0);
}

#[tokio::test(flavor = "current_thread")]
async fn window_close_without_changes_terminates() {
    let repo = seeded_repo(Some(("audit.json", SAVED))).await;
    let mut harness = setup_view_harness(ViewKind::Chrome, repo).await;

    harness.rebuild();
    harness.shell.request_close();
    harness.drive_async().await;
    harness.drive_async().await;

    assert_eq!(harness.terminations(), 1);
    assert_eq!(harness.session.phase(), SessionPhase::Terminated);
    assert!(!harness.render().contains("Save and Quit"));
}

#[tokio::test(flavor = "current_thread")]
async fn chrome_offers_load_action() {
    let repo = seeded_repo(None).await;
    let mut harness = setup_view_harness(ViewKind::Chrome, repo).await;

    harness.rebuild();
    let html = harness.render();
    assert!(html.contains(">Load<"), "missing load button in {html}");
}

#[component]
fn DirtyLoadDialog() -> Element {
    rsx! {
        LoadDialog { dirty: true, on_confirm: move |_| {}, on_cancel: move |_| {} }
    }
}

#[test]
fn load_dialog_warns_about_unsaved_changes() {
    let mut dom = VirtualDom::new(DirtyLoadDialog);
    dom.rebuild_in_place();
    let html = dioxus_ssr::render(&dom);
    assert!(html.contains("Load progress"), "missing title in {html}");
    assert!(html.contains("replaces your unsaved changes"), "missing warning in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn picked_file_replaces_progress() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("picked.json"), SAVED).expect("write file");
    let repo = seeded_repo(None).await;
    let mut harness = setup_view_harness_in(ViewKind::Chrome, repo, dir.path()).await;
    harness
        .session
        .set_status(TestId::new("WSTG-CONF-02"), TestStatus::Done);

    let outcome = load_file(&harness.session, harness.shell.data_dir(), "picked.json")
        .await
        .expect("file loads");
    assert_eq!(outcome.label, "picked.json");
    assert_eq!(outcome.handle, None);
    assert_eq!(
        harness.session.status(&TestId::new("WSTG-CONF-02")),
        TestStatus::Pending
    );
    assert!(!harness.session.is_dirty());

    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("picked.json"), "missing label in {html}");
    assert!(html.contains("25.0%"), "missing percentage in {html}");
    assert!(!html.contains("dirty-marker"), "loaded session marked dirty: {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn corrupt_or_missing_file_is_reported_and_keeps_progress() {
    let dir = tempfile::tempdir().expect("tempdir");
    let broken = dir.path().join("broken.json");
    std::fs::write(&broken, "{\"status\": [").expect("write file");
    let repo = seeded_repo(None).await;
    let harness = setup_view_harness_in(ViewKind::Chrome, repo, dir.path()).await;
    harness
        .session
        .set_status(TestId::new("WSTG-INFO-02"), TestStatus::InProgress);
    let before = harness.session.export_document();

    let corrupt = load_file(
        &harness.session,
        harness.shell.data_dir(),
        &broken.to_string_lossy(),
    )
    .await
    .expect_err("corrupt file is rejected");
    assert_eq!(
        corrupt,
        "Load failed: the file is not a valid progress document."
    );

    let missing = load_file(&harness.session, harness.shell.data_dir(), "nope.json")
        .await
        .expect_err("missing file is rejected");
    assert!(missing.contains("could not read"), "{missing}");

    assert_eq!(harness.session.export_document(), before);
    assert!(harness.session.is_dirty());
    assert!(harness.session.document_label().is_none());
}
