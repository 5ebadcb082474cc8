use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use checklist_core::model::Locale;
use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder, WindowCloseBehaviour};
use services::session::DEFAULT_GATEWAY_TIMEOUT;
use services::{AppServices, Clock, SessionConfig, SessionController};
use storage::repository::DocumentHandle;
use tracing::info;
use tracing_subscriber::EnvFilter;
use ui::{App, DesktopLinkOpener, DesktopShell, LinkOpenerRef, UiApp, build_app_context};

const DEFAULT_DATA_DIR: &str = "./saves";
const DEFAULT_CATALOG_DIR: &str = "./json";
const DEFAULT_DOCUMENT_FILE: &str = "default_progress.json";
const SETTINGS_DB_FILE: &str = "settings.sqlite3";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidLocale { raw: String },
    InvalidTimeout { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidLocale { raw } => {
                write!(f, "invalid --locale value: {raw} (expected en or it)")
            }
            ArgsError::InvalidTimeout { raw } => {
                write!(f, "invalid --gateway-timeout-ms value: {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct DesktopApp {
    session: Arc<SessionController>,
    shell: Arc<DesktopShell>,
    locale_override: Option<Locale>,
}

impl UiApp for DesktopApp {
    fn session(&self) -> Arc<SessionController> {
        Arc::clone(&self.session)
    }

    fn shell(&self) -> Arc<DesktopShell> {
        Arc::clone(&self.shell)
    }

    fn link_opener(&self) -> LinkOpenerRef {
        Arc::new(DesktopLinkOpener)
    }

    fn locale_override(&self) -> Option<Locale> {
        self.locale_override
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    data_dir: PathBuf,
    catalog_dir: PathBuf,
    db_url: String,
    locale: Option<Locale>,
    default_document: PathBuf,
    gateway_timeout: Duration,
    log_file: Option<PathBuf>,
}

enum Parsed {
    Run(Args),
    Help,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --data-dir <path>          saved progress documents");
    eprintln!("  --catalog-dir <path>       checklist catalogs, one folder per locale");
    eprintln!("  --db <sqlite_url>          settings database");
    eprintln!("  --locale <en|it>           override the saved language for this launch");
    eprintln!("  --default-document <path>  progress loaded when no last document exists");
    eprintln!("  --gateway-timeout-ms <n>   storage timeout per operation (default 5000)");
    eprintln!("  --log-file <path>          write logs to a file instead of stderr");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --data-dir {DEFAULT_DATA_DIR}");
    eprintln!("  --catalog-dir {DEFAULT_CATALOG_DIR}");
    eprintln!("  --db sqlite://<data-dir>/{SETTINGS_DB_FILE}");
    eprintln!("  --default-document <catalog-dir>/{DEFAULT_DOCUMENT_FILE}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  CHECKLIST_DATA_DIR, CHECKLIST_CATALOG_DIR, CHECKLIST_DB_URL, RUST_LOG");
}

impl Args {
    fn parse(
        args: &mut impl Iterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Parsed, ArgsError> {
        let mut data_dir = env("CHECKLIST_DATA_DIR").map(PathBuf::from);
        let mut catalog_dir = env("CHECKLIST_CATALOG_DIR").map(PathBuf::from);
        let mut db_url = env("CHECKLIST_DB_URL").map(normalize_sqlite_url);
        let mut locale = None;
        let mut default_document = None;
        let mut gateway_timeout = DEFAULT_GATEWAY_TIMEOUT;
        let mut log_file = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--data-dir" => data_dir = Some(require_value(args, "--data-dir")?.into()),
                "--catalog-dir" => {
                    catalog_dir = Some(require_value(args, "--catalog-dir")?.into());
                }
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = Some(normalize_sqlite_url(value));
                }
                "--locale" => {
                    let value = require_value(args, "--locale")?;
                    let parsed = value
                        .parse::<Locale>()
                        .map_err(|_| ArgsError::InvalidLocale { raw: value.clone() })?;
                    locale = Some(parsed);
                }
                "--default-document" => {
                    default_document = Some(require_value(args, "--default-document")?.into());
                }
                "--gateway-timeout-ms" => {
                    let value = require_value(args, "--gateway-timeout-ms")?;
                    let millis: u64 = value
                        .parse()
                        .ok()
                        .filter(|millis| *millis > 0)
                        .ok_or_else(|| ArgsError::InvalidTimeout { raw: value.clone() })?;
                    gateway_timeout = Duration::from_millis(millis);
                }
                "--log-file" => log_file = Some(require_value(args, "--log-file")?.into()),
                "--help" | "-h" => return Ok(Parsed::Help),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        // The document store resolves relative handles inside the data dir,
        // so every path leaving here is anchored to the launch directory.
        let data_dir =
            absolute_path(data_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)));
        let catalog_dir =
            absolute_path(catalog_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG_DIR)));
        let db_url = db_url.unwrap_or_else(|| {
            normalize_sqlite_url(data_dir.join(SETTINGS_DB_FILE).display().to_string())
        });
        let default_document = default_document
            .map(absolute_path)
            .unwrap_or_else(|| catalog_dir.join(DEFAULT_DOCUMENT_FILE));

        Ok(Parsed::Run(Self {
            data_dir,
            catalog_dir,
            db_url,
            locale,
            default_document,
            gateway_timeout,
            log_file,
        }))
    }
}

fn absolute_path(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(path)
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim();
    let path = PathBuf::from(trimmed.strip_prefix("sqlite:").unwrap_or(trimmed));
    format!("sqlite://{}", absolute_path(path).display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_logging(log_file: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let Some(path) = log_file else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        return Ok(());
    };

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(&mut argv, |key| std::env::var(key).ok()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    let args = match parsed {
        Parsed::Run(args) => args,
        Parsed::Help => {
            print_usage();
            return Ok(());
        }
    };

    init_logging(args.log_file.as_deref())?;
    std::fs::create_dir_all(&args.data_dir)?;
    prepare_sqlite_file(&args.db_url)?;

    let shell = Arc::new(DesktopShell::new(args.data_dir.clone(), || {
        std::process::exit(0);
    }));
    let config = SessionConfig {
        default_document: Some(DocumentHandle::new(
            args.default_document.display().to_string(),
        )),
        gateway_timeout: args.gateway_timeout,
    };
    let services = AppServices::new_local(
        &args.db_url,
        args.data_dir.clone(),
        args.catalog_dir.clone(),
        Clock::default_clock(),
        config,
        shell.clone(),
    )
    .await?;
    info!(
        data_dir = %args.data_dir.display(),
        catalog_dir = %args.catalog_dir.display(),
        db = %args.db_url,
        "storage ready"
    );

    let app: Arc<dyn UiApp> = Arc::new(DesktopApp {
        session: services.session(),
        shell,
        locale_override: args.locale,
    });
    let context = build_app_context(&app);

    // The frame's close button only hides the window; the view tree decides
    // whether the process ends.
    let desktop_cfg = DesktopConfig::new()
        .with_close_behaviour(WindowCloseBehaviour::WindowHides)
        .with_window(
            WindowBuilder::new()
                .with_title("WSTG Checklist")
                .with_always_on_top(false),
        );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
