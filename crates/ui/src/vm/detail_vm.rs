use checklist_core::model::{Catalog, RiskLevel, TestId};

use crate::vm::sanitize_html;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InfoSectionVm {
    pub title: &'static str,
    pub html: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassificationVm {
    pub key: String,
    pub description: String,
    pub level_label: &'static str,
    pub level_class: &'static str,
    pub link: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestDetailVm {
    pub id: TestId,
    pub name: String,
    pub category_name: String,
    pub category_description: Option<String>,
    pub reference: Option<String>,
    pub objectives: Vec<String>,
    pub sections: Vec<InfoSectionVm>,
    pub classification: Vec<ClassificationVm>,
}

fn level_label(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => "Low",
        RiskLevel::Medium => "Medium",
        RiskLevel::High => "High",
        RiskLevel::Critical => "Critical",
    }
}

fn level_class(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => "risk-low",
        RiskLevel::Medium => "risk-medium",
        RiskLevel::High => "risk-high",
        RiskLevel::Critical => "risk-critical",
    }
}

fn is_http_link(raw: &str) -> bool {
    url::Url::parse(raw).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

/// Everything the detail pane shows for one test. Catalog rich text is
/// sanitised here, before it reaches the webview.
#[must_use]
pub fn build_test_detail(catalog: &Catalog, id: &TestId) -> Option<TestDetailVm> {
    let (category, test) = catalog.find_test(id)?;

    let sections = catalog
        .test_info(id)
        .map(|info| {
            [
                ("Summary", info.summary.as_deref()),
                ("Test objectives", info.test_objectives.as_deref()),
                ("How to test", info.how_to.as_deref()),
                ("Tools", info.tools.as_deref()),
                ("Remediation", info.remediation.as_deref()),
            ]
            .into_iter()
            .filter_map(|(title, body)| {
                let body = body?.trim();
                (!body.is_empty()).then(|| InfoSectionVm {
                    title,
                    html: sanitize_html(body),
                })
            })
            .collect()
        })
        .unwrap_or_default();

    let classification = catalog
        .classification_for(&category.id)
        .into_iter()
        .map(|(key, item)| ClassificationVm {
            key: key.to_owned(),
            description: item.description.clone(),
            level_label: level_label(item.level),
            level_class: level_class(item.level),
            link: item.link_url().map(String::from),
        })
        .collect();

    Some(TestDetailVm {
        id: test.id.clone(),
        name: test.name.clone(),
        category_name: category.name.clone(),
        category_description: catalog
            .category_description(&category.name)
            .map(str::to_owned),
        reference: Some(test.reference.trim())
            .filter(|raw| is_http_link(raw))
            .map(str::to_owned),
        objectives: test.objectives.clone(),
        sections,
        classification,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use checklist_core::model::CatalogSources;

    const CHECKLIST: &str = r#"{"categories": {"Authorization Testing": {"id": "WSTG-ATHZ", "tests": [
        {"id": "WSTG-ATHZ-02", "name": "Bypassing Authorization Schema",
         "reference": "https://owasp.org/wstg/athz-02", "objectives": ["Assess horizontal access"]},
        {"id": "WSTG-ATHZ-03", "name": "Privilege Escalation", "reference": "not a url"}
    ]}}}"#;
    const DESCRIPTIONS: &str = r#"{"Authorization Testing": "Who may do what"}"#;
    const INFO: &str = r#"{"WSTG-ATHZ-02": {
        "summary": "<p onclick=\"x()\">Summary</p><script>alert(1)</script>",
        "how-to": "  ",
        "remediation": "<p>Check every request</p>"
    }}"#;
    const CLASSIFICATION: &str = r#"{
        "A01:2021 Broken Access Control": {"description": "Access", "link": "https://owasp.org/A01", "level": "critico"},
        "A03:2021 Injection": {"description": "Injection", "link": "https://owasp.org/A03", "level": "alto"}
    }"#;

    fn catalog() -> Catalog {
        Catalog::from_sources(CatalogSources {
            checklist: CHECKLIST,
            category_descriptions: DESCRIPTIONS,
            test_info: INFO,
            classification: CLASSIFICATION,
        })
        .unwrap()
    }

    #[test]
    fn detail_sanitises_sections_and_skips_blank_ones() {
        let detail = build_test_detail(&catalog(), &TestId::new("WSTG-ATHZ-02")).unwrap();
        let titles: Vec<&str> = detail.sections.iter().map(|s| s.title).collect();
        assert_eq!(titles, ["Summary", "Remediation"]);
        assert!(!detail.sections[0].html.contains("script"));
        assert!(!detail.sections[0].html.contains("onclick"));
        assert_eq!(detail.category_description.as_deref(), Some("Who may do what"));
        assert_eq!(
            detail.reference.as_deref(),
            Some("https://owasp.org/wstg/athz-02")
        );
    }

    #[test]
    fn classification_rows_follow_category_codes() {
        let detail = build_test_detail(&catalog(), &TestId::new("WSTG-ATHZ-03")).unwrap();
        assert_eq!(detail.classification.len(), 1);
        let row = &detail.classification[0];
        assert_eq!(row.level_label, "Critical");
        assert_eq!(row.level_class, "risk-critical");
        assert!(detail.reference.is_none());
        assert!(detail.sections.is_empty());
    }

    #[test]
    fn unknown_test_has_no_detail() {
        assert!(build_test_detail(&catalog(), &TestId::new("WSTG-NOPE-01")).is_none());
    }
}
