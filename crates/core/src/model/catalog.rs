use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::model::ids::{CategoryId, TestId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("failed to parse {document}: {message}")]
    Parse {
        document: &'static str,
        message: String,
    },

    #[error("unsupported locale: {0}")]
    UnsupportedLocale(String),
}

//
// ─── LOCALE ────────────────────────────────────────────────────────────────────
//

/// Language of the catalog text. The progress document is locale independent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    It,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Self::En, Self::It];

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::It => "it",
        }
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::It => "Italiano",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "it" => Ok(Self::It),
            other => Err(CatalogError::UnsupportedLocale(other.to_owned())),
        }
    }
}

//
// ─── ENTRIES ───────────────────────────────────────────────────────────────────
//

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogTest {
    pub id: TestId,
    pub name: String,
    #[serde(default)]
    pub reference: String,
    #[serde(default)]
    pub objectives: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub tests: Vec<CatalogTest>,
}

impl Category {
    pub fn test_ids(&self) -> impl Iterator<Item = &TestId> {
        self.tests.iter().map(|test| &test.id)
    }
}

/// Rich-text (HTML) reference sections for one test.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestInfo {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, rename = "how-to")]
    pub how_to: Option<String>,
    #[serde(default)]
    pub tools: Option<String>,
    #[serde(default)]
    pub remediation: Option<String>,
    #[serde(default)]
    pub test_objectives: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "basso", alias = "low")]
    Low,
    #[serde(rename = "medio", alias = "medium")]
    Medium,
    #[serde(rename = "alto", alias = "high")]
    High,
    #[serde(rename = "critico", alias = "critical")]
    Critical,
}

impl RiskLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// One row of the secondary classification table (OWASP Top 10 style).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationItem {
    pub description: String,
    #[serde(default)]
    pub link: String,
    pub level: RiskLevel,
}

impl ClassificationItem {
    /// The link, only if it is an absolute http(s) URL.
    #[must_use]
    pub fn link_url(&self) -> Option<Url> {
        Url::parse(&self.link)
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https"))
    }
}

/// Classification codes per category family.
const CLASSIFICATION_BY_CATEGORY: &[(&str, &[&str])] = &[
    ("WSTG-INFO", &["A01", "A05", "A06"]),
    ("WSTG-CONF", &["A05", "A06"]),
    ("WSTG-IDNT", &["A07"]),
    ("WSTG-ATHN", &["A07"]),
    ("WSTG-ATHZ", &["A01"]),
    ("WSTG-SESS", &["A07"]),
    ("WSTG-INPV", &["A03", "A10"]),
    ("WSTG-ERRH", &["A05"]),
    ("WSTG-CRYP", &["A02", "A08"]),
    ("WSTG-BUSL", &["A04", "A08"]),
    ("WSTG-CLNT", &["A03", "A05"]),
    ("WSTG-APIT", &["A01", "A03", "A05", "A06", "A10"]),
];

/// Classification codes mapped to a category id; empty for unknown families.
#[must_use]
pub fn classification_codes(category: &CategoryId) -> &'static [&'static str] {
    CLASSIFICATION_BY_CATEGORY
        .iter()
        .find(|(family, _)| *family == category.as_str())
        .map(|(_, codes)| *codes)
        .unwrap_or_default()
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// Raw JSON texts of the four documents that make up a locale's catalog.
#[derive(Clone, Copy, Debug)]
pub struct CatalogSources<'a> {
    pub checklist: &'a str,
    pub category_descriptions: &'a str,
    pub test_info: &'a str,
    pub classification: &'a str,
}

#[derive(Deserialize)]
struct RawChecklist {
    categories: IndexMap<String, RawCategory>,
}

#[derive(Deserialize)]
struct RawCategory {
    id: CategoryId,
    #[serde(default)]
    tests: Vec<CatalogTest>,
}

/// Read-only taxonomy of categories and tests plus descriptive metadata.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    categories: Vec<Category>,
    category_descriptions: HashMap<String, String>,
    test_info: HashMap<TestId, TestInfo>,
    classification: IndexMap<String, ClassificationItem>,
}

impl Catalog {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A catalog with categories only, no auxiliary data.
    #[must_use]
    pub fn from_categories(categories: Vec<Category>) -> Self {
        Self {
            categories,
            ..Self::default()
        }
    }

    /// Parse the four catalog documents. Category order follows the
    /// `categories` object of the checklist document.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` naming the first document that failed.
    pub fn from_sources(sources: CatalogSources<'_>) -> Result<Self, CatalogError> {
        let raw: RawChecklist = parse_document("checklist", sources.checklist)?;
        let category_descriptions =
            parse_document("category descriptions", sources.category_descriptions)?;
        let test_info = parse_document("test info", sources.test_info)?;
        let classification =
            parse_document("classification table", sources.classification)?;

        let categories = raw
            .categories
            .into_iter()
            .map(|(name, category)| Category {
                id: category.id,
                name,
                tests: category.tests,
            })
            .collect();

        Ok(Self {
            categories,
            category_descriptions,
            test_info,
            classification,
        })
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    #[must_use]
    pub fn test_count(&self) -> usize {
        self.categories.iter().map(|c| c.tests.len()).sum()
    }

    pub fn tests(&self) -> impl Iterator<Item = &CatalogTest> {
        self.categories.iter().flat_map(|c| c.tests.iter())
    }

    /// Every test id in catalog order; the usual universe for counters.
    #[must_use]
    pub fn all_test_ids(&self) -> Vec<TestId> {
        self.tests().map(|test| test.id.clone()).collect()
    }

    #[must_use]
    pub fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| &c.id == id)
    }

    #[must_use]
    pub fn find_test(&self, id: &TestId) -> Option<(&Category, &CatalogTest)> {
        self.categories.iter().find_map(|category| {
            category
                .tests
                .iter()
                .find(|test| &test.id == id)
                .map(|test| (category, test))
        })
    }

    /// Inclusive id range between two tests in flattened catalog order,
    /// regardless of which one comes first. Empty if either is unknown.
    #[must_use]
    pub fn tests_between(&self, from: &TestId, to: &TestId) -> Vec<TestId> {
        let flat: Vec<&TestId> = self.tests().map(|test| &test.id).collect();
        let start = flat.iter().position(|id| *id == from);
        let end = flat.iter().position(|id| *id == to);
        let (Some(start), Some(end)) = (start, end) else {
            return Vec::new();
        };
        let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
        flat[lo..=hi].iter().map(|id| (*id).clone()).collect()
    }

    #[must_use]
    pub fn category_description(&self, category_name: &str) -> Option<&str> {
        self.category_descriptions
            .get(category_name)
            .map(String::as_str)
    }

    #[must_use]
    pub fn test_info(&self, id: &TestId) -> Option<&TestInfo> {
        self.test_info.get(id)
    }

    #[must_use]
    pub fn classification(&self) -> &IndexMap<String, ClassificationItem> {
        &self.classification
    }

    /// Classification rows whose key starts with one of the category's codes.
    #[must_use]
    pub fn classification_for(&self, category: &CategoryId) -> Vec<(&str, &ClassificationItem)> {
        let codes = classification_codes(category);
        self.classification
            .iter()
            .filter(|(key, _)| codes.iter().any(|code| key.starts_with(*code)))
            .map(|(key, item)| (key.as_str(), item))
            .collect()
    }
}

fn parse_document<T: serde::de::DeserializeOwned>(
    document: &'static str,
    text: &str,
) -> Result<T, CatalogError> {
    serde_json::from_str(text).map_err(|err| CatalogError::Parse {
        document,
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECKLIST: &str = r#"{
        "categories": {
            "Information Gathering": {
                "id": "WSTG-INFO",
                "tests": [
                    {"id": "WSTG-INFO-01", "name": "Search Engine Discovery", "reference": "https://owasp.org/info-01", "objectives": ["Identify leaks"]},
                    {"id": "WSTG-INFO-02", "name": "Fingerprint Web Server", "reference": "https://owasp.org/info-02", "objectives": []}
                ]
            },
            "Authorization Testing": {
                "id": "WSTG-ATHZ",
                "tests": [
                    {"id": "WSTG-ATHZ-01", "name": "Directory Traversal", "reference": "", "objectives": []}
                ]
            }
        }
    }"#;

    const DESCRIPTIONS: &str = r#"{"Information Gathering": "Recon phase"}"#;
    const INFO: &str = r#"{"WSTG-INFO-01": {"summary": "<p>Sum</p>", "how-to": "<p>How</p>"}}"#;
    const CLASSIFICATION: &str = r#"{
        "A01:2021 Broken Access Control": {"description": "Access", "link": "https://owasp.org/A01", "level": "critico"},
        "A07:2021 Identification Failures": {"description": "Auth", "link": "javascript:alert(1)", "level": "high"}
    }"#;

    fn sources() -> CatalogSources<'static> {
        CatalogSources {
            checklist: CHECKLIST,
            category_descriptions: DESCRIPTIONS,
            test_info: INFO,
            classification: CLASSIFICATION,
        }
    }

    #[test]
    fn parses_categories_in_document_order() {
        let catalog = Catalog::from_sources(sources()).unwrap();
        let names: Vec<&str> = catalog.categories().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Information Gathering", "Authorization Testing"]);
        assert_eq!(catalog.test_count(), 3);
        assert_eq!(
            catalog.all_test_ids(),
            vec![
                TestId::new("WSTG-INFO-01"),
                TestId::new("WSTG-INFO-02"),
                TestId::new("WSTG-ATHZ-01"),
            ]
        );
    }

    #[test]
    fn auxiliary_lookups() {
        let catalog = Catalog::from_sources(sources()).unwrap();
        assert_eq!(
            catalog.category_description("Information Gathering"),
            Some("Recon phase")
        );
        let info = catalog.test_info(&TestId::new("WSTG-INFO-01")).unwrap();
        assert_eq!(info.how_to.as_deref(), Some("<p>How</p>"));
        assert!(info.tools.is_none());

        let (category, test) = catalog.find_test(&TestId::new("WSTG-ATHZ-01")).unwrap();
        assert_eq!(category.id, CategoryId::new("WSTG-ATHZ"));
        assert_eq!(test.name, "Directory Traversal");
    }

    #[test]
    fn classification_levels_accept_both_spellings() {
        let catalog = Catalog::from_sources(sources()).unwrap();
        let levels: Vec<RiskLevel> = catalog.classification().values().map(|i| i.level).collect();
        assert_eq!(levels, [RiskLevel::Critical, RiskLevel::High]);
    }

    #[test]
    fn classification_for_category_uses_code_table() {
        let catalog = Catalog::from_sources(sources()).unwrap();
        let rows = catalog.classification_for(&CategoryId::new("WSTG-ATHZ"));
        assert_eq!(rows.len(), 1);
        assert!(rows[0].0.starts_with("A01"));
        assert!(rows[0].1.link_url().is_some());

        let unknown = catalog.classification_for(&CategoryId::new("WSTG-NOPE"));
        assert!(unknown.is_empty());
    }

    #[test]
    fn non_http_links_are_rejected() {
        let catalog = Catalog::from_sources(sources()).unwrap();
        let item = catalog.classification().values().nth(1).unwrap();
        assert!(item.link_url().is_none());
    }

    #[test]
    fn tests_between_is_order_independent_and_inclusive() {
        let catalog = Catalog::from_sources(sources()).unwrap();
        let forward = catalog.tests_between(
            &TestId::new("WSTG-INFO-02"),
            &TestId::new("WSTG-ATHZ-01"),
        );
        let backward = catalog.tests_between(
            &TestId::new("WSTG-ATHZ-01"),
            &TestId::new("WSTG-INFO-02"),
        );
        assert_eq!(forward, backward);
        assert_eq!(forward.len(), 2);
        assert!(catalog
            .tests_between(&TestId::new("WSTG-INFO-01"), &TestId::new("missing"))
            .is_empty());
    }

    #[test]
    fn parse_errors_name_the_document() {
        let broken = CatalogSources {
            test_info: "{not json",
            ..sources()
        };
        let err = Catalog::from_sources(broken).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Parse {
                document: "test info",
                ..
            }
        ));
    }

    #[test]
    fn locale_parsing() {
        assert_eq!("IT".parse::<Locale>().unwrap(), Locale::It);
        assert_eq!(Locale::default().code(), "en");
        assert!("fr".parse::<Locale>().is_err());
    }
}
