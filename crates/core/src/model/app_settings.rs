use thiserror::Error;

use crate::model::catalog::Locale;

/// Preferences that survive restarts: catalog language and the handle of the
/// last progress document that was saved or loaded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppSettings {
    locale: Locale,
    last_document: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct AppSettingsDraft {
    pub locale: Option<String>,
    pub last_document: Option<String>,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppSettingsError {
    #[error("unsupported locale: {0}")]
    InvalidLocale(String),
}

impl AppSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and normalize the draft into persisted settings.
    ///
    /// # Errors
    ///
    /// Returns `AppSettingsError` if the locale is present but unsupported.
    pub fn validate(self) -> Result<AppSettings, AppSettingsError> {
        let locale = match normalize_optional(self.locale) {
            Some(raw) => raw
                .parse::<Locale>()
                .map_err(|_| AppSettingsError::InvalidLocale(raw))?,
            None => Locale::default(),
        };

        Ok(AppSettings {
            locale,
            last_document: normalize_optional(self.last_document),
        })
    }
}

impl AppSettings {
    /// Rebuild settings from stored columns.
    ///
    /// # Errors
    ///
    /// Returns `AppSettingsError` if the stored locale is no longer supported.
    pub fn from_persisted(
        locale: Option<String>,
        last_document: Option<String>,
    ) -> Result<Self, AppSettingsError> {
        AppSettingsDraft {
            locale,
            last_document,
        }
        .validate()
    }

    #[must_use]
    pub fn locale(&self) -> Locale {
        self.locale
    }

    #[must_use]
    pub fn last_document(&self) -> Option<&str> {
        self.last_document.as_deref()
    }

    #[must_use]
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    #[must_use]
    pub fn with_last_document(mut self, handle: impl Into<String>) -> Self {
        self.last_document = normalize_optional(Some(handle.into()));
        self
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_draft_uses_defaults() {
        let settings = AppSettingsDraft::new().validate().unwrap();
        assert_eq!(settings, AppSettings::default());
        assert_eq!(settings.locale(), Locale::En);
        assert!(settings.last_document().is_none());
    }

    #[test]
    fn blank_values_are_normalized_away() {
        let settings = AppSettings::from_persisted(Some("  ".into()), Some(" ".into())).unwrap();
        assert_eq!(settings.locale(), Locale::En);
        assert!(settings.last_document().is_none());
    }

    #[test]
    fn invalid_locale_is_rejected() {
        let err = AppSettings::from_persisted(Some("klingon".into()), None).unwrap_err();
        assert!(matches!(err, AppSettingsError::InvalidLocale(raw) if raw == "klingon"));
    }

    #[test]
    fn builders_update_fields() {
        let settings = AppSettings::default()
            .with_locale(Locale::It)
            .with_last_document("/tmp/wstg.json");
        assert_eq!(settings.locale(), Locale::It);
        assert_eq!(settings.last_document(), Some("/tmp/wstg.json"));
    }
}
