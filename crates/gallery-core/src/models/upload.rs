//! Upload form model and validation

use chrono::{DateTime, Utc};
use thiserror::Error;
use url::Url;

use super::{Category, Identity, ItemRecord};
use crate::util::iso_timestamp;

/// Reasons an upload form is rejected before reaching the store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title is required")]
    MissingTitle,
    #[error("image URL is required")]
    MissingUrl,
    #[error("image URL must be a valid public http(s) URL")]
    InvalidUrl,
    #[error("prompt is required")]
    MissingPrompt,
    #[error("unknown category '{0}'")]
    UnknownCategory(String),
}

/// The "add item" form as the user is filling it in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadForm {
    pub title: String,
    pub url: String,
    pub prompt: String,
    pub category: Category,
}

impl UploadForm {
    /// Back to empty fields and the default category.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Check the form, trimming title and URL.
    ///
    /// The prompt keeps its inner formatting; only whitespace-only prompts are
    /// rejected.
    pub fn validate(&self) -> Result<ValidatedUpload, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::MissingTitle);
        }

        let raw_url = self.url.trim();
        if raw_url.is_empty() {
            return Err(ValidationError::MissingUrl);
        }
        let url = Url::parse(raw_url).map_err(|_| ValidationError::InvalidUrl)?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(ValidationError::InvalidUrl);
        }

        if self.prompt.trim().is_empty() {
            return Err(ValidationError::MissingPrompt);
        }

        Ok(ValidatedUpload {
            title: title.to_string(),
            url: raw_url.to_string(),
            prompt: self.prompt.clone(),
            category: self.category,
        })
    }
}

/// Upload input that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUpload {
    title: String,
    url: String,
    prompt: String,
    category: Category,
}

impl ValidatedUpload {
    /// Stamp the upload with its author and creation time.
    #[must_use]
    pub fn into_record(self, created_by: &Identity, created_at: DateTime<Utc>) -> ItemRecord {
        ItemRecord {
            title: self.title,
            url: self.url,
            prompt: self.prompt,
            category: self.category,
            timestamp: iso_timestamp(created_at),
            created_by: created_by.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn filled_form() -> UploadForm {
        UploadForm {
            title: "Neon Samurai".to_string(),
            url: "https://example.com/a.png".to_string(),
            prompt: "a samurai in neon rain".to_string(),
            category: Category::SciFi,
        }
    }

    #[test]
    fn valid_form_becomes_a_record() {
        let created_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let record = filled_form()
            .validate()
            .unwrap()
            .into_record(&Identity::new("user-1"), created_at);

        assert_eq!(record.title, "Neon Samurai");
        assert_eq!(record.url, "https://example.com/a.png");
        assert_eq!(record.prompt, "a samurai in neon rain");
        assert_eq!(record.category, Category::SciFi);
        assert_eq!(record.timestamp, "2024-05-01T12:30:00.000Z");
        assert_eq!(record.created_by, Identity::new("user-1"));
    }

    #[test]
    fn blank_fields_are_rejected_in_order() {
        let mut form = filled_form();
        form.title = "  ".to_string();
        assert_eq!(form.validate(), Err(ValidationError::MissingTitle));

        let mut form = filled_form();
        form.url = String::new();
        assert_eq!(form.validate(), Err(ValidationError::MissingUrl));

        let mut form = filled_form();
        form.prompt = "\n\t".to_string();
        assert_eq!(form.validate(), Err(ValidationError::MissingPrompt));
    }

    #[test]
    fn malformed_urls_are_rejected() {
        for bad in ["example.com/a.png", "not a url", "ftp://example.com/a.png", "https://"] {
            let mut form = filled_form();
            form.url = bad.to_string();
            assert_eq!(form.validate(), Err(ValidationError::InvalidUrl), "{bad}");
        }
    }

    #[test]
    fn reset_restores_defaults() {
        let mut form = filled_form();
        form.reset();
        assert_eq!(form, UploadForm::default());
        assert_eq!(form.category, Category::General);
    }
}
