//! User-submitted resource reports.
//!
//! Reports are validated and logged; nothing is stored.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const TITLE_MAX_LENGTH: usize = 100;
pub const DESCRIPTION_MAX_LENGTH: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportCategory {
    Food,
    #[serde(rename = "Personal Hygiene")]
    PersonalHygiene,
    Clothing,
    #[serde(rename = "School Supplies")]
    SchoolSupplies,
}

impl ReportCategory {
    pub const ALL: [ReportCategory; 4] = [
        Self::Food,
        Self::PersonalHygiene,
        Self::Clothing,
        Self::SchoolSupplies,
    ];
}

impl fmt::Display for ReportCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Food => write!(f, "Food"),
            Self::PersonalHygiene => write!(f, "Personal Hygiene"),
            Self::Clothing => write!(f, "Clothing"),
            Self::SchoolSupplies => write!(f, "School Supplies"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<ReportCategory>,
    #[serde(default)]
    pub image_uri: Option<String>,
}

/// Per-field validation messages. Empty means the form is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ReportErrors {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.category.is_none()
    }
}

impl ReportForm {
    pub fn validate(&self) -> ReportErrors {
        ReportErrors {
            title: check_text("Title", &self.title, TITLE_MAX_LENGTH),
            description: check_text("Description", &self.description, DESCRIPTION_MAX_LENGTH),
            category: self.category.is_none().then(|| "Category is required".to_string()),
        }
    }
}

/// Length is counted in characters, untrimmed.
fn check_text(field: &str, value: &str, max: usize) -> Option<String> {
    if value.trim().is_empty() {
        Some(format!("{} is required", field))
    } else if value.chars().count() > max {
        Some(format!("{} must be {} characters or less", field, max))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ReportForm {
        ReportForm {
            title: "Fridge is empty".into(),
            description: "The community fridge on 5th has been empty since Monday.".into(),
            category: Some(ReportCategory::Food),
            image_uri: None,
        }
    }

    #[test]
    fn test_valid_form() {
        assert!(valid().validate().is_empty());
    }

    #[test]
    fn test_required_fields() {
        let errors = ReportForm { title: "   ".into(), ..ReportForm::default() }.validate();
        assert_eq!(errors.title.as_deref(), Some("Title is required"));
        assert_eq!(errors.description.as_deref(), Some("Description is required"));
        assert_eq!(errors.category.as_deref(), Some("Category is required"));
    }

    #[test]
    fn test_length_limits() {
        let form = ReportForm {
            title: "x".repeat(TITLE_MAX_LENGTH),
            description: "y".repeat(DESCRIPTION_MAX_LENGTH),
            ..valid()
        };
        assert!(form.validate().is_empty());

        let form = ReportForm {
            title: "x".repeat(TITLE_MAX_LENGTH + 1),
            description: "y".repeat(DESCRIPTION_MAX_LENGTH + 1),
            ..valid()
        };
        let errors = form.validate();
        assert_eq!(errors.title.as_deref(), Some("Title must be 100 characters or less"));
        assert_eq!(errors.description.as_deref(), Some("Description must be 500 characters or less"));
    }

    #[test]
    fn test_category_names() {
        let form: ReportForm = serde_json::from_str(
            r#"{"title": "t", "description": "d", "category": "Personal Hygiene"}"#,
        )
        .unwrap();
        assert_eq!(form.category, Some(ReportCategory::PersonalHygiene));

        assert!(serde_json::from_str::<ReportForm>(r#"{"category": "Toys"}"#).is_err());
        assert_eq!(ReportCategory::SchoolSupplies.to_string(), "School Supplies");
        assert_eq!(ReportCategory::ALL.len(), 4);
    }

    #[test]
    fn test_errors_serialize_only_failures() {
        let errors = ReportForm { category: None, ..valid() }.validate();
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, serde_json::json!({"category": "Category is required"}));
    }
}
