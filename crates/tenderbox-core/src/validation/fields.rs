//! Field-level validation failures
//!
//! Validators never stop at the first problem: every violation is pushed into a
//! [`FieldErrors`] list so a form can highlight all offending fields at once.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use validator::{ValidationError, ValidationErrors};

/// Form field names shared by the server and the client
pub mod field {
    pub const TITLE: &str = "title";
    pub const DEADLINE: &str = "deadline";
    pub const STATUS: &str = "status";
    pub const FILE: &str = "tenderDocument";
    pub const VERSION: &str = "version";
}

/// A single failed rule on a single field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Ordered collection of field errors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self(vec![FieldError::new(field, message)])
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    pub fn extend(&mut self, other: FieldErrors) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Messages recorded for one field, in insertion order
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// `Ok(())` when nothing was recorded, otherwise the collected errors
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl IntoIterator for FieldErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Field errors from a `#[derive(Validate)]` struct, ordered by field name
impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut by_field = errors.field_errors().into_iter().collect::<Vec<_>>();
        by_field.sort_by(|a, b| a.0.cmp(&b.0));

        let mut out = FieldErrors::new();
        for (name, list) in by_field {
            for error in list.iter() {
                out.push(name.to_string(), describe(&name, error));
            }
        }
        out
    }
}

/// The rule's own message, or one naming the failed rule when it has none
pub fn describe(field: &str, error: &ValidationError) -> String {
    match &error.message {
        Some(message) => message.to_string(),
        None => format!("The {} field failed the '{}' rule.", field, error.code),
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        f.write_str(&joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_every_violation() {
        let mut errors = FieldErrors::new();
        errors.push(field::TITLE, "too short");
        errors.push(field::DEADLINE, "in the past");
        errors.push(field::TITLE, "blank");

        assert_eq!(errors.len(), 3);
        assert_eq!(
            errors.for_field(field::TITLE).collect::<Vec<_>>(),
            vec!["too short", "blank"]
        );
        assert!(errors.has_field(field::DEADLINE));
        assert!(!errors.has_field(field::FILE));
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn test_empty_is_ok() {
        assert!(FieldErrors::new().into_result().is_ok());
    }

    #[test]
    fn test_converts_derived_validation_errors() {
        use validator::Validate;

        #[derive(Validate)]
        struct Sample {
            #[validate(length(min = 1, message = "Name is required"))]
            name: String,
            #[validate(range(min = 1))]
            version: i64,
        }

        let errors = Sample {
            name: String::new(),
            version: 0,
        }
        .validate()
        .unwrap_err();
        let fields = FieldErrors::from(errors);

        assert_eq!(fields.len(), 2);
        assert_eq!(fields.for_field("name").collect::<Vec<_>>(), vec!["Name is required"]);
        assert_eq!(
            fields.for_field("version").collect::<Vec<_>>(),
            vec!["The version field failed the 'range' rule."]
        );
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let errors = FieldErrors::single(field::FILE, "File size must be less than 10MB");
        let json = serde_json::to_value(&errors).expect("serialize");
        assert!(json.is_array());
        assert_eq!(json[0]["field"], "tenderDocument");
    }
}
