//! Field rules for tender records

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::borrow::Cow;
use std::str::FromStr;
use validator::{Validate, ValidateArgs, ValidationError, ValidationErrors};

use super::fields::{describe, field, FieldErrors};
use crate::models::TenderStatus;

/// Length bounds for a tender title, counted in characters after trimming
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TitleRule {
    pub min_chars: usize,
    pub max_chars: usize,
}

impl TitleRule {
    /// Rule enforced by the record store
    pub const SERVER: TitleRule = TitleRule {
        min_chars: 3,
        max_chars: 200,
    };

    /// Stricter rule applied by the admin form before submission
    pub const CLIENT: TitleRule = TitleRule {
        min_chars: 5,
        max_chars: 200,
    };

    /// Returns the trimmed title or the message describing the broken bound
    pub fn check(&self, raw: Option<&str>) -> Result<String, String> {
        let trimmed = raw.map(str::trim).unwrap_or_default();
        let len = trimmed.chars().count();

        if len == 0 {
            return Err("Please enter a title for the tender.".to_string());
        }
        if len < self.min_chars {
            return Err(format!(
                "The title is too short. Please enter at least {} characters.",
                self.min_chars
            ));
        }
        if len > self.max_chars {
            return Err(format!(
                "The title is too long. Please use at most {} characters.",
                self.max_chars
            ));
        }
        Ok(trimmed.to_string())
    }
}

/// Parse a deadline as RFC 3339, an HTML `datetime-local` value, or a bare `YYYY-MM-DD`
/// date (midnight UTC).
pub fn parse_deadline(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Deadline must parse and lie strictly after `now`
pub fn check_deadline(raw: Option<&str>, now: DateTime<Utc>) -> Result<DateTime<Utc>, String> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err("Please select a deadline date.".to_string());
    }
    let deadline = parse_deadline(raw).ok_or_else(|| "The deadline is not a valid date.".to_string())?;
    check_future(deadline, now)
}

/// Already-typed deadline variant of [`check_deadline`]
pub fn check_future(deadline: DateTime<Utc>, now: DateTime<Utc>) -> Result<DateTime<Utc>, String> {
    if deadline <= now {
        return Err("The deadline must be a future date.".to_string());
    }
    Ok(deadline)
}

pub fn check_status(raw: &str) -> Result<TenderStatus, String> {
    TenderStatus::from_str(raw.trim())
        .map_err(|_| "Status must be one of: active, closed, cancelled.".to_string())
}

/// Whether absent fields are errors (create, full replace) or left unchanged (partial update)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftMode {
    Complete,
    Partial,
}

/// Values the field rules are checked against
#[derive(Debug, Clone, Copy)]
pub struct RuleContext {
    pub now: DateTime<Utc>,
}

/// Raw, untrusted tender fields as received from a form or JSON body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenderDraft {
    pub title: Option<String>,
    pub deadline: Option<String>,
    pub status: Option<String>,
    /// Violations found while decoding the request, reported with the field rules
    pub rejected: FieldErrors,
}

/// Fields that passed validation; `None` means "not supplied"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenderFields {
    pub title: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub status: Option<TenderStatus>,
}

impl TenderFields {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.deadline.is_none() && self.status.is_none()
    }
}

#[derive(Debug, Validate)]
#[validate(context = RuleContext)]
struct CompleteDraft {
    #[validate(
        required(message = "Please enter a title for the tender."),
        length(min = 3, max = 200)
    )]
    title: Option<String>,
    #[validate(
        required(message = "Please select a deadline date."),
        custom(function = "future_deadline", use_context)
    )]
    deadline: Option<String>,
    #[validate(custom(function = "known_status"))]
    status: Option<String>,
}

#[derive(Debug, Validate)]
#[validate(context = RuleContext)]
struct PartialDraft {
    #[validate(length(min = 3, max = 200))]
    title: Option<String>,
    #[validate(custom(function = "future_deadline", use_context))]
    deadline: Option<String>,
    #[validate(custom(function = "known_status"))]
    status: Option<String>,
}

fn rule_error(code: &'static str, message: String) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Owned(message))
}

fn future_deadline(raw: &str, context: &RuleContext) -> Result<(), ValidationError> {
    check_deadline(Some(raw), context.now)
        .map(|_| ())
        .map_err(|message| rule_error("deadline", message))
}

fn known_status(raw: &str) -> Result<(), ValidationError> {
    check_status(raw)
        .map(|_| ())
        .map_err(|message| rule_error("status", message))
}

impl TenderDraft {
    /// Validate every supplied (or, in complete mode, required) field against the server rules,
    /// recording each violation in `errors`.
    pub fn validate(&self, mode: DraftMode, now: DateTime<Utc>, errors: &mut FieldErrors) -> TenderFields {
        let title = self.title.as_deref().map(|t| t.trim().to_string());
        let deadline = self.deadline.clone();
        let status = self
            .status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let context = RuleContext { now };
        let outcome = match mode {
            DraftMode::Complete => CompleteDraft {
                title: title.clone(),
                deadline: deadline.clone(),
                status: status.clone(),
            }
            .validate_with_args(&context),
            DraftMode::Partial => PartialDraft {
                title: title.clone(),
                deadline: deadline.clone(),
                status: status.clone(),
            }
            .validate_with_args(&context),
        };

        let violations = match outcome {
            Ok(()) => FieldErrors::new(),
            Err(e) => field_violations(&e, title.as_deref()),
        };

        let fields = TenderFields {
            title: title.filter(|_| !violations.has_field(field::TITLE)),
            deadline: deadline
                .filter(|_| !violations.has_field(field::DEADLINE))
                .and_then(|raw| parse_deadline(&raw)),
            status: status
                .filter(|_| !violations.has_field(field::STATUS))
                .and_then(|raw| check_status(&raw).ok()),
        };

        errors.extend(violations);
        errors.extend(self.rejected.clone());
        fields
    }
}

/// Messages for the tender fields, in form order; title bounds get the wording of [`TitleRule`]
fn field_violations(errors: &ValidationErrors, title: Option<&str>) -> FieldErrors {
    let by_field = errors.field_errors();
    let mut out = FieldErrors::new();
    for name in [field::TITLE, field::DEADLINE, field::STATUS] {
        let Some(list) = by_field.get(name) else {
            continue;
        };
        for error in list.iter() {
            let message = match (&error.message, name) {
                (None, field::TITLE) => TitleRule::SERVER
                    .check(title)
                    .err()
                    .unwrap_or_else(|| describe(name, error)),
                _ => describe(name, error),
            };
            out.push(name, message);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 6, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_title_bounds() {
        let rule = TitleRule::SERVER;
        assert!(rule.check(Some("abc")).is_ok());
        assert!(rule.check(Some(&"x".repeat(200))).is_ok());
        assert!(rule.check(Some("ab")).is_err());
        assert!(rule.check(Some(&"x".repeat(201))).is_err());
    }

    #[test]
    fn test_title_is_trimmed_before_measuring() {
        let rule = TitleRule::SERVER;
        assert_eq!(rule.check(Some("   abc   ")), Ok("abc".to_string()));
        assert_eq!(
            rule.check(Some("  ab  ")),
            Err("The title is too short. Please enter at least 3 characters.".to_string())
        );
        assert_eq!(
            rule.check(Some("    ")),
            Err("Please enter a title for the tender.".to_string())
        );
    }

    #[test]
    fn test_title_counts_characters_not_bytes() {
        let title = "é".repeat(200);
        assert!(TitleRule::SERVER.check(Some(&title)).is_ok());
    }

    #[test]
    fn test_client_rule_is_stricter() {
        assert!(TitleRule::SERVER.check(Some("Lift")).is_ok());
        assert!(TitleRule::CLIENT.check(Some("Lift")).is_err());
    }

    #[test]
    fn test_parse_deadline_formats() {
        assert_eq!(
            parse_deadline("2030-07-01"),
            Some(Utc.with_ymd_and_hms(2030, 7, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            parse_deadline("2030-07-01T15:30"),
            Some(Utc.with_ymd_and_hms(2030, 7, 1, 15, 30, 0).unwrap())
        );
        assert_eq!(
            parse_deadline("2030-07-01T15:30:00+02:00"),
            Some(Utc.with_ymd_and_hms(2030, 7, 1, 13, 30, 0).unwrap())
        );
        assert_eq!(parse_deadline("next tuesday"), None);
    }

    #[test]
    fn test_deadline_must_be_strictly_future() {
        let now = now();
        assert!(check_future(now + Duration::seconds(1), now).is_ok());
        assert_eq!(
            check_future(now, now),
            Err("The deadline must be a future date.".to_string())
        );
        assert!(check_future(now - Duration::days(1), now).is_err());
        assert_eq!(
            check_deadline(Some(""), now),
            Err("Please select a deadline date.".to_string())
        );
        assert_eq!(
            check_deadline(Some("31/12/2030"), now),
            Err("The deadline is not a valid date.".to_string())
        );
    }

    #[test]
    fn test_complete_draft_reports_every_field() {
        let draft = TenderDraft {
            title: Some("ab".to_string()),
            deadline: Some("2020-01-01".to_string()),
            status: Some("archived".to_string()),
            ..Default::default()
        };
        let mut errors = FieldErrors::new();
        let fields = draft.validate(DraftMode::Complete, now(), &mut errors);

        assert!(fields.is_empty());
        assert!(errors.has_field(field::TITLE));
        assert!(errors.has_field(field::DEADLINE));
        assert!(errors.has_field(field::STATUS));
    }

    #[test]
    fn test_complete_draft_requires_title_and_deadline() {
        let mut errors = FieldErrors::new();
        TenderDraft::default().validate(DraftMode::Complete, now(), &mut errors);
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.for_field(field::TITLE).collect::<Vec<_>>(),
            vec!["Please enter a title for the tender."]
        );
        assert_eq!(
            errors.for_field(field::DEADLINE).collect::<Vec<_>>(),
            vec!["Please select a deadline date."]
        );
    }

    #[test]
    fn test_title_length_messages_follow_the_bound_broken() {
        let cases = [
            ("   ", "Please enter a title for the tender."),
            (" ab ", "The title is too short. Please enter at least 3 characters."),
        ];
        for (title, expected) in cases {
            let draft = TenderDraft {
                title: Some(title.to_string()),
                ..Default::default()
            };
            let mut errors = FieldErrors::new();
            draft.validate(DraftMode::Partial, now(), &mut errors);
            assert_eq!(errors.for_field(field::TITLE).collect::<Vec<_>>(), vec![expected]);
        }

        let draft = TenderDraft {
            title: Some("x".repeat(201)),
            ..Default::default()
        };
        let mut errors = FieldErrors::new();
        draft.validate(DraftMode::Partial, now(), &mut errors);
        assert_eq!(
            errors.for_field(field::TITLE).collect::<Vec<_>>(),
            vec!["The title is too long. Please use at most 200 characters."]
        );

        for title in ["abc".to_string(), "é".repeat(200)] {
            let draft = TenderDraft {
                title: Some(title),
                ..Default::default()
            };
            let mut errors = FieldErrors::new();
            draft.validate(DraftMode::Partial, now(), &mut errors);
            assert!(errors.is_empty());
        }
    }

    #[test]
    fn test_valid_complete_draft_is_trimmed_and_typed() {
        let draft = TenderDraft {
            title: Some("  Water tank cleaning  ".to_string()),
            deadline: Some("2030-07-01T15:30".to_string()),
            status: Some(" closed ".to_string()),
            ..Default::default()
        };
        let mut errors = FieldErrors::new();
        let fields = draft.validate(DraftMode::Complete, now(), &mut errors);

        assert!(errors.is_empty());
        assert_eq!(fields.title.as_deref(), Some("Water tank cleaning"));
        assert_eq!(
            fields.deadline,
            Some(Utc.with_ymd_and_hms(2030, 7, 1, 15, 30, 0).unwrap())
        );
        assert_eq!(fields.status, Some(TenderStatus::Closed));
    }

    #[test]
    fn test_rejected_fields_are_reported_with_the_rest() {
        let draft = TenderDraft {
            title: Some("ab".to_string()),
            rejected: FieldErrors::single(field::VERSION, "Version must be a positive whole number."),
            ..Default::default()
        };
        let mut errors = FieldErrors::new();
        draft.validate(DraftMode::Partial, now(), &mut errors);

        assert!(errors.has_field(field::TITLE));
        assert!(errors.has_field(field::VERSION));
    }

    #[test]
    fn test_partial_draft_only_checks_supplied_fields() {
        let draft = TenderDraft {
            title: Some("Water tank cleaning".to_string()),
            ..Default::default()
        };
        let mut errors = FieldErrors::new();
        let fields = draft.validate(DraftMode::Partial, now(), &mut errors);

        assert!(errors.is_empty());
        assert_eq!(fields.title.as_deref(), Some("Water tank cleaning"));
        assert_eq!(fields.deadline, None);
    }

    #[test]
    fn test_partial_draft_revalidates_future_deadline() {
        let draft = TenderDraft {
            deadline: Some("2030-05-31".to_string()),
            ..Default::default()
        };
        let mut errors = FieldErrors::new();
        draft.validate(DraftMode::Partial, now(), &mut errors);
        assert_eq!(
            errors.for_field(field::DEADLINE).collect::<Vec<_>>(),
            vec!["The deadline must be a future date."]
        );
    }
}
