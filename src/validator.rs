//! Submission validation and normalization
//!
//! Checks an incoming submission against the tag catalog and structural
//! rules, producing either a `NormalizedSubmission` ready for
//! persistence or the full list of per-field violations. Every problem
//! is reported in one pass so the caller can show a user everything at
//! once instead of iterating requests.
//!
//! Sanitization strips angle brackets, quote characters and control
//! characters from free text and identity strings, and truncates to a
//! fixed maximum. This is defensive normalization before persistence,
//! not a security boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{self, Question};

/// Maximum free-text answer length (characters)
pub const MAX_FREE_TEXT_LEN: usize = 500;
/// Maximum name length (characters)
pub const MAX_NAME_LEN: usize = 200;
/// Maximum email length per RFC 3696 erratum
pub const MAX_EMAIL_LEN: usize = 320;

// =============================================================================
// Wire types
// =============================================================================

/// Raw survey submission as posted by the onboarding form.
///
/// Outer keys are camelCase; the keys inside `surveyData` and
/// `customResponses` are snake_case, matching the form payload.
/// `timestamp` and `completed` are optional with server-assigned
/// defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub survey_data: SurveyData,
    /// Client-computed recommendation list (stored verbatim)
    #[serde(default)]
    pub recommendations: Vec<String>,
    /// Client-computed flattened tag list
    #[serde(default)]
    pub selected_tags: Vec<String>,
    #[serde(default)]
    pub custom_responses: CustomResponses,
    /// RFC 3339 submission time; server time is used when absent
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

/// The six question answers
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SurveyData {
    #[serde(default)]
    pub setting: Option<String>,
    #[serde(default)]
    pub profession: Option<String>,
    #[serde(default)]
    pub populations: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub modalities: Vec<String>,
    /// Free text for `prof_other` (older clients send it here instead
    /// of `customResponses.role_other`)
    #[serde(default)]
    pub profession_other: Option<String>,
    /// Free text for `mod_other` (older client location)
    #[serde(default)]
    pub modality_other: Option<String>,
}

/// Free-text answers accompanying the "other" sentinel tags
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomResponses {
    #[serde(default)]
    pub role_other: Option<String>,
    #[serde(default)]
    pub mod_other: Option<String>,
}

// =============================================================================
// Validation results
// =============================================================================

/// One field-level validation problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub code: &'static str,
    pub message: String,
}

impl FieldViolation {
    fn required(field: &str) -> Self {
        Self {
            field: field.to_string(),
            code: "required",
            message: format!("{} is required", field),
        }
    }

    fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            code: "invalid",
            message: message.into(),
        }
    }

    fn unknown_value(field: &str, value: &str) -> Self {
        Self {
            field: field.to_string(),
            code: "unknown_value",
            message: format!("'{}' is not an allowed value for {}", value, field),
        }
    }

    fn too_long(field: &str, max: usize) -> Self {
        Self {
            field: field.to_string(),
            code: "too_long",
            message: format!("{} exceeds {} characters", field, max),
        }
    }
}

/// Sanitized answer set, persisted verbatim on the survey response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurveyAnswers {
    pub setting: String,
    pub profession: String,
    pub populations: Vec<String>,
    pub interests: Vec<String>,
    pub frequency: String,
    pub modalities: Vec<String>,
}

/// A validated, sanitized submission ready for the pipeline
#[derive(Debug, Clone)]
pub struct NormalizedSubmission {
    pub name: String,
    /// Lowercased identity key
    pub email: String,
    pub answers: SurveyAnswers,
    pub recommendations: Vec<String>,
    /// Deduplicated flattened tag list, all values catalog-checked
    pub tags: Vec<String>,
    /// Free text for `prof_other`, kept only when the sentinel was selected
    pub profession_other: Option<String>,
    /// Free text for `mod_other`, kept only when the sentinel was selected
    pub modality_other: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub completed: bool,
}

// =============================================================================
// Validation
// =============================================================================

/// Validate a raw submission, returning all violations at once.
pub fn validate(request: SubmissionRequest) -> Result<NormalizedSubmission, Vec<FieldViolation>> {
    let mut violations = Vec::new();

    // (a) identity
    let name = sanitize(&request.name, MAX_NAME_LEN);
    if name.is_empty() {
        violations.push(FieldViolation::required("name"));
    }
    let email = request.email.trim().to_lowercase();
    if email.is_empty() {
        violations.push(FieldViolation::required("email"));
    } else if !is_valid_email(&email) {
        violations.push(FieldViolation::invalid(
            "email",
            "email is not a valid address",
        ));
    }

    // (b) + (c) the six answers, cardinality and catalog membership
    let data = &request.survey_data;
    let setting = check_single(Question::Setting, &data.setting, &mut violations);
    let profession = check_single(Question::Profession, &data.profession, &mut violations);
    let frequency = check_single(Question::Frequency, &data.frequency, &mut violations);
    let populations = check_multi(Question::Populations, &data.populations, &mut violations);
    let interests = check_multi(Question::Interests, &data.interests, &mut violations);
    let modalities = check_multi(Question::Modalities, &data.modalities, &mut violations);

    // (d) the flattened list must stay within the catalog union even when
    // every per-question field validated; callers can construct an
    // inconsistent flattened list
    for tag in &request.selected_tags {
        if !catalog::tag_union_contains(tag) {
            violations.push(FieldViolation::unknown_value("selectedTags", tag));
        }
    }

    // (e) free text, bounded and paired with its sentinel
    let role_text = request
        .custom_responses
        .role_other
        .as_deref()
        .or(data.profession_other.as_deref());
    let mod_text = request
        .custom_responses
        .mod_other
        .as_deref()
        .or(data.modality_other.as_deref());
    if let Some(text) = role_text {
        if text.chars().count() > MAX_FREE_TEXT_LEN {
            violations.push(FieldViolation::too_long(
                "customResponses.role_other",
                MAX_FREE_TEXT_LEN,
            ));
        }
    }
    if let Some(text) = mod_text {
        if text.chars().count() > MAX_FREE_TEXT_LEN {
            violations.push(FieldViolation::too_long(
                "customResponses.mod_other",
                MAX_FREE_TEXT_LEN,
            ));
        }
    }

    // Optional timestamp; present-but-unparsable is a violation rather
    // than being silently replaced
    let submitted_at = match request.timestamp.as_deref() {
        None => Utc::now(),
        Some(raw) => match DateTime::parse_from_rfc3339(raw) {
            Ok(dt) => dt.with_timezone(&Utc),
            Err(_) => {
                violations.push(FieldViolation::invalid(
                    "timestamp",
                    "timestamp is not a valid RFC 3339 datetime",
                ));
                Utc::now()
            }
        },
    };

    if !violations.is_empty() {
        return Err(violations);
    }

    // Free text only survives when its sentinel tag was actually selected
    let profession_other = if profession == "prof_other" {
        role_text
            .map(|t| sanitize(t, MAX_FREE_TEXT_LEN))
            .filter(|t| !t.is_empty())
    } else {
        None
    };
    let modality_other = if modalities.iter().any(|m| m == "mod_other") {
        mod_text
            .map(|t| sanitize(t, MAX_FREE_TEXT_LEN))
            .filter(|t| !t.is_empty())
    } else {
        None
    };

    Ok(NormalizedSubmission {
        name,
        email,
        answers: SurveyAnswers {
            setting,
            profession,
            frequency,
            populations,
            interests,
            modalities,
        },
        recommendations: request.recommendations,
        tags: dedup_preserving_order(request.selected_tags),
        profession_other,
        modality_other,
        submitted_at,
        completed: request.completed.unwrap_or(true),
    })
}

fn check_single(
    question: Question,
    value: &Option<String>,
    violations: &mut Vec<FieldViolation>,
) -> String {
    let field = format!("surveyData.{}", question.field());
    match value.as_deref().map(str::trim) {
        None | Some("") => {
            violations.push(FieldViolation::required(&field));
            String::new()
        }
        Some(v) => {
            if !question.contains(v) {
                violations.push(FieldViolation::unknown_value(&field, v));
            }
            v.to_string()
        }
    }
}

fn check_multi(
    question: Question,
    values: &[String],
    violations: &mut Vec<FieldViolation>,
) -> Vec<String> {
    let field = format!("surveyData.{}", question.field());
    if values.is_empty() {
        violations.push(FieldViolation::required(&field));
        return Vec::new();
    }
    for v in values {
        if !question.contains(v) {
            violations.push(FieldViolation::unknown_value(&field, v));
        }
    }
    dedup_preserving_order(values.to_vec())
}

// =============================================================================
// Helpers
// =============================================================================

/// Strip angle brackets, quotes and control characters, trim, and
/// truncate to `max_len` characters.
pub fn sanitize(input: &str, max_len: usize) -> String {
    let cleaned: String = input
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '"' | '\'') && !c.is_control())
        .collect();
    cleaned.trim().chars().take(max_len).collect()
}

/// Standard address-syntax check. Deliberately permissive: the mailbox
/// is never verified here, only the shape.
pub fn is_valid_email(email: &str) -> bool {
    if email.len() > MAX_EMAIL_LEN {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    let local_ok = local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '%' | '+' | '-'));
    let domain_ok = domain.contains('.')
        && domain
            .split('.')
            .all(|part| {
                !part.is_empty()
                    && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            });
    local_ok && domain_ok
}

fn dedup_preserving_order(values: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> SubmissionRequest {
        SubmissionRequest {
            name: "Jordan Avery".to_string(),
            email: "Jordan@Example.com".to_string(),
            survey_data: SurveyData {
                setting: Some("set_private_practice".to_string()),
                profession: Some("prof_therapist".to_string()),
                populations: vec!["pop_adults".to_string(), "pop_couples".to_string()],
                interests: vec!["int_worksheets".to_string()],
                frequency: Some("freq_weekly".to_string()),
                modalities: vec!["mod_cbt".to_string()],
                profession_other: None,
                modality_other: None,
            },
            recommendations: vec!["rec_anxiety_pack".to_string()],
            selected_tags: vec![
                "set_private_practice".to_string(),
                "prof_therapist".to_string(),
                "pop_adults".to_string(),
                "pop_couples".to_string(),
                "int_worksheets".to_string(),
                "freq_weekly".to_string(),
                "mod_cbt".to_string(),
            ],
            custom_responses: CustomResponses::default(),
            timestamp: Some("2026-08-01T12:30:00Z".to_string()),
            completed: Some(true),
        }
    }

    #[test]
    fn test_valid_submission_normalizes() {
        let normalized = validate(valid_request()).expect("should validate");
        assert_eq!(normalized.email, "jordan@example.com");
        assert_eq!(normalized.name, "Jordan Avery");
        assert_eq!(normalized.tags.len(), 7);
        assert!(normalized.completed);
        assert_eq!(normalized.answers.populations, vec!["pop_adults", "pop_couples"]);
    }

    #[test]
    fn test_unknown_population_rejected_with_field_and_value() {
        let mut request = valid_request();
        request.survey_data.populations.push("pop_martians".to_string());
        let violations = validate(request).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "surveyData.populations");
        assert_eq!(violations[0].code, "unknown_value");
        assert!(violations[0].message.contains("pop_martians"));
    }

    #[test]
    fn test_flattened_list_checked_against_union() {
        // Per-question fields all valid, but the flattened list smuggles
        // in a tag outside the catalog union
        let mut request = valid_request();
        request.selected_tags.push("vip_customer".to_string());
        let violations = validate(request).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "selectedTags");
        assert!(violations[0].message.contains("vip_customer"));
    }

    #[test]
    fn test_all_violations_reported_at_once() {
        let request = SubmissionRequest::default();
        let violations = validate(request).unwrap_err();
        // name, email, and all six answers missing
        assert_eq!(violations.len(), 8);
        let fields: Vec<_> = violations.iter().map(|v| v.field.as_str()).collect();
        assert!(fields.contains(&"name"));
        assert!(fields.contains(&"email"));
        assert!(fields.contains(&"surveyData.modalities"));
    }

    #[test]
    fn test_invalid_email_rejected() {
        for bad in ["not-an-email", "a@b", "a b@example.com", "@example.com", "user@"] {
            let mut request = valid_request();
            request.email = bad.to_string();
            let violations = validate(request).unwrap_err();
            assert_eq!(violations[0].field, "email", "email '{}' should fail", bad);
        }
    }

    #[test]
    fn test_free_text_kept_only_with_sentinel() {
        let mut request = valid_request();
        request.survey_data.profession = Some("prof_other".to_string());
        request.custom_responses.role_other = Some("Art therapist".to_string());
        // mod_other text without mod_other selected gets dropped
        request.custom_responses.mod_other = Some("Sandplay".to_string());
        let normalized = validate(request).expect("should validate");
        assert_eq!(normalized.profession_other.as_deref(), Some("Art therapist"));
        assert_eq!(normalized.modality_other, None);
    }

    #[test]
    fn test_free_text_length_bound() {
        let mut request = valid_request();
        request.survey_data.profession = Some("prof_other".to_string());
        request.custom_responses.role_other = Some("x".repeat(MAX_FREE_TEXT_LEN + 1));
        let violations = validate(request).unwrap_err();
        assert_eq!(violations[0].field, "customResponses.role_other");
        assert_eq!(violations[0].code, "too_long");
    }

    #[test]
    fn test_unparsable_timestamp_is_a_violation() {
        let mut request = valid_request();
        request.timestamp = Some("yesterday-ish".to_string());
        let violations = validate(request).unwrap_err();
        assert_eq!(violations[0].field, "timestamp");
    }

    #[test]
    fn test_timestamp_and_completed_default() {
        let mut request = valid_request();
        request.timestamp = None;
        request.completed = None;
        let normalized = validate(request).expect("should validate");
        assert!(normalized.completed);
    }

    #[test]
    fn test_sanitize_strips_markup_and_quotes() {
        assert_eq!(sanitize("<script>alert('x')</script>", 100), "scriptalert(x)/script");
        assert_eq!(sanitize("  plain text  ", 100), "plain text");
        assert_eq!(sanitize("abcdef", 3), "abc");
        assert_eq!(sanitize("line\x07bell", 100), "linebell");
    }

    #[test]
    fn test_duplicate_tags_deduplicated() {
        let mut request = valid_request();
        request.selected_tags.push("pop_adults".to_string());
        let normalized = validate(request).expect("should validate");
        let adults = normalized.tags.iter().filter(|t| *t == "pop_adults").count();
        assert_eq!(adults, 1);
    }
}
