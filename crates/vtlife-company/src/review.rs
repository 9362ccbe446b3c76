//! Project review policies.
//!
//! A policy is a pure function of the inbound project mail: same payload,
//! same decision. Missing or malformed fields are rejections, never errors.

use serde_json::Value;
use vtlife_core::config::ReviewMode;

use crate::project::{effective_project, field_str, lookup_str};

const LENIENT_MIN_CHARS: usize = 20;
const STRICT_MIN_CHARS: usize = 100;

/// Outcome of reviewing one proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDecision {
    pub approved: bool,
    pub reason: String,
}

impl ReviewDecision {
    fn approve(reason: &str) -> Self {
        Self {
            approved: true,
            reason: reason.to_string(),
        }
    }

    fn reject(reason: impl Into<String>) -> Self {
        Self {
            approved: false,
            reason: reason.into(),
        }
    }
}

/// Pluggable review rule set.
pub trait ReviewPolicy: Send {
    fn name(&self) -> &'static str;

    /// Review a raw project mail payload.
    fn review(&self, mail: &Value) -> ReviewDecision;
}

/// Policy "A": both fields present and non-blank, content of at least 20 characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct LenientReview;

/// Policy "B": everything in "A", plus 100 characters of content and a project id.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictReview;

impl ReviewPolicy for LenientReview {
    fn name(&self) -> &'static str {
        "lenient"
    }

    fn review(&self, mail: &Value) -> ReviewDecision {
        review_project(mail)
    }
}

impl ReviewPolicy for StrictReview {
    fn name(&self) -> &'static str {
        "strict"
    }

    fn review(&self, mail: &Value) -> ReviewDecision {
        let decision = review_project(mail);
        if !decision.approved {
            return decision;
        }
        let project = effective_project(mail);
        let content_chars = field_str(project, "project_content")
            .map(|c| c.chars().count())
            .unwrap_or(0);
        if content_chars < STRICT_MIN_CHARS {
            return ReviewDecision::reject(format!(
                "project_content too short for strict review ({content_chars} < {STRICT_MIN_CHARS} characters)"
            ));
        }
        let has_id = lookup_str(mail, &["project_id"])
            .map(|id| !id.trim().is_empty())
            .unwrap_or(false);
        if !has_id {
            return ReviewDecision::reject("missing project_id");
        }
        ReviewDecision::approve("passed strict review")
    }
}

/// Build the policy selected in configuration.
pub fn policy_for(mode: ReviewMode) -> Box<dyn ReviewPolicy> {
    match mode {
        ReviewMode::Lenient => Box::new(LenientReview),
        ReviewMode::Strict => Box::new(StrictReview),
    }
}

/// Lenient review. The effective payload is the nested `project` object
/// when present, otherwise the mail itself.
pub fn review_project(mail: &Value) -> ReviewDecision {
    let project = effective_project(mail);

    for field in ["project_name", "project_content"] {
        if field_str(project, field).is_none() {
            return ReviewDecision::reject(format!("missing required field: {field}"));
        }
    }
    let name = field_str(project, "project_name").unwrap_or_default();
    let content = field_str(project, "project_content").unwrap_or_default();

    if name.trim().is_empty() {
        return ReviewDecision::reject("project_name is empty");
    }
    if content.trim().is_empty() {
        return ReviewDecision::reject("project_content is empty");
    }
    let chars = content.chars().count();
    if chars < LENIENT_MIN_CHARS {
        return ReviewDecision::reject(format!(
            "project_content too short ({chars} < {LENIENT_MIN_CHARS} characters)"
        ));
    }
    ReviewDecision::approve("passed lenient review")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn proposal(name: &str, content: &str) -> Value {
        json!({"project_id": "p1", "project": {"project_name": name, "project_content": content}})
    }

    #[test]
    fn test_missing_name_is_named_in_reason() {
        let decision = review_project(&json!({"project": {"project_content": "x".repeat(40)}}));
        assert!(!decision.approved);
        assert!(decision.reason.contains("project_name"));
    }

    #[test]
    fn test_first_missing_field_wins() {
        let decision = review_project(&json!({}));
        assert!(decision.reason.contains("project_name"));
        assert!(!decision.reason.contains("project_content"));
    }

    #[test]
    fn test_non_string_field_counts_as_missing() {
        let decision = review_project(&json!({"project_name": 7, "project_content": "x".repeat(30)}));
        assert!(!decision.approved);
        assert!(decision.reason.contains("project_name"));
    }

    #[test]
    fn test_content_length_boundary() {
        assert!(!review_project(&proposal("Cooking", &"a".repeat(19))).approved);
        assert!(review_project(&proposal("Cooking", &"a".repeat(20))).approved);
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        assert!(review_project(&proposal("料理", &"料".repeat(20))).approved);
        assert!(!review_project(&proposal("料理", &"料".repeat(19))).approved);
    }

    #[test]
    fn test_blank_fields_rejected() {
        let decision = review_project(&proposal("   ", &"a".repeat(30)));
        assert_eq!(decision.reason, "project_name is empty");
        let decision = review_project(&proposal("Cooking", "   "));
        assert_eq!(decision.reason, "project_content is empty");
    }

    #[test]
    fn test_top_level_payload_without_nested_project() {
        let mail = json!({"project_name": "Cooking", "project_content": "a".repeat(25)});
        assert!(review_project(&mail).approved);
    }

    #[test]
    fn test_review_is_deterministic() {
        let mail = proposal("Cooking", &"a".repeat(25));
        assert_eq!(review_project(&mail), review_project(&mail));
    }

    #[test]
    fn test_strict_policy() {
        let strict = policy_for(ReviewMode::Strict);
        assert_eq!(strict.name(), "strict");
        assert!(!strict.review(&proposal("Cooking", &"a".repeat(99))).approved);
        assert!(strict.review(&proposal("Cooking", &"a".repeat(100))).approved);

        let no_id = json!({"project": {"project_name": "Cooking", "project_content": "a".repeat(120)}});
        let decision = strict.review(&no_id);
        assert!(!decision.approved);
        assert!(decision.reason.contains("project_id"));

        let lenient = policy_for(ReviewMode::Lenient);
        assert!(lenient.review(&no_id).approved);
    }
}
