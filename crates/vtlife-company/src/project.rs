//! Project proposal fields, read leniently from free-form mail payloads.

use serde_json::Value;

pub const UNTITLED_PROJECT: &str = "Untitled project";

/// The nested `project` object when present, otherwise the mail itself.
pub fn effective_project(mail: &Value) -> &Value {
    match mail.get("project") {
        Some(project) if project.is_object() => project,
        _ => mail,
    }
}

/// A string field, if present and a string.
pub fn field_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

/// First non-blank value among `keys`, checking the nested project object
/// before the top level. Numbers are accepted and rendered as text.
pub fn lookup_str(mail: &Value, keys: &[&str]) -> Option<String> {
    let project = effective_project(mail);
    let scopes: Vec<&Value> = if std::ptr::eq(project, mail) {
        vec![mail]
    } else {
        vec![project, mail]
    };
    scopes.iter().find_map(|scope| {
        keys.iter().find_map(|key| match scope.get(*key) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
    })
}

/// The id a proposal is filed under: the mail's own `project_id` first,
/// then whatever the nested project object carries.
pub fn project_key(mail: &Value) -> Option<String> {
    match mail.get("project_id") {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => lookup_str(mail, &["project_id", "id", "id_str"]),
    }
}

/// Scheduling-relevant view of a queued project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInfo {
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub preferred_start: Option<String>,
    pub preferred_end: Option<String>,
}

impl ProjectInfo {
    pub fn from_mail(mail: &Value) -> Self {
        let preferred = [effective_project(mail), mail].into_iter().find_map(|scope| {
            ["preferred_time", "preferredTime"]
                .iter()
                .find_map(|key| scope.get(*key).filter(|v| v.is_object()))
        });
        let window_end = |key: &str| {
            preferred
                .and_then(|p| field_str(p, key))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Self {
            id: project_key(mail),
            name: lookup_str(mail, &["project_name", "title", "name"])
                .unwrap_or_else(|| UNTITLED_PROJECT.to_string()),
            description: lookup_str(mail, &["project_content", "description", "content"])
                .unwrap_or_default(),
            preferred_start: window_end("start"),
            preferred_end: window_end("end"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_fields_win_over_top_level() {
        let mail = json!({
            "project_name": "Outer",
            "project": {"project_id": "inner", "project_name": "Cooking"}
        });
        let info = ProjectInfo::from_mail(&mail);
        assert_eq!(info.id.as_deref(), Some("inner"));
        assert_eq!(info.name, "Cooking");
    }

    #[test]
    fn test_top_level_project_id_is_the_key() {
        let mail = json!({
            "project_id": "outer",
            "project": {"project_id": "inner", "project_name": "Cooking"}
        });
        assert_eq!(project_key(&mail).as_deref(), Some("outer"));
        assert_eq!(ProjectInfo::from_mail(&mail).id.as_deref(), Some("outer"));
        assert_eq!(project_key(&json!({"project_id": 7})).as_deref(), Some("7"));
        assert_eq!(project_key(&json!({"project_id": " ", "id": "x"})).as_deref(), Some("x"));
    }

    #[test]
    fn test_top_level_id_used_when_nested_missing() {
        let mail = json!({"project_id": "p7", "project": {"project_name": "Cooking"}});
        assert_eq!(ProjectInfo::from_mail(&mail).id.as_deref(), Some("p7"));
    }

    #[test]
    fn test_fallback_keys_and_defaults() {
        let mail = json!({"id": 42, "title": "Karaoke", "description": "sing"});
        let info = ProjectInfo::from_mail(&mail);
        assert_eq!(info.id.as_deref(), Some("42"));
        assert_eq!(info.name, "Karaoke");
        assert_eq!(info.description, "sing");

        let info = ProjectInfo::from_mail(&json!({}));
        assert_eq!(info.id, None);
        assert_eq!(info.name, UNTITLED_PROJECT);
        assert_eq!(info.description, "");
    }

    #[test]
    fn test_preferred_time_both_spellings() {
        let info = ProjectInfo::from_mail(&json!({"project": {"preferred_time": {"start": "14:00"}}}));
        assert_eq!(info.preferred_start.as_deref(), Some("14:00"));
        assert_eq!(info.preferred_end, None);

        let info = ProjectInfo::from_mail(&json!({"preferredTime": {"start": "9:00", "end": " "}}));
        assert_eq!(info.preferred_start.as_deref(), Some("9:00"));
        assert_eq!(info.preferred_end, None);
    }
}
