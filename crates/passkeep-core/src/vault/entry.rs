//! Credential records and grouping.

use serde::{Deserialize, Serialize};

/// Sentinel group for entries stored without an explicit group.
///
/// Groups partition credentials for display and filtering only; they are
/// not a security boundary.
pub const DEFAULT_GROUP: &str = "default";

/// A single stored credential.
///
/// Titles are not unique. The vault preserves insertion order, which is
/// what listings display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub title: String,
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default = "default_group")]
    pub group: String,
}

fn default_group() -> String {
    DEFAULT_GROUP.to_string()
}

impl Credential {
    /// Create a credential in the default group with no URL or notes.
    pub fn new(
        title: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            username: username.into(),
            password: password.into(),
            url: None,
            notes: None,
            group: DEFAULT_GROUP.to_string(),
        }
    }

    /// File this credential under `group`.
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Normalize a loaded entry: an empty group collapses to the default.
    pub(crate) fn normalize(&mut self) {
        if self.group.is_empty() {
            self.group = DEFAULT_GROUP.to_string();
        }
    }

    /// Case-insensitive substring match against title, username and notes.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.title.to_lowercase().contains(&query)
            || self.username.to_lowercase().contains(&query)
            || self
                .notes
                .as_deref()
                .is_some_and(|notes| notes.to_lowercase().contains(&query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default_on_deserialize() {
        let json = r#"{"title": "mail", "username": "me", "password": "pw"}"#;
        let cred: Credential = serde_json::from_str(json).unwrap();
        assert_eq!(cred.group, DEFAULT_GROUP);
        assert_eq!(cred.url, None);
        assert_eq!(cred.notes, None);
    }

    #[test]
    fn optional_fields_are_omitted_when_absent() {
        let json = serde_json::to_string(&Credential::new("mail", "me", "pw")).unwrap();
        assert!(!json.contains("url"));
        assert!(!json.contains("notes"));
    }

    #[test]
    fn search_matches_title_username_and_notes() {
        let cred = Credential::new("Example Bank", "alice@example.org", "pw")
            .with_notes("shared with FAMILY");
        assert!(cred.matches("bank"));
        assert!(cred.matches("ALICE"));
        assert!(cred.matches("family"));
        assert!(!cred.matches("github"));
    }

    #[test]
    fn empty_group_normalizes_to_default() {
        let mut cred = Credential::new("t", "u", "p");
        cred.group = String::new();
        cred.normalize();
        assert_eq!(cred.group, DEFAULT_GROUP);
    }
}
