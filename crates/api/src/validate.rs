//! Field-level request validation.
//!
//! Every resource handler runs its payload through a [`FieldRules`] check
//! before touching the store: required fields must be present and non-empty,
//! server-computed fields must be absent. Failures are collected rather than
//! short-circuited so the caller gets the full list in one response, with
//! forbidden fields marked by a `!` prefix (`"name,!twilio"`).

use serde::Serialize;

/// A failed validation: the itemized list of offending fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("validation failed: {}", self.list())]
pub struct ValidationError {
    fields: Vec<String>,
}

impl ValidationError {
    /// The offending fields as a comma-joined list, forbidden ones
    /// prefixed with `!`.
    #[must_use]
    pub fn list(&self) -> String {
        self.fields.join(",")
    }
}

impl Serialize for ValidationError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.list())
    }
}

/// Accumulates required/forbidden field checks for one payload.
#[derive(Debug, Default)]
pub struct FieldRules {
    failed: Vec<String>,
}

impl FieldRules {
    /// Start an empty rule set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The field must be present. `None` fails.
    pub fn require<T>(&mut self, name: &str, value: Option<&T>) -> &mut Self {
        if value.is_none() {
            self.failed.push(name.to_owned());
        }
        self
    }

    /// The field must be a present, non-empty string.
    pub fn require_str(&mut self, name: &str, value: Option<&str>) -> &mut Self {
        if value.is_none_or(str::is_empty) {
            self.failed.push(name.to_owned());
        }
        self
    }

    /// The field must be absent (server-computed or immutable).
    pub fn forbid<T>(&mut self, name: &str, value: Option<&T>) -> &mut Self {
        if value.is_some() {
            self.failed.push(format!("!{name}"));
        }
        self
    }

    /// Resolve the accumulated checks.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] itemizing every failed check, in the
    /// order the checks ran.
    pub fn finish(self) -> Result<(), ValidationError> {
        if self.failed.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                fields: self.failed,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_rules_pass() {
        let mut rules = FieldRules::new();
        rules
            .require_str("name", Some("Test"))
            .forbid("twilio", None::<&String>);
        assert!(rules.finish().is_ok());
    }

    #[test]
    fn test_missing_and_forbidden_are_itemized_in_order() {
        let mut rules = FieldRules::new();
        rules
            .require_str("name", None)
            .require_str("zip", Some(""))
            .forbid("twilio", Some(&"18005551212".to_owned()))
            .forbid("user_id", None::<&i32>);
        let err = rules.finish().expect_err("rules failed");
        assert_eq!(err.list(), "name,zip,!twilio");
    }

    #[test]
    fn test_require_non_string() {
        let mut rules = FieldRules::new();
        rules.require("display", None::<&bool>);
        let err = rules.finish().expect_err("rules failed");
        assert_eq!(err.list(), "display");

        let mut rules = FieldRules::new();
        rules.require("display", Some(&false));
        assert!(rules.finish().is_ok());
    }

    #[test]
    fn test_error_serializes_as_joined_string() {
        let mut rules = FieldRules::new();
        rules.require_str("name", None).forbid("id", Some(&1));
        let err = rules.finish().expect_err("rules failed");
        let json = serde_json::to_string(&err).expect("serialize");
        assert_eq!(json, "\"name,!id\"");
    }
}
