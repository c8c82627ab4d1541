use chrono::Utc;

use crate::models::entity::{FieldChanges, FieldValue};

/// Builds the column changes of a partial update.
///
/// Required columns are compared and recorded when they differ. Optional
/// text follows the input convention: `None` leaves the column alone,
/// `Some("")` clears it, anything else sets it.
#[derive(Debug, Default)]
pub struct ChangeSet {
    changes: FieldChanges,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&mut self, column: &'static str, current: FieldValue, new: FieldValue) -> &mut Self {
        if current != new {
            self.changes.insert(column, new);
        }
        self
    }

    pub fn required(&mut self, column: &'static str, current: &str, new: &str) -> &mut Self {
        self.value(column, FieldValue::from(current), FieldValue::from(new))
    }

    pub fn optional(&mut self, column: &'static str, current: Option<&str>, new: Option<&str>) -> &mut Self {
        match new {
            None => self,
            Some("") => self.value(column, FieldValue::from(current), FieldValue::Text(None)),
            Some(value) => self.value(column, FieldValue::from(current), FieldValue::from(value)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// The changes, stamping `column` with the current time when there are any.
    pub fn touched(mut self, column: &'static str) -> FieldChanges {
        if !self.changes.is_empty() {
            self.changes.insert(column, FieldValue::from(Utc::now()));
        }
        self.changes
    }

    pub fn into_changes(self) -> FieldChanges {
        self.changes
    }
}

/// `Some("")` as "no value" for columns being created.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_conventions() {
        let mut set = ChangeSet::new();
        set.optional("platform", Some("h1"), None)
            .optional("url", Some("https://a"), Some(""))
            .optional("scope", None, Some("*.acme.com"))
            .optional("description", Some("same"), Some("same"));
        let changes = set.into_changes();

        assert!(!changes.contains_key("platform"));
        assert_eq!(changes.get("url"), Some(&FieldValue::Text(None)));
        assert_eq!(changes.get("scope"), Some(&FieldValue::from("*.acme.com")));
        assert!(!changes.contains_key("description"));
    }

    #[test]
    fn test_touched_only_when_changed() {
        let mut unchanged = ChangeSet::new();
        unchanged.required("name", "acme", "acme");
        assert!(unchanged.touched("updated_at").is_empty());

        let mut changed = ChangeSet::new();
        changed.required("name", "acme", "globex");
        let changes = changed.touched("updated_at");
        assert_eq!(changes.len(), 2);
        assert!(changes.contains_key("updated_at"));
    }
}
