use std::collections::HashSet;
use std::hash::Hash;

use notes_core_api::EntityType;

use crate::models::entity::{Entity, FieldValue};

/// Row selection of a batched lookup: "natural key IN (keys)".
///
/// Values are de-duplicated on construction, first occurrence wins, so a
/// filter never carries the same key twice.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyFilter {
    /// Integer column IN (values)
    Int {
        column: &'static str,
        values: Vec<i64>,
    },
    /// Text column IN (values)
    Text {
        column: &'static str,
        values: Vec<String>,
    },
    /// (id column, type column) IN (pairs)
    Reference {
        id_column: &'static str,
        type_column: &'static str,
        values: Vec<(i64, EntityType)>,
    },
}

impl KeyFilter {
    pub fn int(column: &'static str, values: impl IntoIterator<Item = i64>) -> Self {
        KeyFilter::Int {
            column,
            values: dedup(values),
        }
    }

    pub fn text<S: Into<String>>(column: &'static str, values: impl IntoIterator<Item = S>) -> Self {
        KeyFilter::Text {
            column,
            values: dedup(values.into_iter().map(Into::into)),
        }
    }

    pub fn reference(
        id_column: &'static str,
        type_column: &'static str,
        values: impl IntoIterator<Item = (i64, EntityType)>,
    ) -> Self {
        KeyFilter::Reference {
            id_column,
            type_column,
            values: dedup(values),
        }
    }

    /// Columns the filter reads.
    pub fn columns(&self) -> Vec<&'static str> {
        match self {
            KeyFilter::Int { column, .. } | KeyFilter::Text { column, .. } => vec![*column],
            KeyFilter::Reference {
                id_column,
                type_column,
                ..
            } => vec![*id_column, *type_column],
        }
    }

    pub fn len(&self) -> usize {
        match self {
            KeyFilter::Int { values, .. } => values.len(),
            KeyFilter::Text { values, .. } => values.len(),
            KeyFilter::Reference { values, .. } => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains_int(&self, key: i64) -> bool {
        matches!(self, KeyFilter::Int { values, .. } if values.contains(&key))
    }

    /// Whether `row` is selected by this filter.
    pub fn matches<E: Entity>(&self, row: &E) -> bool {
        match self {
            KeyFilter::Int { column, values } => match row.value_of(column) {
                Some(FieldValue::Int(Some(value))) => values.contains(&value),
                _ => false,
            },
            KeyFilter::Text { column, values } => match row.value_of(column) {
                Some(FieldValue::Text(Some(value))) => values.contains(&value),
                _ => false,
            },
            KeyFilter::Reference {
                id_column,
                type_column,
                values,
            } => match (row.value_of(id_column), row.value_of(type_column)) {
                (Some(FieldValue::Int(Some(id))), Some(FieldValue::Text(Some(kind)))) => values
                    .iter()
                    .any(|(key_id, key_type)| *key_id == id && key_type.as_str() == kind),
                _ => false,
            },
        }
    }
}

fn dedup<T: Eq + Hash + Clone>(values: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaggingModel;
    use chrono::Utc;

    #[test]
    fn test_values_are_deduplicated_in_order() {
        let filter = KeyFilter::int("id", [3, 1, 3, 2, 1]);
        assert_eq!(
            filter,
            KeyFilter::Int {
                column: "id",
                values: vec![3, 1, 2]
            }
        );
        assert_eq!(filter.len(), 3);
        assert!(filter.contains_int(2));
        assert!(!filter.contains_int(4));
    }

    #[test]
    fn test_reference_filter_matches_pair() {
        let tagging = TaggingModel {
            id: 1,
            tag_id: 9,
            reference_id: 5,
            reference_type: EntityType::Programs,
            created_at: Utc::now(),
        };

        let hit = KeyFilter::reference("reference_id", "reference_type", [(5, EntityType::Programs)]);
        let wrong_type = KeyFilter::reference("reference_id", "reference_type", [(5, EntityType::Words)]);
        let by_tag = KeyFilter::int("tag_id", [9]);

        assert!(hit.matches(&tagging));
        assert!(!wrong_type.matches(&tagging));
        assert!(by_tag.matches(&tagging));
        assert_eq!(hit.columns(), vec!["reference_id", "reference_type"]);
    }
}
