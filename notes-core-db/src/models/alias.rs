use heapless::String as HeaplessString;
use serde::{Deserialize, Serialize};

use notes_core_api::EntityType;

use super::entity::{to_bounded, Entity, FieldChanges, FieldError, FieldValue};
use super::identifiable::Identifiable;
use crate::utils::hash_as_i64;

/// # Documentation
/// Unique human-readable name bound to one (reference_type, reference_id) pair.
///
/// `name_hash` indexes the name so lookups hit a fixed-width column; the
/// name itself is compared afterwards to rule out collisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasModel {
    pub id: i64,
    pub reference_id: i64,
    pub reference_type: EntityType,
    pub name: HeaplessString<100>,
    pub name_hash: i64,
}

impl AliasModel {
    pub fn new(reference_type: EntityType, reference_id: i64, name: &str) -> Result<Self, FieldError> {
        Ok(Self {
            id: 0,
            reference_id,
            reference_type,
            name: to_bounded("name", name)?,
            name_hash: alias_name_hash(name)?,
        })
    }
}

/// Hash used to index alias names.
pub fn alias_name_hash(name: &str) -> Result<i64, FieldError> {
    hash_as_i64(&name).map_err(|message| FieldError::Invalid {
        column: "name".to_string(),
        message,
    })
}

impl Identifiable for AliasModel {
    fn get_id(&self) -> i64 {
        self.id
    }
}

impl Entity for AliasModel {
    const TABLE: &'static str = "alias";
    const COLUMNS: &'static [&'static str] = &["reference_id", "reference_type", "name", "name_hash"];

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn column(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "reference_id" => FieldValue::from(self.reference_id),
            "reference_type" => FieldValue::from(self.reference_type),
            "name" => FieldValue::from(&self.name),
            "name_hash" => FieldValue::from(self.name_hash),
            _ => return None,
        })
    }

    fn apply(&mut self, changes: &FieldChanges) -> Result<(), FieldError> {
        for (&column, value) in changes {
            match column {
                "reference_id" => self.reference_id = value.required_int(column)?,
                "reference_type" => self.reference_type = value.parsed(column)?,
                "name" => self.name = value.bounded(column)?,
                "name_hash" => self.name_hash = value.required_int(column)?,
                other => {
                    return Err(FieldError::UnknownColumn {
                        column: other.to_string(),
                    })
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_alias_hashes_name() {
        let alias = AliasModel::new(EntityType::Programs, 5, "acme").unwrap();
        assert_eq!(alias.name.as_str(), "acme");
        assert_eq!(alias.name_hash, alias_name_hash("acme").unwrap());
        assert_ne!(alias.name_hash, alias_name_hash("acme2").unwrap());
    }

    #[test]
    fn test_alias_name_too_long() {
        let long = "a".repeat(101);
        assert!(AliasModel::new(EntityType::Words, 1, &long).is_err());
    }
}
