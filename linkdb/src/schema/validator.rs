use super::types::*;
use crate::error::{LinkDbError, Result};
use std::collections::HashSet;

/// Fail-fast structural checks run once when a store is opened.
pub struct SchemaValidator;

impl SchemaValidator {
    pub fn validate(schema: &StoreSchema) -> Result<()> {
        Self::check_type_names(schema)?;
        Self::check_member_names(schema)?;
        Self::check_relation_targets(schema)?;
        Ok(())
    }

    fn check_type_names(schema: &StoreSchema) -> Result<()> {
        let mut seen = HashSet::new();
        for type_def in &schema.types {
            if type_def.name.is_empty() {
                return Err(LinkDbError::SchemaError("Empty type name".into()));
            }
            if !seen.insert(type_def.name.as_str()) {
                return Err(LinkDbError::SchemaError(format!(
                    "Duplicate type name: {}",
                    type_def.name
                )));
            }
        }
        Ok(())
    }

    /// Field and relation names share one namespace per type; a dotted query
    /// path must resolve unambiguously.
    fn check_member_names(schema: &StoreSchema) -> Result<()> {
        for type_def in &schema.types {
            let mut seen = HashSet::new();
            for field in &type_def.fields {
                if field.name.is_empty() || field.name.contains('.') {
                    return Err(LinkDbError::SchemaError(format!(
                        "Invalid field name '{}' on type '{}'",
                        field.name, type_def.name
                    )));
                }
                if !seen.insert(field.name.as_str()) {
                    return Err(LinkDbError::SchemaError(format!(
                        "Duplicate member name '{}' on type '{}'",
                        field.name, type_def.name
                    )));
                }
            }
            for relation in &type_def.relations {
                if relation.name.is_empty() || relation.name.contains('.') {
                    return Err(LinkDbError::SchemaError(format!(
                        "Invalid relation name '{}' on type '{}'",
                        relation.name, type_def.name
                    )));
                }
                if !seen.insert(relation.name.as_str()) {
                    return Err(LinkDbError::SchemaError(format!(
                        "Duplicate member name '{}' on type '{}'",
                        relation.name, type_def.name
                    )));
                }
            }
        }
        Ok(())
    }

    fn check_relation_targets(schema: &StoreSchema) -> Result<()> {
        for type_def in &schema.types {
            for relation in &type_def.relations {
                if schema.get_type(&relation.target).is_none() {
                    return Err(LinkDbError::SchemaError(format!(
                        "Relation '{}.{}' targets unknown type '{}'",
                        type_def.name, relation.name, relation.target
                    )));
                }
            }
        }
        Ok(())
    }
}
