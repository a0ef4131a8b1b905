//! Schema-validated field paths.
//!
//! A raw dot-separated path string is parsed once when the predicate is
//! built, into a descriptor holding the optional relation hop and the leaf
//! field with its declared type. Unknown names fail here, not at evaluation.

use crate::error::{LinkDbError, Result};
use crate::schema::{Cardinality, FieldType, StoreSchema, TypeDefinition};

/// The relation segment of a traversing path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationHop {
    pub name: String,
    pub cardinality: Cardinality,
}

/// A parsed, validated field path.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPath {
    pub raw: String,
    /// `None` for a direct field on the queried type.
    pub hop: Option<RelationHop>,
    pub field: String,
    pub field_type: FieldType,
}

impl FieldPath {
    pub fn parse(raw: &str, type_def: &TypeDefinition, schema: &StoreSchema) -> Result<Self> {
        let segments: Vec<&str> = raw.split('.').collect();
        match segments.as_slice() {
            [field] => {
                let field_def =
                    type_def
                        .get_field(field)
                        .ok_or_else(|| LinkDbError::UnknownField {
                            type_name: type_def.name.clone(),
                            field: field.to_string(),
                        })?;
                Ok(Self {
                    raw: raw.to_string(),
                    hop: None,
                    field: field_def.name.clone(),
                    field_type: field_def.field_type,
                })
            }
            [relation, field] => {
                let relation_def = type_def.get_relation(relation).ok_or_else(|| {
                    LinkDbError::UnknownRelation {
                        type_name: type_def.name.clone(),
                        relation: relation.to_string(),
                    }
                })?;
                let target_def = schema.get_type(&relation_def.target).ok_or_else(|| {
                    LinkDbError::UnknownType(relation_def.target.clone())
                })?;
                let field_def =
                    target_def
                        .get_field(field)
                        .ok_or_else(|| LinkDbError::UnknownField {
                            type_name: target_def.name.clone(),
                            field: field.to_string(),
                        })?;
                Ok(Self {
                    raw: raw.to_string(),
                    hop: Some(RelationHop {
                        name: relation_def.name.clone(),
                        cardinality: relation_def.cardinality,
                    }),
                    field: field_def.name.clone(),
                    field_type: field_def.field_type,
                })
            }
            _ => Err(LinkDbError::InvalidPath {
                path: raw.to_string(),
                reason: "expected 'field' or 'relation.field'".to_string(),
            }),
        }
    }
}
