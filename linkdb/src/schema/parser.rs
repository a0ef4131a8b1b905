use super::types::*;
use crate::error::{LinkDbError, Result};
use std::fs;
use std::path::Path;

pub struct SchemaParser;

impl SchemaParser {
    pub fn from_file(path: impl AsRef<Path>) -> Result<StoreSchema> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_string(&content)
    }

    pub fn from_string(toml_str: &str) -> Result<StoreSchema> {
        let doc: toml::Value = toml::from_str(toml_str)
            .map_err(|e| LinkDbError::SchemaError(format!("TOML parse error: {}", e)))?;

        let store = doc
            .get("store")
            .ok_or_else(|| LinkDbError::SchemaError("Missing [store] section".into()))?;

        let name = store
            .get("name")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| LinkDbError::SchemaError("Missing store.name".into()))?;

        let version = store
            .get("version")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| "1".to_string());

        let mut types = Vec::new();
        if let Some(type_defs) = doc.get("types") {
            for (type_name, type_config) in type_defs.as_table().unwrap_or(&Default::default()) {
                let fields = Self::parse_field_list(type_config)?;
                let relations = Self::parse_relation_list(type_config)?;

                types.push(TypeDefinition {
                    name: type_name.clone(),
                    fields,
                    relations,
                });
            }
        }

        Ok(StoreSchema {
            name,
            version,
            types,
        })
    }

    fn parse_field_list(config: &toml::Value) -> Result<Vec<FieldDefinition>> {
        let mut fields = Vec::new();

        if let Some(field_array) = config.get("fields").and_then(|v| v.as_array()) {
            for field_val in field_array {
                let name = field_val
                    .get("name")
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string())
                    .ok_or_else(|| LinkDbError::SchemaError("Field missing 'name'".into()))?;

                let type_str = field_val
                    .get("type")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| LinkDbError::SchemaError("Field missing 'type'".into()))?;

                let field_type = Self::parse_type(type_str)?;

                fields.push(FieldDefinition { name, field_type });
            }
        }

        Ok(fields)
    }

    fn parse_relation_list(config: &toml::Value) -> Result<Vec<RelationDefinition>> {
        let mut relations = Vec::new();

        if let Some(relation_array) = config.get("relations").and_then(|v| v.as_array()) {
            for relation_val in relation_array {
                let name = relation_val
                    .get("name")
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string())
                    .ok_or_else(|| LinkDbError::SchemaError("Relation missing 'name'".into()))?;

                let target = relation_val
                    .get("target")
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string())
                    .ok_or_else(|| LinkDbError::SchemaError("Relation missing 'target'".into()))?;

                let cardinality = match relation_val.get("cardinality").and_then(|v| v.as_str()) {
                    Some("one") => Cardinality::One,
                    Some("many") => Cardinality::Many,
                    Some(other) => {
                        return Err(LinkDbError::SchemaError(format!(
                            "Invalid relation cardinality: {}",
                            other
                        )))
                    }
                    None => {
                        return Err(LinkDbError::SchemaError(
                            "Relation missing 'cardinality'".into(),
                        ))
                    }
                };

                relations.push(RelationDefinition {
                    name,
                    target,
                    cardinality,
                });
            }
        }

        Ok(relations)
    }

    fn parse_type(type_str: &str) -> Result<FieldType> {
        match type_str {
            "int" => Ok(FieldType::Int),
            "float" => Ok(FieldType::Float),
            "double" => Ok(FieldType::Double),
            "bool" => Ok(FieldType::Bool),
            "string" => Ok(FieldType::String),
            s => Err(LinkDbError::SchemaError(format!(
                "Unknown field type: {}",
                s
            ))),
        }
    }
}
