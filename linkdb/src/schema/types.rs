use serde::{Deserialize, Serialize};

/// Declared type of an object field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FieldType {
    Int,
    Float,
    Double,
    Bool,
    String,
}

impl FieldType {
    /// Returns the schema name for this type.
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Int => "int",
            FieldType::Float => "float",
            FieldType::Double => "double",
            FieldType::Bool => "bool",
            FieldType::String => "string",
        }
    }

    /// Returns true if values of this type have a total numeric ordering.
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Int | FieldType::Float | FieldType::Double)
    }
}

/// Cardinality of a relation field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Cardinality {
    /// Zero or one target object.
    One,
    /// Ordered sequence of target objects.
    Many,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    pub field_type: FieldType,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// A declared link from one object type to another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationDefinition {
    pub name: String,
    /// Name of the target type.
    pub target: String,
    pub cardinality: Cardinality,
}

impl RelationDefinition {
    pub fn one(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            cardinality: Cardinality::One,
        }
    }

    pub fn many(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            cardinality: Cardinality::Many,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDefinition {
    pub name: String,
    pub fields: Vec<FieldDefinition>,
    pub relations: Vec<RelationDefinition>,
}

impl TypeDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            relations: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.push(FieldDefinition::new(name, field_type));
        self
    }

    pub fn relation_one(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.relations.push(RelationDefinition::one(name, target));
        self
    }

    pub fn relation_many(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.relations.push(RelationDefinition::many(name, target));
        self
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn get_relation(&self, name: &str) -> Option<&RelationDefinition> {
        self.relations.iter().find(|r| r.name == name)
    }
}

/// The full set of types a store instance is opened with.
/// Consumed as read-only metadata; the store never mutates its schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSchema {
    pub name: String,
    pub version: String,
    pub types: Vec<TypeDefinition>,
}

impl StoreSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: "1".to_string(),
            types: Vec::new(),
        }
    }

    pub fn with_type(mut self, type_def: TypeDefinition) -> Self {
        self.types.push(type_def);
        self
    }

    pub fn get_type(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.iter().find(|t| t.name == name)
    }
}
