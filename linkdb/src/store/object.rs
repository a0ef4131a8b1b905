use crate::schema::types::{Cardinality, TypeDefinition};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A live object instance.
///
/// Field values and link targets are stored by member name. To-one slots are
/// absent from `links_one` when unset; to-many lists exist from creation and
/// preserve insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Object {
    pub id: ObjectId,
    pub type_name: String,
    fields: HashMap<String, Value>,
    links_one: HashMap<String, ObjectId>,
    links_many: HashMap<String, Vec<ObjectId>>,
}

impl Object {
    /// Creates an object with every field at its type's default value and
    /// every relation empty.
    pub fn new(id: ObjectId, type_def: &TypeDefinition) -> Self {
        let mut fields = HashMap::with_capacity(type_def.fields.len());
        for field in &type_def.fields {
            fields.insert(field.name.clone(), Value::default_for(field.field_type));
        }

        let mut links_many = HashMap::new();
        for relation in &type_def.relations {
            if relation.cardinality == Cardinality::Many {
                links_many.insert(relation.name.clone(), Vec::new());
            }
        }

        Self {
            id,
            type_name: type_def.name.clone(),
            fields,
            links_one: HashMap::new(),
            links_many,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn set_field(&mut self, name: &str, value: Value) {
        self.fields.insert(name.to_string(), value);
    }

    pub fn link_one(&self, relation: &str) -> Option<ObjectId> {
        self.links_one.get(relation).copied()
    }

    pub fn set_link_one(&mut self, relation: &str, target: Option<ObjectId>) {
        match target {
            Some(id) => {
                self.links_one.insert(relation.to_string(), id);
            }
            None => {
                self.links_one.remove(relation);
            }
        }
    }

    pub fn links_many(&self, relation: &str) -> &[ObjectId] {
        self.links_many
            .get(relation)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn push_link(&mut self, relation: &str, target: ObjectId) {
        self.links_many
            .entry(relation.to_string())
            .or_default()
            .push(target);
    }

    /// Drops every link pointing at an id in `removed`. To-one slots become
    /// absent; to-many lists lose the removed members and keep their order.
    pub fn scrub_links(&mut self, removed: &std::collections::HashSet<ObjectId>) {
        self.links_one.retain(|_, target| !removed.contains(target));
        for list in self.links_many.values_mut() {
            list.retain(|target| !removed.contains(target));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::{FieldType, TypeDefinition};
    use std::collections::HashSet;

    fn owner_type() -> TypeDefinition {
        TypeDefinition::new("Owner")
            .field("name", FieldType::String)
            .relation_one("cat", "Cat")
            .relation_many("dogs", "Dog")
    }

    #[test]
    fn test_defaults_on_create() {
        let obj = Object::new(ObjectId(1), &owner_type());
        assert_eq!(obj.field("name"), Some(&Value::String(String::new())));
        assert_eq!(obj.link_one("cat"), None);
        assert!(obj.links_many("dogs").is_empty());
    }

    #[test]
    fn test_link_order_preserved() {
        let mut obj = Object::new(ObjectId(1), &owner_type());
        obj.push_link("dogs", ObjectId(5));
        obj.push_link("dogs", ObjectId(3));
        assert_eq!(obj.links_many("dogs"), &[ObjectId(5), ObjectId(3)]);
    }

    #[test]
    fn test_scrub_links() {
        let mut obj = Object::new(ObjectId(1), &owner_type());
        obj.set_link_one("cat", Some(ObjectId(7)));
        obj.push_link("dogs", ObjectId(5));
        obj.push_link("dogs", ObjectId(6));

        let removed: HashSet<ObjectId> = [ObjectId(7), ObjectId(5)].into_iter().collect();
        obj.scrub_links(&removed);

        assert_eq!(obj.link_one("cat"), None);
        assert_eq!(obj.links_many("dogs"), &[ObjectId(6)]);
    }
}
