//! JSON rendering of committed objects, for inspection and tooling.

use crate::error::Result;
use crate::schema::Cardinality;
use crate::store::{ObjectId, Store};
use crate::value::Value;
use serde_json::{json, Value as JsonValue};

/// Renders every live object of `type_name` as a JSON array, in creation
/// order. Fields appear under their names; relations render as the target id
/// (or null) for to-one and an array of ids for to-many.
pub fn objects_to_json(store: &Store, type_name: &str) -> Result<JsonValue> {
    let type_def = store
        .schema()
        .get_type(type_name)
        .ok_or_else(|| crate::error::LinkDbError::UnknownType(type_name.to_string()))?
        .clone();

    let mut rows = Vec::new();
    for id in store.all_objects(type_name)? {
        let mut obj = serde_json::Map::new();
        obj.insert("id".to_string(), json!(id.0));

        for field in &type_def.fields {
            obj.insert(field.name.clone(), value_to_json(&store.get(id, &field.name)?));
        }
        for relation in &type_def.relations {
            match relation.cardinality {
                Cardinality::One => {
                    let target = store.link(id, &relation.name)?;
                    obj.insert(relation.name.clone(), object_id_to_json(target));
                }
                Cardinality::Many => {
                    let targets: Vec<JsonValue> = store
                        .links(id, &relation.name)?
                        .iter()
                        .map(|target| json!(target.0))
                        .collect();
                    obj.insert(relation.name.clone(), JsonValue::Array(targets));
                }
            }
        }
        rows.push(JsonValue::Object(obj));
    }
    Ok(JsonValue::Array(rows))
}

fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Int(i) => json!(i),
        Value::Float(f) => json!(f),
        Value::Double(d) => json!(d),
        Value::Bool(b) => json!(b),
        Value::String(s) => json!(s),
    }
}

fn object_id_to_json(id: Option<ObjectId>) -> JsonValue {
    match id {
        Some(id) => json!(id.0),
        None => JsonValue::Null,
    }
}
