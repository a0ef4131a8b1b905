//! Basic usage example for linkdb.
//! Loads a schema, builds a small object graph, and runs link queries.

use linkdb::json::objects_to_json;
use linkdb::schema::SchemaParser;
use linkdb::store::Store;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let schema_path = concat!(env!("CARGO_MANIFEST_DIR"), "/examples/petshop_schema.toml");
    let schema = SchemaParser::from_file(schema_path)?;

    println!("Store: {} v{}", schema.name, schema.version);
    for type_def in &schema.types {
        println!("  - {}", type_def.name);
        for field in &type_def.fields {
            println!("    {}: {}", field.name, field.field_type.name());
        }
        for relation in &type_def.relations {
            println!("    {} -> {} ({:?})", relation.name, relation.target, relation.cardinality);
        }
    }

    let store = Store::in_memory(schema)?;

    let mut txn = store.begin()?;
    let pluto = txn.create("Dog")?;
    txn.set(pluto, "name", "Pluto")?;
    txn.set(pluto, "age", 5)?;

    let blackie = txn.create("Cat")?;
    txn.set(blackie, "name", "Blackie")?;
    txn.set(blackie, "age", 12)?;

    let tim = txn.create("Owner")?;
    txn.set(tim, "name", "Tim")?;
    txn.push_link(tim, "dogs", pluto)?;
    txn.set_link(tim, "cat", Some(blackie))?;
    txn.commit()?;

    let with_old_cat = store.query("Owner")?.greater_than("cat.age", 10)?.find_all()?;
    println!("Owners with a cat older than 10: {}", with_old_cat.len());

    println!("{}", serde_json::to_string_pretty(&objects_to_json(&store, "Owner")?)?);
    Ok(())
}
