pub mod links;
pub mod object;
pub mod registry;

pub use links::LinkList;
pub use object::{Object, ObjectId};
pub use registry::ObjectRegistry;

use crate::config::StoreConfig;
use crate::error::{LinkDbError, Result};
use crate::persistence::{self, StoreSnapshot};
use crate::query::{Query, QueryResults};
use crate::schema::{Cardinality, SchemaValidator, StoreSchema};
use crate::transaction::Transaction;
use crate::value::Value;
use log::{debug, info};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Committed state of a store instance.
#[derive(Debug)]
pub(crate) struct StoreState {
    pub objects: HashMap<ObjectId, Object>,
    /// Creation-ordered ids per type.
    pub by_type: HashMap<String, Vec<ObjectId>>,
    pub registry: ObjectRegistry,
    pub version: u64,
}

impl StoreState {
    fn empty() -> Self {
        Self {
            objects: HashMap::new(),
            by_type: HashMap::new(),
            registry: ObjectRegistry::new(),
            version: 0,
        }
    }
}

/// Main store handle.
///
/// The handle owns all object lifetimes. Reads (`all_objects`, `get`,
/// `link`, `links`, queries) are legal at any time and observe the last
/// committed state. Mutation goes through a [`Transaction`] obtained from
/// [`Store::begin`]; at most one transaction is open at a time.
pub struct Store {
    schema: StoreSchema,
    config: StoreConfig,
    pub(crate) state: RwLock<StoreState>,
    pub(crate) txn_open: AtomicBool,
}

impl Store {
    /// Opens a store with the given schema and configuration.
    ///
    /// When the configuration carries a data directory and a snapshot file
    /// for the configured name exists, the committed state is loaded from it.
    pub fn open(schema: StoreSchema, config: StoreConfig) -> Result<Self> {
        SchemaValidator::validate(&schema)?;
        config.create_directories()?;

        let state = match persistence::snapshot_path(&config) {
            Some(path) if path.exists() => {
                let snapshot = StoreSnapshot::from_file(&path)?;
                if snapshot.schema.name != schema.name {
                    return Err(LinkDbError::SnapshotError(format!(
                        "Snapshot belongs to store '{}', expected '{}'",
                        snapshot.schema.name, schema.name
                    )));
                }
                info!(
                    "loaded snapshot for store '{}' at version {}",
                    schema.name, snapshot.version
                );
                snapshot.into_state()
            }
            _ => StoreState::empty(),
        };

        Ok(Self {
            schema,
            config,
            state: RwLock::new(state),
            txn_open: AtomicBool::new(false),
        })
    }

    /// Opens a purely in-memory store; nothing is ever written to disk.
    pub fn in_memory(schema: StoreSchema) -> Result<Self> {
        Self::open(schema, StoreConfig::default())
    }

    /// Deletes the on-disk files of the named store instance, if any.
    pub fn delete_files(config: &StoreConfig) -> Result<()> {
        persistence::delete_store_files(config)
    }

    /// Opens a mutation scope. Fails if one is already open.
    pub fn begin(&self) -> Result<Transaction<'_>> {
        if self
            .txn_open
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(LinkDbError::TransactionInProgress);
        }
        debug!("transaction opened on store '{}'", self.schema.name);
        Ok(Transaction::new(self))
    }

    /// Returns all live objects of `type_name`, in creation order.
    pub fn all_objects(&self, type_name: &str) -> Result<QueryResults> {
        self.require_type(type_name)?;
        let state = self.state.read();
        let ids = state.by_type.get(type_name).cloned().unwrap_or_default();
        Ok(QueryResults::new(ids))
    }

    /// Begins a filter builder scoped to `type_name`.
    pub fn query(&self, type_name: &str) -> Result<Query<'_>> {
        Query::new(self, type_name)
    }

    /// Reads a field value from the committed state.
    pub fn get(&self, id: ObjectId, field: &str) -> Result<Value> {
        let state = self.state.read();
        let object = state
            .objects
            .get(&id)
            .ok_or(LinkDbError::ObjectNotFound(id.0))?;
        object
            .field(field)
            .cloned()
            .ok_or_else(|| LinkDbError::UnknownField {
                type_name: object.type_name.clone(),
                field: field.to_string(),
            })
    }

    /// Reads a to-one relation slot. `None` means no target is linked.
    pub fn link(&self, id: ObjectId, relation: &str) -> Result<Option<ObjectId>> {
        let state = self.state.read();
        let object = state
            .objects
            .get(&id)
            .ok_or(LinkDbError::ObjectNotFound(id.0))?;
        self.require_relation(&object.type_name, relation, Cardinality::One)?;
        Ok(object.link_one(relation))
    }

    /// Reads a to-many relation as an insertion-ordered view.
    pub fn links(&self, id: ObjectId, relation: &str) -> Result<LinkList> {
        let state = self.state.read();
        let object = state
            .objects
            .get(&id)
            .ok_or(LinkDbError::ObjectNotFound(id.0))?;
        self.require_relation(&object.type_name, relation, Cardinality::Many)?;
        Ok(LinkList::new(object.links_many(relation).to_vec()))
    }

    /// Number of live objects of `type_name`.
    pub fn object_count(&self, type_name: &str) -> Result<usize> {
        self.require_type(type_name)?;
        let state = self.state.read();
        Ok(state
            .by_type
            .get(type_name)
            .map(|ids| ids.len())
            .unwrap_or(0))
    }

    /// Current committed version, incremented on each commit.
    pub fn version(&self) -> u64 {
        self.state.read().version
    }

    pub fn schema(&self) -> &StoreSchema {
        &self.schema
    }

    pub(crate) fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub(crate) fn require_type(&self, type_name: &str) -> Result<()> {
        if self.schema.get_type(type_name).is_none() {
            return Err(LinkDbError::UnknownType(type_name.to_string()));
        }
        Ok(())
    }

    fn require_relation(
        &self,
        type_name: &str,
        relation: &str,
        cardinality: Cardinality,
    ) -> Result<()> {
        let type_def = self
            .schema
            .get_type(type_name)
            .ok_or_else(|| LinkDbError::UnknownType(type_name.to_string()))?;
        let relation_def =
            type_def
                .get_relation(relation)
                .ok_or_else(|| LinkDbError::UnknownRelation {
                    type_name: type_name.to_string(),
                    relation: relation.to_string(),
                })?;
        if relation_def.cardinality != cardinality {
            let describe = |c: Cardinality| match c {
                Cardinality::One => "to-one relation",
                Cardinality::Many => "to-many relation",
            };
            return Err(LinkDbError::TypeMismatch {
                expected: describe(cardinality).to_string(),
                got: describe(relation_def.cardinality).to_string(),
            });
        }
        Ok(())
    }
}
