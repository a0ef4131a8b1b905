//! Single-writer transaction scope.
//!
//! Mutations are staged on the transaction and validated when staged; the
//! whole batch is applied to the committed state at commit time, so readers
//! never observe a partially applied transaction.

use crate::error::{LinkDbError, Result};
use crate::persistence::{self, StoreSnapshot};
use crate::schema::Cardinality;
use crate::store::{Object, ObjectId, Store, StoreState};
use crate::value::Value;
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::Ordering;

#[derive(Debug, Clone)]
enum WriteOp {
    Create {
        id: ObjectId,
        type_name: String,
    },
    SetField {
        id: ObjectId,
        field: String,
        value: Value,
    },
    SetLink {
        id: ObjectId,
        relation: String,
        target: Option<ObjectId>,
    },
    PushLink {
        id: ObjectId,
        relation: String,
        target: ObjectId,
    },
    Clear {
        type_name: String,
    },
}

/// An open mutation scope on a [`Store`].
///
/// Obtained from [`Store::begin`]. Consuming the guard with [`commit`]
/// publishes the staged batch; [`rollback`] or dropping the guard discards
/// it. Either way the store accepts a new `begin` afterwards.
///
/// [`commit`]: Transaction::commit
/// [`rollback`]: Transaction::rollback
pub struct Transaction<'s> {
    store: &'s Store,
    ops: Vec<WriteOp>,
    /// Types of objects created in this scope, keyed by their fresh id.
    staged_types: HashMap<ObjectId, String>,
    finished: bool,
}

impl<'s> Transaction<'s> {
    pub(crate) fn new(store: &'s Store) -> Self {
        Self {
            store,
            ops: Vec::new(),
            staged_types: HashMap::new(),
            finished: false,
        }
    }

    /// Creates an object of `type_name` with all fields at their defaults.
    ///
    /// The identity is assigned immediately and is never reused; the object
    /// itself becomes visible to readers at commit.
    pub fn create(&mut self, type_name: &str) -> Result<ObjectId> {
        self.store.require_type(type_name)?;
        let id = self.store.state.write().registry.allocate();
        self.ops.push(WriteOp::Create {
            id,
            type_name: type_name.to_string(),
        });
        self.staged_types.insert(id, type_name.to_string());
        Ok(id)
    }

    /// Stages a field write. The value must match the declared field type.
    pub fn set(&mut self, id: ObjectId, field: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let store = self.store;
        let type_name = self.type_of(id)?;
        let type_def = store
            .schema()
            .get_type(&type_name)
            .ok_or_else(|| LinkDbError::UnknownType(type_name.clone()))?;
        let field_def = type_def
            .get_field(field)
            .ok_or_else(|| LinkDbError::UnknownField {
                type_name: type_name.clone(),
                field: field.to_string(),
            })?;
        if value.field_type() != field_def.field_type {
            return Err(LinkDbError::TypeMismatch {
                expected: field_def.field_type.name().to_string(),
                got: value.type_name().to_string(),
            });
        }
        self.ops.push(WriteOp::SetField {
            id,
            field: field.to_string(),
            value,
        });
        Ok(())
    }

    /// Stages a to-one slot write. `None` clears the slot.
    pub fn set_link(
        &mut self,
        id: ObjectId,
        relation: &str,
        target: Option<ObjectId>,
    ) -> Result<()> {
        let target_type_name = self.relation_target(id, relation, Cardinality::One)?;
        if let Some(target) = target {
            let target_type = self.type_of(target)?;
            if target_type != target_type_name {
                return Err(LinkDbError::TypeMismatch {
                    expected: target_type_name,
                    got: target_type,
                });
            }
        }
        self.ops.push(WriteOp::SetLink {
            id,
            relation: relation.to_string(),
            target,
        });
        Ok(())
    }

    /// Stages an append to a to-many relation.
    pub fn push_link(&mut self, id: ObjectId, relation: &str, target: ObjectId) -> Result<()> {
        let target_type_name = self.relation_target(id, relation, Cardinality::Many)?;
        let target_type = self.type_of(target)?;
        if target_type != target_type_name {
            return Err(LinkDbError::TypeMismatch {
                expected: target_type_name,
                got: target_type,
            });
        }
        self.ops.push(WriteOp::PushLink {
            id,
            relation: relation.to_string(),
            target,
        });
        Ok(())
    }

    /// Stages removal of every live object of `type_name`.
    ///
    /// At apply time, links elsewhere that point at removed objects are
    /// scrubbed: to-one slots become absent, to-many lists drop the removed
    /// members.
    pub fn clear(&mut self, type_name: &str) -> Result<()> {
        self.store.require_type(type_name)?;
        self.ops.push(WriteOp::Clear {
            type_name: type_name.to_string(),
        });
        Ok(())
    }

    /// Applies the staged batch and publishes it to readers.
    pub fn commit(mut self) -> Result<()> {
        let result = self.commit_inner();
        self.finished = true;
        self.store.txn_open.store(false, Ordering::Release);
        result
    }

    /// Discards the staged batch.
    pub fn rollback(mut self) {
        let discarded = self.ops.len();
        self.ops.clear();
        self.finished = true;
        self.store.txn_open.store(false, Ordering::Release);
        debug!("transaction rolled back, {} staged ops discarded", discarded);
    }

    fn commit_inner(&mut self) -> Result<()> {
        let mut state = self.store.state.write();
        self.check_batch(&state)?;

        let ops = std::mem::take(&mut self.ops);
        for op in ops {
            Self::apply(&mut state, self.store, op)?;
        }
        state.version += 1;
        debug!(
            "transaction committed on store '{}' at version {}",
            self.store.schema().name,
            state.version
        );

        if let Some(path) = persistence::snapshot_path(self.store.config()) {
            let config = self.store.config();
            let snapshot = StoreSnapshot::from_state(self.store.schema(), &state);
            snapshot.write_to_file(
                &path,
                config.compress_snapshots,
                config.compression_level,
                config.sync_on_write,
            )?;
            debug!("snapshot written to {:?}", path);
        }
        Ok(())
    }

    /// Rejects batches whose later ops touch objects removed by an earlier
    /// staged `clear`, so that apply cannot fail halfway through.
    fn check_batch(&self, state: &StoreState) -> Result<()> {
        let mut removed: HashSet<ObjectId> = HashSet::new();
        let mut created: HashMap<&str, Vec<ObjectId>> = HashMap::new();

        let ensure_live = |removed: &HashSet<ObjectId>, id: ObjectId| -> Result<()> {
            if removed.contains(&id) {
                return Err(LinkDbError::ObjectNotFound(id.0));
            }
            Ok(())
        };

        for op in &self.ops {
            match op {
                WriteOp::Create { id, type_name } => {
                    created.entry(type_name.as_str()).or_default().push(*id);
                }
                WriteOp::SetField { id, .. } => ensure_live(&removed, *id)?,
                WriteOp::SetLink { id, target, .. } => {
                    ensure_live(&removed, *id)?;
                    if let Some(target) = target {
                        ensure_live(&removed, *target)?;
                    }
                }
                WriteOp::PushLink { id, target, .. } => {
                    ensure_live(&removed, *id)?;
                    ensure_live(&removed, *target)?;
                }
                WriteOp::Clear { type_name } => {
                    if let Some(ids) = state.by_type.get(type_name.as_str()) {
                        removed.extend(ids.iter().copied());
                    }
                    if let Some(ids) = created.get_mut(type_name.as_str()) {
                        removed.extend(ids.drain(..));
                    }
                }
            }
        }
        Ok(())
    }

    fn apply(state: &mut StoreState, store: &Store, op: WriteOp) -> Result<()> {
        match op {
            WriteOp::Create { id, type_name } => {
                let type_def = store
                    .schema()
                    .get_type(&type_name)
                    .ok_or_else(|| LinkDbError::UnknownType(type_name.clone()))?;
                state.objects.insert(id, Object::new(id, type_def));
                state.by_type.entry(type_name).or_default().push(id);
            }
            WriteOp::SetField { id, field, value } => {
                let object = state
                    .objects
                    .get_mut(&id)
                    .ok_or(LinkDbError::ObjectNotFound(id.0))?;
                object.set_field(&field, value);
            }
            WriteOp::SetLink {
                id,
                relation,
                target,
            } => {
                let object = state
                    .objects
                    .get_mut(&id)
                    .ok_or(LinkDbError::ObjectNotFound(id.0))?;
                object.set_link_one(&relation, target);
            }
            WriteOp::PushLink {
                id,
                relation,
                target,
            } => {
                let object = state
                    .objects
                    .get_mut(&id)
                    .ok_or(LinkDbError::ObjectNotFound(id.0))?;
                object.push_link(&relation, target);
            }
            WriteOp::Clear { type_name } => {
                let ids = state.by_type.remove(&type_name).unwrap_or_default();
                let removed: HashSet<ObjectId> = ids.iter().copied().collect();
                for id in &ids {
                    state.objects.remove(id);
                }
                if !removed.is_empty() {
                    for object in state.objects.values_mut() {
                        object.scrub_links(&removed);
                    }
                    debug!("cleared {} objects of type '{}'", removed.len(), type_name);
                }
            }
        }
        Ok(())
    }

    /// Resolves `relation` on `id`'s type, checking cardinality. Returns the
    /// declared target type name.
    fn relation_target(
        &self,
        id: ObjectId,
        relation: &str,
        cardinality: Cardinality,
    ) -> Result<String> {
        let store = self.store;
        let type_name = self.type_of(id)?;
        let type_def = store
            .schema()
            .get_type(&type_name)
            .ok_or_else(|| LinkDbError::UnknownType(type_name.clone()))?;
        let relation_def =
            type_def
                .get_relation(relation)
                .ok_or_else(|| LinkDbError::UnknownRelation {
                    type_name: type_name.clone(),
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
        Ok(relation_def.target.clone())
    }

    /// Type of an object, whether staged in this scope or already committed.
    fn type_of(&self, id: ObjectId) -> Result<String> {
        if let Some(type_name) = self.staged_types.get(&id) {
            return Ok(type_name.clone());
        }
        let state = self.store.state.read();
        state
            .objects
            .get(&id)
            .map(|object| object.type_name.clone())
            .ok_or(LinkDbError::ObjectNotFound(id.0))
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.store.txn_open.store(false, Ordering::Release);
            if !self.ops.is_empty() {
                warn!(
                    "transaction dropped without commit; {} staged ops discarded",
                    self.ops.len()
                );
            }
        }
    }
}
