//! Filter-builder queries over the committed object graph.
//!
//! A query is a conjunction of predicates over field paths. Paths are
//! validated against the schema when the predicate is added; evaluation
//! walks the committed live set of the scoped type in creation order.
//!
//! Path semantics:
//! - `"age"` reads the field on the candidate object;
//! - `"cat.age"` traverses a to-one relation; a candidate with no linked
//!   target matches nothing, for negated predicates as well;
//! - `"dogs.age"` traverses a to-many relation existentially: the candidate
//!   matches when at least one element satisfies the predicate.

pub mod path;
pub mod predicate;
pub mod results;

pub use path::{FieldPath, RelationHop};
pub use predicate::{Operator, Predicate};
pub use results::QueryResults;

use crate::error::{LinkDbError, Result};
use crate::schema::Cardinality;
use crate::store::{Object, Store, StoreState};
use crate::value::Value;

/// Filter builder scoped to one object type.
pub struct Query<'s> {
    store: &'s Store,
    type_name: String,
    predicates: Vec<Predicate>,
}

impl<'s> Query<'s> {
    pub(crate) fn new(store: &'s Store, type_name: &str) -> Result<Self> {
        store.require_type(type_name)?;
        Ok(Self {
            store,
            type_name: type_name.to_string(),
            predicates: Vec::new(),
        })
    }

    pub fn equal_to(self, path: &str, value: impl Into<Value>) -> Result<Self> {
        self.push(Operator::Equal, path, value.into(), None)
    }

    pub fn not_equal_to(self, path: &str, value: impl Into<Value>) -> Result<Self> {
        self.push(Operator::NotEqual, path, value.into(), None)
    }

    pub fn greater_than(self, path: &str, value: impl Into<Value>) -> Result<Self> {
        self.push(Operator::GreaterThan, path, value.into(), None)
    }

    pub fn greater_than_or_equal_to(self, path: &str, value: impl Into<Value>) -> Result<Self> {
        self.push(Operator::GreaterThanOrEqual, path, value.into(), None)
    }

    pub fn less_than(self, path: &str, value: impl Into<Value>) -> Result<Self> {
        self.push(Operator::LessThan, path, value.into(), None)
    }

    pub fn less_than_or_equal_to(self, path: &str, value: impl Into<Value>) -> Result<Self> {
        self.push(Operator::LessThanOrEqual, path, value.into(), None)
    }

    /// Inclusive on both bounds.
    pub fn between(
        self,
        path: &str,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Result<Self> {
        self.push(Operator::Between, path, low.into(), Some(high.into()))
    }

    /// Evaluates the conjunction against the committed live set.
    pub fn find_all(&self) -> Result<QueryResults> {
        let state = self.store.state.read();
        let ids = state
            .by_type
            .get(&self.type_name)
            .cloned()
            .unwrap_or_default();

        let mut matches = Vec::new();
        for id in ids {
            let Some(object) = state.objects.get(&id) else {
                continue;
            };
            if self
                .predicates
                .iter()
                .all(|predicate| matches_object(predicate, object, &state))
            {
                matches.push(id);
            }
        }
        Ok(QueryResults::new(matches))
    }

    fn push(
        mut self,
        op: Operator,
        raw_path: &str,
        literal: Value,
        upper: Option<Value>,
    ) -> Result<Self> {
        let schema = self.store.schema();
        let type_def = schema
            .get_type(&self.type_name)
            .ok_or_else(|| LinkDbError::UnknownType(self.type_name.clone()))?;
        let path = FieldPath::parse(raw_path, type_def, schema)?;
        self.predicates.push(Predicate::new(path, op, literal, upper)?);
        Ok(self)
    }
}

fn matches_object(predicate: &Predicate, object: &Object, state: &StoreState) -> bool {
    match &predicate.path.hop {
        None => object
            .field(&predicate.path.field)
            .map(|value| predicate.matches_value(value))
            .unwrap_or(false),
        Some(hop) => match hop.cardinality {
            // An absent to-one link participates in no predicate at all.
            Cardinality::One => {
                let Some(target_id) = object.link_one(&hop.name) else {
                    return false;
                };
                let Some(target) = state.objects.get(&target_id) else {
                    return false;
                };
                target
                    .field(&predicate.path.field)
                    .map(|value| predicate.matches_value(value))
                    .unwrap_or(false)
            }
            // Existential: one satisfying element is enough.
            Cardinality::Many => object.links_many(&hop.name).iter().any(|target_id| {
                state
                    .objects
                    .get(target_id)
                    .and_then(|target| target.field(&predicate.path.field))
                    .map(|value| predicate.matches_value(value))
                    .unwrap_or(false)
            }),
        },
    }
}
