use super::object::ObjectId;
use serde::{Deserialize, Serialize};

/// Allocates object identities.
///
/// Ids are never reused, even when an allocation belongs to a transaction
/// that is later rolled back; identity is fixed at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectRegistry {
    next_id: u64,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    pub fn allocate(&mut self) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        id
    }
}

impl Default for ObjectRegistry {
    fn default() -> Self {
        Self::new()
    }
}
