//! Snapshot format for persistent storage of store state.

use crate::error::{LinkDbError, Result};
use crate::schema::StoreSchema;
use crate::store::{Object, ObjectId, ObjectRegistry, StoreState};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Magic number for snapshot files: "LINKSNAP" in ASCII
const SNAPSHOT_MAGIC: [u8; 8] = *b"LINKSNAP";
/// Current snapshot format version
const SNAPSHOT_VERSION: u32 = 1;
/// Flags bit 0: compressed with zstd
const FLAG_COMPRESSED: u32 = 1 << 0;

/// Header at the start of a snapshot file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotHeader {
    magic: [u8; 8],
    version: u32,
    flags: u32,
    checksum: u32, // CRC32 of the data after header (compressed if flags indicate)
    reserved: [u8; 8],
}

/// Serialized size of the header: 8 + 4 + 4 + 4 + 8 bytes.
const HEADER_SIZE: usize = 28;

impl SnapshotHeader {
    fn new(flags: u32, checksum: u32) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: SNAPSHOT_VERSION,
            flags,
            checksum,
            reserved: [0; 8],
        }
    }

    /// Validates the header's magic and version.
    fn validate(&self) -> Result<()> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(LinkDbError::SnapshotError("Invalid snapshot magic".into()));
        }
        if self.version != SNAPSHOT_VERSION {
            return Err(LinkDbError::SnapshotError(format!(
                "Unsupported snapshot version {}",
                self.version
            )));
        }
        Ok(())
    }
}

/// Complete store snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Schema the state was committed under.
    pub schema: StoreSchema,
    /// Identity allocator state.
    pub registry: ObjectRegistry,
    /// All live objects.
    pub objects: Vec<Object>,
    /// Creation-ordered ids per type.
    pub by_type: HashMap<String, Vec<ObjectId>>,
    /// Committed version at snapshot time.
    pub version: u64,
}

impl StoreSnapshot {
    pub(crate) fn from_state(schema: &StoreSchema, state: &StoreState) -> Self {
        // Objects go in per-type creation order so a restore rebuilds the
        // same iteration behavior.
        let mut objects = Vec::with_capacity(state.objects.len());
        for ids in state.by_type.values() {
            for id in ids {
                if let Some(object) = state.objects.get(id) {
                    objects.push(object.clone());
                }
            }
        }
        Self {
            schema: schema.clone(),
            registry: state.registry.clone(),
            objects,
            by_type: state.by_type.clone(),
            version: state.version,
        }
    }

    pub(crate) fn into_state(self) -> StoreState {
        let mut objects = HashMap::with_capacity(self.objects.len());
        for object in self.objects {
            objects.insert(object.id, object);
        }
        StoreState {
            objects,
            by_type: self.by_type,
            registry: self.registry,
            version: self.version,
        }
    }

    /// Writes the snapshot to a file, optionally compressing with zstd.
    pub fn write_to_file(
        &self,
        path: &Path,
        compress: bool,
        compression_level: i32,
        sync: bool,
    ) -> Result<()> {
        let snapshot_bytes = bincode::serialize(self)?;
        let (flags, data) = if compress {
            let compressed = zstd::encode_all(snapshot_bytes.as_slice(), compression_level)
                .map_err(|e| LinkDbError::CompressionError(e.to_string()))?;
            (FLAG_COMPRESSED, compressed)
        } else {
            (0, snapshot_bytes)
        };
        // Compute checksum of data (compressed or not)
        let checksum = crc32fast::hash(&data);
        let header = SnapshotHeader::new(flags, checksum);
        let header_bytes = bincode::serialize(&header)?;

        let mut file = File::create(path)?;
        file.write_all(&header_bytes)?;
        file.write_all(&data)?;
        if sync {
            file.sync_all()?;
        }
        Ok(())
    }

    /// Loads a snapshot from a file, decompressing if necessary.
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut header_buf = [0u8; HEADER_SIZE];
        file.read_exact(&mut header_buf)?;
        let header: SnapshotHeader = bincode::deserialize(&header_buf)?;
        header.validate()?;

        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        let computed = crc32fast::hash(&data);
        if computed != header.checksum {
            return Err(LinkDbError::SnapshotError("Checksum mismatch".into()));
        }

        let snapshot_bytes = if header.flags & FLAG_COMPRESSED != 0 {
            zstd::decode_all(&data[..])
                .map_err(|e| LinkDbError::CompressionError(e.to_string()))?
        } else {
            data
        };
        let snapshot: StoreSnapshot = bincode::deserialize(&snapshot_bytes)?;
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldType, TypeDefinition};
    use crate::value::Value;
    use tempfile::tempdir;

    fn sample_snapshot() -> StoreSnapshot {
        let schema = StoreSchema::new("petshop").with_type(
            TypeDefinition::new("Dog")
                .field("name", FieldType::String)
                .field("age", FieldType::Int),
        );
        let dog_type = schema.get_type("Dog").unwrap();

        let mut dog = Object::new(ObjectId(1), dog_type);
        dog.set_field("name", Value::String("Pluto".into()));
        dog.set_field("age", Value::Int(5));

        let mut registry = ObjectRegistry::new();
        registry.allocate();

        let mut by_type = HashMap::new();
        by_type.insert("Dog".to_string(), vec![ObjectId(1)]);

        StoreSnapshot {
            schema,
            registry,
            objects: vec![dog],
            by_type,
            version: 1,
        }
    }

    #[test]
    fn test_roundtrip_uncompressed() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("store.snapshot");
        let snapshot = sample_snapshot();
        snapshot.write_to_file(&path, false, 3, false)?;

        let loaded = StoreSnapshot::from_file(&path)?;
        assert_eq!(loaded.version, 1);
        assert_eq!(loaded.objects.len(), 1);
        assert_eq!(
            loaded.objects[0].field("name"),
            Some(&Value::String("Pluto".into()))
        );
        Ok(())
    }

    #[test]
    fn test_roundtrip_compressed() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("store.snapshot");
        sample_snapshot().write_to_file(&path, true, 3, false)?;

        let loaded = StoreSnapshot::from_file(&path)?;
        assert_eq!(loaded.schema.name, "petshop");
        assert_eq!(loaded.by_type["Dog"], vec![ObjectId(1)]);
        Ok(())
    }

    #[test]
    fn test_corruption_detected() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("store.snapshot");
        sample_snapshot().write_to_file(&path, false, 3, false)?;

        // Flip a byte past the header.
        let mut bytes = std::fs::read(&path)?;
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        std::fs::write(&path, &bytes)?;

        assert!(matches!(
            StoreSnapshot::from_file(&path),
            Err(LinkDbError::SnapshotError(_))
        ));
        Ok(())
    }

    #[test]
    fn test_bad_magic_rejected() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("store.snapshot");
        std::fs::write(&path, vec![0u8; 64])?;
        assert!(StoreSnapshot::from_file(&path).is_err());
        Ok(())
    }
}
