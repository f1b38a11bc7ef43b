//! Persistent vector index
//!
//! Entries live in a single redb table keyed by entry ID, values are JSON
//! encoded [`IndexEntry`] records. All entries are mirrored in memory and
//! searched exhaustively by cosine distance.

use parking_lot::RwLock;
use redb::{backends::InMemoryBackend, Database, ReadableTable, TableDefinition};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::{IndexEntry, ScoredEntry};

const ENTRIES: TableDefinition<&str, &[u8]> = TableDefinition::new("entries");

/// Synchronous vector index backed by redb
pub struct VectorIndex {
    db: Database,
    entries: RwLock<BTreeMap<String, IndexEntry>>,
}

impl VectorIndex {
    /// Open (or create) the index at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = Database::create(path)?;
        let index = Self::from_database(db)?;
        tracing::info!(
            "Opened vector index at {} ({} entries)",
            path.display(),
            index.len()
        );
        Ok(index)
    }

    /// Create a non-persistent index
    pub fn in_memory() -> Result<Self> {
        let db = Database::builder().create_with_backend(InMemoryBackend::new())?;
        Self::from_database(db)
    }

    fn from_database(db: Database) -> Result<Self> {
        let txn = db.begin_write()?;
        txn.open_table(ENTRIES)?;
        txn.commit()?;

        let mut entries = BTreeMap::new();
        {
            let txn = db.begin_read()?;
            let table = txn.open_table(ENTRIES)?;
            for item in table.iter()? {
                let (key, value) = item?;
                let entry: IndexEntry = serde_json::from_slice(value.value()).map_err(|e| {
                    Error::vector_db(format!("Corrupt index entry {}: {}", key.value(), e))
                })?;
                entries.insert(entry.id.clone(), entry);
            }
        }

        let index = Self {
            db,
            entries: RwLock::new(entries),
        };
        index.check_consistent()?;
        Ok(index)
    }

    fn check_consistent(&self) -> Result<()> {
        let entries = self.entries.read();
        let mut dims = entries.values().map(IndexEntry::dimensions);
        if let Some(expected) = dims.next() {
            if let Some(actual) = dims.find(|d| *d != expected) {
                return Err(Error::DimensionMismatch { expected, actual });
            }
        }
        Ok(())
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Vector dimension of the stored entries, `None` when empty
    pub fn dimensions(&self) -> Option<usize> {
        self.entries.read().values().next().map(IndexEntry::dimensions)
    }

    /// Insert or replace entries by ID in one transaction
    pub fn upsert(&self, batch: &[IndexEntry]) -> Result<usize> {
        if batch.is_empty() {
            return Ok(0);
        }

        let expected = self.dimensions().unwrap_or_else(|| batch[0].dimensions());
        if let Some(bad) = batch.iter().find(|e| e.dimensions() != expected) {
            return Err(Error::DimensionMismatch {
                expected,
                actual: bad.dimensions(),
            });
        }

        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(ENTRIES)?;
            for entry in batch {
                let value = serde_json::to_vec(entry)?;
                table.insert(entry.id.as_str(), value.as_slice())?;
            }
        }
        txn.commit()?;

        let mut entries = self.entries.write();
        for entry in batch {
            entries.insert(entry.id.clone(), entry.clone());
        }
        Ok(batch.len())
    }

    /// Up to `k` entries nearest to `vector`, closest first
    pub fn query(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredEntry>> {
        let entries = self.entries.read();
        let Some(expected) = entries.values().next().map(IndexEntry::dimensions) else {
            return Ok(Vec::new());
        };
        if vector.len() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                actual: vector.len(),
            });
        }

        let mut scored: Vec<ScoredEntry> = entries
            .values()
            .map(|entry| ScoredEntry {
                chunk: entry.chunk.clone(),
                distance: cosine_distance(vector, &entry.embedding),
            })
            .collect();
        scored.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        scored.truncate(k);
        Ok(scored)
    }
}

/// `1 - cos(a, b)`; a zero vector is at distance 1 from everything
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a.sqrt() * norm_b.sqrt())
}
