//! Typed access to numeric postings shards.

use crate::errors::StoreError;
use crate::types::ShardKind;

/// Postings keyed by `(kind, key)`. Missing keys are absent, never errors.
/// Implementations must be safe under concurrent reads and sequentially
/// consistent per key.
pub trait ShardStore: Send + Sync {
    fn get(&self, kind: ShardKind, key: u64) -> Result<Option<Vec<u64>>, StoreError>;

    /// Postings of every present key, flattened in `keys` order.
    fn get_all(&self, kind: ShardKind, keys: &[u64]) -> Result<Vec<u64>, StoreError> {
        let mut out = Vec::new();
        for &key in keys {
            if let Some(postings) = self.get(kind, key)? {
                out.extend(postings);
            }
        }
        Ok(out)
    }

    fn put(&self, kind: ShardKind, key: u64, postings: Vec<u64>) -> Result<(), StoreError>;

    /// Every key present for `kind`, sorted.
    fn keys(&self, kind: ShardKind) -> Result<Vec<u64>, StoreError>;
}
