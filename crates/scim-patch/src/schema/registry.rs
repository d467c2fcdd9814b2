//! Memoized per-type list of comparable fields.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use tracing::trace;

use super::{FieldDescriptor, RecordType};

/// Cache of the fields the diff engine walks for each record type, keyed by
/// [`RecordType::id`].
///
/// On a miss the field list is computed without holding the lock and then
/// published. Concurrent misses for the same type compute identical lists,
/// so the last write simply wins.
#[derive(Debug, Default)]
pub struct FieldRegistry {
    cache: RwLock<HashMap<u64, Arc<[FieldDescriptor]>>>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry shared by every default [`PatchGenerator`](crate::PatchGenerator).
    pub fn global() -> Arc<FieldRegistry> {
        static GLOBAL: OnceLock<Arc<FieldRegistry>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(FieldRegistry::new())).clone()
    }

    /// Comparable fields of `ty` in declaration order. Read-only and static
    /// fields are dropped here and never reach the diff.
    pub fn fields_of(&self, ty: &RecordType) -> Arc<[FieldDescriptor]> {
        let cached = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&ty.id())
            .cloned();
        if let Some(fields) = cached {
            return fields;
        }

        let fields: Arc<[FieldDescriptor]> = ty
            .fields()
            .iter()
            .filter(|f| f.is_comparable())
            .cloned()
            .collect();
        trace!(record_type = ty.name(), fields = fields.len(), "field registry miss");

        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(ty.id(), fields.clone());
        fields
    }

    /// Number of cached types.
    pub fn len(&self) -> usize {
        self.cache.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.cache.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}
