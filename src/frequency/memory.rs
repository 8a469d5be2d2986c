//! In-memory frequency store.
use std::collections::HashMap;

use crate::error::Error;

use super::{FrequencyStore, Progress};

/// Hash map backed store. Nothing is persisted.
#[derive(Debug, Default)]
pub struct MemoryStore {
    counts: HashMap<String, u64>,
    progress: Option<Progress>,
}

impl MemoryStore {
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl FrequencyStore for MemoryStore {
    fn progress(&self) -> Result<Option<Progress>, Error> {
        Ok(self.progress.clone())
    }

    fn get(&self, key: &str) -> Result<Option<u64>, Error> {
        Ok(self.counts.get(key).copied())
    }

    fn commit(&mut self, batch: Vec<(String, u64)>, progress: Progress) -> Result<(), Error> {
        self.counts.reserve(batch.len());
        for (key, count) in batch {
            let stored = self.counts.entry(key).or_insert(0);
            *stored = stored.saturating_add(count);
        }
        self.progress = Some(progress);
        Ok(())
    }

    fn scan(&self, cutoff: u64) -> Result<Vec<(String, u64)>, Error> {
        Ok(self
            .counts
            .iter()
            .filter(|(_, &count)| count >= cutoff)
            .map(|(key, &count)| (key.clone(), count))
            .collect())
    }
}
