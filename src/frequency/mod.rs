/*! N-gram frequency counting.

Counting is done by the [aggregate] function, that folds pages into an in-memory [Accumulator]
and periodically commits it, along with a [Progress] checkpoint, into a [FrequencyStore].

There are three stores:

- [MemoryStore]: a plain hash map, for corpora that fit in memory.
- [TrieStore]: a prefix tree ([Trie]), same use case.
- [DiskStore]: a persistent, resumable store for corpora larger than memory.

All of them are accessible through the [Store] enum, selected with a [StoreKind].
!*/
mod aggregator;
mod disk;
mod memory;
mod trie;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Error;

pub use aggregator::{aggregate, Accumulator, AggregateConfig, AggregateReport, COMPLETED_MARKER};
pub use disk::DiskStore;
pub use memory::MemoryStore;
pub use trie::{Trie, TrieStore};

/// Resumability checkpoint: number of source pages folded into the store,
/// and title of the last one (or [COMPLETED_MARKER]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub page_index: u64,
    pub title: String,
}

impl Progress {
    pub fn new(page_index: u64, title: String) -> Self {
        Self { page_index, title }
    }
}

/// Key -> cumulative count table, with a single [Progress] record.
pub trait FrequencyStore {
    /// Last committed checkpoint, if any.
    fn progress(&self) -> Result<Option<Progress>, Error>;

    /// Count of a single key.
    fn get(&self, key: &str) -> Result<Option<u64>, Error>;

    /// Adds the counts of `batch` to the stored ones (inserting missing keys)
    /// and overwrites the progress record.
    ///
    /// Either everything is persisted or nothing is.
    fn commit(&mut self, batch: Vec<(String, u64)>, progress: Progress) -> Result<(), Error>;

    /// Every entry whose count is at least `cutoff`, in no particular order.
    fn scan(&self, cutoff: u64) -> Result<Vec<(String, u64)>, Error>;
}

/// Entries with a count of at least `cutoff`,
/// by descending count then ascending key.
pub fn query<S>(store: &S, cutoff: u64) -> Result<Vec<(String, u64)>, Error>
where
    S: FrequencyStore + ?Sized,
{
    let mut entries = store.scan(cutoff)?;
    sort_by_frequency(&mut entries);
    Ok(entries)
}

pub(crate) fn sort_by_frequency(entries: &mut [(String, u64)]) {
    entries.sort_unstable_by(|(key_a, count_a), (key_b, count_b)| {
        count_b.cmp(count_a).then_with(|| key_a.cmp(key_b))
    });
}

/// Frequency store selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    Trie,
    /// Persistent store in the provided directory.
    Disk(PathBuf),
}

impl StoreKind {
    pub fn open(&self) -> Result<Store, Error> {
        Ok(match self {
            StoreKind::Memory => Store::Memory(MemoryStore::default()),
            StoreKind::Trie => Store::Trie(TrieStore::default()),
            StoreKind::Disk(dir) => Store::Disk(DiskStore::open(dir)?),
        })
    }
}

/// Holds different kinds of stores.
#[derive(Debug)]
pub enum Store {
    Memory(MemoryStore),
    Trie(TrieStore),
    Disk(DiskStore),
}

impl FrequencyStore for Store {
    fn progress(&self) -> Result<Option<Progress>, Error> {
        match self {
            Store::Memory(s) => s.progress(),
            Store::Trie(s) => s.progress(),
            Store::Disk(s) => s.progress(),
        }
    }

    fn get(&self, key: &str) -> Result<Option<u64>, Error> {
        match self {
            Store::Memory(s) => s.get(key),
            Store::Trie(s) => s.get(key),
            Store::Disk(s) => s.get(key),
        }
    }

    fn commit(&mut self, batch: Vec<(String, u64)>, progress: Progress) -> Result<(), Error> {
        match self {
            Store::Memory(s) => s.commit(batch, progress),
            Store::Trie(s) => s.commit(batch, progress),
            Store::Disk(s) => s.commit(batch, progress),
        }
    }

    fn scan(&self, cutoff: u64) -> Result<Vec<(String, u64)>, Error> {
        match self {
            Store::Memory(s) => s.scan(cutoff),
            Store::Trie(s) => s.scan(cutoff),
            Store::Disk(s) => s.scan(cutoff),
        }
    }
}
