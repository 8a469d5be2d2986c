//! Prefix tree counter.
//!
//! Each node counts the terms that went through it during insertion,
//! so the frequency of a term alone is its node count minus the counts of the node's children.
use std::collections::BTreeMap;

use crate::error::Error;

use super::{sort_by_frequency, FrequencyStore, Progress};

#[derive(Debug, Default)]
struct Node {
    count: u64,
    terminal: bool,
    children: BTreeMap<char, Node>,
}

impl Node {
    /// Occurrences of the term ending here, excluding longer terms.
    fn own_count(&self) -> u64 {
        let through_children: u64 = self.children.values().map(|child| child.count).sum();
        self.count.saturating_sub(through_children)
    }

    fn collect_terms(&self, prefix: &mut String, out: &mut Vec<(String, u64)>) {
        if self.terminal {
            out.push((prefix.clone(), self.own_count()));
        }
        for (c, child) in &self.children {
            prefix.push(*c);
            child.collect_terms(prefix, out);
            prefix.pop();
        }
    }
}

/// Character keyed prefix tree.
#[derive(Debug, Default)]
pub struct Trie {
    root: Node,
}

impl Trie {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, term: &str) {
        self.insert_n(term, 1);
    }

    /// Inserts `term` `n` times.
    pub fn insert_n(&mut self, term: &str, n: u64) {
        if n == 0 {
            return;
        }
        let mut node = &mut self.root;
        node.count += n;
        for c in term.chars() {
            node = node.children.entry(c).or_default();
            node.count += n;
        }
        node.terminal = true;
    }

    /// Number of insertions.
    pub fn total(&self) -> u64 {
        self.root.count
    }

    /// Frequency of `term` alone, `None` if it was never inserted.
    pub fn frequency(&self, term: &str) -> Option<u64> {
        let mut node = &self.root;
        for c in term.chars() {
            node = node.children.get(&c)?;
        }
        if node.terminal {
            Some(node.own_count())
        } else {
            None
        }
    }

    /// Every inserted term with its frequency, in lexicographic order.
    pub fn terms(&self) -> Vec<(String, u64)> {
        let mut out = Vec::new();
        self.root.collect_terms(&mut String::new(), &mut out);
        out
    }

    /// Terms with a frequency of at least `cutoff`,
    /// by descending frequency then ascending term.
    pub fn query(&self, cutoff: u64) -> Vec<(String, u64)> {
        let mut terms: Vec<_> = self
            .terms()
            .into_iter()
            .filter(|(_, frequency)| *frequency >= cutoff)
            .collect();
        sort_by_frequency(&mut terms);
        terms
    }
}

/// [Trie] backed frequency store. Nothing is persisted.
#[derive(Debug, Default)]
pub struct TrieStore {
    trie: Trie,
    progress: Option<Progress>,
}

impl TrieStore {
    pub fn trie(&self) -> &Trie {
        &self.trie
    }
}

impl FrequencyStore for TrieStore {
    fn progress(&self) -> Result<Option<Progress>, Error> {
        Ok(self.progress.clone())
    }

    fn get(&self, key: &str) -> Result<Option<u64>, Error> {
        Ok(self.trie.frequency(key))
    }

    fn commit(&mut self, batch: Vec<(String, u64)>, progress: Progress) -> Result<(), Error> {
        for (key, count) in batch {
            self.trie.insert_n(&key, count);
        }
        self.progress = Some(progress);
        Ok(())
    }

    fn scan(&self, cutoff: u64) -> Result<Vec<(String, u64)>, Error> {
        Ok(self
            .trie
            .terms()
            .into_iter()
            .filter(|(_, frequency)| *frequency >= cutoff)
            .collect())
    }
}
