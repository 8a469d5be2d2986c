//! Batched, resumable n-gram counting.
use std::collections::HashMap;

use log::{debug, error, info};

use crate::error::Error;
use crate::page::Page;
use crate::tokenizer;

use super::{FrequencyStore, Progress};

/// Title written in the checkpoint of the final flush.
pub const COMPLETED_MARKER: &str = "[COMPLETED]";

/// Expected number of distinct keys per page, used to size the accumulator.
const KEYS_PER_PAGE: usize = 6;

/// Aggregation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateConfig {
    ngram_size: usize,
    batch_size: usize,
}

impl AggregateConfig {
    /// `ngram_size` is the number of tokens per key,
    /// `batch_size` the number of pages between two commits.
    pub fn new(ngram_size: usize, batch_size: usize) -> Result<Self, Error> {
        if ngram_size == 0 {
            return Err(Error::InvalidArgument(
                "n-gram size must be at least 1".to_string(),
            ));
        }
        if batch_size == 0 {
            return Err(Error::InvalidArgument(
                "batch size must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            ngram_size,
            batch_size,
        })
    }

    pub fn ngram_size(&self) -> usize {
        self.ngram_size
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

impl Default for AggregateConfig {
    /// Unigrams, committed every 10k pages.
    fn default() -> Self {
        Self {
            ngram_size: 1,
            batch_size: 10_000,
        }
    }
}

/// In-memory counts of the current batch.
#[derive(Debug, Default)]
pub struct Accumulator {
    counts: HashMap<String, u64>,
}

impl Accumulator {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            counts: HashMap::with_capacity(capacity),
        }
    }

    pub fn add(&mut self, key: String) {
        *self.counts.entry(key).or_insert(0) += 1;
    }

    /// Counts every n-gram of the page's plaintext.
    pub fn add_page(&mut self, page: &Page, ngram_size: usize) {
        for section in tokenizer::sections(page.plaintext()) {
            let tokens = tokenizer::tokens(section);
            for ngram in tokenizer::ngrams(&tokens, ngram_size) {
                self.add(ngram);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.counts.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Empties the accumulator, returning its content.
    pub fn drain(&mut self) -> Vec<(String, u64)> {
        self.counts.drain().collect()
    }
}

/// What a call to [aggregate] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateReport {
    /// pages skipped because they were already counted by a previous run.
    pub skipped: u64,
    /// pages counted by this run.
    pub processed: u64,
    /// commits done by this run.
    pub batches: u64,
}

/// Counts the n-grams of `pages` into `store`.
///
/// If the store holds a checkpoint, that many pages are skipped first:
/// pages must come in the same order across runs.
/// Counts are committed every `batch_size` pages along with a checkpoint, and once more at the end.
///
/// A page source error stops the run without committing the current batch.
/// A commit failure is returned as [Error::Commit]; the store is left at its previous checkpoint
/// and a new run resumes from there without counting anything twice.
pub fn aggregate<S, I>(
    pages: I,
    store: &mut S,
    config: &AggregateConfig,
) -> Result<AggregateReport, Error>
where
    S: FrequencyStore + ?Sized,
    I: IntoIterator<Item = Result<Page, Error>>,
{
    let mut report = AggregateReport::default();
    let mut pages = pages.into_iter();

    if let Some(progress) = store.progress()? {
        info!(
            "resuming after page {} ({})",
            progress.page_index, progress.title
        );
        while report.skipped < progress.page_index {
            match pages.next() {
                Some(page) => {
                    page?;
                    report.skipped += 1;
                }
                None => break,
            }
        }
    }

    let batch_size = config.batch_size as u64;
    let mut page_index = report.skipped;
    let mut accumulator = Accumulator::with_capacity(KEYS_PER_PAGE * config.batch_size);

    for page in pages {
        let page = page?;
        accumulator.add_page(&page, config.ngram_size);
        page_index += 1;
        report.processed += 1;

        if page_index % batch_size == 0 {
            flush(
                store,
                &mut accumulator,
                Progress::new(page_index, page.title().to_string()),
            )?;
            report.batches += 1;
        }
    }

    if !accumulator.is_empty() {
        flush(
            store,
            &mut accumulator,
            Progress::new(page_index, COMPLETED_MARKER.to_string()),
        )?;
        report.batches += 1;
    }

    debug!("{:?}", report);
    Ok(report)
}

/// Commits the accumulator content. The accumulator is emptied whatever the outcome.
fn flush<S>(store: &mut S, accumulator: &mut Accumulator, progress: Progress) -> Result<(), Error>
where
    S: FrequencyStore + ?Sized,
{
    let page_index = progress.page_index;
    let title = progress.title.clone();
    let batch = accumulator.drain();
    let keys = batch.len();

    match store.commit(batch, progress) {
        Ok(()) => {
            info!("committed {} ({}), {} keys", page_index, title, keys);
            Ok(())
        }
        Err(e) => {
            error!(
                "batch ending at page {} abandoned: {}. Rerun to resume from the last checkpoint.",
                page_index, e
            );
            Err(Error::Commit {
                page_index,
                source: Box::new(e),
            })
        }
    }
}
