/*! N-gram counting command.

Reads pages, counts their n-grams into the selected [StoreKind] and writes the entries
above the cutoff as a `term<TAB>count` list.

When a disk store is used, an interrupted run can be restarted with the same arguments:
counting resumes from the last checkpoint.

The output is written next to its destination with a `.tmp` suffix, and only replaces the
destination once counting succeeded: a failed run leaves a previous output untouched.
!*/
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{info, warn};

use crate::error::Error;
use crate::frequency::{aggregate, query, AggregateConfig, AggregateReport, StoreKind};
use crate::io::{open_pages, write_frequencies};
use crate::markup::NormalizeOptions;
use crate::page::Page;

#[derive(Debug, Clone)]
pub struct NGramCounting {
    pub src: PathBuf,
    pub dst: PathBuf,
    pub store: StoreKind,
    /// Only count that many articles.
    pub articles: Option<usize>,
    pub config: AggregateConfig,
    /// Minimum count of a written entry.
    pub cutoff: u64,
    pub options: NormalizeOptions,
}

impl NGramCounting {
    pub fn new(src: PathBuf, dst: PathBuf) -> Self {
        Self {
            src,
            dst,
            store: StoreKind::Memory,
            articles: None,
            config: AggregateConfig::default(),
            cutoff: 10,
            options: NormalizeOptions::default(),
        }
    }

    pub fn run(&self) -> Result<AggregateReport, Error> {
        let start = Instant::now();

        // fail on bad inputs/outputs before counting anything
        let pages = open_pages(&self.src, self.options)?;
        let tmp = tmp_path(&self.dst);
        let dst = BufWriter::new(File::create(&tmp)?);

        let (report, written) = match self.count_and_write(pages, dst) {
            Ok(outcome) => outcome,
            Err(e) => {
                if let Err(rm) = fs::remove_file(&tmp) {
                    warn!("could not remove {:?}: {}", tmp, rm);
                }
                return Err(e);
            }
        };
        fs::rename(&tmp, &self.dst)?;

        info!(
            "wrote {} entries to {:?}. Process took {:.2?}",
            written,
            self.dst,
            start.elapsed()
        );

        Ok(report)
    }

    /// Counts `pages` and writes the entries above the cutoff into `dst`.
    /// Returns the aggregation report and the number of written entries.
    fn count_and_write<I>(
        &self,
        pages: I,
        mut dst: BufWriter<File>,
    ) -> Result<(AggregateReport, usize), Error>
    where
        I: Iterator<Item = Result<Page, Error>>,
    {
        let mut store = self.store.open()?;

        let report = match self.articles {
            Some(limit) => aggregate(pages.take(limit), &mut store, &self.config)?,
            None => aggregate(pages, &mut store, &self.config)?,
        };
        info!(
            "counted {} pages ({} already counted) in {} batches",
            report.processed, report.skipped, report.batches
        );

        let entries = query(&store, self.cutoff)?;
        write_frequencies(&mut dst, &entries)?;
        Ok((report, entries.len()))
    }
}

/// `dst` with a `.tmp` suffix appended to its file name.
fn tmp_path(dst: &Path) -> PathBuf {
    let mut name = dst.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}
