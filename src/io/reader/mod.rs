/*! Page sources.

Sources are either MediaWiki XML dumps (plain or gzipped) or exchange files previously written by
[crate::io::writer::ExchangeWriter]. Their kind is inferred from the file name.

Readers implement [Iterator], yielding `Result<Page, Error>`.
!*/
mod dump;
mod exchange;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use flate2::read::MultiGzDecoder;
use log::debug;

use crate::error::Error;
use crate::markup::NormalizeOptions;
use crate::page::Page;

pub use dump::{unescape, DumpReader};
pub use exchange::ExchangeReader;

/// Kind of a page source, inferred from its file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// `.xml`
    Dump,
    /// `.xml.gz`, `.gz`
    GzDump,
    /// `.jsonl`
    Exchange,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if name.ends_with(".jsonl") {
            Ok(Self::Exchange)
        } else if name.ends_with(".gz") {
            Ok(Self::GzDump)
        } else if name.ends_with(".xml") {
            Ok(Self::Dump)
        } else {
            Err(Error::UnsupportedInput(path.to_path_buf()))
        }
    }
}

/// Holds the different kinds of page readers.
///
/// Dump readers only yield articles (see [Page::is_article]), exchange readers yield every page.
pub enum PageReader {
    Dump(DumpReader<BufReader<File>>),
    GzDump(DumpReader<BufReader<MultiGzDecoder<File>>>),
    Exchange(ExchangeReader<BufReader<File>>),
}

impl PageReader {
    /// Opens `path`, checking its existence and kind before anything is read.
    pub fn open(path: &Path, options: NormalizeOptions) -> Result<Self, Error> {
        if !path.is_file() {
            return Err(Error::MissingInput(path.to_path_buf()));
        }
        let kind = SourceKind::from_path(path)?;
        debug!("opening {:?} as {:?}", path, kind);

        let file = File::open(path)?;
        Ok(match kind {
            SourceKind::Dump => Self::Dump(DumpReader::new(BufReader::new(file)).with_options(options)),
            SourceKind::GzDump => Self::GzDump(
                DumpReader::new(BufReader::new(MultiGzDecoder::new(file))).with_options(options),
            ),
            SourceKind::Exchange => Self::Exchange(ExchangeReader::new(BufReader::new(file))),
        })
    }
}

/// Skips non-article pages.
fn next_article<I>(reader: &mut I) -> Option<Result<Page, Error>>
where
    I: Iterator<Item = Result<Page, Error>>,
{
    reader.find(|page| match page {
        Ok(page) => page.is_article(),
        Err(_) => true,
    })
}

impl Iterator for PageReader {
    type Item = Result<Page, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            PageReader::Dump(r) => next_article(r),
            PageReader::GzDump(r) => next_article(r),
            PageReader::Exchange(r) => r.next(),
        }
    }
}

/// Opens a page source. See [PageReader::open].
pub fn open_pages(path: &Path, options: NormalizeOptions) -> Result<PageReader, Error> {
    PageReader::open(path, options)
}
