//! Exchange file reader.
use std::io::{BufRead, Lines};

use crate::error::Error;
use crate::io::ExchangeRecord;
use crate::page::Page;

/// Reads back pages written by [crate::io::writer::ExchangeWriter].
///
/// Pages carry their plaintext but no raw markup.
pub struct ExchangeReader<R> {
    lines: Lines<R>,
}

impl<R: BufRead> ExchangeReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }
}

impl<R: BufRead> Iterator for ExchangeReader<R> {
    type Item = Result<Page, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            // tolerate blank lines (trailing newline of hand-edited files)
            if line.trim().is_empty() {
                continue;
            }
            return Some(
                serde_json::from_str::<ExchangeRecord>(&line)
                    .map(|record| Page::from_plaintext(record.title, record.plaintext))
                    .map_err(Error::from),
            );
        }
    }
}
