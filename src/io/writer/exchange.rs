use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::Error;
use crate::page::Page;

/// Borrowed counterpart of [crate::io::ExchangeRecord].
#[derive(Serialize)]
struct ExchangeRecordRef<'a> {
    title: &'a str,
    plaintext: &'a str,
}

/// Writes pages into an exchange file.
///
/// Content is buffered: call [ExchangeWriter::flush] when done.
pub struct ExchangeWriter<W: Write> {
    handle: BufWriter<W>,
    nb_written: u64,
}

impl ExchangeWriter<File> {
    /// Creates (or truncates) the exchange file at `dst`.
    pub fn create(dst: &Path) -> Result<Self, Error> {
        Ok(Self::new(File::create(dst)?))
    }
}

impl<W: Write> ExchangeWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            handle: BufWriter::new(inner),
            nb_written: 0,
        }
    }

    /// Writes the page's title and plaintext.
    pub fn write(&mut self, page: &Page) -> Result<(), Error> {
        let record = ExchangeRecordRef {
            title: page.title(),
            plaintext: page.plaintext(),
        };
        serde_json::to_writer(&mut self.handle, &record)?;
        self.handle.write_all(b"\n")?;
        self.nb_written += 1;
        Ok(())
    }

    /// Number of pages written so far.
    pub fn nb_written(&self) -> u64 {
        self.nb_written
    }

    pub fn flush(&mut self) -> Result<(), Error> {
        Ok(self.handle.flush()?)
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> Result<W, Error> {
        self.handle
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))
    }
}
