/*!
# IO utilities

Page reading (XML dumps, exchange files) and result writing (exchange files, frequency lists).

The exchange format is JSON Lines, one [ExchangeRecord] per line:

```json
{"title":"Anarchism","plaintext":"Anarchism is a political philosophy."}
```
!*/
pub mod reader;
pub mod writer;

use serde::{Deserialize, Serialize};

pub use reader::{open_pages, PageReader, SourceKind};
pub use writer::{write_frequencies, ExchangeWriter};

/// A page, as stored in exchange files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRecord {
    pub title: String,
    pub plaintext: String,
}
