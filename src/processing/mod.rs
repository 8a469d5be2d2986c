/*! Commands

Each command binds page sources ([crate::io::reader]) to a processing step and an output:

- [ngrams::NGramCounting] counts n-grams into a frequency store and writes the frequency list.
- [extract::Extraction] writes (filtered) pages into an exchange file.
- [extract::ArticleLookup] writes a single page, looked up by title.
!*/
pub mod extract;
pub mod ngrams;

pub use extract::{ArticleLookup, Extraction, PageFilter};
pub use ngrams::NGramCounting;
