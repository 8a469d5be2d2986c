/*! # Wikigrams

Approximate plaintext extraction from MediaWiki markup, and n-gram frequency counting over whole dumps.

- [markup]: markup normalization and section trees.
- [page]: pages and their derived views.
- [tokenizer]: sentence-ish sections, tokens, n-grams.
- [frequency]: frequency stores and the resumable aggregator.
- [io]: dump/exchange readers, exchange/frequency writers.
- [processing]: commands binding everything together.
!*/
pub mod error;
pub mod frequency;
pub mod io;
pub mod markup;
pub mod page;
pub mod processing;
pub mod tokenizer;
