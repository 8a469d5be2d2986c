/*! Result writing.

- [ExchangeWriter] writes pages as JSON Lines (see [crate::io::ExchangeRecord]).
- [write_frequencies] writes a `term<TAB>count` frequency list.
!*/
mod exchange;
mod frequencies;

pub use exchange::ExchangeWriter;
pub use frequencies::write_frequencies;
