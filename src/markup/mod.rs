/*! Wiki markup processing.

- [normalize] turns raw markup into approximate plaintext,
- [parse_sections] builds the heading tree of a page.

Both are pure and total: malformed markup never produces an error, at worst some markup is left in the output.
!*/
mod normalizer;
mod sections;

pub use normalizer::{normalize, NormalizeOptions};
pub use sections::{parse_sections, Section};
