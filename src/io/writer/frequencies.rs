use std::io::Write;

use crate::error::Error;

/// Writes one `term<TAB>count` line per entry, in the provided order.
///
/// Terms never contain whitespace (see [crate::tokenizer::tokens]) except for the n-gram separator,
/// so the output stays unambiguous.
pub fn write_frequencies<W: Write>(writer: &mut W, entries: &[(String, u64)]) -> Result<(), Error> {
    for (term, count) in entries {
        writeln!(writer, "{}\t{}", term, count)?;
    }
    writer.flush()?;
    Ok(())
}
