//! Similarity matrix export.

use std::io::Write;

use revigo_core::{AspectResult, Result};

/// Write the aspect's similarity matrix with formatted term ids as the
/// header row and as the first column of every row.
pub fn write_similarity_matrix<W: Write>(writer: &mut W, aspect: &AspectResult) -> Result<()> {
    let matrix = &aspect.similarity;
    if matrix.is_empty() {
        return Ok(());
    }

    for id in matrix.ids() {
        write!(writer, "\t{}", id)?;
    }
    writeln!(writer)?;

    for (i, id) in matrix.ids().iter().enumerate() {
        write!(writer, "{}", id)?;
        for value in matrix.row(i) {
            write!(writer, "\t{}", value)?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::job;
    use revigo_core::Aspect;

    #[test]
    fn test_matrix_layout() {
        let results = job();
        let aspect = results.aspect(Aspect::BiologicalProcess).unwrap();
        let mut out = Vec::new();
        write_similarity_matrix(&mut out, aspect).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "\tGO:0000001\tGO:0000005\tGO:0000009\tGO:0000013");
        assert_eq!(lines[1], "GO:0000001\t1\t0.85\t0.05\t0.3");
        let cells: Vec<&str> = lines[3].split('\t').collect();
        assert_eq!(cells[0], "GO:0000009");
        assert_eq!(cells[3], "1");
    }

    #[test]
    fn test_matrix_single_term() {
        let results = job();
        let aspect = results.aspect(Aspect::CellularComponent).unwrap();
        let mut out = Vec::new();
        write_similarity_matrix(&mut out, aspect).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "\tGO:0000020\nGO:0000020\t1\n");
    }
}
