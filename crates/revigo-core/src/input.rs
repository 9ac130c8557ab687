//! Parsing of the submitted term table.
//!
//! One GO term per line followed by at least one numeric value; columns may
//! be separated by tabs, spaces, commas or semicolons. Lines starting with
//! `%`, `#` or `!` are comments.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

use crate::defaults::MIN_VALUE_COLUMNS;
use crate::error::{Error, Result};
use crate::models::GoTermId;
use crate::ontology::Ontology;

static COLUMN_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s,;]+").unwrap());

/// One accepted row of the submitted table.
#[derive(Debug, Clone, PartialEq)]
pub struct InputRow {
    /// 1-based line in the submitted text.
    pub line: usize,
    /// Primary id (alternate ids already resolved).
    pub term_id: GoTermId,
    pub value: f64,
    /// Exactly `min_num_cols - 1` extra values.
    pub user_values: Vec<f64>,
}

/// Accepted rows plus what was skipped on the way.
#[derive(Debug, Clone, Default)]
pub struct ParsedInput {
    pub rows: Vec<InputRow>,
    /// Smallest number of numeric columns across rows (`MinNumColsPerGoTerm`).
    pub min_num_cols: usize,
    pub warnings: Vec<String>,
}

/// Parse the submitted table against `ontology`.
///
/// Malformed lines fail the whole table. Unknown terms, obsolete terms (when
/// `remove_obsolete` is set) and repeated terms are skipped with a warning.
pub fn parse_term_table(text: &str, ontology: &Ontology, remove_obsolete: bool) -> Result<ParsedInput> {
    let mut raw: Vec<(usize, GoTermId, Vec<f64>)> = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with(['%', '#', '!']) {
            continue;
        }

        let mut columns = COLUMN_SPLIT.split(trimmed).filter(|c| !c.is_empty());
        let id_token = columns.next().unwrap_or_default();
        let term_id: GoTermId = id_token
            .parse()
            .map_err(|e: String| Error::at_line(line_no, e))?;

        let mut values = Vec::new();
        for token in columns {
            let value: f64 = token
                .parse()
                .map_err(|_| Error::at_line(line_no, format!("'{}' is not a number", token)))?;
            if !value.is_finite() {
                return Err(Error::at_line(line_no, format!("'{}' is not a finite number", token)));
            }
            values.push(value);
        }
        if values.len() < MIN_VALUE_COLUMNS {
            return Err(Error::at_line(
                line_no,
                format!("{} has no numeric value", term_id),
            ));
        }
        raw.push((line_no, term_id, values));
    }

    let mut accepted: Vec<(usize, GoTermId, Vec<f64>)> = Vec::with_capacity(raw.len());
    let mut warnings = Vec::new();
    let mut seen = HashSet::new();

    for (line, submitted, values) in raw {
        let Some(term) = ontology.term(submitted) else {
            warnings.push(format!("line {}: {} not found in the ontology, skipped", line, submitted));
            continue;
        };
        if term.id != submitted {
            trace!(submitted = %submitted, primary = %term.id, "Alternate id resolved");
        }
        if term.obsolete && remove_obsolete {
            warnings.push(format!("line {}: {} is obsolete, skipped", line, term.id));
            continue;
        }
        if !seen.insert(term.id) {
            warnings.push(format!("line {}: {} listed more than once, kept first", line, term.id));
            continue;
        }
        accepted.push((line, term.id, values));
    }

    // Skipped rows do not narrow the column count of the kept ones
    let min_num_cols = accepted
        .iter()
        .map(|(_, _, values)| values.len())
        .min()
        .unwrap_or(MIN_VALUE_COLUMNS);

    let rows = accepted
        .into_iter()
        .map(|(line, term_id, mut values)| {
            values.truncate(min_num_cols);
            let user_values = values.split_off(1);
            InputRow {
                line,
                term_id,
                value: values[0],
                user_values,
            }
        })
        .collect();
    let parsed = ParsedInput {
        rows,
        min_num_cols,
        warnings,
    };

    if parsed.rows.is_empty() {
        return Err(Error::InvalidInput(
            "no usable GO terms in the submitted table".to_string(),
        ));
    }

    debug!(
        term_count = parsed.rows.len(),
        min_num_cols,
        skipped = parsed.warnings.len(),
        "Submitted table parsed"
    );
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Aspect, GoTerm};

    fn ontology() -> Ontology {
        let term = |id: u32, obsolete: bool, alt: &[u32]| GoTerm {
            id: GoTermId(id),
            name: format!("term {}", id),
            aspect: Aspect::BiologicalProcess,
            obsolete,
            parents: Vec::new(),
            alt_ids: alt.iter().map(|a| GoTermId(*a)).collect(),
        };
        Ontology::from_terms(vec![
            term(8150, false, &[]),
            term(6950, false, &[1111]),
            term(9999, true, &[]),
        ])
        .unwrap()
    }

    #[test]
    fn test_parse_basic_table() {
        let text = "GO:0008150\t0.001\nGO:0006950 0.05\n";
        let parsed = parse_term_table(text, &ontology(), true).unwrap();
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.min_num_cols, 1);
        assert_eq!(parsed.rows[0].term_id, GoTermId(8150));
        assert_eq!(parsed.rows[0].value, 0.001);
        assert!(parsed.rows[0].user_values.is_empty());
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_parse_skips_comments_and_blank_lines() {
        let text = "% comment\n\n# another\n! bang\n8150, 0.5\n";
        let parsed = parse_term_table(text, &ontology(), true).unwrap();
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rows[0].line, 5);
    }

    #[test]
    fn test_parse_truncates_to_min_columns() {
        let text = "GO:0008150 0.01 1.5 2.5\nGO:0006950;0.02;3.5\n";
        let parsed = parse_term_table(text, &ontology(), true).unwrap();
        assert_eq!(parsed.min_num_cols, 2);
        assert_eq!(parsed.rows[0].user_values, vec![1.5]);
        assert_eq!(parsed.rows[1].user_values, vec![3.5]);
    }

    #[test]
    fn test_parse_rejects_missing_value() {
        let err = parse_term_table("GO:0008150\n", &ontology(), true).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid input: line 1: GO:0008150 has no numeric value"
        );
    }

    #[test]
    fn test_parse_rejects_bad_number() {
        let err = parse_term_table("GO:0008150 abc\n", &ontology(), true).unwrap_err();
        assert!(err.to_string().contains("line 1"));
        assert!(err.to_string().contains("'abc' is not a number"));
        assert!(parse_term_table("GO:0008150 NaN\n", &ontology(), true).is_err());
    }

    #[test]
    fn test_parse_rejects_bad_identifier() {
        let err = parse_term_table("8150 0.1\nGO:xyz 0.1\n", &ontology(), true).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_skipped_rows_do_not_narrow_columns() {
        let text = "GO:0008150\t0.01\t2.5\t3.5\nGO:0000042\t0.5\nGO:0009999 0.2\n";
        let parsed = parse_term_table(text, &ontology(), true).unwrap();
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.min_num_cols, 3);
        assert_eq!(parsed.rows[0].value, 0.01);
        assert_eq!(parsed.rows[0].user_values, vec![2.5, 3.5]);
        assert_eq!(parsed.warnings.len(), 2);
    }

    #[test]
    fn test_parse_skips_unknown_terms_with_warning() {
        let text = "GO:0008150 0.01\nGO:0000042 0.02\n";
        let parsed = parse_term_table(text, &ontology(), true).unwrap();
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.warnings.len(), 1);
        assert!(parsed.warnings[0].contains("GO:0000042 not found"));
    }

    #[test]
    fn test_parse_obsolete_handling() {
        let text = "GO:0008150 0.01\nGO:0009999 0.02\n";
        let removed = parse_term_table(text, &ontology(), true).unwrap();
        assert_eq!(removed.rows.len(), 1);
        assert!(removed.warnings[0].contains("obsolete"));

        let kept = parse_term_table(text, &ontology(), false).unwrap();
        assert_eq!(kept.rows.len(), 2);
        assert!(kept.warnings.is_empty());
    }

    #[test]
    fn test_parse_resolves_alt_ids_and_dedups() {
        let text = "GO:0001111 0.01\nGO:0006950 0.02\n";
        let parsed = parse_term_table(text, &ontology(), true).unwrap();
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rows[0].term_id, GoTermId(6950));
        assert_eq!(parsed.rows[0].value, 0.01);
        assert!(parsed.warnings[0].contains("more than once"));
    }

    #[test]
    fn test_parse_no_usable_terms() {
        let err = parse_term_table("% only comments\n", &ontology(), true).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        let err = parse_term_table("GO:0000042 0.1\n", &ontology(), true).unwrap_err();
        assert!(err.to_string().contains("no usable GO terms"));
    }
}
