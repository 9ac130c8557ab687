//! TreeMap export.
//!
//! The treemap needs every tile grouped under a parent, so its
//! representative column comes from a second, deliberately permissive
//! reduction at [`TREEMAP_CUTOFF`] over the terms the job kept. That second
//! run only feeds this file and never touches the job's own results.

use std::collections::HashMap;
use std::io::Write;

use tracing::debug;

use revigo_core::defaults::TREEMAP_CUTOFF;
use revigo_core::{AspectResult, JobResults, Ontology, Result};
use revigo_reduce::Reducer;

use crate::table::{term_name, write_user_values};

const WARNING_HEADER: [&str; 4] = [
    "# WARNING: this table exists only to lay out a TreeMap visualization.",
    "# Its representative column comes from a very permissive redundancy cutoff (0.10),",
    "# so it is not a general list of non-redundant GO terms; cutoffs of 0.4 or more are usual.",
    "# Export the Table or Scatterplot instead for a reduced list of GO terms.",
];

/// Write the treemap rows of one aspect.
///
/// Only terms whose dispensability is at most `min(job cutoff, 0.10)` are
/// written. Dispensability and uniqueness are the job's own values.
pub fn write_treemap<W: Write>(
    writer: &mut W,
    ontology: &Ontology,
    results: &JobResults,
    aspect: &AspectResult,
) -> Result<()> {
    let limit = results.cutoff.min(TREEMAP_CUTOFF);
    let kept: Vec<_> = aspect
        .terms
        .iter()
        .filter(|t| t.dispensability <= limit)
        .cloned()
        .collect();
    if kept.is_empty() {
        return Ok(());
    }

    let indices: Vec<usize> = kept
        .iter()
        .filter_map(|t| aspect.similarity.index_of(t.term_id))
        .collect();
    let similarity = aspect.similarity.submatrix(&indices);
    let main_run: HashMap<_, _> = kept
        .iter()
        .map(|t| (t.term_id, (t.uniqueness, t.dispensability)))
        .collect();
    let regrouped = Reducer::new(TREEMAP_CUTOFF, results.value_type).reduce(kept, &similarity)?;
    debug!(
        aspect = aspect.aspect.code(),
        term_count = regrouped.terms.len(),
        cluster_count = regrouped.cluster_count,
        "TreeMap regrouped"
    );

    for line in WARNING_HEADER {
        writeln!(writer, "{}", line)?;
    }
    let user_columns = results.min_num_cols.saturating_sub(1);
    write!(writer, "TermID\tName\tFrequency\tValue\t")?;
    for c in 0..user_columns {
        write!(writer, "UserValue_{}\t", c)?;
    }
    writeln!(writer, "Uniqueness\tDispensability\tRepresentative")?;

    for props in &regrouped.terms {
        let (uniqueness, dispensability) = main_run
            .get(&props.term_id)
            .copied()
            .unwrap_or((props.uniqueness, props.dispensability));
        write!(
            writer,
            "\"{}\"\t\"{}\"\t{}\t{}\t",
            props.term_id,
            term_name(ontology, props),
            props.annotation_frequency * 100.0,
            props.value
        )?;
        write_user_values(writer, props, user_columns)?;
        let representative = props
            .representative
            .and_then(|r| ontology.term(r))
            .map(|t| format!("\"{}\"", t.name))
            .unwrap_or_else(|| "null".to_string());
        writeln!(writer, "{}\t{}\t{}", uniqueness, dispensability, representative)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{job, ontology};
    use revigo_core::Aspect;

    fn render(cutoff: f64) -> String {
        let ontology = ontology();
        let mut results = job();
        results.cutoff = cutoff;
        let aspect = results.aspect(Aspect::BiologicalProcess).unwrap();
        let mut out = Vec::new();
        write_treemap(&mut out, &ontology, &results, aspect).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn rows(text: &str) -> Vec<Vec<&str>> {
        text.lines()
            .filter(|l| !l.starts_with('#'))
            .skip(1)
            .map(|l| l.split('\t').collect())
            .collect()
    }

    #[test]
    fn test_treemap_starts_with_warning_block() {
        let text = render(0.7);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[..4].iter().all(|l| l.starts_with('#')));
        assert_eq!(
            lines[4],
            "TermID\tName\tFrequency\tValue\tUserValue_0\tUniqueness\tDispensability\tRepresentative"
        );
    }

    #[test]
    fn test_treemap_drops_dispensable_terms() {
        let text = render(0.7);
        let rows = rows(&text);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r[0] != "\"GO:0000005\""));
        for row in &rows {
            let dispensability: f64 = row[6].parse().unwrap();
            assert!(dispensability <= 0.10);
        }
    }

    #[test]
    fn test_treemap_groups_with_permissive_cutoff() {
        let text = render(0.7);
        let rows = rows(&text);
        let ids: Vec<&str> = rows.iter().map(|r| r[0]).collect();
        assert_eq!(ids, vec!["\"GO:0000001\"", "\"GO:0000013\"", "\"GO:0000009\""]);
        assert_eq!(rows[0][7], "null");
        assert_eq!(rows[1][7], "\"alpha\"");
        assert_eq!(rows[2][7], "null");
        // Dispensability stays the job's own value
        assert_eq!(rows[1][6], "0");
    }

    #[test]
    fn test_treemap_frequency_column() {
        let text = render(0.7);
        let rows = rows(&text);
        assert_eq!(rows[0][2], "5");
        assert_eq!(rows[0][3], "0.001");
        assert_eq!(rows[0][4], "2.5");
    }

    #[test]
    fn test_treemap_respects_stricter_job_cutoff() {
        let ontology = ontology();
        let mut results = job();
        results.cutoff = 0.05;
        if let Some(bp) = results.aspects.iter_mut().find(|a| a.aspect == Aspect::BiologicalProcess) {
            // A term absorbed with dispensability between the two cutoffs
            bp.terms[3].dispensability = 0.08;
            bp.terms[3].representative = Some(revigo_core::GoTermId(1));
        }
        let aspect = results.aspect(Aspect::BiologicalProcess).unwrap();
        let mut out = Vec::new();
        write_treemap(&mut out, &ontology, &results, aspect).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains("GO:0000009"));
    }

    #[test]
    fn test_treemap_empty_when_nothing_qualifies() {
        let ontology = ontology();
        let mut results = job();
        for aspect in &mut results.aspects {
            for term in &mut aspect.terms {
                term.dispensability = 0.5;
            }
        }
        let aspect = results.aspect(Aspect::BiologicalProcess).unwrap();
        let mut out = Vec::new();
        write_treemap(&mut out, &ontology, &results, aspect).unwrap();
        assert!(out.is_empty());
    }
}
