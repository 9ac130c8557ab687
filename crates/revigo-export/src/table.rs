//! Tab-separated table and scatterplot exports.

use std::io::Write;

use revigo_core::{AspectResult, JobResults, Ontology, Result, TermProperties};

/// Write the reduced term table of one aspect.
///
/// Columns: `TermID Name Value [UserValue_i..] LogSize Frequency Uniqueness
/// Dispensability Representative`, with `null` for terms that are their own
/// representative.
pub fn write_table<W: Write>(
    writer: &mut W,
    ontology: &Ontology,
    results: &JobResults,
    aspect: &AspectResult,
) -> Result<()> {
    write_rows(writer, ontology, results, aspect, false)
}

/// Write the table columns plus the `PC_0 PC_1` projection coordinates.
pub fn write_scatterplot<W: Write>(
    writer: &mut W,
    ontology: &Ontology,
    results: &JobResults,
    aspect: &AspectResult,
) -> Result<()> {
    write_rows(writer, ontology, results, aspect, true)
}

fn write_rows<W: Write>(
    writer: &mut W,
    ontology: &Ontology,
    results: &JobResults,
    aspect: &AspectResult,
    coordinates: bool,
) -> Result<()> {
    if aspect.is_empty() {
        return Ok(());
    }
    let user_columns = results.min_num_cols.saturating_sub(1);

    write!(writer, "TermID\tName\tValue\t")?;
    for c in 0..user_columns {
        write!(writer, "UserValue_{}\t", c)?;
    }
    write!(writer, "LogSize\tFrequency\tUniqueness\tDispensability\tRepresentative")?;
    if coordinates {
        write!(writer, "\tPC_0\tPC_1")?;
    }
    writeln!(writer)?;

    for props in &aspect.terms {
        write!(
            writer,
            "\"{}\"\t\"{}\"\t{}\t",
            props.term_id,
            term_name(ontology, props),
            props.value
        )?;
        write_user_values(writer, props, user_columns)?;
        write!(
            writer,
            "{}\t{}\t{}\t{}\t{}",
            props.log_annotation_size,
            props.annotation_frequency * 100.0,
            props.uniqueness,
            props.dispensability,
            props
                .representative
                .map(|r| r.0.to_string())
                .unwrap_or_else(|| "null".to_string())
        )?;
        if coordinates {
            write!(writer, "\t{}\t{}", or_null(props.pc_0), or_null(props.pc_1))?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Name of the term, or empty when it no longer resolves.
pub(crate) fn term_name<'a>(ontology: &'a Ontology, props: &TermProperties) -> &'a str {
    ontology
        .term(props.term_id)
        .map(|t| t.name.as_str())
        .unwrap_or("")
}

pub(crate) fn write_user_values<W: Write>(
    writer: &mut W,
    props: &TermProperties,
    columns: usize,
) -> Result<()> {
    for c in 0..columns {
        match props.user_values.get(c) {
            Some(v) => write!(writer, "{}\t", v)?,
            None => write!(writer, "null\t")?,
        }
    }
    Ok(())
}

pub(crate) fn or_null(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "null".to_string())
}
