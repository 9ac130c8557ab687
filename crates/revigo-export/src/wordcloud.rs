//! Word-cloud JSON export.

use std::io::Write;

use serde::Serialize;

use revigo_core::{JobResults, Result, WordSize};

#[derive(Debug, Serialize)]
struct WordCloudDocument<'a> {
    #[serde(rename = "Enrichments", skip_serializing_if = "is_empty")]
    enrichments: &'a [WordSize],
    #[serde(rename = "Correlations", skip_serializing_if = "is_empty")]
    correlations: &'a [WordSize],
}

fn is_empty(words: &&[WordSize]) -> bool {
    words.is_empty()
}

/// Write `{"Enrichments": [...], "Correlations": [...]}`; an empty list is
/// left out.
pub fn write_word_clouds<W: Write>(writer: &mut W, results: &JobResults) -> Result<()> {
    let document = WordCloudDocument {
        enrichments: &results.enrichments,
        correlations: &results.correlations,
    };
    serde_json::to_writer(&mut *writer, &document)?;
    writeln!(writer)?;
    Ok(())
}
