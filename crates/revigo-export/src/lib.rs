//! # revigo-export
//!
//! Read-only renderers for a finished revigo job.
//!
//! This crate provides:
//! - Tab-separated table and scatterplot exports
//! - TreeMap export with its permissive regrouping
//! - Similarity matrix export
//! - XGMML graph export for Cytoscape
//! - Word-cloud JSON export
//!
//! Every writer takes any [`std::io::Write`] and writes nothing for an empty
//! aspect.

pub mod simmat;
pub mod table;
pub mod treemap;
pub mod wordcloud;
pub mod xgmml;

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, info};

use revigo_core::{Aspect, AspectResult, Error, JobResults, Ontology, Result};

pub use simmat::write_similarity_matrix;
pub use table::{write_scatterplot, write_table};
pub use treemap::write_treemap;
pub use wordcloud::write_word_clouds;
pub use xgmml::write_xgmml;

/// One export format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportKind {
    Table,
    Scatterplot,
    TreeMap,
    SimMat,
    Xgmml,
    WordCloud,
}

impl ExportKind {
    pub const ALL: [ExportKind; 6] = [
        ExportKind::Table,
        ExportKind::Scatterplot,
        ExportKind::TreeMap,
        ExportKind::SimMat,
        ExportKind::Xgmml,
        ExportKind::WordCloud,
    ];

    /// Whether the format is written once per aspect rather than per job.
    pub fn is_per_aspect(&self) -> bool {
        !matches!(self, ExportKind::WordCloud)
    }

    /// File name suffix, extension included.
    pub fn file_suffix(&self) -> &'static str {
        match self {
            ExportKind::Table => "Table.tsv",
            ExportKind::Scatterplot => "Scatterplot.tsv",
            ExportKind::TreeMap => "TreeMap.tsv",
            ExportKind::SimMat => "SimilarityMatrix.tsv",
            ExportKind::Xgmml => "Cytoscape.xgmml",
            ExportKind::WordCloud => "WordClouds.json",
        }
    }

    /// `<stem>_<BP|CC|MF>_<suffix>` per aspect, `<stem>_<suffix>` per job.
    pub fn file_name(&self, stem: &str, aspect: Option<Aspect>) -> String {
        match aspect {
            Some(aspect) if self.is_per_aspect() => {
                format!("{}_{}_{}", stem, aspect.code(), self.file_suffix())
            }
            _ => format!("{}_{}", stem, self.file_suffix()),
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportKind::Table => "table",
            ExportKind::Scatterplot => "scatterplot",
            ExportKind::TreeMap => "treemap",
            ExportKind::SimMat => "simmat",
            ExportKind::Xgmml => "xgmml",
            ExportKind::WordCloud => "wordcloud",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ExportKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(ExportKind::Table),
            "scatterplot" | "scatter" => Ok(ExportKind::Scatterplot),
            "treemap" => Ok(ExportKind::TreeMap),
            "simmat" | "matrix" => Ok(ExportKind::SimMat),
            "xgmml" | "graph" | "cytoscape" => Ok(ExportKind::Xgmml),
            "wordcloud" | "wordclouds" => Ok(ExportKind::WordCloud),
            _ => Err(format!("Invalid export kind: {}", s)),
        }
    }
}

/// Render one per-aspect format.
pub fn write_aspect<W: Write>(
    kind: ExportKind,
    writer: &mut W,
    ontology: &Ontology,
    results: &JobResults,
    aspect: &AspectResult,
) -> Result<()> {
    match kind {
        ExportKind::Table => write_table(writer, ontology, results, aspect),
        ExportKind::Scatterplot => write_scatterplot(writer, ontology, results, aspect),
        ExportKind::TreeMap => write_treemap(writer, ontology, results, aspect),
        ExportKind::SimMat => write_similarity_matrix(writer, aspect),
        ExportKind::Xgmml => write_xgmml(writer, ontology, aspect),
        ExportKind::WordCloud => Err(Error::Export(
            "word clouds are exported once per job, not per aspect".to_string(),
        )),
    }
}

/// Write every requested format of a job into `dir`, named after `stem`.
///
/// Empty aspects, and a job without any word-cloud entries, produce no file.
/// Returns the paths written.
pub fn write_files(
    dir: &Path,
    stem: &str,
    ontology: &Ontology,
    results: &JobResults,
    kinds: &[ExportKind],
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for &kind in kinds {
        if !kind.is_per_aspect() {
            if results.enrichments.is_empty() && results.correlations.is_empty() {
                debug!(job_id = results.job_id, %kind, "Nothing to export");
                continue;
            }
            let path = dir.join(kind.file_name(stem, None));
            let mut writer = BufWriter::new(File::create(&path)?);
            write_word_clouds(&mut writer, results)?;
            writer.flush()?;
            written.push(path);
            continue;
        }
        for aspect in results.aspects.iter().filter(|a| !a.is_empty()) {
            let mut buffer = Vec::new();
            write_aspect(kind, &mut buffer, ontology, results, aspect)?;
            if buffer.is_empty() {
                debug!(job_id = results.job_id, %kind, aspect = aspect.aspect.code(), "Nothing to export");
                continue;
            }
            let path = dir.join(kind.file_name(stem, Some(aspect.aspect)));
            std::fs::write(&path, &buffer)?;
            written.push(path);
        }
    }
    info!(
        job_id = results.job_id,
        files = written.len(),
        dir = %dir.display(),
        "Export written"
    );
    Ok(written)
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Hand-built job shared by the exporter tests.

    use revigo_core::{
        Aspect, AspectResult, GoTerm, GoTermId, JobResults, Ontology, SimilarityMatrix,
        SimilarityMeasure, TermProperties, TermStats, ValueType, WordSize,
    };

    fn go(id: u32, name: &str, aspect: Aspect) -> GoTerm {
        GoTerm {
            id: GoTermId(id),
            name: name.to_string(),
            aspect,
            obsolete: false,
            parents: Vec::new(),
            alt_ids: Vec::new(),
        }
    }

    pub fn ontology() -> Ontology {
        Ontology::from_terms(vec![
            go(1, "alpha", Aspect::BiologicalProcess),
            go(5, "beta", Aspect::BiologicalProcess),
            go(9, "gamma", Aspect::BiologicalProcess),
            go(13, "epsilon", Aspect::BiologicalProcess),
            go(20, "delta", Aspect::CellularComponent),
        ])
        .unwrap()
    }

    #[allow(clippy::too_many_arguments)]
    fn props(
        id: u32,
        value: f64,
        user: f64,
        frequency: f64,
        uniqueness: f64,
        dispensability: f64,
        representative: Option<u32>,
        pc: (Option<f64>, Option<f64>),
    ) -> TermProperties {
        let mut p = TermProperties::new(
            GoTermId(id),
            value,
            vec![user],
            TermStats {
                log_annotation_size: 1.5,
                annotation_frequency: frequency,
            },
        );
        p.uniqueness = uniqueness;
        p.dispensability = dispensability;
        p.representative = representative.map(GoTermId);
        p.pc_0 = pc.0;
        p.pc_1 = pc.1;
        p
    }

    /// BP: 1 absorbs 5 at 0.85; 13 and 9 are singletons. 13 is 0.3 similar
    /// to 1, enough for the permissive treemap grouping. CC: one term.
    pub fn job() -> JobResults {
        let bp_ids: Vec<GoTermId> = [1, 5, 9, 13].into_iter().map(GoTermId).collect();
        let bp_similarity = SimilarityMatrix::from_fn(bp_ids, |i, j| match (i, j) {
            (0, 1) => 0.85,
            (0, 2) => 0.05,
            (0, 3) => 0.3,
            (1, 2) => 0.08,
            (1, 3) => 0.1,
            _ => 0.02,
        });
        let bp = AspectResult {
            aspect: Aspect::BiologicalProcess,
            terms: vec![
                props(1, 0.001, 2.5, 0.05, 0.4, 0.0, None, (Some(0.5), Some(-0.25))),
                props(5, 0.01, 1.0, 0.02, 0.5, 0.85, Some(1), (Some(0.45), Some(-0.2))),
                props(13, 0.05, 0.7, 0.03, 0.8, 0.0, None, (Some(-0.3), Some(0.2))),
                props(9, 0.2, 0.5, 0.1, 0.9, 0.0, None, (Some(0.1), None)),
            ],
            similarity: bp_similarity,
            complete: true,
        };
        let cc = AspectResult {
            aspect: Aspect::CellularComponent,
            terms: vec![props(20, 0.03, 1.0, 0.2, 1.0, 0.0, None, (Some(0.0), None))],
            similarity: SimilarityMatrix::identity(vec![GoTermId(20)]),
            complete: true,
        };
        JobResults {
            job_id: 1,
            cutoff: 0.7,
            value_type: ValueType::PValue,
            measure: SimilarityMeasure::SimRel,
            min_num_cols: 2,
            aspects: vec![bp, cc],
            enrichments: vec![
                WordSize {
                    word: "alpha".to_string(),
                    size: 9,
                },
                WordSize {
                    word: "gamma".to_string(),
                    size: 1,
                },
            ],
            correlations: vec![WordSize {
                word: "alpha".to_string(),
                size: 4,
            }],
            warnings: Vec::new(),
            complete: true,
        }
    }
}
