//! Core data models for revigo.
//!
//! These types are shared across all revigo crates and represent the GO
//! terms, per-term statistics, and finished job results.

use serde::{Deserialize, Serialize};

use crate::similarity::SimilarityMatrix;

// =============================================================================
// TERM TYPES
// =============================================================================

/// Numeric GO term identifier (`GO:0008150` is `GoTermId(8150)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoTermId(pub u32);

impl GoTermId {
    /// Display form used in every export, e.g. `GO:0008150`.
    pub fn formatted(&self) -> String {
        format!("GO:{:07}", self.0)
    }
}

impl std::fmt::Display for GoTermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GO:{:07}", self.0)
    }
}

impl std::str::FromStr for GoTermId {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("GO:")
            .or_else(|| trimmed.strip_prefix("go:"))
            .unwrap_or(trimmed);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("Invalid GO term identifier: {}", s));
        }
        digits
            .parse::<u32>()
            .map(GoTermId)
            .map_err(|_| format!("Invalid GO term identifier: {}", s))
    }
}

/// One of the three GO sub-ontologies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aspect {
    BiologicalProcess,
    CellularComponent,
    MolecularFunction,
}

impl Aspect {
    /// All aspects in export order.
    pub const ALL: [Aspect; 3] = [
        Aspect::BiologicalProcess,
        Aspect::CellularComponent,
        Aspect::MolecularFunction,
    ];

    /// Two-letter code used in file names and log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BiologicalProcess => "BP",
            Self::CellularComponent => "CC",
            Self::MolecularFunction => "MF",
        }
    }
}

impl std::fmt::Display for Aspect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BiologicalProcess => write!(f, "biological_process"),
            Self::CellularComponent => write!(f, "cellular_component"),
            Self::MolecularFunction => write!(f, "molecular_function"),
        }
    }
}

impl std::str::FromStr for Aspect {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "biological_process" | "bp" | "p" => Ok(Self::BiologicalProcess),
            "cellular_component" | "cc" | "c" => Ok(Self::CellularComponent),
            "molecular_function" | "mf" | "f" => Ok(Self::MolecularFunction),
            _ => Err(format!("Invalid aspect: {}", s)),
        }
    }
}

/// A GO term as loaded from an ontology snapshot. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoTerm {
    pub id: GoTermId,
    pub name: String,
    pub aspect: Aspect,
    #[serde(default)]
    pub obsolete: bool,
    /// Direct `is_a` / `part_of` parents.
    #[serde(default)]
    pub parents: Vec<GoTermId>,
    /// Secondary identifiers merged into this term.
    #[serde(default)]
    pub alt_ids: Vec<GoTermId>,
}

impl GoTerm {
    pub fn formatted_id(&self) -> String {
        self.id.formatted()
    }
}

// =============================================================================
// JOB PARAMETERS
// =============================================================================

/// Whether smaller or larger primary values are more significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueDirection {
    LowerIsBetter,
    HigherIsBetter,
}

/// How the primary value column of the submitted table is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// Enrichment p-values; smaller is more significant
    #[default]
    PValue,
    /// Arbitrary score where larger is better
    HigherIsBetter,
    /// Arbitrary score where smaller is better
    LowerIsBetter,
    /// Magnitude matters, sign does not
    HigherAbsolute,
    /// Fold changes; magnitude of the log2 ratio matters
    HigherAbsLog2,
}

impl ValueType {
    pub fn direction(&self) -> ValueDirection {
        match self {
            Self::PValue | Self::LowerIsBetter => ValueDirection::LowerIsBetter,
            Self::HigherIsBetter | Self::HigherAbsolute | Self::HigherAbsLog2 => {
                ValueDirection::HigherIsBetter
            }
        }
    }

    /// Key the priority ordering compares, in the type's own direction.
    ///
    /// Non-positive fold changes have no log2 and rank last.
    pub fn priority_key(&self, value: f64) -> f64 {
        match self {
            Self::PValue | Self::LowerIsBetter | Self::HigherIsBetter => value,
            Self::HigherAbsolute => value.abs(),
            Self::HigherAbsLog2 => {
                if value > 0.0 {
                    value.log2().abs()
                } else {
                    f64::NEG_INFINITY
                }
            }
        }
    }

    /// Score oriented so that larger always means more significant.
    pub fn oriented_score(&self, value: f64) -> f64 {
        match self {
            Self::PValue => {
                if value > 0.0 {
                    -value.log10()
                } else {
                    // p = 0 is as significant as a double can express
                    -f64::MIN_POSITIVE.log10()
                }
            }
            Self::LowerIsBetter => -value,
            Self::HigherIsBetter | Self::HigherAbsolute | Self::HigherAbsLog2 => {
                let key = self.priority_key(value);
                if key.is_finite() {
                    key
                } else {
                    0.0
                }
            }
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PValue => write!(f, "p-value"),
            Self::HigherIsBetter => write!(f, "higher"),
            Self::LowerIsBetter => write!(f, "lower"),
            Self::HigherAbsolute => write!(f, "higher-absolute"),
            Self::HigherAbsLog2 => write!(f, "higher-abs-log2"),
        }
    }
}

impl std::str::FromStr for ValueType {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "p-value" | "pvalue" => Ok(Self::PValue),
            "higher" => Ok(Self::HigherIsBetter),
            "lower" => Ok(Self::LowerIsBetter),
            "higher-absolute" => Ok(Self::HigherAbsolute),
            "higher-abs-log2" => Ok(Self::HigherAbsLog2),
            _ => Err(format!("Invalid value type: {}", s)),
        }
    }
}

/// Semantic similarity measure the Similarity Provider evaluates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimilarityMeasure {
    #[default]
    SimRel,
    Lin,
    Resnik,
    Jiang,
}

impl std::fmt::Display for SimilarityMeasure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SimRel => write!(f, "SimRel"),
            Self::Lin => write!(f, "Lin"),
            Self::Resnik => write!(f, "Resnik"),
            Self::Jiang => write!(f, "Jiang"),
        }
    }
}

impl std::str::FromStr for SimilarityMeasure {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "simrel" => Ok(Self::SimRel),
            "lin" => Ok(Self::Lin),
            "resnik" => Ok(Self::Resnik),
            "jiang" => Ok(Self::Jiang),
            _ => Err(format!("Invalid similarity measure: {}", s)),
        }
    }
}

// =============================================================================
// PER-TERM RESULTS
// =============================================================================

/// Annotation statistics the Similarity Provider reports per term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TermStats {
    /// `log10(1 + annotation count)`
    pub log_annotation_size: f64,
    /// Fraction of the annotated genome, 0..1
    pub annotation_frequency: f64,
}

/// Statistics for one submitted term within one job.
///
/// Populated once by the reducer, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermProperties {
    pub term_id: GoTermId,
    /// Primary value (first numeric column).
    pub value: f64,
    /// Remaining numeric columns, `MinNumColsPerGoTerm - 1` of them.
    pub user_values: Vec<f64>,
    pub log_annotation_size: f64,
    pub annotation_frequency: f64,
    pub uniqueness: f64,
    pub dispensability: f64,
    /// Term that subsumes this one; `None` for representatives and singletons.
    pub representative: Option<GoTermId>,
    pub pc_0: Option<f64>,
    pub pc_1: Option<f64>,
}

impl TermProperties {
    /// Fresh properties before reduction.
    pub fn new(term_id: GoTermId, value: f64, user_values: Vec<f64>, stats: TermStats) -> Self {
        Self {
            term_id,
            value,
            user_values,
            log_annotation_size: stats.log_annotation_size,
            annotation_frequency: stats.annotation_frequency,
            uniqueness: 1.0,
            dispensability: 0.0,
            representative: None,
            pc_0: None,
            pc_1: None,
        }
    }

    pub fn is_representative(&self) -> bool {
        self.representative.is_none()
    }
}

/// A word with its rendered cloud size (1..=9).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordSize {
    #[serde(rename = "Word")]
    pub word: String,
    #[serde(rename = "Size")]
    pub size: u8,
}

// =============================================================================
// JOB RESULTS
// =============================================================================

/// Lifecycle state of a reduction job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Created,
    Running,
    Finished,
    TimedOut,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::TimedOut | Self::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Running => write!(f, "running"),
            Self::Finished => write!(f, "finished"),
            Self::TimedOut => write!(f, "timed_out"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Reduced term set of one aspect.
#[derive(Debug, Clone)]
pub struct AspectResult {
    pub aspect: Aspect,
    /// Cluster-sorted: representatives, each followed by its members, then singletons.
    pub terms: Vec<TermProperties>,
    /// Similarity between the aspect's terms, in submission order.
    pub similarity: SimilarityMatrix,
    /// False when the deadline cut clustering short.
    pub complete: bool,
}

impl AspectResult {
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Properties of one term of this aspect.
    pub fn properties(&self, id: GoTermId) -> Option<&TermProperties> {
        self.terms.iter().find(|p| p.term_id == id)
    }
}

/// Everything a finished (or timed-out) job produced.
#[derive(Debug, Clone)]
pub struct JobResults {
    pub job_id: u32,
    pub cutoff: f64,
    pub value_type: ValueType,
    pub measure: SimilarityMeasure,
    /// Numeric columns per submitted row (primary value included).
    pub min_num_cols: usize,
    /// One entry per aspect with at least one submitted term.
    pub aspects: Vec<AspectResult>,
    pub enrichments: Vec<WordSize>,
    pub correlations: Vec<WordSize>,
    /// Skipped rows and other recoverable issues.
    pub warnings: Vec<String>,
    /// False when the job hit its deadline.
    pub complete: bool,
}

impl JobResults {
    pub fn aspect(&self, aspect: Aspect) -> Option<&AspectResult> {
        self.aspects.iter().find(|a| a.aspect == aspect)
    }

    /// Properties of a term in any aspect.
    pub fn properties(&self, id: GoTermId) -> Option<&TermProperties> {
        self.aspects.iter().find_map(|a| a.properties(id))
    }

    pub fn term_count(&self) -> usize {
        self.aspects.iter().map(AspectResult::len).sum()
    }
}
