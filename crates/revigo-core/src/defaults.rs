//! Centralized default constants for revigo.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates and the command-line client reference these constants instead of
//! defining their own magic numbers.

// =============================================================================
// REDUCTION
// =============================================================================

/// Default similarity cutoff (0.7 = "medium" list size).
pub const CUTOFF: f64 = 0.7;

/// Fixed permissive cutoff the treemap view re-reduces with.
pub const TREEMAP_CUTOFF: f64 = 0.10;

/// Smallest number of numeric columns a submitted row must carry.
pub const MIN_VALUE_COLUMNS: usize = 1;

// =============================================================================
// SPECIES
// =============================================================================

/// Taxon selector for the union of all species annotations.
pub const ALL_SPECIES_TAXON: u32 = 0;

// =============================================================================
// JOBS
// =============================================================================

/// Default per-job timeout in seconds (20 minutes).
pub const JOB_TIMEOUT_SECS: u64 = 20 * 60;

/// Extra time given to a job past its deadline before the hard backstop fires.
pub const JOB_TIMEOUT_GRACE_MS: u64 = 2_000;

/// Maximum number of jobs running at once.
pub const JOB_MAX_CONCURRENT: usize = 4;

/// Capacity of the progress event broadcast channel.
pub const EVENT_BUS_CAPACITY: usize = 256;

// =============================================================================
// PROJECTION
// =============================================================================

/// Power-iteration rounds per principal coordinate.
pub const PROJECTION_ITERATIONS: usize = 200;

/// Eigenvalues below this are treated as an absent dimension.
pub const PROJECTION_EPSILON: f64 = 1e-9;

// =============================================================================
// WORD CLOUDS
// =============================================================================

/// Smallest rendered word size.
pub const WORD_SIZE_MIN: u8 = 1;

/// Largest rendered word size.
pub const WORD_SIZE_MAX: u8 = 9;

/// Maximum number of words kept per cloud.
pub const MAX_WORDS: usize = 100;

/// Shortest token kept by the word tokenizer.
pub const MIN_WORD_LEN: usize = 3;

// =============================================================================
// GRAPH EXPORT
// =============================================================================

/// Share of the strongest pairwise similarities drawn as graph edges.
pub const GRAPH_EDGE_FRACTION: f64 = 0.03;
