//! Ontology and species-annotation snapshots.
//!
//! Both are loaded once from JSON, then shared read-only (behind an `Arc`)
//! by every concurrently running job.

use std::collections::{HashMap, HashSet, VecDeque};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::defaults::ALL_SPECIES_TAXON;
use crate::error::{Error, Result};
use crate::models::{Aspect, GoTerm, GoTermId};
use crate::words::WordBackground;

// =============================================================================
// ONTOLOGY
// =============================================================================

/// Persisted form of an ontology.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OntologySnapshot {
    /// Release tag, e.g. `"2023-01-01"`.
    #[serde(default)]
    pub version: Option<String>,
    pub terms: Vec<GoTerm>,
}

/// Immutable GO term lookup.
#[derive(Debug)]
pub struct Ontology {
    version: Option<String>,
    terms: HashMap<GoTermId, GoTerm>,
    /// Secondary id -> primary id.
    alt_index: HashMap<GoTermId, GoTermId>,
    word_background: OnceCell<WordBackground>,
}

impl Ontology {
    /// Build from a snapshot. Duplicate primary ids are an error; dangling
    /// parent links are dropped with a warning.
    pub fn from_snapshot(snapshot: OntologySnapshot) -> Result<Self> {
        let mut terms: HashMap<GoTermId, GoTerm> = HashMap::with_capacity(snapshot.terms.len());
        for term in snapshot.terms {
            if terms.contains_key(&term.id) {
                return Err(Error::Ontology(format!("duplicate term {}", term.id)));
            }
            terms.insert(term.id, term);
        }

        let known: HashSet<GoTermId> = terms.keys().copied().collect();
        let mut dangling = 0usize;
        for term in terms.values_mut() {
            let before = term.parents.len();
            term.parents.retain(|p| known.contains(p));
            dangling += before - term.parents.len();
        }
        if dangling > 0 {
            warn!(dangling, "Dropped parent links to unknown terms");
        }

        let mut alt_index = HashMap::new();
        for term in terms.values() {
            for alt in &term.alt_ids {
                if *alt != term.id && !terms.contains_key(alt) {
                    alt_index.insert(*alt, term.id);
                }
            }
        }

        debug!(
            term_count = terms.len(),
            alt_count = alt_index.len(),
            "Ontology indexed"
        );

        Ok(Self {
            version: snapshot.version,
            terms,
            alt_index,
            word_background: OnceCell::new(),
        })
    }

    pub fn from_terms(terms: Vec<GoTerm>) -> Result<Self> {
        Self::from_snapshot(OntologySnapshot {
            version: None,
            terms,
        })
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let snapshot: OntologySnapshot = serde_json::from_reader(reader)?;
        Self::from_snapshot(snapshot)
    }

    /// Load a JSON snapshot from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let ontology = Self::from_json_reader(std::io::BufReader::new(file))?;
        info!(
            path = %path.display(),
            term_count = ontology.len(),
            version = ontology.version.as_deref().unwrap_or("unknown"),
            "Ontology loaded"
        );
        Ok(ontology)
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Primary id for `id`, following alternate ids.
    pub fn resolve(&self, id: GoTermId) -> Option<GoTermId> {
        if self.terms.contains_key(&id) {
            Some(id)
        } else {
            self.alt_index.get(&id).copied()
        }
    }

    /// Term by primary or alternate id.
    pub fn term(&self, id: GoTermId) -> Option<&GoTerm> {
        self.resolve(id).and_then(|primary| self.terms.get(&primary))
    }

    pub fn terms(&self) -> impl Iterator<Item = &GoTerm> {
        self.terms.values()
    }

    /// `id` together with every term reachable through parent links.
    pub fn ancestors(&self, id: GoTermId) -> HashSet<GoTermId> {
        let mut seen = HashSet::new();
        let Some(start) = self.resolve(id) else {
            return seen;
        };
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            if let Some(term) = self.terms.get(&current) {
                queue.extend(term.parents.iter().copied());
            }
        }
        seen
    }

    /// Word document frequencies over all non-obsolete term names, computed on
    /// first use and shared afterwards.
    pub fn word_background(&self) -> &WordBackground {
        self.word_background
            .get_or_init(|| WordBackground::from_terms(self.terms.values()))
    }
}

// =============================================================================
// ANNOTATIONS
// =============================================================================

/// Cumulative annotation counts of one species.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeciesAnnotations {
    pub taxon: u32,
    pub name: String,
    /// Annotations per term, already propagated up the ontology.
    #[serde(default)]
    pub counts: HashMap<GoTermId, u64>,
}

impl SpeciesAnnotations {
    pub fn count(&self, id: GoTermId) -> u64 {
        self.counts.get(&id).copied().unwrap_or(0)
    }

    /// Annotations of the aspect as a whole (the root term's count).
    pub fn aspect_total(&self, ontology: &Ontology, aspect: Aspect) -> u64 {
        self.counts
            .iter()
            .filter(|(id, _)| ontology.term(**id).is_some_and(|t| t.aspect == aspect))
            .map(|(_, count)| *count)
            .max()
            .unwrap_or(0)
    }
}

/// Persisted form of the annotation store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnotationSnapshot {
    pub species: Vec<SpeciesAnnotations>,
}

/// All species annotation sets, looked up by NCBI taxon.
#[derive(Debug, Default)]
pub struct AnnotationSet {
    species: Vec<Arc<SpeciesAnnotations>>,
    union: OnceCell<Arc<SpeciesAnnotations>>,
}

impl AnnotationSet {
    pub fn new(species: Vec<SpeciesAnnotations>) -> Self {
        Self {
            species: species.into_iter().map(Arc::new).collect(),
            union: OnceCell::new(),
        }
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let snapshot: AnnotationSnapshot = serde_json::from_reader(reader)?;
        Ok(Self::new(snapshot.species))
    }

    /// Load a JSON snapshot from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let set = Self::from_json_reader(std::io::BufReader::new(file))?;
        info!(
            path = %path.display(),
            species_count = set.species.len(),
            "Species annotations loaded"
        );
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    /// Annotations of one species; taxon 0 is the all-species union.
    pub fn get_by_taxon(&self, taxon: u32) -> Result<Arc<SpeciesAnnotations>> {
        if let Some(found) = self.species.iter().find(|s| s.taxon == taxon) {
            return Ok(found.clone());
        }
        if taxon == ALL_SPECIES_TAXON && !self.species.is_empty() {
            return Ok(self.union.get_or_init(|| self.build_union()).clone());
        }
        Err(Error::UnknownTaxon(taxon))
    }

    fn build_union(&self) -> Arc<SpeciesAnnotations> {
        let mut counts: HashMap<GoTermId, u64> = HashMap::new();
        for species in &self.species {
            for (id, count) in &species.counts {
                *counts.entry(*id).or_insert(0) += count;
            }
        }
        debug!(
            species_count = self.species.len(),
            term_count = counts.len(),
            "Built all-species annotation union"
        );
        Arc::new(SpeciesAnnotations {
            taxon: ALL_SPECIES_TAXON,
            name: "All species".to_string(),
            counts,
        })
    }
}
