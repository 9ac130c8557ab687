//! Term-name tokenization for the word clouds.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::defaults::MIN_WORD_LEN;
use crate::models::{Aspect, GoTerm};

static WORD_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9\-']+").unwrap());

/// Words too generic to say anything about a term set.
static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "and", "the", "for", "with", "from", "via", "into", "onto", "other", "its", "that",
        "this", "than", "not", "all", "any", "are", "but", "has", "was", "who", "which",
        "involved", "process", "processes", "activity", "regulation", "positive", "negative",
        "cellular", "cell", "response", "protein", "complex", "binding", "component",
        "function", "molecular", "biological", "organism", "mediated", "dependent",
        "during", "type", "pathway", "metabolic", "involved", "part",
    ]
    .into_iter()
    .collect()
});

/// Distinct lowercase words of a term name, in first-occurrence order.
///
/// Stopwords, numbers and tokens shorter than three characters are dropped.
pub fn tokenize(name: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    WORD_SPLIT
        .split(name)
        .map(|w| w.trim_matches(|c| c == '-' || c == '\'').to_lowercase())
        .filter(|w| w.chars().count() >= MIN_WORD_LEN)
        .filter(|w| !w.chars().all(|c| c.is_ascii_digit() || c == '-'))
        .filter(|w| !STOPWORDS.contains(w.as_str()))
        .filter(|w| seen.insert(w.clone()))
        .collect()
}

/// Document frequencies of words within one aspect.
#[derive(Debug, Clone, Default)]
pub struct WordCounts {
    /// Number of term names counted.
    pub documents: usize,
    /// Word -> number of names containing it.
    pub words: HashMap<String, usize>,
}

impl WordCounts {
    /// Share of names containing `word`.
    pub fn share(&self, word: &str) -> f64 {
        if self.documents == 0 {
            return 0.0;
        }
        self.words.get(word).copied().unwrap_or(0) as f64 / self.documents as f64
    }
}

/// Background word frequencies over a whole ontology, per aspect.
#[derive(Debug, Clone, Default)]
pub struct WordBackground {
    per_aspect: HashMap<Aspect, WordCounts>,
}

impl WordBackground {
    /// Count words of every non-obsolete term.
    pub fn from_terms<'a>(terms: impl IntoIterator<Item = &'a GoTerm>) -> Self {
        let mut per_aspect: HashMap<Aspect, WordCounts> = HashMap::new();
        for term in terms.into_iter().filter(|t| !t.obsolete) {
            let counts = per_aspect.entry(term.aspect).or_default();
            counts.documents += 1;
            for word in tokenize(&term.name) {
                *counts.words.entry(word).or_insert(0) += 1;
            }
        }
        Self { per_aspect }
    }

    pub fn aspect(&self, aspect: Aspect) -> Option<&WordCounts> {
        self.per_aspect.get(&aspect)
    }

    /// Share of names containing `word` across the given aspects together.
    pub fn share(&self, aspects: &[Aspect], word: &str) -> f64 {
        let (docs, hits) = aspects
            .iter()
            .filter_map(|a| self.per_aspect.get(a))
            .fold((0usize, 0usize), |(d, h), c| {
                (d + c.documents, h + c.words.get(word).copied().unwrap_or(0))
            });
        if docs == 0 {
            0.0
        } else {
            hits as f64 / docs as f64
        }
    }
}
