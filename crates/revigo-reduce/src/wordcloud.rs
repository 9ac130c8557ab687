//! Word statistics behind the enrichment and correlation clouds.

use std::collections::HashMap;

use tracing::debug;

use revigo_core::defaults::MAX_WORDS;
use revigo_core::{Aspect, AspectResult, Ontology, TermProperties, ValueType, WordSize};

use crate::binning::{bin, Transform};
use crate::reducer::priority_cmp;

/// Both binned word lists of one job.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordClouds {
    pub enrichments: Vec<WordSize>,
    pub correlations: Vec<WordSize>,
}

#[derive(Debug, Default)]
struct WordTally {
    terms: usize,
    score_sum: f64,
}

/// Build the clouds from every submitted term of the job.
///
/// Enrichment is a word's share of submitted names over its share of the
/// ontology's names for the same aspects. Correlation is the mean oriented
/// score of terms whose names carry the word minus the mean over all terms.
pub fn word_clouds(ontology: &Ontology, aspects: &[AspectResult], value_type: ValueType) -> WordClouds {
    let mut terms: Vec<&TermProperties> = aspects.iter().flat_map(|a| a.terms.iter()).collect();
    if terms.is_empty() {
        return WordClouds::default();
    }
    terms.sort_by(|a, b| priority_cmp(a, b, value_type));

    let mut order: Vec<String> = Vec::new();
    let mut tallies: HashMap<String, WordTally> = HashMap::new();
    let mut total_score = 0.0;
    for props in &terms {
        let score = value_type.oriented_score(props.value);
        total_score += score;
        let Some(term) = ontology.term(props.term_id) else {
            continue;
        };
        for word in revigo_core::tokenize(&term.name) {
            let tally = tallies.entry(word.clone()).or_insert_with(|| {
                order.push(word);
                WordTally::default()
            });
            tally.terms += 1;
            tally.score_sum += score;
        }
    }

    let n = terms.len() as f64;
    let present: Vec<Aspect> = aspects.iter().map(|a| a.aspect).collect();
    let background = ontology.word_background();
    let background_docs: usize = present
        .iter()
        .filter_map(|a| background.aspect(*a))
        .map(|c| c.documents)
        .sum();
    let floor = 1.0 / (background_docs + 1) as f64;

    let enrichment_raw: Vec<(String, f64)> = order
        .iter()
        .map(|word| {
            let observed = tallies[word].terms as f64 / n;
            let expected = background.share(&present, word).max(floor);
            (word.clone(), observed / expected)
        })
        .collect();

    let correlation_raw: Vec<(String, f64)> = if terms.len() < 2 {
        Vec::new()
    } else {
        let overall = total_score / n;
        order
            .iter()
            .map(|word| {
                let tally = &tallies[word];
                (word.clone(), tally.score_sum / tally.terms as f64 - overall)
            })
            .collect()
    };

    let clouds = WordClouds {
        enrichments: bin(&strongest(enrichment_raw, MAX_WORDS), Transform::SquareRoot),
        correlations: bin(&strongest(correlation_raw, MAX_WORDS), Transform::Identity),
    };
    debug!(
        word_count = order.len(),
        enrichments = clouds.enrichments.len(),
        correlations = clouds.correlations.len(),
        "Word clouds computed"
    );
    clouds
}

/// Keep the `limit` largest entries without disturbing their order.
fn strongest(entries: Vec<(String, f64)>, limit: usize) -> Vec<(String, f64)> {
    if entries.len() <= limit {
        return entries;
    }
    let mut ranked: Vec<usize> = (0..entries.len()).collect();
    ranked.sort_by(|&a, &b| entries[b].1.total_cmp(&entries[a].1).then(a.cmp(&b)));
    let mut keep = vec![false; entries.len()];
    for &i in ranked.iter().take(limit) {
        keep[i] = true;
    }
    entries
        .into_iter()
        .zip(keep)
        .filter_map(|(entry, kept)| kept.then_some(entry))
        .collect()
}
