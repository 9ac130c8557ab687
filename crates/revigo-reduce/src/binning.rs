//! Binning of raw word statistics into the 1..=9 word-cloud size scale.

use revigo_core::defaults::{WORD_SIZE_MAX, WORD_SIZE_MIN};
use revigo_core::WordSize;

/// Transform applied to raw values before binning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Correlations.
    Identity,
    /// Enrichments.
    SquareRoot,
}

impl Transform {
    fn apply(self, value: f64) -> f64 {
        match self {
            Self::Identity => value,
            Self::SquareRoot => value.sqrt(),
        }
    }
}

/// Map `(word, raw value)` entries to integer sizes, keeping input order.
///
/// Entries whose transformed value is not positive are dropped. Single
/// quotes are stripped from words; JSON escaping is left to the writer.
pub fn bin(entries: &[(String, f64)], transform: Transform) -> Vec<WordSize> {
    let transformed: Vec<(&str, f64)> = entries
        .iter()
        .map(|(word, raw)| (word.as_str(), transform.apply(*raw)))
        .filter(|(_, value)| *value > 0.0)
        .collect();

    let mut min = transformed
        .iter()
        .map(|(_, v)| *v)
        .fold(f64::INFINITY, f64::min);
    let mut max = transformed
        .iter()
        .map(|(_, v)| *v)
        .fold(f64::NEG_INFINITY, f64::max);
    if min > max {
        std::mem::swap(&mut min, &mut max);
    }
    if min == max {
        max = min + 1.0;
    }

    let span = f64::from(WORD_SIZE_MAX - WORD_SIZE_MIN);
    transformed
        .into_iter()
        .map(|(word, value)| {
            let scaled = (f64::from(WORD_SIZE_MIN) + ((value - min) * span / (max - min)).round()).ceil();
            WordSize {
                word: word.replace('\'', ""),
                size: scaled.clamp(f64::from(WORD_SIZE_MIN), f64::from(WORD_SIZE_MAX)) as u8,
            }
        })
        .collect()
}
