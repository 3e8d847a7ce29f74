//! The loaded dataset and the projection currently on screen.

use std::cmp::{Ordering, Reverse};

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::config::SortMode;
use crate::normalize::ExtractedQuestion;

/// Choices offered by the result-limit selector; 0 means no limit.
pub const LIMIT_CHOICES: [usize; 5] = [0, 10, 25, 50, 100];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalQuestion {
    /// 1-based position in the loaded dataset. Never reassigned.
    pub index: usize,
    pub question: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchControls {
    pub query: String,
    pub sort: SortMode,
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Controls {
    Search(SearchControls),
    /// Keep records whose index is strictly greater than this.
    Threshold(usize),
}

impl Default for Controls {
    fn default() -> Self {
        Controls::Search(SearchControls::default())
    }
}

#[derive(Debug, Default)]
pub struct ViewState {
    dataset: Vec<CanonicalQuestion>,
    /// Positions into `dataset`, in display order.
    projection: Vec<usize>,
    controls: Controls,
}

impl ViewState {
    pub fn new(controls: Controls) -> Self {
        Self {
            dataset: Vec::new(),
            projection: Vec::new(),
            controls,
        }
    }

    /// Replaces the dataset wholesale and recomputes the projection
    /// against the controls currently in effect.
    pub fn load_dataset(&mut self, records: Vec<ExtractedQuestion>) {
        self.dataset = records
            .into_iter()
            .enumerate()
            .map(|(pos, r)| CanonicalQuestion {
                index: pos + 1,
                question: r.question,
                image: r.image,
            })
            .collect();
        self.projection = (0..self.dataset.len()).collect();
        self.recompute();
    }

    pub fn update_controls(&mut self, controls: Controls) {
        self.controls = controls;
        self.recompute();
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    pub fn dataset(&self) -> &[CanonicalQuestion] {
        &self.dataset
    }

    pub fn projection(&self) -> Vec<&CanonicalQuestion> {
        self.projection.iter().map(|&i| &self.dataset[i]).collect()
    }

    pub fn projection_len(&self) -> usize {
        self.projection.len()
    }

    fn recompute(&mut self) {
        let data = &self.dataset;
        let mut rows: Vec<usize> = (0..data.len()).collect();
        match &self.controls {
            Controls::Search(c) => {
                let query = c.query.trim().to_lowercase();
                if !query.is_empty() {
                    rows.retain(|&i| data[i].question.to_lowercase().contains(&query));
                }
                match c.sort {
                    SortMode::Original => {}
                    SortMode::Asc => {
                        rows.sort_by_cached_key(|&i| (collation_key(&data[i].question), data[i].index))
                    }
                    SortMode::Desc => rows.sort_by_cached_key(|&i| {
                        Reverse((collation_key(&data[i].question), data[i].index))
                    }),
                }
                if c.limit > 0 {
                    rows.truncate(c.limit);
                }
            }
            Controls::Threshold(t) => rows.retain(|&i| data[i].index > *t),
        }
        tracing::debug!(
            total = data.len(),
            shown = rows.len(),
            "projection recomputed"
        );
        self.projection = rows;
    }
}

/// Sort key approximating a browser's `localeCompare` for Latin text.
///
/// Levels, in order: base letters with accents and case removed
/// (punctuation < digits < letters), then accents, then lowercase before
/// uppercase.
pub type CollationKey = (Vec<(u8, char)>, String, Reverse<String>);

pub fn collation_key(s: &str) -> CollationKey {
    let decomposed: String = s.nfd().flat_map(char::to_lowercase).collect();
    let base = decomposed
        .chars()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| {
            let class = if c.is_alphabetic() {
                2
            } else if c.is_numeric() {
                1
            } else {
                0
            };
            (class, c)
        })
        .collect();
    (base, decomposed, Reverse(s.to_string()))
}

pub fn collate(a: &str, b: &str) -> Ordering {
    collation_key(a).cmp(&collation_key(b))
}
