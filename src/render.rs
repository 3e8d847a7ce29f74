//! Turns a projection into display rows and hands them to a target.
//!
//! Every call replaces the target's content in full.

use crate::config::Variant;
use crate::view::CanonicalQuestion;

pub const EMPTY_MESSAGE: &str = "No questions match your search yet.";
/// Shown in the image slot of gallery rows that carry no image.
pub const NO_IMAGE_GLYPH: &str = "∅";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageCell {
    Reference(String),
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayRow {
    /// Stands in for an empty projection.
    Empty(String),
    Question {
        index: usize,
        label: String,
        text: String,
        /// Only populated for the gallery variant.
        image: Option<ImageCell>,
    },
}

/// Anything that can show a list of rows.
pub trait RenderTarget {
    fn replace_rows(&mut self, rows: Vec<DisplayRow>);
}

pub fn build_rows(projection: &[&CanonicalQuestion], variant: Variant) -> Vec<DisplayRow> {
    if projection.is_empty() {
        return vec![DisplayRow::Empty(EMPTY_MESSAGE.into())];
    }
    projection
        .iter()
        .map(|q| DisplayRow::Question {
            index: q.index,
            label: format!("Q{}", q.index),
            text: q.question.clone(),
            image: match variant {
                Variant::Cards => None,
                Variant::Gallery => Some(match &q.image {
                    Some(src) => ImageCell::Reference(src.clone()),
                    None => ImageCell::Placeholder,
                }),
            },
        })
        .collect()
}

pub fn render<T: RenderTarget + ?Sized>(
    projection: &[&CanonicalQuestion],
    variant: Variant,
    target: &mut T,
) {
    target.replace_rows(build_rows(projection, variant));
}

/// Keeps whatever it was last given. Handy for headless runs and tests.
#[derive(Debug, Default)]
pub struct RecordingTarget {
    pub rows: Vec<DisplayRow>,
    pub redraws: usize,
}

impl RenderTarget for RecordingTarget {
    fn replace_rows(&mut self, rows: Vec<DisplayRow>) {
        self.rows = rows;
        self.redraws += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cq(index: usize, text: &str, image: Option<&str>) -> CanonicalQuestion {
        CanonicalQuestion {
            index,
            question: text.into(),
            image: image.map(String::from),
        }
    }

    #[test]
    fn empty_projection_renders_single_placeholder() {
        let rows = build_rows(&[], Variant::Cards);
        assert_eq!(rows, vec![DisplayRow::Empty(EMPTY_MESSAGE.into())]);
    }

    #[test]
    fn cards_rows_are_labelled_without_images() {
        let a = cq(3, "Why?", Some("x.png"));
        let rows = build_rows(&[&a], Variant::Cards);
        assert_eq!(
            rows,
            vec![DisplayRow::Question {
                index: 3,
                label: "Q3".into(),
                text: "Why?".into(),
                image: None,
            }]
        );
    }

    #[test]
    fn gallery_rows_use_placeholder_when_imageless() {
        let a = cq(1, "A", Some("http://x/y.png"));
        let b = cq(2, "B", None);
        let rows = build_rows(&[&a, &b], Variant::Gallery);
        match (&rows[0], &rows[1]) {
            (
                DisplayRow::Question { image: Some(first), .. },
                DisplayRow::Question { image: Some(second), .. },
            ) => {
                assert_eq!(first, &ImageCell::Reference("http://x/y.png".into()));
                assert_eq!(second, &ImageCell::Placeholder);
            }
            other => panic!("unexpected rows {:?}", other),
        }
    }

    #[test]
    fn render_replaces_previous_rows() {
        let mut target = RecordingTarget::default();
        let a = cq(1, "A", None);
        render(&[&a], Variant::Cards, &mut target);
        render(&[], Variant::Cards, &mut target);
        assert_eq!(target.redraws, 2);
        assert_eq!(target.rows.len(), 1);
        assert!(matches!(target.rows[0], DisplayRow::Empty(_)));
    }
}
