//! Maps every raw record onto the canonical question shape.
//!
//! Total by construction: each input record yields exactly one
//! [`ExtractedQuestion`] with non-empty text, in input order.

use serde_json::Value;

use crate::config::Variant;
use crate::parser::RawRecord;

/// Fields consulted for an image reference, highest priority first.
pub const IMAGE_FIELDS: [&str; 4] = ["image", "image_url", "imageUrl", "url"];

/// A normalized record before it is given its dataset index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedQuestion {
    pub question: String,
    pub image: Option<String>,
}

pub fn normalize_all(records: &[RawRecord], variant: Variant) -> Vec<ExtractedQuestion> {
    records
        .iter()
        .enumerate()
        .map(|(pos, r)| normalize(r, pos, variant))
        .collect()
}

/// `position` is zero-based; it only feeds the placeholder text.
pub fn normalize(record: &RawRecord, position: usize, variant: Variant) -> ExtractedQuestion {
    let text = match record {
        RawRecord::Null => None,
        RawRecord::Text(s) => Some(s.clone()),
        RawRecord::Object(fields) => match field(fields, "question") {
            Some(v) => coerce_truthy(v),
            None => fields.first().map(|(_, v)| coerce_text(v)),
        },
        RawRecord::Other(v) => coerce_truthy(v),
    };
    let question = text
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| placeholder(position, variant));
    let image = match (variant, record) {
        (Variant::Gallery, RawRecord::Object(fields)) => find_image(fields),
        _ => None,
    };
    ExtractedQuestion { question, image }
}

pub fn placeholder(position: usize, variant: Variant) -> String {
    match variant {
        Variant::Cards => format!("Unknown question at index {}", position),
        Variant::Gallery => format!("Question {}", position + 1),
    }
}

fn field<'a>(fields: &'a [(String, Value)], name: &str) -> Option<&'a Value> {
    fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
}

fn find_image(fields: &[(String, Value)]) -> Option<String> {
    IMAGE_FIELDS.iter().find_map(|name| match field(fields, name) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    })
}

/// Text form of any value: strings verbatim, everything else as JSON.
fn coerce_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Like [`coerce_text`], but `None` for values that read as "nothing"
/// (null, false, zero, empty string).
fn coerce_truthy(v: &Value) -> Option<String> {
    match v {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(coerce_text(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> RawRecord {
        RawRecord::from(v)
    }

    #[test]
    fn null_gets_placeholder_per_variant() {
        let a = normalize(&RawRecord::Null, 4, Variant::Cards);
        assert_eq!(a.question, "Unknown question at index 4");
        let b = normalize(&RawRecord::Null, 4, Variant::Gallery);
        assert_eq!(b.question, "Question 5");
        assert_eq!(b.image, None);
    }

    #[test]
    fn string_is_taken_verbatim() {
        let q = normalize(&RawRecord::Text("  Why?  ".into()), 0, Variant::Cards);
        assert_eq!(q.question, "  Why?  ");
    }

    #[test]
    fn empty_string_falls_back() {
        let q = normalize(&RawRecord::Text(String::new()), 2, Variant::Cards);
        assert_eq!(q.question, "Unknown question at index 2");
    }

    #[test]
    fn question_field_wins_over_order() {
        let rec = obj(json!({"id": 7, "question": "What is 2+2?"}));
        assert_eq!(normalize(&rec, 0, Variant::Cards).question, "What is 2+2?");
    }

    #[test]
    fn falsy_question_field_falls_back() {
        let rec = obj(json!({"question": null, "other": "ignored"}));
        assert_eq!(
            normalize(&rec, 1, Variant::Gallery).question,
            "Question 2"
        );
        let rec = obj(json!({"question": 0}));
        assert_eq!(
            normalize(&rec, 1, Variant::Cards).question,
            "Unknown question at index 1"
        );
    }

    #[test]
    fn non_string_question_is_coerced() {
        let rec = obj(json!({"question": 42}));
        assert_eq!(normalize(&rec, 0, Variant::Cards).question, "42");
    }

    #[test]
    fn first_field_is_used_without_question() {
        let rec = obj(json!({"prompt": "Name a prime", "answer": "7"}));
        assert_eq!(normalize(&rec, 0, Variant::Cards).question, "Name a prime");
        let rec = obj(json!({"n": 12.5, "x": "y"}));
        assert_eq!(normalize(&rec, 0, Variant::Cards).question, "12.5");
    }

    #[test]
    fn falsy_first_field_is_kept_as_text() {
        let rec = obj(json!({"count": 0, "x": "y"}));
        assert_eq!(normalize(&rec, 0, Variant::Cards).question, "0");
        let rec = obj(json!({"f": false}));
        assert_eq!(normalize(&rec, 0, Variant::Cards).question, "false");
        let rec = obj(json!({"a": null}));
        assert_eq!(normalize(&rec, 0, Variant::Gallery).question, "null");
    }

    #[test]
    fn empty_first_field_falls_back() {
        let rec = obj(json!({"a": "", "b": "later"}));
        assert_eq!(
            normalize(&rec, 0, Variant::Cards).question,
            "Unknown question at index 0"
        );
    }

    #[test]
    fn empty_object_falls_back() {
        let rec = obj(json!({}));
        assert_eq!(normalize(&rec, 3, Variant::Gallery).question, "Question 4");
    }

    #[test]
    fn image_fields_follow_priority() {
        let rec = obj(json!({"question": "Q1", "url": "u", "image_url": "iu"}));
        assert_eq!(
            normalize(&rec, 0, Variant::Gallery).image.as_deref(),
            Some("iu")
        );
        let rec = obj(json!({"question": "Q1", "image": "", "imageUrl": "camel"}));
        assert_eq!(
            normalize(&rec, 0, Variant::Gallery).image.as_deref(),
            Some("camel")
        );
    }

    #[test]
    fn image_ignored_by_cards_variant() {
        let rec = obj(json!({"question": "Q1", "image": "http://x/y.png"}));
        assert_eq!(normalize(&rec, 0, Variant::Cards).image, None);
    }

    #[test]
    fn no_image_fields_leaves_image_unset() {
        let rec = obj(json!({"question": "Q1", "picture": "p.png"}));
        assert_eq!(normalize(&rec, 0, Variant::Gallery).image, None);
    }

    #[test]
    fn preserves_count_and_order() {
        let recs = vec![
            RawRecord::Null,
            RawRecord::Text("b".into()),
            obj(json!({"question": "c"})),
            RawRecord::Other(json!(false)),
        ];
        let out = normalize_all(&recs, Variant::Cards);
        assert_eq!(out.len(), 4);
        assert_eq!(out[1].question, "b");
        assert_eq!(out[2].question, "c");
        assert!(out.iter().all(|q| !q.question.is_empty()));
    }
}
