//! End-to-end checks of fetch → parse → normalize → view → render,
//! with a canned fetcher standing in for the network.

use std::fs;

use qbank::{
    config::{SortMode, Variant},
    error::LoadError,
    fetch::Headers,
    render::{DisplayRow, ImageCell, RecordingTarget},
    session::{load_questions, Session},
    view::{Controls, SearchControls},
    Fetcher,
};
use tempfile::tempdir;

struct Canned<'a>(&'a str);

impl Fetcher for Canned<'_> {
    fn get_text(&self, _url: &str, _headers: &Headers) -> Result<String, LoadError> {
        Ok(self.0.to_string())
    }
}

fn cards() -> Session<RecordingTarget> {
    Session::new(
        Variant::Cards,
        Controls::default(),
        "huggingface.co",
        RecordingTarget::default(),
    )
}

fn search(query: &str) -> Controls {
    Controls::Search(SearchControls {
        query: query.into(),
        sort: SortMode::Original,
        limit: 0,
    })
}

fn shown(s: &Session<RecordingTarget>) -> Vec<(usize, String)> {
    s.view()
        .projection()
        .iter()
        .map(|q| (q.index, q.question.clone()))
        .collect()
}

#[test]
fn search_narrows_and_empty_search_restores() {
    let mut s = cards();
    let body = r#"[{"question":"What is 2+2?"}, {"question":"Capital of France?"}]"#;
    let job = s.begin_remote("org/quiz", "test.json", None).unwrap();
    assert!(s.load_now(job, &Canned(body)));

    let idx: Vec<usize> = s.view().dataset().iter().map(|q| q.index).collect();
    assert_eq!(idx, vec![1, 2]);

    s.update_controls(search("capital"));
    assert_eq!(shown(&s), vec![(2, "Capital of France?".to_string())]);

    s.update_controls(search(""));
    assert_eq!(shown(&s).len(), 2);
}

#[test]
fn malformed_jsonl_leaves_dataset_untouched() {
    let mut s = cards();
    let job = s.begin_remote("org/quiz", "good.json", None).unwrap();
    s.load_now(job, &Canned(r#"["before"]"#));

    let job = s.begin_remote("org/quiz", "bad.jsonl", None).unwrap();
    s.load_now(job, &Canned("{\"question\":\"A\"}\nNOT_JSON"));

    assert!(s.status().is_error);
    assert!(s.status().text.starts_with("Unable to load data: invalid JSON on line 2"));
    assert_eq!(shown(&s), vec![(1, "before".to_string())]);
}

#[test]
fn malformed_jsonl_is_reported_as_malformed_record() {
    let err = load_questions("{\"question\":\"A\"}\nNOT_JSON", "x.jsonl", Variant::Cards)
        .unwrap_err();
    assert!(matches!(err, LoadError::MalformedRecord { line: Some(2), .. }));
}

#[test]
fn wrapper_without_questions_is_unsupported() {
    let err = load_questions(r#"{"data": []}"#, "x.json", Variant::Cards).unwrap_err();
    assert!(matches!(err, LoadError::UnsupportedFormat));
}

#[test]
fn jsonl_and_array_normalize_identically() {
    let lines = [
        r#"{"question":"Q1","image":"a.png"}"#,
        r#""plain text""#,
        "null",
        r#"{"prompt":"first field","answer":"x"}"#,
        r#"{"question":"Q5","url":"https://x/5.jpg"}"#,
    ];
    let jsonl = format!("{}\n\n", lines.join("\n"));
    let array = format!("[{}]", lines.join(","));
    for variant in [Variant::Cards, Variant::Gallery] {
        let a = load_questions(&jsonl, "d.jsonl", variant).unwrap();
        let b = load_questions(&array, "d.json", variant).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), lines.len());
    }
}

#[test]
fn gallery_keeps_image_and_threshold_filters() {
    let mut s = Session::new(
        Variant::Gallery,
        Controls::Threshold(0),
        "huggingface.co",
        RecordingTarget::default(),
    );
    let body = r#"[{"question":"Q1","image":"http://x/y.png"}, {"question":"Q2"}, "Q3"]"#;
    let job = s.begin_remote("org/pics", "set.json", None).unwrap();
    s.load_now(job, &Canned(body));

    let first = &s.view().dataset()[0];
    assert_eq!(first.index, 1);
    assert_eq!(first.question, "Q1");
    assert_eq!(first.image.as_deref(), Some("http://x/y.png"));

    match &s.target().rows[1] {
        DisplayRow::Question { image, .. } => assert_eq!(image, &Some(ImageCell::Placeholder)),
        other => panic!("unexpected row {:?}", other),
    }

    s.update_controls(Controls::Threshold(1));
    let idx: Vec<usize> = shown(&s).into_iter().map(|(i, _)| i).collect();
    assert_eq!(idx, vec![2, 3]);

    s.update_controls(Controls::Threshold(3));
    assert!(matches!(s.target().rows[0], DisplayRow::Empty(_)));
}

#[test]
fn every_array_length_gets_dense_indices() {
    for n in [0usize, 1, 7, 64] {
        let body = serde_json::to_string(&(0..n).map(|i| format!("q{}", i)).collect::<Vec<_>>())
            .unwrap();
        let questions = load_questions(&body, "n.json", Variant::Cards).unwrap();
        let mut s = cards();
        let job = s.begin_remote("a/b", "n.json", None).unwrap();
        s.load_now(job, &Canned(&body));
        assert_eq!(questions.len(), n);
        let idx: Vec<usize> = s.view().dataset().iter().map(|q| q.index).collect();
        assert_eq!(idx, (1..=n).collect::<Vec<_>>());
    }
}

#[test]
fn sample_file_on_disk_is_loaded() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sample.json");
    fs::write(&path, r#"{"questions": ["x", {"question": "y"}]}"#).unwrap();
    let mut s = cards();
    let job = s.begin_sample(&path);
    s.load_now(job, &Canned("unused"));
    assert_eq!(
        s.status().text,
        "Loaded 2 sample questions. Use the Hugging Face form to load the full set."
    );
}

#[test]
fn missing_sample_file_reports_error() {
    let dir = tempdir().unwrap();
    let mut s = cards();
    let job = s.begin_sample(dir.path().join("absent.json"));
    s.load_now(job, &Canned("unused"));
    assert!(s.status().is_error);
    assert!(s.status().text.starts_with("Unable to load sample data:"));
}
