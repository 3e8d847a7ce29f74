//! Ties the pipeline together around one explicitly owned [`ViewState`].
//!
//! A load is split in two so the fetch can run off the UI thread:
//! [`Session::begin_remote`] / [`Session::begin_sample`] hand out a
//! [`LoadJob`] stamped with a generation ticket, and [`Session::finish`]
//! applies the outcome only if no newer load has started since.

use std::path::PathBuf;

use chrono::{DateTime, Local};
use tracing::{info, warn};

use crate::config::Variant;
use crate::error::{LoadError, Result};
use crate::fetch::{read_sample, Fetcher, RemoteRequest};
use crate::normalize::{normalize_all, ExtractedQuestion};
use crate::parser::parse_records;
use crate::render::{render, RenderTarget};
use crate::view::{Controls, ViewState};

pub const MISSING_FIELDS_MESSAGE: &str = "Please provide both a dataset repo id and file path.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadKind {
    Remote,
    Sample,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Status {
    pub text: String,
    pub is_error: bool,
}

impl Status {
    fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

#[derive(Debug, Clone)]
enum JobSource {
    Remote(RemoteRequest),
    Sample(PathBuf),
}

/// A pending load. Cheap to move to a worker thread.
#[derive(Debug, Clone)]
pub struct LoadJob {
    pub ticket: u64,
    pub kind: LoadKind,
    variant: Variant,
    source: JobSource,
}

impl LoadJob {
    /// Fetches, parses and normalizes. Touches no shared state.
    pub fn run(self, fetcher: &dyn Fetcher) -> LoadOutcome {
        let result = match &self.source {
            JobSource::Remote(req) => req
                .fetch(fetcher)
                .and_then(|text| load_questions(&text, &req.file_path, self.variant)),
            JobSource::Sample(path) => read_sample(path).and_then(|text| {
                load_questions(&text, &path.to_string_lossy(), self.variant)
            }),
        };
        LoadOutcome {
            ticket: self.ticket,
            kind: self.kind,
            result,
        }
    }
}

#[derive(Debug)]
pub struct LoadOutcome {
    pub ticket: u64,
    pub kind: LoadKind,
    pub result: Result<Vec<ExtractedQuestion>>,
}

/// Parse then normalize; fails without partial output.
pub fn load_questions(text: &str, file_hint: &str, variant: Variant) -> Result<Vec<ExtractedQuestion>> {
    let records = parse_records(text, file_hint)?;
    Ok(normalize_all(&records, variant))
}

pub struct Session<T: RenderTarget> {
    view: ViewState,
    variant: Variant,
    host: String,
    status: Status,
    generation: u64,
    loaded_at: Option<DateTime<Local>>,
    target: T,
}

impl<T: RenderTarget> Session<T> {
    pub fn new(variant: Variant, controls: Controls, host: impl Into<String>, target: T) -> Self {
        let mut session = Self {
            view: ViewState::new(controls),
            variant,
            host: host.into(),
            status: Status::default(),
            generation: 0,
            loaded_at: None,
            target,
        };
        session.redraw();
        session
    }

    /// Starts a remote load, or reports missing fields and returns `None`.
    pub fn begin_remote(&mut self, repo_id: &str, file_path: &str, token: Option<&str>) -> Option<LoadJob> {
        let req = match RemoteRequest::new(&self.host, repo_id, file_path, token) {
            Ok(req) => req,
            Err(e) => {
                warn!(error = %e, "remote load not started");
                self.status = Status::error(MISSING_FIELDS_MESSAGE);
                return None;
            }
        };
        info!(url = %req.url, authorized = !req.headers.is_empty(), "fetching dataset");
        self.status = Status::info(format!("Fetching {} ...", req.url));
        Some(self.next_job(LoadKind::Remote, JobSource::Remote(req)))
    }

    pub fn begin_sample(&mut self, path: impl Into<PathBuf>) -> LoadJob {
        let path = path.into();
        info!(path = %path.display(), "loading sample");
        self.status = Status::info("Loading bundled sample ...");
        self.next_job(LoadKind::Sample, JobSource::Sample(path))
    }

    fn next_job(&mut self, kind: LoadKind, source: JobSource) -> LoadJob {
        self.generation += 1;
        LoadJob {
            ticket: self.generation,
            kind,
            variant: self.variant,
            source,
        }
    }

    /// Applies a finished load. Returns `false` when the outcome was
    /// superseded by a newer load and dropped.
    pub fn finish(&mut self, outcome: LoadOutcome) -> bool {
        if outcome.ticket != self.generation {
            warn!(
                ticket = outcome.ticket,
                current = self.generation,
                "dropping stale load result"
            );
            return false;
        }
        match outcome.result {
            Ok(questions) => {
                let n = questions.len();
                self.view.load_dataset(questions);
                self.loaded_at = Some(Local::now());
                self.status = Status::info(loaded_message(outcome.kind, n));
                info!(count = n, kind = ?outcome.kind, "dataset loaded");
                self.redraw();
            }
            Err(e) => {
                warn!(error = %e, kind = ?outcome.kind, "load failed");
                self.status = Status::error(failure_message(outcome.kind, &e));
            }
        }
        true
    }

    /// Runs `job` on the current thread and applies it.
    pub fn load_now(&mut self, job: LoadJob, fetcher: &dyn Fetcher) -> bool {
        self.finish(job.run(fetcher))
    }

    pub fn update_controls(&mut self, controls: Controls) {
        self.view.update_controls(controls);
        self.redraw();
    }

    fn redraw(&mut self) {
        render(&self.view.projection(), self.variant, &mut self.target);
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn loaded_at(&self) -> Option<DateTime<Local>> {
        self.loaded_at
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }
}

fn loaded_message(kind: LoadKind, n: usize) -> String {
    match kind {
        LoadKind::Remote => format!("Loaded {} questions from Hugging Face.", n),
        LoadKind::Sample => format!(
            "Loaded {} sample questions. Use the Hugging Face form to load the full set.",
            n
        ),
    }
}

fn failure_message(kind: LoadKind, e: &LoadError) -> String {
    match kind {
        LoadKind::Remote => format!("Unable to load data: {}", e),
        LoadKind::Sample => format!("Unable to load sample data: {}", e),
    }
}
