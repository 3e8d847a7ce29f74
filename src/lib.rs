//! Load a question dataset (JSON or JSON Lines) from a Hugging Face repo or a
//! local sample, normalize it, and browse it with search, sort, limit or a
//! start-index threshold.
//!
//! The terminal front end lives in the `qbank` binary; everything it drives
//! is here so it can run headless.

pub mod config;
pub mod error;
pub mod fetch;
pub mod normalize;
pub mod parser;
pub mod render;
pub mod sanitize;
pub mod session;
pub mod view;

pub use config::{Settings, SortMode, Variant};
pub use error::LoadError;
pub use fetch::{Fetcher, HttpFetcher};
pub use render::{DisplayRow, RenderTarget};
pub use session::{LoadJob, LoadOutcome, Session, Status};
pub use view::{CanonicalQuestion, Controls, SearchControls, ViewState};
