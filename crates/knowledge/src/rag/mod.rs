//! Question answering over a built index.
//!
//! Retrieve → optional web points → synthesize, one question at a time.

pub mod ask;
pub mod cache;
pub mod search;
pub mod web;

pub use ask::{build_context, AnswerSynthesizer};
pub use cache::PointCache;
pub use search::Retriever;
pub use web::{
    extract_points, format_points, DuckDuckGoSearch, WebPointExtractor, WebSearch,
    WEB_POINTS_TITLE,
};
