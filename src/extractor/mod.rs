//! Extractors.
//!
//! # Module Structure
//!
//! - `schema`: declarative, schema-driven record extraction
//! - `generic`: readability-style text/Markdown extraction of the whole page
//!
//! Both read the page through an [`ExtractContext`] and never hold a parsed
//! document across an `.await`.

pub mod generic;
pub mod schema;

use crate::logging::EngineLogger;
use crate::markdown::MarkdownConverter;
use crate::options::EngineOptions;
use crate::viewport::Viewport;

pub use generic::{extract_generic, run_generic};
pub use schema::{extract_records, run_schema};

/// Everything an extractor needs from the engine for one run.
#[derive(Clone, Copy)]
pub struct ExtractContext<'a> {
    pub viewport: &'a dyn Viewport,
    pub options: &'a EngineOptions,
    pub converter: &'a MarkdownConverter,
    pub logger: &'a EngineLogger,
}
