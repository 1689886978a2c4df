//! # rs-pagescrape
//!
//! In-page content extraction engine for a live, possibly still-changing,
//! web page.
//!
//! Given an [`ExtractionSchema`] the engine pulls structured records out of
//! repeated containers; without one it produces the readable content of the
//! page as plain text or Markdown. Either way the outcome is delivered to the
//! host exactly once per invocation over a window-scoped channel.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use rs_pagescrape::{ChannelEmitter, EngineOptions, HostBridge, MemoryViewport, ScrapeEngine};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
//! let page = Arc::new(MemoryViewport::new(
//!     "https://example.com/post",
//!     "<html><head><title>Post</title></head><body><article>\
//!      <p>A paragraph that is long enough to count as real page content.</p>\
//!      </article></body></html>",
//! ));
//! let (emitter, mut events) = ChannelEmitter::new();
//! let bridge = HostBridge::with_emitter(Arc::new(emitter));
//! let engine = ScrapeEngine::new(page, bridge, EngineOptions::default());
//!
//! let outcome = engine.perform_scrape(None, None).await;
//! assert!(outcome.is_success());
//! # let _ = events.try_recv();
//! # });
//! ```
//!
//! ## Features
//!
//! - **Schema extraction**: text, attribute, HTML and Markdown fields with
//!   required-field filtering and absolute URL resolution
//! - **Generic extraction**: boilerplate removal with text or Markdown output
//! - **Resilience**: readiness gating, element waits and retry with backoff
//! - **At-most-once delivery**: one result per [`ExtractionSession`]

mod error;
mod options;
mod patterns;
mod result;

/// DOM helpers over `dom_query` (parsing, attributes, rendered text).
pub mod dom;

/// Declarative schema and generic rule types.
pub mod schema;

/// Schema and generic extractors.
pub mod extractor;

/// HTML sanitization shared by the extractors.
pub mod sanitize;

/// HTML to Markdown conversion.
pub mod markdown;

/// URL utilities for validation, resolution and redirect decoding.
pub mod url_utils;

/// Page readiness checks.
pub mod readiness;

/// Retry with backoff.
pub mod retry;

/// Polling and mutation-driven waits.
pub mod wait;

/// The page the engine reads from.
pub mod viewport;

/// Host event bridge.
pub mod bridge;

/// Logging mirrored to the host.
pub mod logging;

/// Extraction sessions and the delivery latch.
pub mod session;

/// Page-loaded lifecycle signal.
pub mod lifecycle;

/// Extraction orchestrator.
pub mod engine;

// Public API - re-exports
pub use bridge::{ChannelEmitter, EventEmitter, HostBridge, HostEvent};
pub use engine::ScrapeEngine;
pub use error::{Error, Result};
pub use markdown::MarkdownConverter;
pub use options::EngineOptions;
pub use result::{ExtractionOutcome, GenericContent, Record};
pub use schema::{
    ContentFormat, ExtractionSchema, FieldKind, FieldSpec, GenericContentRule, SchemaConfig,
    Selectors,
};
pub use session::{ExtractionSession, SessionState};
pub use viewport::{MemoryViewport, Viewport};
