//! Extraction orchestrator.
//!
//! `IDLE -> AWAITING_DEPENDENCIES -> {RUNNING_SCHEMA | RUNNING_GENERIC} -> DONE`.
//! Every path, including a panic inside an extractor, ends in exactly one
//! call to [`ExtractionSession::dispatch_once`].

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::task::JoinHandle;

use crate::bridge::HostBridge;
use crate::error::Error;
use crate::extractor::{run_generic, run_schema, ExtractContext};
use crate::lifecycle::signal_page_loaded;
use crate::logging::EngineLogger;
use crate::markdown::MarkdownConverter;
use crate::options::EngineOptions;
use crate::readiness::is_final_page;
use crate::result::ExtractionOutcome;
use crate::schema::{ExtractionSchema, GenericContentRule};
use crate::session::{ExtractionSession, SessionState};
use crate::viewport::Viewport;
use crate::wait::poll_until;

/// The engine bound to one viewport.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use rs_pagescrape::{EngineOptions, HostBridge, MemoryViewport, ScrapeEngine, ExtractionSchema};
///
/// # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
/// let page = Arc::new(MemoryViewport::new(
///     "https://example.com/list",
///     r#"<ul><li class="item"><a class="t" href="/a">First</a></li></ul>"#,
/// ));
/// let engine = ScrapeEngine::new(page, HostBridge::new(), EngineOptions::default());
/// let schema: ExtractionSchema = serde_json::from_str(
///     r#"{"selectors":{"base_selector":".item","fields":[
///         {"name":"title","selector":".t","type":"text"},
///         {"name":"url","selector":".t","type":"attribute","attribute":"href"}]}}"#,
/// ).unwrap();
///
/// let outcome = engine.perform_scrape(Some(&schema), None).await;
/// assert_eq!(
///     outcome.into_result().unwrap(),
///     r#"[{"title":"First","url":"https://example.com/a"}]"#
/// );
/// # });
/// ```
pub struct ScrapeEngine {
    viewport: Arc<dyn Viewport>,
    bridge: HostBridge,
    options: EngineOptions,
    converter: MarkdownConverter,
    logger: EngineLogger,
}

impl ScrapeEngine {
    #[must_use]
    pub fn new(viewport: Arc<dyn Viewport>, bridge: HostBridge, options: EngineOptions) -> Self {
        let logger = EngineLogger::new(bridge.clone(), options.window());
        Self {
            viewport,
            bridge,
            options,
            converter: MarkdownConverter::new(),
            logger,
        }
    }

    #[must_use]
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    #[must_use]
    pub fn bridge(&self) -> &HostBridge {
        &self.bridge
    }

    #[must_use]
    pub fn logger(&self) -> &EngineLogger {
        &self.logger
    }

    /// A new session with a fresh delivery latch.
    #[must_use]
    pub fn begin_session(&self) -> ExtractionSession {
        ExtractionSession::new(
            self.options.result_channel(),
            self.bridge.clone(),
            self.logger.clone(),
        )
    }

    /// Whether extraction may start: the converter is linked in, so this is
    /// the page readiness check.
    #[must_use]
    pub fn dependencies_ready(&self) -> bool {
        is_final_page(&self.viewport.current_url())
    }

    /// Extract from the current page and report the outcome to the host.
    ///
    /// Runs schema extraction when `schema` is given, otherwise generic
    /// extraction with `rule` (or the default rule).
    pub async fn perform_scrape(
        &self,
        schema: Option<&ExtractionSchema>,
        rule: Option<&GenericContentRule>,
    ) -> ExtractionOutcome {
        let session = self.begin_session();
        self.run_session(&session, schema, rule).await
    }

    /// Drive `session` to `Done`, returning the outcome it delivered.
    pub async fn run_session(
        &self,
        session: &ExtractionSession,
        schema: Option<&ExtractionSchema>,
        rule: Option<&GenericContentRule>,
    ) -> ExtractionOutcome {
        session.transition(SessionState::AwaitingDependencies);
        let ready = poll_until(
            self.options.readiness_poll_interval(),
            self.options.readiness_timeout(),
            || self.dependencies_ready(),
        )
        .await;
        if !ready {
            let err = Error::NotReady {
                url: self.viewport.current_url(),
                timeout_ms: self.options.readiness_timeout_ms,
            };
            return self.finish(session, ExtractionOutcome::Error(err.to_string()));
        }

        let ctx = ExtractContext {
            viewport: self.viewport.as_ref(),
            options: &self.options,
            converter: &self.converter,
            logger: &self.logger,
        };
        let outcome = match schema {
            Some(schema) => {
                session.transition(SessionState::RunningSchema);
                self.logger.debug(format!(
                    "Running schema `{}`",
                    schema.config.name.as_deref().unwrap_or(&schema.selectors.base_selector)
                ));
                guarded(schema_outcome(ctx, schema)).await
            }
            None => {
                session.transition(SessionState::RunningGeneric);
                let rule = rule.cloned().unwrap_or_default();
                self.logger.debug(format!("Running generic {} extraction", rule.format));
                guarded(generic_outcome(ctx, &rule)).await
            }
        };
        self.finish(session, outcome)
    }

    fn finish(&self, session: &ExtractionSession, outcome: ExtractionOutcome) -> ExtractionOutcome {
        if let ExtractionOutcome::Error(message) = &outcome {
            self.logger.error(message);
        }
        session.dispatch_once(outcome.clone());
        session.transition(SessionState::Done);
        session.outcome().cloned().unwrap_or(outcome)
    }

    /// Start the page-loaded signaler for the page currently loading.
    pub fn spawn_lifecycle_signaler(&self) -> JoinHandle<bool> {
        tokio::spawn(signal_page_loaded(
            Arc::clone(&self.viewport),
            self.bridge.clone(),
            self.options.clone(),
            self.logger.clone(),
        ))
    }
}

async fn schema_outcome(ctx: ExtractContext<'_>, schema: &ExtractionSchema) -> ExtractionOutcome {
    match run_schema(&ctx, schema).await {
        Ok(records) => match serde_json::to_string(&records) {
            Ok(json) => ExtractionOutcome::Success(json),
            Err(err) => ExtractionOutcome::Error(format!("Schema scraping failed: {err}")),
        },
        Err(err @ Error::ElementTimeout { .. }) => ExtractionOutcome::Error(err.to_string()),
        Err(err) => ExtractionOutcome::Error(format!("Schema scraping failed: {err}")),
    }
}

async fn generic_outcome(ctx: ExtractContext<'_>, rule: &GenericContentRule) -> ExtractionOutcome {
    match run_generic(&ctx, rule).await {
        Ok(content) => match serde_json::to_string(&content) {
            Ok(json) => ExtractionOutcome::Success(json),
            Err(err) => ExtractionOutcome::Error(format!("Generic scraping failed: {err}")),
        },
        Err(err) => ExtractionOutcome::Error(format!(
            "Generic scraping failed after {} attempts: {err}",
            ctx.options.max_attempts.max(1)
        )),
    }
}

/// Turn a panic inside an extractor into an error outcome.
async fn guarded<F>(extraction: F) -> ExtractionOutcome
where
    F: Future<Output = ExtractionOutcome>,
{
    AssertUnwindSafe(extraction)
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| {
            ExtractionOutcome::Error(format!("Scraping failed: {}", panic_message(&*panic)))
        })
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
