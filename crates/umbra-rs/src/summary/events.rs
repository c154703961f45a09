//! Lifecycle events and observers for summary generation.
//!
//! The lifecycle manager never hands out references to in-progress
//! messages; progress is reported through [`SummaryEvent`] values and the
//! store is the only writer. Front ends implement [`SummaryObserver`] to
//! render streaming state, or use [`FnObserver`] for quick closures and
//! [`LoggingObserver`] for tracing output.

use tracing::{debug, info, warn};

/// Events emitted during one summarization run, in lifecycle order:
/// `Started`, zero or more `ContentDelta`s, then exactly one of
/// `Completed`, `Failed`, or `Cancelled`.
#[derive(Debug)]
pub enum SummaryEvent<'a> {
    /// Candidates are collected and the placeholder is inserted;
    /// generation is starting.
    Started {
        target_index: usize,
        summary_index: usize,
        candidate_count: usize,
        word_target: u32,
        model: &'a str,
    },
    /// A streamed chunk was applied to the placeholder.
    ContentDelta { summary_index: usize, delta: &'a str },
    /// Generation finished; the summary is active.
    Completed { summary_index: usize, chars: usize },
    /// Generation failed; the placeholder was removed.
    Failed { error: &'a str },
    /// The caller cancelled; the placeholder was removed.
    Cancelled { target_index: usize },
}

/// Observer for summarization lifecycle events.
pub trait SummaryObserver {
    fn on_event(&self, event: &SummaryEvent<'_>);
}

/// Observer that ignores every event. For tests and fire-and-forget runs.
pub struct NoopObserver;

impl SummaryObserver for NoopObserver {
    fn on_event(&self, _event: &SummaryEvent<'_>) {}
}

/// Observer that logs events through `tracing`.
pub struct LoggingObserver;

impl SummaryObserver for LoggingObserver {
    fn on_event(&self, event: &SummaryEvent<'_>) {
        match event {
            SummaryEvent::Started {
                target_index,
                candidate_count,
                word_target,
                model,
                ..
            } => info!(
                "Summarizing {candidate_count} message(s) up to index {target_index} \
                 with {model} (~{word_target} words)"
            ),
            SummaryEvent::ContentDelta { delta, .. } => {
                debug!("Summary delta: {} char(s)", delta.len());
            }
            SummaryEvent::Completed {
                summary_index,
                chars,
            } => info!("Summary at index {summary_index} complete ({chars} chars)"),
            SummaryEvent::Failed { error } => warn!("Summarization failed: {error}"),
            SummaryEvent::Cancelled { target_index } => {
                info!("Summarization at index {target_index} cancelled");
            }
        }
    }
}

/// Closure-backed observer.
pub struct FnObserver<F: Fn(&SummaryEvent<'_>)> {
    f: F,
}

impl<F: Fn(&SummaryEvent<'_>)> FnObserver<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F: Fn(&SummaryEvent<'_>)> SummaryObserver for FnObserver<F> {
    fn on_event(&self, event: &SummaryEvent<'_>) {
        (self.f)(event)
    }
}
