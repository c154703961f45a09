//! Summary generation lifecycle.
//!
//! One [`summarize`] call runs one request through the state machine
//! `CollectingCandidates -> Generating -> Complete | Failed | Cancelled`:
//! select the candidate span, insert an **inactive** placeholder at the
//! insertion index, stream text into it chunk by chunk, and only then
//! flip it active. The ordering is the safety property: at no point does
//! an active summary with empty content exist, so a render or outbound
//! call racing the stream can never have real history shadowed by
//! nothing. A failed or cancelled run removes the placeholder outright.
//!
//! Cancellation is cooperative and checked before every chunk (the
//! select below is biased toward it), so no further chunks are applied
//! once the token fires, and the resolver observes the rollback
//! immediately.
//!
//! Only one generation may be pending per insertion point: a pending
//! placeholder (inactive summary, still empty) at the insertion index
//! rejects a second request for the same spot. Deterministic — the newer
//! request fails, the older one keeps streaming.

use crate::api::{ChatClient, ChatMessage, ChatRequest, StreamEvent, models};
use crate::history::{MessageStore, messages_to_summarize};
use crate::summary::events::{SummaryEvent, SummaryObserver};
use crate::summary::prompt::{build_summary_request, candidate_chars, summary_word_target};
use crate::summary::settings::SummarySettings;
use crate::{Message, Role};
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Terminal phases of a summarization run. `Failed` is reported through
/// the `Err` channel of [`summarize`] and the observer, never through an
/// outcome value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryPhase {
    Complete,
    Cancelled,
}

/// Result of a successful (non-error) summarization run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryOutcome {
    pub phase: SummaryPhase,
    /// Index of the completed summary in the history. `None` when
    /// cancelled (the placeholder was removed).
    pub summary_index: Option<usize>,
    /// The advisory word target embedded in the prompt.
    pub word_target: u32,
    /// Characters of summary content produced.
    pub chars: usize,
}

/// Where a summary folding messages up to `target_index` is inserted:
/// immediately after the last folded message.
///
/// Pure arithmetic, no bounds validation — callers validate
/// `target_index` against the history.
pub fn summary_insertion_index(target_index: usize) -> usize {
    target_index + 1
}

/// True when the entry at `index` is a generation in progress: an
/// inactive summary whose content is still empty. User-deactivated and
/// completed summaries both carry content, so they never match.
fn pending_summary_at(store: &MessageStore, index: usize) -> bool {
    store
        .get(index)
        .is_some_and(|msg| msg.is_summary() && !msg.is_active_summary() && msg.content.is_empty())
}

/// Summarize the conversation up to and including `target_index`.
///
/// Selects candidates, inserts an inactive placeholder at
/// `target_index + 1`, streams the generation into it, and activates it
/// on completion. Returns the outcome, or an error when there is nothing
/// to summarize, a generation is already pending at the insertion point,
/// or the provider call fails — in every error case the history is left
/// exactly as it was.
pub async fn summarize(
    store: &mut MessageStore,
    target_index: usize,
    settings: &SummarySettings,
    client: &dyn ChatClient,
    observer: &dyn SummaryObserver,
    cancel: &CancellationToken,
) -> Result<SummaryOutcome, String> {
    // ── CollectingCandidates ──
    let candidates = messages_to_summarize(store.messages(), target_index);
    if candidates.is_empty() {
        return Err(format!("nothing to summarize at index {target_index}"));
    }

    let insert_index = summary_insertion_index(target_index);
    if pending_summary_at(store, insert_index) {
        return Err(format!(
            "a summarization is already pending at index {insert_index}"
        ));
    }

    let model = settings.effective_summary_model(store.model_override());
    let word_target = summary_word_target(candidate_chars(&candidates));
    let (system, transcript) = build_summary_request(&candidates, word_target);

    let thinking = match models::supports_reasoning(&model) {
        true => Some(models::thinking_budget(&model)),
        false => None,
    };
    let request = ChatRequest::new(
        model.clone(),
        vec![
            ChatMessage::new(Role::System, system),
            ChatMessage::new(Role::User, transcript),
        ],
    )
    .with_max_tokens(settings.max_summary_tokens.min(models::max_output_tokens(&model)))
    .with_temperature(settings.temperature)
    .with_thinking_budget(thinking);

    // ── Generating ──
    // The placeholder goes in inactive: until completion it is invisible
    // to the resolver and shadows nothing.
    let summary_index = store.insert(insert_index, Message::summary("", false));
    observer.on_event(&SummaryEvent::Started {
        target_index,
        summary_index,
        candidate_count: candidates.len(),
        word_target,
        model: &model,
    });
    debug!(
        "Summary generation started: {} candidate(s), insert at {summary_index}, model {model}",
        candidates.len()
    );

    let mut stream = match client.stream(&request).await {
        Ok(stream) => stream,
        Err(e) => {
            store.remove(summary_index);
            observer.on_event(&SummaryEvent::Failed { error: &e });
            return Err(e);
        }
    };

    let mut chars = 0usize;
    loop {
        tokio::select! {
            // Cancellation wins over a ready chunk: once requested, no
            // further chunks are applied.
            biased;

            _ = cancel.cancelled() => {
                store.remove(summary_index);
                observer.on_event(&SummaryEvent::Cancelled { target_index });
                return Ok(SummaryOutcome {
                    phase: SummaryPhase::Cancelled,
                    summary_index: None,
                    word_target,
                    chars: 0,
                });
            }

            event = stream.next() => match event {
                Some(StreamEvent::TextDelta(delta)) => {
                    chars += delta.len();
                    if !store.apply_summary_chunk(summary_index, &delta) {
                        warn!("Summary placeholder vanished at index {summary_index}");
                    }
                    observer.on_event(&SummaryEvent::ContentDelta {
                        summary_index,
                        delta: &delta,
                    });
                }
                Some(StreamEvent::Done) | None => break,
                Some(StreamEvent::Error(e)) => {
                    store.remove(summary_index);
                    observer.on_event(&SummaryEvent::Failed { error: &e });
                    return Err(e);
                }
            }
        }
    }

    // An empty generation is a failure: it must never become an active
    // summary shadowing real history with nothing.
    if chars == 0 {
        store.remove(summary_index);
        let error = "Empty summary response".to_string();
        observer.on_event(&SummaryEvent::Failed { error: &error });
        return Err(error);
    }

    // ── Complete ──
    store.complete_summary(summary_index, model.as_str());
    observer.on_event(&SummaryEvent::Completed {
        summary_index,
        chars,
    });
    Ok(SummaryOutcome {
        phase: SummaryPhase::Complete,
        summary_index: Some(summary_index),
        word_target,
        chars,
    })
}
