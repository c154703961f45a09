//! Summary lifecycle: prompt building, settings, events, orchestration.
//!
//! The entry point is [`summarize`] in [`lifecycle`]: one call takes a
//! target index and runs candidate selection, placeholder insertion,
//! streamed generation, and activation against a
//! [`MessageStore`](crate::history::MessageStore), reporting progress
//! through a [`SummaryObserver`].
//!
//! - [`prompt`] — instruction block, word-target calculation, and the
//!   provider-facing shape of completed summaries.
//! - [`settings`] — [`SummarySettings`] with the model resolution chain,
//!   persisted through the key-value capability.
//! - [`events`] — [`SummaryEvent`] and observer implementations.
//! - [`lifecycle`] — the state machine itself.

pub mod events;
pub mod lifecycle;
pub mod prompt;
pub mod settings;

pub use events::{FnObserver, LoggingObserver, NoopObserver, SummaryEvent, SummaryObserver};
pub use lifecycle::{SummaryOutcome, SummaryPhase, summarize, summary_insertion_index};
pub use prompt::{SUMMARY_PREFIX, summary_word_target, to_outbound};
pub use settings::SummarySettings;
