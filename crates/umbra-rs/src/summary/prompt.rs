//! Summarization prompt building and outbound message shaping.
//!
//! Two jobs live here:
//!
//! 1. Turning a span of candidate messages into the (system, user) pair
//!    sent to the summarizer model, with a computed word target embedded
//!    in the instructions. The target is advisory — it bounds the model
//!    through the prompt, not the output programmatically.
//!
//! 2. Re-shaping history entries into provider-facing [`ChatMessage`]s.
//!    Completed summaries travel as **user**-role messages carrying a
//!    fixed marker prefix: the Anthropic messages API strips system
//!    content out of the message list, so a system-role summary would be
//!    silently relocated or dropped. One shape for both providers.

use crate::api::ChatMessage;
use crate::{Message, Role};

/// Marker prepended to summary content when it is sent to a provider.
pub const SUMMARY_PREFIX: &str = "[Previous conversation summary]:\n";

/// Bounds for the advisory word target.
pub const MIN_SUMMARY_WORDS: u32 = 50;
pub const MAX_SUMMARY_WORDS: u32 = 2000;

/// Word-count estimate: characters per word.
const CHARS_PER_WORD: f64 = 5.0;

/// Fraction of the estimated word count the summary should compress to.
const COMPRESSION_RATIO: f64 = 0.10;

/// The fixed summarization instructions. The word target is appended by
/// [`build_summary_request`].
const SUMMARY_INSTRUCTIONS: &str = "\
Summarize the conversation below so it can stand in for the original \
messages in a continuing chat.

Rules:
- Only include facts explicitly stated in the messages. Do not infer or extrapolate.
- Preserve names, numbers, decisions, and open questions verbatim.
- Write in the third person (\"the user asked...\", \"the assistant suggested...\").
- Produce a single cohesive summary, not a message-by-message list.";

/// Advisory word target for a candidate span totalling `total_chars`
/// characters of content: 10% of the estimated word count, clamped to
/// `[MIN_SUMMARY_WORDS, MAX_SUMMARY_WORDS]`.
pub fn summary_word_target(total_chars: usize) -> u32 {
    let estimated_words = total_chars as f64 / CHARS_PER_WORD;
    let raw = (estimated_words * COMPRESSION_RATIO).round() as u32;
    raw.clamp(MIN_SUMMARY_WORDS, MAX_SUMMARY_WORDS)
}

/// Total content characters across a candidate span.
pub fn candidate_chars(candidates: &[Message]) -> usize {
    candidates.iter().map(|msg| msg.content.len()).sum()
}

/// Build the (system, user) prompt pair for summarizing `candidates`.
///
/// The system half carries the instructions plus the word target; the
/// user half is the candidate transcript, one `[role]: text` block per
/// message.
pub fn build_summary_request(candidates: &[Message], word_target: u32) -> (String, String) {
    let system = format!(
        "{SUMMARY_INSTRUCTIONS}\n- Aim for roughly {word_target} words."
    );

    let mut transcript = String::new();
    for msg in candidates {
        let role = &msg.role;
        let text = &msg.content;
        transcript.push_str(&format!("[{role}]: {text}\n\n"));
    }

    (system, transcript)
}

/// The provider-facing form of a completed summary: a user-role message
/// with the fixed marker prefix.
pub fn summary_api_message(summary: &Message) -> ChatMessage {
    ChatMessage::new(Role::User, format!("{SUMMARY_PREFIX}{}", summary.content))
}

/// Flatten an API view (the Shadow Resolver's output) into the outbound
/// provider messages: summaries become prefixed user messages, ordinary
/// entries pass through role and content unchanged.
pub fn to_outbound(api_view: &[Message]) -> Vec<ChatMessage> {
    api_view
        .iter()
        .map(|msg| {
            if msg.is_summary() {
                summary_api_message(msg)
            } else {
                ChatMessage::new(msg.role, msg.content.clone())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_target_clamps_low() {
        // 100 chars -> 20 words estimated -> 2 raw -> clamped to 50.
        assert_eq!(summary_word_target(100), 50);
        assert_eq!(summary_word_target(0), 50);
    }

    #[test]
    fn word_target_clamps_high() {
        // 10M chars -> 2M words -> 200k raw -> clamped to 2000.
        assert_eq!(summary_word_target(10_000_000), 2000);
    }

    #[test]
    fn word_target_midrange() {
        // 5000 chars -> 1000 words estimated -> 100 target.
        assert_eq!(summary_word_target(5000), 100);
    }

    #[test]
    fn request_embeds_target_and_transcript() {
        let candidates = vec![
            Message::user("What is a monad?"),
            Message::assistant("A monoid in the category of endofunctors."),
        ];
        let target = summary_word_target(candidate_chars(&candidates));
        let (system, user) = build_summary_request(&candidates, target);

        assert!(system.contains("roughly 50 words"));
        assert!(user.contains("[user]: What is a monad?"));
        assert!(user.contains("[assistant]: A monoid"));
    }

    #[test]
    fn summary_goes_out_as_prefixed_user_message() {
        let summary = Message::summary("The user asked about monads.", true);
        let out = summary_api_message(&summary);
        assert_eq!(out.role, Role::User);
        assert_eq!(
            out.content,
            "[Previous conversation summary]:\nThe user asked about monads."
        );
    }

    #[test]
    fn outbound_view_never_contains_system_role_summaries() {
        let api_view = vec![
            Message::summary("earlier talk", true),
            Message::user("next question"),
            Message::assistant("answer"),
        ];
        let outbound = to_outbound(&api_view);

        assert_eq!(outbound.len(), 3);
        assert_eq!(outbound[0].role, Role::User);
        assert!(outbound[0].content.starts_with(SUMMARY_PREFIX));
        assert_eq!(outbound[1].content, "next question");
        assert_eq!(outbound[2].role, Role::Assistant);
    }
}
