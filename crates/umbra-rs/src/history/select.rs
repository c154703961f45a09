//! Candidate Selector: which messages a summary folds or has folded.
//!
//! Both functions here scan **backward** from a position to the nearest
//! preceding summary (active or not) and operate on the span after it.
//! This is deliberately not the resolver's rule: the resolver decides
//! what the API sees globally, while these answer the local question
//! "what does a summary at this position cover" — used to build the
//! summarization input and to display "Summarizing N messages". Keep the
//! two rules separate.
//!
//! All functions are total: any out-of-range index yields an empty
//! result, never an error.

use crate::Message;

/// Index of the nearest summary strictly before `index`, if any.
fn nearest_preceding_summary(history: &[Message], index: usize) -> Option<usize> {
    history
        .iter()
        .take(index)
        .rposition(Message::is_summary)
}

/// The ordinary messages a new summary at `target_index` would fold:
/// every non-summary message from just after the nearest preceding
/// summary through `target_index` inclusive, in order.
///
/// `target_index` outside the history yields an empty result.
pub fn messages_to_summarize(history: &[Message], target_index: usize) -> Vec<Message> {
    if target_index >= history.len() {
        return Vec::new();
    }

    let start = nearest_preceding_summary(history, target_index).map_or(0, |p| p + 1);

    history[start..=target_index]
        .iter()
        .filter(|msg| !msg.is_summary())
        .cloned()
        .collect()
}

/// How many ordinary messages the summary at `summary_index` covers:
/// the non-summary messages between the nearest preceding summary and
/// `summary_index` (exclusive). Display-only count.
///
/// `summary_index` outside the history yields zero.
pub fn count_shadowed_messages(history: &[Message], summary_index: usize) -> usize {
    if summary_index >= history.len() {
        return 0;
    }

    let start = nearest_preceding_summary(history, summary_index).map_or(0, |p| p + 1);

    history[start..summary_index]
        .iter()
        .filter(|msg| !msg.is_summary())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(text: &str) -> Message {
        Message::user(text)
    }

    #[test]
    fn selects_back_to_start_when_no_prior_summary() {
        let h = vec![user("u0"), user("u1"), user("u2")];
        assert_eq!(
            messages_to_summarize(&h, 2),
            vec![user("u0"), user("u1"), user("u2")]
        );
    }

    #[test]
    fn selection_stops_at_nearest_preceding_summary() {
        let h = vec![
            user("u0"),
            user("u1"),
            Message::summary("s", true),
            user("u2"),
            user("u3"),
        ];
        assert_eq!(messages_to_summarize(&h, 3), vec![user("u2")]);
        assert_eq!(messages_to_summarize(&h, 4), vec![user("u2"), user("u3")]);
    }

    #[test]
    fn inactive_summary_is_still_a_selection_boundary() {
        // Nearest preceding summary of *any* active state bounds the span.
        let h = vec![user("u0"), Message::summary("off", false), user("u1")];
        assert_eq!(messages_to_summarize(&h, 2), vec![user("u1")]);
    }

    #[test]
    fn out_of_range_target_yields_empty() {
        let h = vec![user("u0")];
        assert!(messages_to_summarize(&h, 1).is_empty());
        assert!(messages_to_summarize(&h, 99).is_empty());
        assert!(messages_to_summarize(&[], 0).is_empty());
    }

    #[test]
    fn target_on_a_summary_excludes_it() {
        let h = vec![user("u0"), Message::summary("s", true)];
        // The span [0, 1] contains the summary itself; only ordinary
        // messages are collected.
        assert_eq!(messages_to_summarize(&h, 1), vec![user("u0")]);
    }

    #[test]
    fn count_covers_span_up_to_but_not_including_summary() {
        let h = vec![
            user("u0"),
            user("u1"),
            Message::summary("s", true),
            user("u2"),
        ];
        assert_eq!(count_shadowed_messages(&h, 2), 2);
    }

    #[test]
    fn count_stops_at_nearest_preceding_summary() {
        let h = vec![
            user("u0"),
            Message::summary("s1", true),
            user("u1"),
            user("u2"),
            Message::summary("s2", true),
        ];
        assert_eq!(count_shadowed_messages(&h, 4), 2);
        assert_eq!(count_shadowed_messages(&h, 1), 1);
    }

    #[test]
    fn count_out_of_range_is_zero() {
        let h = vec![user("u0")];
        assert_eq!(count_shadowed_messages(&h, 5), 0);
        assert_eq!(count_shadowed_messages(&[], 0), 0);
    }
}
