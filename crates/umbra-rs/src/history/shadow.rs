//! Shadow Resolver: compute the API view of a history snapshot.
//!
//! An active summary shadows **everything** strictly before its index —
//! ordinary messages and the regions behind other summaries alike. The
//! rule is global: an ordinary message at index `i` is excluded iff any
//! active summary exists at some index `j > i`. It is *not* a
//! nearest-boundary rule; an inactive summary sitting between a message
//! and a later active summary does not protect the message.
//!
//! Inactive summaries are invisible here: they neither shadow nor appear
//! in the output.
//!
//! Everything in this module is a pure, total function over a snapshot.
//! The resolver runs on every render and every outbound API call, so
//! idempotence is load-bearing: same input, same output, no mutation.

use crate::Message;

/// Compute the subset of `history` to send to the upstream API.
///
/// - Summary entries are included iff active.
/// - Ordinary messages are included unless an active summary exists at
///   any later index.
/// - Relative order is preserved.
///
/// Empty history yields an empty result; a history with no summaries is
/// returned unchanged.
pub fn build_messages_for_api(history: &[Message]) -> Vec<Message> {
    // The global rule collapses to a single boundary: the last active
    // summary. Ordinary messages at or before it are shadowed by it (or by
    // an earlier active summary, same outcome); everything after it has no
    // active summary ahead and survives.
    let last_active = history.iter().rposition(Message::is_active_summary);

    history
        .iter()
        .enumerate()
        .filter(|(i, msg)| {
            if msg.is_summary() {
                msg.is_active_summary()
            } else {
                match last_active {
                    Some(j) => *i > j,
                    None => true,
                }
            }
        })
        .map(|(_, msg)| msg.clone())
        .collect()
}

/// All indices holding a summary entry (active or not), in order.
pub fn find_summary_indices(history: &[Message]) -> Vec<usize> {
    history
        .iter()
        .enumerate()
        .filter(|(_, msg)| msg.is_summary())
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(text: &str) -> Message {
        Message::user(text)
    }

    fn assistant(text: &str) -> Message {
        Message::assistant(text)
    }

    #[test]
    fn empty_history_yields_empty_result() {
        assert!(build_messages_for_api(&[]).is_empty());
    }

    #[test]
    fn no_summaries_is_identity() {
        let h = vec![user("u0"), assistant("a0"), user("u1")];
        assert_eq!(build_messages_for_api(&h), h);
    }

    #[test]
    fn active_summary_shadows_everything_before_it() {
        let h = vec![
            user("u0"),
            assistant("a0"),
            user("u1"),
            assistant("a1"),
            Message::summary("folded", true),
            user("u2"),
        ];
        let api = build_messages_for_api(&h);
        assert_eq!(api, vec![Message::summary("folded", true), user("u2")]);
    }

    #[test]
    fn inactive_summary_is_invisible_and_non_shadowing() {
        let h = vec![user("u0"), Message::summary("folded", false), user("u1")];
        let api = build_messages_for_api(&h);
        assert_eq!(api, vec![user("u0"), user("u1")]);
    }

    #[test]
    fn multiple_active_summaries_are_all_retained() {
        let h = vec![
            user("u0"),
            Message::summary("s1", true),
            user("u1"),
            Message::summary("s2", true),
            user("u2"),
        ];
        // u0 is shadowed by s1 (and s2), u1 by s2, u2 by nothing.
        let api = build_messages_for_api(&h);
        assert_eq!(
            api,
            vec![
                Message::summary("s1", true),
                Message::summary("s2", true),
                user("u2"),
            ]
        );
    }

    #[test]
    fn inactive_summary_between_does_not_protect() {
        // The rule is "any later active summary", not "nearest summary":
        // u0 sits behind an inactive summary, but an active one further
        // ahead still shadows it.
        let h = vec![
            user("u0"),
            Message::summary("off", false),
            user("u1"),
            Message::summary("on", true),
            user("u2"),
        ];
        let api = build_messages_for_api(&h);
        assert_eq!(api, vec![Message::summary("on", true), user("u2")]);
    }

    #[test]
    fn resolver_is_idempotent() {
        let h = vec![
            user("u0"),
            Message::summary("s", true),
            user("u1"),
            assistant("a1"),
        ];
        let once = build_messages_for_api(&h);
        let twice = build_messages_for_api(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn appending_future_messages_does_not_reclassify_earlier_entries() {
        let base = vec![user("u0"), Message::summary("s", true), user("u1")];
        let before = build_messages_for_api(&base);

        let mut extended = base.clone();
        extended.push(assistant("a1"));
        let after = build_messages_for_api(&extended);

        // Earlier entries keep the same classification; only the appended
        // message joins the view.
        assert_eq!(&after[..before.len()], &before[..]);
        assert_eq!(after.last(), Some(&assistant("a1")));
    }

    #[test]
    fn find_summary_indices_lists_all_summaries_in_order() {
        let h = vec![
            user("u0"),
            Message::summary("s1", true),
            user("u1"),
            Message::summary("s2", false),
        ];
        assert_eq!(find_summary_indices(&h), vec![1, 3]);
        assert!(find_summary_indices(&[user("u0")]).is_empty());
    }
}
