//! Conversation history: ownership, shadow resolution, candidate selection.
//!
//! Three pieces with a strict division of labor:
//!
//! 1. **[`store`]** — [`MessageStore`] owns the history and is the only
//!    place it is mutated. Content is normalized to a string at ingestion.
//!
//! 2. **[`shadow`]** — the Shadow Resolver. Computes the API view of a
//!    history snapshot: which entries go upstream on the next turn. Uses
//!    the forward/global rule: an ordinary message is shadowed if **any**
//!    active summary exists after it.
//!
//! 3. **[`select`]** — the Candidate Selector. Computes which messages a
//!    new summary would fold, and how many an existing one shadows for
//!    display. Uses the backward/local rule: scan back to the **nearest**
//!    preceding summary.
//!
//! The two rules are different on purpose and must not be unified: the
//! resolver answers "what does the API see", the selector answers "what
//! does this one summary cover". See each module's docs.

pub mod select;
pub mod shadow;
pub mod store;

pub use select::{count_shadowed_messages, messages_to_summarize};
pub use shadow::{build_messages_for_api, find_summary_indices};
pub use store::MessageStore;
