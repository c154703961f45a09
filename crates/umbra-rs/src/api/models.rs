//! Static model capability lookup.
//!
//! Used only to shape requests — the summarization logic proper never
//! branches on these. Matching is by name fragment after stripping any
//! provider prefix, so `anthropic/claude-opus-4` and `claude-opus-4`
//! resolve identically. Unknown models get conservative defaults: no
//! reasoning, modest output ceiling.

/// Model name with any `vendor/` prefix stripped, lowercased.
fn bare_name(model: &str) -> String {
    model.rsplit('/').next().unwrap_or(model).to_lowercase()
}

/// Whether the model supports extended thinking / reasoning output.
pub fn supports_reasoning(model: &str) -> bool {
    let name = bare_name(model);
    name.starts_with("o1")
        || name.starts_with("o3")
        || name.starts_with("o4")
        || name.contains("opus-4")
        || name.contains("sonnet-4")
        || name.contains("3-7-sonnet")
        || name.contains("thinking")
        || name.contains("deepseek-r1")
}

/// Maximum output tokens the model can produce in one response.
pub fn max_output_tokens(model: &str) -> u32 {
    let name = bare_name(model);
    if name.contains("opus") {
        32_000
    } else if name.contains("sonnet-4") || name.contains("3-7-sonnet") {
        64_000
    } else if name.contains("sonnet") {
        8_192
    } else if name.contains("haiku") {
        8_192
    } else if name.starts_with("o1") || name.starts_with("o3") || name.starts_with("o4") {
        100_000
    } else if name.contains("gpt-4o-mini") || name.contains("4o-mini") {
        16_384
    } else if name.contains("gpt-4o") {
        16_384
    } else if name.contains("gpt-4") {
        8_192
    } else {
        4_096
    }
}

/// Default thinking-token budget for reasoning-capable models. Zero when
/// the model does not support reasoning.
pub fn thinking_budget(model: &str) -> u32 {
    if !supports_reasoning(model) {
        return 0;
    }
    let name = bare_name(model);
    if name.contains("opus") {
        16_000
    } else if name.contains("sonnet") {
        10_000
    } else {
        4_096
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_prefix_is_ignored() {
        assert_eq!(
            supports_reasoning("anthropic/claude-sonnet-4"),
            supports_reasoning("claude-sonnet-4")
        );
        assert_eq!(
            max_output_tokens("openai/gpt-4o-mini"),
            max_output_tokens("gpt-4o-mini")
        );
    }

    #[test]
    fn reasoning_models_detected() {
        assert!(supports_reasoning("o3-mini"));
        assert!(supports_reasoning("claude-opus-4"));
        assert!(supports_reasoning("claude-3-7-sonnet-latest"));
        assert!(!supports_reasoning("gpt-4o-mini"));
        assert!(!supports_reasoning("claude-3-5-haiku-latest"));
    }

    #[test]
    fn unknown_models_get_conservative_defaults() {
        assert!(!supports_reasoning("mystery-model"));
        assert_eq!(max_output_tokens("mystery-model"), 4_096);
        assert_eq!(thinking_budget("mystery-model"), 0);
    }

    #[test]
    fn budget_is_zero_without_reasoning_support() {
        assert_eq!(thinking_budget("gpt-4o"), 0);
        assert!(thinking_budget("claude-sonnet-4") > 0);
    }
}
