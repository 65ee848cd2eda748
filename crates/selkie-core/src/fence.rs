use regex::Regex;

fn fenced_block_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^\s*```(?:mermaid|graphviz)?\s*\n?(.*?)\n?\s*```\s*$")
            .expect("valid regex")
    })
}

/// Strips a single markdown code fence wrapping the entire text.
///
/// The fence label is optional and, when present, must be a diagram-language tag (`mermaid`) or a
/// graph-language tag (`graphviz`). Text that is not one whole fenced block is returned trimmed
/// but otherwise unchanged. Total over all strings, and idempotent: stripping a second time is a
/// no-op.
pub fn strip_markdown_fences(code: &str) -> String {
    if let Some(caps) = fenced_block_regex().captures(code) {
        if let Some(inner) = caps.get(1) {
            let inner = inner.as_str().trim();
            if !inner.is_empty() {
                return inner.to_string();
            }
        }
    }
    code.trim().to_string()
}
