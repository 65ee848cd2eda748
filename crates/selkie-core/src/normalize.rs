use crate::detect::{Dialect, DialectRegistry};
use regex::Regex;

/// Outcome of normalizing one piece of diagram source text.
///
/// `code` is always populated — on failure it still carries the best-effort rewritten text so the
/// caller can display what was attempted. `error` is set if and only if no dialect tag could be
/// determined after default-dialect injection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeResult {
    pub code: String,
    pub error: Option<String>,
}

fn inline_fence_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new("```mermaid|```").expect("valid regex"))
}

fn alias_header_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^\s*(networkDiagram|architectureDiagram)").expect("valid regex")
    })
}

fn subgraph_name_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"subgraph\s+([A-Za-z0-9_-]+\s+[A-Za-z0-9_-]+)").expect("valid regex")
    })
}

fn quoted_edge_label_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"--\s*"([^"]+)"\s*-->"#).expect("valid regex"))
}

fn sequence_subgraph_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)subgraph .*?end").expect("valid regex"))
}

fn gantt_header_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^gantt").expect("valid regex"))
}

fn pie_header_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^pie").expect("valid regex"))
}

fn journey_header_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^journey").expect("valid regex"))
}

fn title_declaration_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)title\s+").expect("valid regex"))
}

fn leading_dialect_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(flowchart|graph|sequenceDiagram|classDiagram|erDiagram|stateDiagram|gantt|journey|pie|mindmap|timeline)",
        )
        .expect("valid regex")
    })
}

/// Normalizes fence-stripped diagram source into text the rendering engine accepts.
///
/// Text without a recognized leading keyword is coerced into a flowchart rather than rejected.
/// The final validation should be unreachable given that injection; it is retained as a defensive
/// invariant check.
pub fn normalize(raw: &str, registry: &DialectRegistry) -> NormalizeResult {
    let mut code = raw.trim().to_string();

    code = inline_fence_regex().replace_all(&code, "").trim().to_string();

    let dialect = if alias_header_regex().is_match(&code) {
        code = alias_header_regex().replace(&code, "flowchart TD").to_string();
        Dialect::Flowchart
    } else {
        match registry.detect(&code) {
            Some(dialect) => dialect,
            None => {
                code = format!("flowchart TD\n{code}");
                Dialect::Flowchart
            }
        }
    };
    tracing::debug!(%dialect, "normalizing diagram code");

    code = apply_dialect_repairs(dialect, code);

    if !leading_dialect_regex().is_match(&code) {
        return NormalizeResult {
            code,
            error: Some("Unknown or unsupported diagram type.".to_string()),
        };
    }

    NormalizeResult { code, error: None }
}

fn apply_dialect_repairs(dialect: Dialect, code: String) -> String {
    match dialect {
        Dialect::Flowchart | Dialect::Graph => repair_flowchart(code),
        Dialect::Sequence => strip_sequence_subgraphs(code),
        Dialect::Gantt => ensure_gantt_date_format(code),
        Dialect::Pie => ensure_title(code, pie_header_regex(), "pie\n  title Pie Chart"),
        Dialect::Journey => ensure_title(code, journey_header_regex(), "journey\n  title Journey"),
        _ => code,
    }
}

fn repair_flowchart(code: String) -> String {
    // Subgraph names containing whitespace must be quoted. The character class excludes `"`, so
    // names that are already quoted cannot match again.
    let code = subgraph_name_regex()
        .replace_all(&code, r#"subgraph "$1""#)
        .to_string();

    // `-- "label" -->` is rewritten into the inline-label form `-->|label|`.
    quoted_edge_label_regex()
        .replace_all(&code, "-->|$1|")
        .to_string()
}

fn strip_sequence_subgraphs(code: String) -> String {
    // `subgraph ... end` is not part of the sequence grammar; drop the whole block.
    sequence_subgraph_regex().replace_all(&code, "").to_string()
}

fn ensure_gantt_date_format(code: String) -> String {
    if code.contains("dateFormat") {
        return code;
    }
    gantt_header_regex()
        .replace(&code, "gantt\n  dateFormat  YYYY-MM-DD")
        .to_string()
}

fn ensure_title(code: String, header: &Regex, replacement: &str) -> String {
    if title_declaration_regex().is_match(&code) {
        return code;
    }
    header.replace(&code, replacement).to_string()
}
