use crate::*;

fn registry() -> DialectRegistry {
    DialectRegistry::default_dialects()
}

#[test]
fn every_recognized_keyword_normalizes_cleanly() {
    let reg = registry();
    let inputs = [
        "flowchart TD\nA-->B",
        "graph LR\nA---B",
        "sequenceDiagram\nA->>B: hi",
        "classDiagram\nclass A",
        "erDiagram\nA ||--o{ B : has",
        "stateDiagram\n[*] --> A",
        "gantt\n  dateFormat  YYYY-MM-DD\nsection S",
        "journey\n  title T\nsection S",
        "pie\n  title T\n\"a\" : 1",
        "mindmap\n  root",
        "timeline\n2024 : event",
    ];
    for input in inputs {
        let res = normalize(input, &reg);
        assert_eq!(res.error, None, "for {input:?}");
        assert!(
            reg.detect(&res.code).is_some(),
            "output no longer starts with a recognized keyword: {:?}",
            res.code
        );
    }
}

#[test]
fn unrecognized_text_is_coerced_into_a_flowchart() {
    let res = normalize("A-->B", &registry());
    assert_eq!(res.error, None);
    assert_eq!(res.code, "flowchart TD\nA-->B");
}

#[test]
fn aliases_resolve_to_flowchart() {
    let reg = registry();
    for input in ["networkDiagram\nA-->B", "architectureDiagram\nA-->B"] {
        let res = normalize(input, &reg);
        assert_eq!(res.error, None, "for {input:?}");
        assert!(res.code.starts_with("flowchart TD"), "got {:?}", res.code);
    }
}

#[test]
fn aliases_match_case_insensitively() {
    let res = normalize("networkdiagram\nA-->B", &registry());
    assert_eq!(res.error, None);
    assert!(res.code.starts_with("flowchart TD"));
}

#[test]
fn residual_inline_fences_are_removed() {
    let res = normalize("```mermaid\nflowchart TD\nA-->B\n```", &registry());
    assert_eq!(res.error, None);
    assert_eq!(res.code, "flowchart TD\nA-->B");
}

#[test]
fn multi_word_subgraph_names_are_quoted() {
    let res = normalize("flowchart TD\nsubgraph My Group\nA-->B\nend", &registry());
    assert!(res.code.contains("subgraph \"My Group\""), "got {:?}", res.code);
}

#[test]
fn already_quoted_subgraph_names_are_not_quoted_again() {
    let input = "flowchart TD\nsubgraph \"My Group\"\nA-->B\nend";
    let res = normalize(input, &registry());
    assert!(res.code.contains("subgraph \"My Group\""));
    assert!(!res.code.contains("\"\"My Group\"\""));
    assert!(!res.code.contains("subgraph \"\""));
}

#[test]
fn trailing_quoted_edge_labels_become_inline_labels() {
    let res = normalize("flowchart TD\nA -- \"label\" --> B", &registry());
    assert!(res.code.contains("-->|label|"), "got {:?}", res.code);
    assert!(!res.code.contains("-- \"label\""));
}

#[test]
fn sequence_subgraph_blocks_are_stripped() {
    let res = normalize(
        "sequenceDiagram\nsubgraph X\nA->>B: hi\nend\nB->>A: yo",
        &registry(),
    );
    assert_eq!(res.error, None);
    assert!(!res.code.contains("subgraph"), "got {:?}", res.code);
    assert!(res.code.contains("B->>A: yo"));
}

#[test]
fn fenced_sequence_round_trip_loses_its_subgraph() {
    let raw = "```mermaid\nsequenceDiagram\nsubgraph X\nA->>B: hi\nend\n```";
    let stripped = strip_markdown_fences(raw);
    let res = normalize(&stripped, &registry());
    assert_eq!(res.error, None);
    assert!(!res.code.contains("subgraph"));
    assert!(!res.code.contains("\nend"));
}

#[test]
fn gantt_without_date_format_gets_exactly_one() {
    let res = normalize("gantt\nsection S\ntask :a, 2024-01-01, 1d", &registry());
    assert_eq!(res.error, None);
    let occurrences = res.code.matches("dateFormat").count();
    assert_eq!(occurrences, 1);
    let second_line = res.code.lines().nth(1).unwrap_or_default();
    assert!(
        second_line.trim_start().starts_with("dateFormat"),
        "dateFormat not immediately after the header: {:?}",
        res.code
    );
}

#[test]
fn gantt_with_date_format_is_untouched() {
    let input = "gantt\n  dateFormat  DD-MM-YYYY\nsection S";
    let res = normalize(input, &registry());
    assert_eq!(res.code.matches("dateFormat").count(), 1);
    assert!(res.code.contains("DD-MM-YYYY"));
}

#[test]
fn pie_without_title_gets_a_default_one() {
    let res = normalize("pie\n\"a\" : 1", &registry());
    assert!(res.code.contains("title Pie Chart"), "got {:?}", res.code);
}

#[test]
fn journey_without_title_gets_a_default_one() {
    let res = normalize("journey\nsection S", &registry());
    assert!(res.code.contains("title Journey"), "got {:?}", res.code);
}

#[test]
fn journey_with_title_is_untouched() {
    let input = "journey\n  title My day\nsection S";
    let res = normalize(input, &registry());
    assert_eq!(res.code, input);
}

#[test]
fn class_dialect_has_no_rewrites() {
    let input = "classDiagram\nclass A {\n  +run()\n}";
    let res = normalize(input, &registry());
    assert_eq!(res.code, input);
    assert_eq!(res.error, None);
}

#[test]
fn empty_input_still_yields_a_flowchart_header() {
    let res = normalize("", &registry());
    assert_eq!(res.error, None);
    assert!(res.code.starts_with("flowchart TD"));
}
