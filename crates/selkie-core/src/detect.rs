use regex::Regex;
use std::fmt;

/// One diagram sub-grammar, selected by the leading keyword of the source text.
///
/// `Flowchart` and `Graph` are two keywords for the same flowchart family and share the same
/// repairs; they are kept as distinct tags so detection mirrors the keyword that actually matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Flowchart,
    Graph,
    Sequence,
    Class,
    EntityRelationship,
    State,
    Gantt,
    Journey,
    Pie,
    Mindmap,
    Timeline,
}

impl Dialect {
    /// The leading keyword that selects this dialect.
    pub fn keyword(self) -> &'static str {
        match self {
            Dialect::Flowchart => "flowchart",
            Dialect::Graph => "graph",
            Dialect::Sequence => "sequenceDiagram",
            Dialect::Class => "classDiagram",
            Dialect::EntityRelationship => "erDiagram",
            Dialect::State => "stateDiagram",
            Dialect::Gantt => "gantt",
            Dialect::Journey => "journey",
            Dialect::Pie => "pie",
            Dialect::Mindmap => "mindmap",
            Dialect::Timeline => "timeline",
        }
    }

    pub fn is_flowchart_family(self) -> bool {
        matches!(self, Dialect::Flowchart | Dialect::Graph)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

pub type DetectorFn = fn(text: &str) -> bool;

#[derive(Debug, Clone)]
pub struct DialectDetector {
    pub dialect: Dialect,
    pub detector: DetectorFn,
}

#[derive(Debug, Clone)]
pub struct DialectRegistry {
    detectors: Vec<DialectDetector>,
}

impl DialectRegistry {
    pub fn new() -> Self {
        Self {
            detectors: Vec::new(),
        }
    }

    pub fn add(&mut self, detector: DialectDetector) {
        self.detectors.push(detector);
    }

    pub fn add_fn(&mut self, dialect: Dialect, detector: DetectorFn) {
        self.add(DialectDetector { dialect, detector });
    }

    /// Runs the detectors in registration order; first match wins.
    pub fn detect(&self, text: &str) -> Option<Dialect> {
        self.detectors
            .iter()
            .find(|det| (det.detector)(text))
            .map(|det| det.dialect)
    }

    /// All recognized dialects, in detection order.
    ///
    /// Detection is a leading-keyword match with no word-boundary check, so keywords that are
    /// prefixes of one another are ambiguous (`graph` also matches text starting with
    /// `graphviz`). The order here is significant: `flowchart` is tested before `graph`.
    pub fn default_dialects() -> Self {
        let mut reg = Self::new();

        reg.add_fn(Dialect::Flowchart, detector_flowchart);
        reg.add_fn(Dialect::Graph, detector_graph);
        reg.add_fn(Dialect::Sequence, detector_sequence);
        reg.add_fn(Dialect::Class, detector_class);
        reg.add_fn(Dialect::EntityRelationship, detector_er);
        reg.add_fn(Dialect::State, detector_state);
        reg.add_fn(Dialect::Gantt, detector_gantt);
        reg.add_fn(Dialect::Journey, detector_journey);
        reg.add_fn(Dialect::Pie, detector_pie);
        reg.add_fn(Dialect::Mindmap, detector_mindmap);
        reg.add_fn(Dialect::Timeline, detector_timeline);

        reg
    }
}

impl Default for DialectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn detector_flowchart(txt: &str) -> bool {
    Regex::new(r"^\s*flowchart").unwrap().is_match(txt)
}

fn detector_graph(txt: &str) -> bool {
    Regex::new(r"^\s*graph").unwrap().is_match(txt)
}

fn detector_sequence(txt: &str) -> bool {
    Regex::new(r"^\s*sequenceDiagram").unwrap().is_match(txt)
}

fn detector_class(txt: &str) -> bool {
    Regex::new(r"^\s*classDiagram").unwrap().is_match(txt)
}

fn detector_er(txt: &str) -> bool {
    Regex::new(r"^\s*erDiagram").unwrap().is_match(txt)
}

fn detector_state(txt: &str) -> bool {
    Regex::new(r"^\s*stateDiagram").unwrap().is_match(txt)
}

fn detector_gantt(txt: &str) -> bool {
    Regex::new(r"^\s*gantt").unwrap().is_match(txt)
}

fn detector_journey(txt: &str) -> bool {
    Regex::new(r"^\s*journey").unwrap().is_match(txt)
}

fn detector_pie(txt: &str) -> bool {
    Regex::new(r"^\s*pie").unwrap().is_match(txt)
}

fn detector_mindmap(txt: &str) -> bool {
    Regex::new(r"^\s*mindmap").unwrap().is_match(txt)
}

fn detector_timeline(txt: &str) -> bool {
    Regex::new(r"^\s*timeline").unwrap().is_match(txt)
}
