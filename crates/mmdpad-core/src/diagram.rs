//! Diagram documents and diagram-type detection.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Title given to documents that were never named
pub const DEFAULT_TITLE: &str = "Untitled Diagram";

/// Diagram identifier - UUID so documents can be copied between stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiagramId(pub Uuid);

impl DiagramId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DiagramId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DiagramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DiagramId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Kind of diagram, taken from the source's header line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramType {
    #[default]
    Flowchart,
    Sequence,
    Class,
    State,
    Er,
    Gantt,
    Journey,
    Gitgraph,
    Pie,
    Mindmap,
}

/// Header keywords, lowercased, checked in order
const HEADERS: &[(&str, DiagramType)] = &[
    ("sequencediagram", DiagramType::Sequence),
    ("classdiagram", DiagramType::Class),
    ("statediagram", DiagramType::State),
    ("erdiagram", DiagramType::Er),
    ("gantt", DiagramType::Gantt),
    ("journey", DiagramType::Journey),
    ("gitgraph", DiagramType::Gitgraph),
    ("pie", DiagramType::Pie),
    ("mindmap", DiagramType::Mindmap),
];

impl DiagramType {
    pub const ALL: [DiagramType; 10] = [
        DiagramType::Flowchart,
        DiagramType::Sequence,
        DiagramType::Class,
        DiagramType::State,
        DiagramType::Er,
        DiagramType::Gantt,
        DiagramType::Journey,
        DiagramType::Gitgraph,
        DiagramType::Pie,
        DiagramType::Mindmap,
    ];

    /// Guess the type from the first non-blank line; anything unknown is a flowchart
    pub fn detect(content: &str) -> Self {
        let Some(first_line) = content.lines().map(str::trim).find(|l| !l.is_empty()) else {
            return DiagramType::Flowchart;
        };
        let first_line = first_line.to_lowercase();
        HEADERS
            .iter()
            .find(|(keyword, _)| first_line.contains(keyword))
            .map(|(_, kind)| *kind)
            .unwrap_or_default()
    }

    pub fn name(&self) -> &'static str {
        match self {
            DiagramType::Flowchart => "flowchart",
            DiagramType::Sequence => "sequence",
            DiagramType::Class => "class",
            DiagramType::State => "state",
            DiagramType::Er => "er",
            DiagramType::Gantt => "gantt",
            DiagramType::Journey => "journey",
            DiagramType::Gitgraph => "gitgraph",
            DiagramType::Pie => "pie",
            DiagramType::Mindmap => "mindmap",
        }
    }
}

impl fmt::Display for DiagramType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A stored diagram document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    pub id: DiagramId,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub diagram_type: DiagramType,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub share_token: Option<String>,
    #[serde(default)]
    pub view_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Diagram {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        let now = Utc::now();
        Self {
            id: DiagramId::new(),
            title: normalize_title(title.into()),
            diagram_type: DiagramType::detect(&content),
            content,
            is_public: false,
            share_token: None,
            view_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace title and content, re-detecting the type
    pub fn edit(&mut self, title: impl Into<String>, content: impl Into<String>) {
        self.title = normalize_title(title.into());
        self.content = content.into();
        self.diagram_type = DiagramType::detect(&self.content);
        self.updated_at = Utc::now();
    }
}

fn normalize_title(title: String) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_from_first_non_blank_line() {
        assert_eq!(DiagramType::detect("\n\n  sequenceDiagram\n  A->>B: hi"), DiagramType::Sequence);
        assert_eq!(DiagramType::detect("classDiagram\n  class A"), DiagramType::Class);
        assert_eq!(DiagramType::detect("erDiagram"), DiagramType::Er);
        assert_eq!(DiagramType::detect("stateDiagram-v2"), DiagramType::State);
        assert_eq!(DiagramType::detect("gitGraph\n commit"), DiagramType::Gitgraph);
        assert_eq!(DiagramType::detect("pie title Pets"), DiagramType::Pie);
    }

    #[test]
    fn unknown_or_empty_is_flowchart() {
        assert_eq!(DiagramType::detect(""), DiagramType::Flowchart);
        assert_eq!(DiagramType::detect("graph TD\n A-->B"), DiagramType::Flowchart);
        assert_eq!(DiagramType::detect("flowchart LR"), DiagramType::Flowchart);
    }

    #[test]
    fn blank_titles_fall_back_to_default() {
        let diagram = Diagram::new("   ", "gantt");
        assert_eq!(diagram.title, DEFAULT_TITLE);
        assert_eq!(diagram.diagram_type, DiagramType::Gantt);
    }

    #[test]
    fn edit_redetects_type() {
        let mut diagram = Diagram::new("Flow", "flowchart TD");
        let created = diagram.updated_at;
        diagram.edit("Seq", "sequenceDiagram");
        assert_eq!(diagram.diagram_type, DiagramType::Sequence);
        assert!(diagram.updated_at >= created);
    }

    #[test]
    fn serializes_type_under_type_key() {
        let diagram = Diagram::new("Pie", "pie");
        let json = serde_json::to_value(&diagram).unwrap();
        assert_eq!(json["type"], "pie");
        assert_eq!(json["is_public"], false);
    }
}
