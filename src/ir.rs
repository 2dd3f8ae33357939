use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A flow-chart node as produced by the flow generator.
///
/// Fields other than `id` and `position` are carried through layout untouched
/// so the result can be stored back verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            position: None,
            extra: Map::new(),
        }
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    #[serde(alias = "source")]
    pub from: String,
    #[serde(alias = "target")]
    pub to: String,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartNode {
    pub id: String,
    pub position: Position,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowGraph {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_node: Option<StartNode>,
}

impl FlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn ensure_node(&mut self, id: &str) {
        if !self.nodes.iter().any(|node| node.id == id) {
            self.nodes.push(Node::new(id));
        }
    }

    pub fn add_edge(&mut self, from: &str, to: &str) {
        self.edges.push(Edge::new(from, to));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_source_target_aliases() {
        let graph: FlowGraph = serde_json::from_str(
            r#"{"nodes":[{"id":"a","type":"message","data":{"text":"hola"}}],
                "edges":[{"source":"start","target":"a"}],
                "startNode":{"id":"start","position":{"x":10,"y":20}}}"#,
        )
        .unwrap();
        assert_eq!(graph.edges[0], Edge::new("start", "a"));
        assert_eq!(graph.nodes[0].extra.get("type"), Some(&Value::from("message")));
        assert_eq!(
            graph.start_node.unwrap().position,
            Position::new(10.0, 20.0)
        );
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let graph = FlowGraph::from_json(r#"{"nodes":[{"id":"solo"}]}"#).unwrap();
        assert_eq!(graph.nodes.len(), 1);
        assert!(graph.edges.is_empty());
        assert!(graph.start_node.is_none());
        assert!(FlowGraph::from_json("[1, 2]").is_err());
    }

    #[test]
    fn preserves_unknown_node_fields() {
        let mut node: Node =
            serde_json::from_str(r#"{"id":"n1","label":"Saludo","data":{"delay":3}}"#).unwrap();
        node.position = Some(Position::new(1.0, 2.0));
        let out = serde_json::to_value(&node).unwrap();
        assert_eq!(out["label"], "Saludo");
        assert_eq!(out["data"]["delay"], 3);
        assert_eq!(out["position"]["x"], 1.0);
    }
}
