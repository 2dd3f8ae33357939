mod ranking;

use std::collections::BTreeMap;

use log::trace;

use crate::config::LayoutConfig;
use crate::ir::{Edge, FlowGraph, Node, Position, StartNode};

pub use ranking::{TierAssignment, assign_tiers};

/// Result of laying out a flow: the input nodes with positions attached,
/// in input order.
#[derive(Debug, Clone)]
pub struct Layout {
    pub start_id: String,
    pub anchor: Position,
    pub nodes: Vec<Node>,
    pub tiers: TierAssignment,
}

impl Layout {
    pub fn position_of(&self, id: &str) -> Option<Position> {
        self.nodes
            .iter()
            .find(|node| node.id == id)
            .and_then(|node| node.position)
    }

    /// Node ids grouped by tier, each row in input order.
    pub fn rows(&self) -> BTreeMap<usize, Vec<&str>> {
        let mut rows: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
        for node in &self.nodes {
            if let Some(tier) = self.tiers.tier_of(&node.id) {
                rows.entry(tier).or_default().push(node.id.as_str());
            }
        }
        rows
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }
}

pub fn compute_layout(graph: &FlowGraph, config: &LayoutConfig) -> Layout {
    layout_nodes(
        &graph.nodes,
        &graph.edges,
        graph.start_node.as_ref(),
        config,
    )
}

/// Places every node on a tier grid hanging from the start node.
///
/// Existing positions are ignored: each call is a full relayout. The start
/// node, when absent, falls back to `config.start_id` at `config.anchor`.
pub fn layout_nodes(
    nodes: &[Node],
    edges: &[Edge],
    start: Option<&StartNode>,
    config: &LayoutConfig,
) -> Layout {
    let (start_id, anchor) = match start {
        Some(start) => (start.id.clone(), start.position),
        None => (config.start_id.clone(), config.anchor),
    };

    if nodes.is_empty() {
        return Layout {
            start_id,
            anchor,
            nodes: Vec::new(),
            tiers: TierAssignment::default(),
        };
    }

    let tiers = assign_tiers(nodes, edges, &start_id, config.convergence);

    let mut rows: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (idx, node) in nodes.iter().enumerate() {
        let tier = tiers.tier_of(&node.id).unwrap_or(tiers.max_reached + 1);
        rows.entry(tier).or_default().push(idx);
    }

    let mut placed = nodes.to_vec();
    for (tier, members) in &rows {
        let y = anchor.y + *tier as f32 * config.tier_spacing;
        let xs = row_offsets(members.len(), config.sibling_spacing);
        for (idx, dx) in members.iter().zip(xs) {
            placed[*idx].position = Some(Position::new(anchor.x + dx, y));
        }
        trace!("tier {tier}: {} node(s) at y={y}", members.len());
    }

    Layout {
        start_id,
        anchor,
        nodes: placed,
        tiers,
    }
}

/// Horizontal offsets for `count` siblings, centred on zero.
fn row_offsets(count: usize, spacing: f32) -> Vec<f32> {
    let center = (count as f32 - 1.0) / 2.0;
    (0..count)
        .map(|i| (i as f32 - center) * spacing)
        .collect()
}
