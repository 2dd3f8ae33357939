use crate::error::Result;
use crate::layout::Layout;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub start_id: String,
    pub anchor: [f32; 2],
    pub tier_count: usize,
    pub trailing_tier: Option<usize>,
    pub nodes: Vec<NodeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub tier: usize,
    pub reached: bool,
    pub x: f32,
    pub y: f32,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout) -> Self {
        let nodes = layout
            .nodes
            .iter()
            .map(|node| {
                let position = node.position.unwrap_or(layout.anchor);
                NodeDump {
                    id: node.id.clone(),
                    tier: layout.tiers.tier_of(&node.id).unwrap_or(0),
                    reached: layout.tiers.is_reached(&node.id),
                    x: position.x,
                    y: position.y,
                }
            })
            .collect();

        LayoutDump {
            start_id: layout.start_id.clone(),
            anchor: [layout.anchor.x, layout.anchor.y],
            tier_count: layout.rows().len(),
            trailing_tier: layout.tiers.trailing_tier(),
            nodes,
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &Layout) -> Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
