use flowboard::config::LayoutOverrides;
use flowboard::{FlowGraph, PathCodec, ViewState, compute_layout};
use wasm_bindgen::prelude::*;

fn layout_flow_json(flow_json: &str, options_json: Option<&str>) -> Result<String, String> {
    let options = match options_json {
        Some(raw) => serde_json::from_str::<LayoutOverrides>(raw).map_err(|e| e.to_string())?,
        None => LayoutOverrides::default(),
    };
    let graph = FlowGraph::from_json(flow_json).map_err(|e| e.to_string())?;
    let layout = compute_layout(&graph, &options.into_config());
    let placed = FlowGraph {
        nodes: layout.into_nodes(),
        edges: graph.edges,
        start_node: graph.start_node,
    };
    serde_json::to_string(&placed).map_err(|e| e.to_string())
}

fn codec_for(base_path: Option<String>) -> PathCodec {
    base_path.map(|base| PathCodec::new(&base)).unwrap_or_default()
}

/// Returns the flow with a position on every node.
#[wasm_bindgen]
pub fn layout_flow(flow_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    layout_flow_json(flow_json, options_json.as_deref()).map_err(|error| JsValue::from_str(&error))
}

#[wasm_bindgen]
pub fn decode_view_path(path: &str, base_path: Option<String>) -> Result<String, JsValue> {
    let state = codec_for(base_path).decode(path);
    serde_json::to_string(&state).map_err(|error| JsValue::from_str(&error.to_string()))
}

#[wasm_bindgen]
pub fn encode_view_path(state_json: &str, base_path: Option<String>) -> Result<String, JsValue> {
    let state: ViewState =
        serde_json::from_str(state_json).map_err(|error| JsValue::from_str(&error.to_string()))?;
    Ok(codec_for(base_path).encode(&state.normalized()))
}
