#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod router;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{
    Config, ConvergencePolicy, LayoutConfig, LayoutOverrides, RouterConfig, load_config,
};
pub use error::FlowboardError;
pub use ir::{Edge, FlowGraph, Node, Position, StartNode};
pub use layout::{Layout, TierAssignment, assign_tiers, compute_layout, layout_nodes};
pub use layout_dump::LayoutDump;
pub use router::{
    History, MemoryHistory, PathCodec, Subscription, View, ViewContext, ViewRouter, ViewState,
};
