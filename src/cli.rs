use crate::config::{Config, ConvergencePolicy, load_config};
use crate::ir::FlowGraph;
use crate::layout::{Layout, compute_layout};
use crate::layout_dump::{LayoutDump, write_layout_dump};
use crate::router::{PathCodec, View, ViewContext, ViewState};
use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{LevelFilter, debug, info};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(
    name = "flowboard",
    version,
    about = "Dashboard view routing and flow-chart auto-layout"
)]
pub struct Args {
    /// Config file (JSON or JSON5)
    #[arg(short = 'c', long = "configFile", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long = "log-level", default_value = "warn", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Place the nodes of a flow document ({nodes, edges, startNode?})
    Layout {
        /// Input file or '-' for stdin
        #[arg(short = 'i', long = "input")]
        input: Option<PathBuf>,

        /// Output file. Defaults to stdout.
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,

        /// Write tiers and coordinates instead of the positioned flow
        #[arg(long = "dump")]
        dump: bool,

        /// Override the configured convergence policy
        #[arg(long = "convergence", value_enum)]
        convergence: Option<ConvergencePolicy>,
    },
    /// Translate between dashboard paths and view states
    Route {
        #[command(subcommand)]
        action: RouteAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum RouteAction {
    /// Print the view state a path decodes to, as JSON
    Decode { path: String },
    /// Print the canonical path of a view state
    Encode {
        view: String,
        sub: Option<String>,
        id: Option<String>,
    },
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logger(&args.log_level);
    debug!("parsed arguments: {args:?}");

    let mut config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Layout {
            input,
            output,
            dump,
            convergence,
        } => {
            if let Some(policy) = convergence {
                config.layout.convergence = policy;
            }
            let source = read_input(input.as_deref())?;
            run_layout(&source, &config, dump, output.as_deref())?;
        }
        Command::Route { action } => {
            let codec = PathCodec::from_config(&config.router);
            let rendered = render_route(&action, &codec)?;
            write_output(&rendered, None)?;
        }
    }

    Ok(())
}

fn init_logger(level: &str) {
    let level = LevelFilter::from_str(level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {level}. Using 'warn' instead.");
        LevelFilter::Warn
    });
    let _ = env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(level)
        .try_init();
}

fn run_layout(source: &str, config: &Config, dump: bool, output: Option<&Path>) -> Result<()> {
    if let (true, Some(path)) = (dump, output) {
        let (_, layout) = lay_out(source, config)?;
        write_layout_dump(path, &layout)?;
        return Ok(());
    }
    let rendered = render_layout(source, config, dump)?;
    write_output(&rendered, output)
}

fn lay_out(source: &str, config: &Config) -> Result<(FlowGraph, Layout)> {
    let graph = FlowGraph::from_json(source)?;
    let layout = compute_layout(&graph, &config.layout);
    info!(
        "placed {} node(s) across {} tier(s)",
        layout.nodes.len(),
        layout.rows().len()
    );
    Ok((graph, layout))
}

fn render_layout(source: &str, config: &Config, dump: bool) -> Result<String> {
    let (graph, layout) = lay_out(source, config)?;
    if dump {
        return Ok(serde_json::to_string_pretty(&LayoutDump::from_layout(
            &layout,
        ))?);
    }
    let placed = FlowGraph {
        nodes: layout.into_nodes(),
        edges: graph.edges,
        start_node: graph.start_node,
    };
    Ok(serde_json::to_string_pretty(&placed)?)
}

fn render_route(action: &RouteAction, codec: &PathCodec) -> Result<String> {
    match action {
        RouteAction::Decode { path } => {
            Ok(serde_json::to_string_pretty(&codec.decode(path))?)
        }
        RouteAction::Encode { view, sub, id } => {
            let context = sub.as_ref().map(|sub| ViewContext {
                sub: sub.clone(),
                id: id.clone(),
            });
            if context.is_none() && id.is_some() {
                return Err(anyhow::anyhow!("an id needs a sub-view"));
            }
            let state = ViewState::new(View::from_segment(view), context);
            Ok(codec.encode(&state))
        }
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn write_output(rendered: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, format!("{rendered}\n"))?,
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{rendered}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_output_keeps_flow_shape() {
        let source = r#"{
            "nodes": [{"id": "a", "type": "mensaje"}, {"id": "b"}],
            "edges": [{"source": "start", "target": "a"}, {"from": "a", "to": "b"}]
        }"#;
        let rendered = render_layout(source, &Config::default(), false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["nodes"][0]["type"], "mensaje");
        assert_eq!(value["nodes"][0]["position"]["y"], 210.0);
        assert_eq!(value["nodes"][1]["position"]["y"], 370.0);
        assert_eq!(value["edges"][1]["from"], "a");
    }

    #[test]
    fn layout_dump_reports_tiers() {
        let source = r#"{"nodes": [{"id": "a"}], "edges": []}"#;
        let rendered = render_layout(source, &Config::default(), true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["tierCount"], 1);
        assert_eq!(value["nodes"][0]["tier"], 1);
    }

    #[test]
    fn dump_to_file_writes_tiers() {
        let path = std::env::temp_dir().join(format!("flowboard-dump-{}.json", std::process::id()));
        let source = r#"{"nodes": [{"id": "a"}, {"id": "orphan"}], "edges": [{"from": "start", "to": "a"}]}"#;
        run_layout(source, &Config::default(), true, Some(&path)).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["trailingTier"], 2);
        assert_eq!(value["nodes"][1]["id"], "orphan");
        assert_eq!(value["nodes"][1]["reached"], false);
    }

    #[test]
    fn route_decode_and_encode() {
        let codec = PathCodec::default();
        let decoded = render_route(
            &RouteAction::Decode {
                path: "/dashboard/tareas/editor/42".to_string(),
            },
            &codec,
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&decoded).unwrap();
        assert_eq!(value["view"], "tareas");
        assert_eq!(value["context"]["id"], "42");

        let encoded = render_route(
            &RouteAction::Encode {
                view: "tareas".to_string(),
                sub: Some("editor".to_string()),
                id: Some("42".to_string()),
            },
            &codec,
        )
        .unwrap();
        assert_eq!(encoded, "/dashboard/tareas/editor/42");
    }

    #[test]
    fn encode_rejects_id_without_sub() {
        let result = render_route(
            &RouteAction::Encode {
                view: "tareas".to_string(),
                sub: None,
                id: Some("42".to_string()),
            },
            &PathCodec::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn args_parse_subcommands() {
        let args = Args::try_parse_from([
            "flowboard",
            "layout",
            "-i",
            "flow.json",
            "--convergence",
            "propagate",
        ])
        .unwrap();
        match args.command {
            Command::Layout { convergence, .. } => {
                assert_eq!(convergence, Some(ConvergencePolicy::Propagate))
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
