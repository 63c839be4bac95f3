use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use mindmark::Config;
use mindmark::layout::{Direction, LaidOutGraph};
use mindmark::outline::IdStrategy;
use mindmark::session::{chunk_text, replay};
use tracing::Level;

/// Markdown outline to mind-map graph pipeline
#[derive(Parser, Debug)]
#[command(name = "mindmark")]
#[command(version)]
#[command(about = "Parse markdown outlines into laid-out mind-map graphs", long_about = None)]
struct Cli {
    /// Log pipeline stages to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Lay out a complete outline and write the graph as JSON
    Render {
        /// Input markdown file (use "-" for stdin)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output JSON file (stdout when omitted)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Config file (TOML or YAML)
        #[arg(short, long, value_name = "CONFIG")]
        config: Option<PathBuf>,

        /// Layer direction: lr, rl, td or bt
        #[arg(short, long)]
        direction: Option<Direction>,

        /// Derive node ids from sibling paths instead of a counter
        #[arg(long)]
        path_ids: bool,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Replay an outline as a token stream through the incremental renderer
    Stream {
        /// Input markdown file (use "-" for stdin)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output JSON file for the final frame (stdout when omitted)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Config file (TOML or YAML)
        #[arg(short, long, value_name = "CONFIG")]
        config: Option<PathBuf>,

        /// Characters per simulated token
        #[arg(long, default_value_t = 12)]
        chunk_size: usize,

        /// Pause between tokens in milliseconds
        #[arg(long, default_value_t = 15)]
        token_delay_ms: u64,
    },

    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<(), String> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    match cli.command {
        Command::Render {
            input,
            output,
            config,
            direction,
            path_ids,
            pretty,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(direction) = direction {
                config.layout.direction = direction;
            }
            if path_ids {
                config.coordinator.id_strategy = IdStrategy::Path;
            }

            let markdown = read_input(&input)?;
            let graph = mindmark::render(&markdown, &config)
                .map_err(|e| format!("Layout failed: {}", e))?;
            write_graph(&graph, output.as_deref(), pretty)
        }
        Command::Stream {
            input,
            output,
            config,
            chunk_size,
            token_delay_ms,
        } => {
            let config = load_config(config.as_deref())?;
            let markdown = read_input(&input)?;

            let runtime = tokio::runtime::Runtime::new()
                .map_err(|e| format!("Failed to start runtime: {}", e))?;
            let report = runtime.block_on(replay(
                chunk_text(&markdown, chunk_size),
                Duration::from_millis(token_delay_ms),
                &config,
            ));

            for frame in &report.frames {
                eprintln!(
                    "frame {}: {} nodes, {} new",
                    frame.generation,
                    frame.nodes,
                    frame.new_ids.len()
                );
            }
            let stats = report.stats;
            eprintln!(
                "passes: {}, layouts: {}, reused: {}, stale: {}, failed: {}",
                stats.passes, stats.layouts, stats.reused, stats.stale, stats.failed
            );
            if let Some(error) = &report.last_error {
                eprintln!("last layout error: {}", error);
            }

            let graph = report
                .final_graph
                .ok_or("No frame was laid out for the stream")?;
            write_graph(&graph, output.as_deref(), true)
        }
        Command::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "mindmark", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config, String> {
    match path {
        Some(path) if path.is_file() => {
            Config::load(path).map_err(|e| format!("Failed to load config: {}", e))
        }
        Some(path) => Err(format!("Config file not found: {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn read_input(input: &Path) -> Result<String, String> {
    if input.to_str() == Some("-") {
        let mut buffer = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(input).map_err(|e| format!("Failed to read input file: {}", e))
    }
}

fn write_graph(graph: &LaidOutGraph, output: Option<&Path>, pretty: bool) -> Result<(), String> {
    let json = if pretty {
        serde_json::to_string_pretty(graph)
    } else {
        serde_json::to_string(graph)
    }
    .map_err(|e| format!("Failed to serialize graph: {}", e))?;

    match output {
        Some(path) => {
            std::fs::write(path, json).map_err(|e| format!("Failed to write output: {}", e))?;
            eprintln!("Graph saved to: {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
