//! # web2api CLI
//!
//! The `web2api` binary calls the feed tools directly and hosts the stdio,
//! MCP, and HTTP front ends.
//!
//! ## Usage
//!
//! ```bash
//! web2api --config ./config/web2api.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `web2api call --tool <name>` | Run one tool and print its JSON result |
//! | `web2api tools` | Print the tool manifest |
//! | `web2api sources` | List sources and their configured URLs |
//! | `web2api stdio` | Answer one JSON request read from stdin |
//! | `web2api serve mcp` | MCP tool server over stdio |
//! | `web2api serve http` | HTTP tool API and browser page |
//! | `web2api completions <shell>` | Print shell completions |
//!
//! A missing config file is not an error; built-in defaults are used.
//! Logs go to stderr (`RUST_LOG` or `--log-level`), stdout carries results.

use anyhow::bail;
use clap::{CommandFactory, Parser, Subcommand};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;

use web2api::config::load_config_or_default;
use web2api::http::{HttpTransport, Transport};
use web2api::limit::LimitPolicy;
use web2api::mcp::{serve_stdio, McpBridge};
use web2api::server::run_server;
use web2api::sources::list_sources;
use web2api::stdio::run_stdio;
use web2api::tools::manifest;
use web2api::traits::{AdapterRegistry, ToolContext, ToolError, ToolRegistry};

/// web2api: top items from Hacker News, Product Hunt, and Reddit as
/// normalized JSON tools.
#[derive(Parser)]
#[command(name = "web2api", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/web2api.toml`; a missing file means defaults.
    #[arg(long, global = true, default_value = "./config/web2api.toml")]
    config: PathBuf,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a tool and print its result as JSON.
    ///
    /// A failed fetch still prints: the result is an `{error, details}`
    /// object.
    Call {
        /// Tool name, e.g. `hn_get_top_posts`.
        #[arg(long)]
        tool: String,

        /// Maximum number of items.
        #[arg(long, allow_hyphen_values = true)]
        limit: Option<i64>,

        /// Source key for `get_feed` (hackernews, producthunt, reddit).
        #[arg(long)]
        source: Option<String>,
    },

    /// Print the tool manifest.
    Tools,

    /// List sources and their configured URLs.
    Sources,

    /// Read one JSON request from stdin and print the response.
    Stdio,

    /// Start a server.
    Serve {
        #[command(subcommand)]
        service: ServeService,
    },

    /// Print shell completions.
    Completions {
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum ServeService {
    /// MCP tool server on stdin/stdout.
    Mcp,
    /// HTTP tool API and browser page on `[server].bind`.
    Http,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Commands that don't require config
    if let Commands::Completions { shell } = &cli.command {
        clap_complete::generate(*shell, &mut Cli::command(), "web2api", &mut std::io::stdout());
        return Ok(());
    }

    let cfg = load_config_or_default(&cli.config)?;

    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(cfg.http.timeout())?);
    let adapters = Arc::new(AdapterRegistry::from_config(&cfg, transport)?);
    let tools = Arc::new(ToolRegistry::with_builtins());
    let ctx = ToolContext::new(adapters.clone(), LimitPolicy::HANDLER);

    match cli.command {
        Commands::Call {
            tool,
            limit,
            source,
        } => {
            let mut params = json!({});
            if let Some(limit) = limit {
                params["limit"] = json!(limit);
            }
            if let Some(source) = source {
                params["source"] = Value::String(source);
            }

            let outcome = match tools.call(&tool, params, &ctx).await {
                Ok(outcome) => outcome,
                Err(ToolError::UnknownTool { name, available }) => bail!(
                    "Unknown tool '{}'. Available tools: {}",
                    name,
                    available.join(", ")
                ),
                Err(e) => return Err(e.into()),
            };
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Tools => {
            println!("{}", serde_json::to_string_pretty(&manifest(&tools))?);
        }
        Commands::Sources => {
            list_sources(&adapters)?;
        }
        Commands::Stdio => {
            run_stdio(&tools, &ctx).await?;
        }
        Commands::Serve { service } => match service {
            ServeService::Mcp => {
                serve_stdio(McpBridge::new(tools, &ctx)).await?;
            }
            ServeService::Http => {
                run_server(&cfg, tools, &ctx).await?;
            }
        },
        Commands::Completions { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
