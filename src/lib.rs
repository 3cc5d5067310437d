//! # web2api
//!
//! Top-items feeds from Hacker News, Product Hunt, and Reddit, normalized
//! into one item shape and exposed as callable tools.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌─────────────┐   ┌──────────────┐
//! │   Adapters   │──▶│ Normalizer  │──▶│ ToolRegistry │
//! │ HN/PH/Reddit │   │ RawItem →   │   │  4 tools     │
//! └──────┬───────┘   │ Canonical   │   └──────┬───────┘
//!        │           └─────────────┘          │
//!   Transport                  ┌───────┬──────┴───┬──────────┐
//!   (reqwest)                  ▼       ▼          ▼          ▼
//!                            CLI    stdio JSON   MCP    HTTP + page
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! web2api tools                                   # tool manifest
//! web2api call --tool hn_get_top_posts --limit 5
//! web2api call --tool get_feed --source reddit
//! echo '{"tool":"ph_get_top_products"}' | web2api stdio
//! web2api serve mcp                               # MCP over stdio
//! web2api serve http                              # http://127.0.0.1:5000
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Source kinds, raw and canonical items |
//! | [`http`] | Outbound request primitive |
//! | [`parse`] | HTML helpers and lenient integer parsing |
//! | [`extract`] | Ordered fallback selector chains |
//! | [`adapter_hackernews`] | Hacker News front page |
//! | [`adapter_producthunt`] | Product Hunt front page |
//! | [`adapter_reddit`] | Reddit JSON listing |
//! | [`normalize`] | Raw → canonical items |
//! | [`limit`] | `limit` argument policy |
//! | [`traits`] | `Adapter` / `Tool` traits and registries |
//! | [`tools`] | Built-in tools and manifest |
//! | [`stdio`] | One-shot JSON over stdin/stdout |
//! | [`mcp`] | MCP server over stdio |
//! | [`server`] | HTTP tool API |
//! | [`ui`] | Browser page |
//! | [`sources`] | `web2api sources` listing |

pub mod adapter_hackernews;
pub mod adapter_producthunt;
pub mod adapter_reddit;
pub mod config;
pub mod extract;
pub mod http;
pub mod limit;
pub mod mcp;
pub mod models;
pub mod normalize;
pub mod parse;
pub mod server;
pub mod sources;
pub mod stdio;
pub mod tools;
pub mod traits;
pub mod ui;
