//! Browser page for `GET /`.
//!
//! One form (source + limit) and a table of normalized items. Query values
//! are forgiving: a bad `limit` or `source` falls back to the default and
//! shows a warning instead of failing the request.

use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::Deserialize;

use crate::limit::{LimitPolicy, DEFAULT_LIMIT, MAX_LIMIT};
use crate::models::{CanonicalItem, SourceKind};
use crate::traits::ToolOutcome;

pub const INVALID_LIMIT_WARNING: &str = "Invalid 'limit' value. Using default of 10.";

/// Raw query string of the page. Both fields stay strings so parsing
/// problems can be reported rather than rejected by the extractor.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub source: Option<String>,
    pub limit: Option<String>,
}

/// A warning shown above the results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub details: Option<String>,
}

/// The resolved page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub source: SourceKind,
    pub limit: usize,
    pub notices: Vec<Notice>,
}

impl PageQuery {
    pub fn resolve(&self) -> PageRequest {
        let mut notices = Vec::new();

        let limit = match self.limit.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_LIMIT,
            Some(raw) => match raw.parse::<i64>() {
                Ok(n) if n > 0 => LimitPolicy::AGENT.clamp(n),
                Ok(n) => {
                    notices.push(Notice {
                        message: INVALID_LIMIT_WARNING.to_string(),
                        details: Some(format!("limit must be positive, got {}", n)),
                    });
                    DEFAULT_LIMIT
                }
                Err(e) => {
                    notices.push(Notice {
                        message: INVALID_LIMIT_WARNING.to_string(),
                        details: Some(format!("'{}': {}", raw, e)),
                    });
                    DEFAULT_LIMIT
                }
            },
        };

        let source = match self.source.as_deref() {
            None | Some("") => SourceKind::HackerNews,
            Some(raw) => raw.parse::<SourceKind>().unwrap_or_else(|e| {
                notices.push(Notice {
                    message: format!("{} Showing {}.", e, SourceKind::HackerNews.label()),
                    details: Some(format!("got '{}'", raw)),
                });
                SourceKind::HackerNews
            }),
        };

        PageRequest {
            source,
            limit,
            notices,
        }
    }
}

const STYLE: &str = r#"
body { font-family: system-ui, -apple-system, "Segoe UI", sans-serif; margin: 2rem; background: #f5f5f5; }
h1 { margin-bottom: 0.5rem; }
.subtitle { margin-bottom: 1.5rem; color: #555; }
form { margin-bottom: 1.5rem; padding: 1rem; background: #fff; border-radius: 8px;
       box-shadow: 0 1px 3px rgba(0,0,0,0.08); display: inline-flex; align-items: center; gap: 0.5rem; }
input[type="number"] { width: 80px; padding: 0.3rem 0.5rem; }
button { padding: 0.4rem 0.9rem; border-radius: 6px; border: none; cursor: pointer;
         background: #2563eb; color: #fff; font-weight: 500; }
table { border-collapse: collapse; width: 100%; background: #fff; border-radius: 8px;
        overflow: hidden; box-shadow: 0 1px 3px rgba(0,0,0,0.08); }
th, td { padding: 0.6rem 0.75rem; border-bottom: 1px solid #eee; text-align: left;
         vertical-align: top; font-size: 0.9rem; }
th { background: #f9fafb; font-weight: 600; }
.rank { width: 40px; }
.points, .comments { width: 90px; text-align: right; }
.error, .warning { margin-bottom: 1rem; padding: 0.75rem 1rem; border-radius: 6px; }
.error { background: #fef2f2; color: #b91c1c; }
.warning { background: #fffbeb; color: #92400e; }
.details { margin-top: 0.25rem; font-size: 0.8rem; }
.footer { margin-top: 2rem; font-size: 0.8rem; color: #777; }
a { color: #2563eb; text-decoration: none; }
"#;

fn count_cell(value: Option<i64>) -> String {
    value.map_or_else(|| "-".to_string(), |n| n.to_string())
}

fn notice_box(class: &str, message: &str, details: Option<&str>) -> String {
    let mut html = format!(r#"<div class="{}">{}"#, class, encode_text(message));
    if let Some(details) = details {
        html.push_str(&format!(
            r#"<div class="details">{}</div>"#,
            encode_text(details)
        ));
    }
    html.push_str("</div>\n");
    html
}

fn item_row(item: &CanonicalItem) -> String {
    let link = encode_double_quoted_attribute(&item.link);
    format!(
        concat!(
            "<tr>",
            r#"<td class="rank">{}</td>"#,
            "<td>{}</td>",
            r#"<td><a href="{}" target="_blank" rel="noopener noreferrer">{}</a></td>"#,
            r#"<td class="points">{}</td>"#,
            r#"<td class="comments">{}</td>"#,
            "</tr>\n"
        ),
        item.rank,
        encode_text(&item.title),
        link,
        encode_text(&item.link),
        count_cell(item.points),
        count_cell(item.comments),
    )
}

/// Render the full page for a resolved request and the tool's outcome.
pub fn render_page(request: &PageRequest, outcome: &ToolOutcome) -> String {
    let mut html = String::new();
    html.push_str("<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!(
        "<title>web2api: {}</title>\n<style>{}</style>\n</head>\n<body>\n",
        request.source.label(),
        STYLE
    ));
    html.push_str(&format!("<h1>web2api: {}</h1>\n", request.source.label()));
    html.push_str("<div class=\"subtitle\">Top items, normalized.</div>\n");

    html.push_str("<form method=\"get\" action=\"/\">\n<label for=\"source\">Source:</label>\n");
    html.push_str("<select id=\"source\" name=\"source\">\n");
    for kind in SourceKind::ALL {
        let selected = if kind == request.source { " selected" } else { "" };
        html.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>\n",
            kind.key(),
            selected,
            kind.label()
        ));
    }
    html.push_str("</select>\n<label for=\"limit\">Items:</label>\n");
    html.push_str(&format!(
        "<input type=\"number\" id=\"limit\" name=\"limit\" min=\"1\" max=\"{}\" value=\"{}\"/>\n",
        MAX_LIMIT, request.limit
    ));
    html.push_str("<button type=\"submit\">Fetch</button>\n</form>\n");

    for notice in &request.notices {
        html.push_str(&notice_box(
            "warning",
            &notice.message,
            notice.details.as_deref(),
        ));
    }

    match outcome {
        ToolOutcome::Error(envelope) => {
            html.push_str(&notice_box(
                "error",
                &envelope.error,
                envelope.details.as_deref(),
            ));
        }
        ToolOutcome::Items(items) if !items.is_empty() => {
            html.push_str("<table>\n<thead><tr><th class=\"rank\">#</th><th>Title</th><th>Link</th>");
            html.push_str("<th class=\"points\">Points</th><th class=\"comments\">Comments</th></tr></thead>\n<tbody>\n");
            for item in items {
                html.push_str(&item_row(item));
            }
            html.push_str("</tbody>\n</table>\n");
        }
        ToolOutcome::Items(_) => {}
    }

    html.push_str("<div class=\"footer\">Backed by the <code>get_feed</code> tool.</div>\n");
    html.push_str("</body>\n</html>\n");
    html
}
