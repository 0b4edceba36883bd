//! Context-optimized response formatting.
//!
//! Catalog listings can be enormous; these renderers produce Markdown at two
//! detail levels and cap the final string so a single tool call cannot flood
//! the assistant's context window.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Maximum response size in characters for formatted listings.
pub const CHARACTER_LIMIT: usize = 25_000;

/// Detail level for listing renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailLevel {
    /// High-signal summary
    #[default]
    Concise,
    /// Full information
    Detailed,
}

impl FromStr for DetailLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "concise" => Ok(DetailLevel::Concise),
            "detailed" => Ok(DetailLevel::Detailed),
            _ => Err(format!(
                "Invalid detail level: '{}'. Expected: concise or detailed",
                s
            )),
        }
    }
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetailLevel::Concise => write!(f, "concise"),
            DetailLevel::Detailed => write!(f, "detailed"),
        }
    }
}

/// Format a Unix timestamp in milliseconds as a human-readable string.
pub fn format_timestamp(ts: Option<i64>) -> String {
    let Some(ts) = ts else {
        return "N/A".to_string();
    };
    match DateTime::<Utc>::from_timestamp_millis(ts) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => format!("Invalid timestamp: {}", ts),
    }
}

/// Truncate a response that exceeds the character limit.
/// Returns the (possibly shortened) string and whether truncation happened.
pub fn truncate_response(data: String, max_chars: usize) -> (String, bool) {
    if data.chars().count() <= max_chars {
        return (data, false);
    }
    let truncated: String = data.chars().take(max_chars).collect();
    (truncated, true)
}

/// Render a catalogs listing as Markdown.
pub fn format_catalogs_markdown(catalogs: &[Value], detail_level: DetailLevel) -> String {
    let mut lines = vec![
        "# Unity Catalogs".to_string(),
        String::new(),
        format!("Found {} catalogs", catalogs.len()),
        String::new(),
    ];

    for catalog in catalogs {
        lines.push(format!("## {}", name_of(catalog)));

        if detail_level == DetailLevel::Detailed {
            if let Some(catalog_type) = catalog.get("catalog_type").and_then(Value::as_str) {
                lines.push(format!("- **Type**: {}", catalog_type));
            }
            if let Some(comment) = catalog.get("comment").and_then(Value::as_str) {
                lines.push(format!("- **Description**: {}", comment));
            }
            if let Some(owner) = catalog.get("owner").and_then(Value::as_str) {
                lines.push(format!("- **Owner**: {}", owner));
            }
            if let Some(created) = catalog.get("created_at").and_then(Value::as_i64) {
                lines.push(format!("- **Created**: {}", format_timestamp(Some(created))));
            }
        } else if let Some(comment) = catalog.get("comment").and_then(Value::as_str) {
            lines.push(format!("- {}", comment));
        }

        lines.push(String::new());
    }

    cap(lines.join("\n"))
}

/// Render a schemas listing as Markdown.
pub fn format_schemas_markdown(
    schemas: &[Value],
    catalog_name: &str,
    detail_level: DetailLevel,
) -> String {
    let mut lines = vec![
        format!("# Catalog: {}", catalog_name),
        String::new(),
        format!("## Schemas ({})", schemas.len()),
        String::new(),
    ];

    if schemas.is_empty() {
        lines.push("No schemas found in this catalog.".to_string());
        return cap(lines.join("\n"));
    }

    for schema in schemas {
        lines.push(format!("### {}", name_of(schema)));
        if let Some(comment) = schema.get("comment").and_then(Value::as_str) {
            lines.push(format!("- {}", comment));
        }

        if detail_level == DetailLevel::Detailed {
            if let Some(owner) = schema.get("owner").and_then(Value::as_str) {
                lines.push(format!("- Owner: {}", owner));
            }
            if let Some(created) = schema.get("created_at").and_then(Value::as_i64) {
                lines.push(format!("- Created: {}", format_timestamp(Some(created))));
            }
        }

        lines.push(String::new());
    }

    cap(lines.join("\n"))
}

/// Render a tables listing as Markdown.
pub fn format_tables_markdown(
    tables: &[Value],
    schema_name: &str,
    detail_level: DetailLevel,
) -> String {
    let mut lines = vec![
        format!("# Schema: {}", schema_name),
        String::new(),
        format!("## Tables ({})", tables.len()),
        String::new(),
    ];

    if tables.is_empty() {
        lines.push("No tables found in this schema.".to_string());
        return cap(lines.join("\n"));
    }

    for table in tables {
        lines.push(format!("### {}", name_of(table)));

        if let Some(comment) = table.get("comment").and_then(Value::as_str) {
            lines.push(format!("- {}", comment));
        }

        if detail_level == DetailLevel::Detailed {
            if let Some(table_type) = table.get("table_type").and_then(Value::as_str) {
                lines.push(format!("- Type: {}", table_type));
            }
            if let Some(owner) = table.get("owner").and_then(Value::as_str) {
                lines.push(format!("- Owner: {}", owner));
            }
            if let Some(created) = table.get("created_at").and_then(Value::as_i64) {
                lines.push(format!("- Created: {}", format_timestamp(Some(created))));
            }
            if let Some(columns) = table.get("columns").and_then(Value::as_array) {
                lines.push(format!("- Columns ({}):", columns.len()));
                for column in columns {
                    let type_name = column
                        .get("type_name")
                        .and_then(Value::as_str)
                        .unwrap_or("?");
                    lines.push(format!("  - {} ({})", name_of(column), type_name));
                }
            }
        }

        lines.push(String::new());
    }

    cap(lines.join("\n"))
}

fn name_of(value: &Value) -> &str {
    value.get("name").and_then(Value::as_str).unwrap_or("Unknown")
}

fn cap(rendered: String) -> String {
    let (text, truncated) = truncate_response(rendered, CHARACTER_LIMIT);
    if truncated {
        format!("{}\n\n... [response truncated at {} characters]", text, CHARACTER_LIMIT)
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn timestamp_rendering() {
        assert_eq!(format_timestamp(None), "N/A");
        let rendered = format_timestamp(Some(1_700_000_000_000));
        assert!(rendered.ends_with("UTC"), "got {}", rendered);
        assert!(rendered.starts_with("2023-11-14"), "got {}", rendered);
    }

    #[test]
    fn truncation_guard() {
        let (out, truncated) = truncate_response("short".to_string(), 100);
        assert_eq!(out, "short");
        assert!(!truncated);

        let long = "x".repeat(200);
        let (out, truncated) = truncate_response(long, 100);
        assert_eq!(out.chars().count(), 100);
        assert!(truncated);
    }

    #[test]
    fn catalogs_concise_versus_detailed() {
        let catalogs = vec![json!({
            "name": "main",
            "comment": "Primary catalog",
            "owner": "admins",
            "catalog_type": "MANAGED_CATALOG",
            "created_at": 1_700_000_000_000i64
        })];

        let concise = format_catalogs_markdown(&catalogs, DetailLevel::Concise);
        assert!(concise.contains("## main"));
        assert!(concise.contains("Primary catalog"));
        assert!(!concise.contains("Owner"));

        let detailed = format_catalogs_markdown(&catalogs, DetailLevel::Detailed);
        assert!(detailed.contains("**Owner**: admins"));
        assert!(detailed.contains("**Type**: MANAGED_CATALOG"));
    }

    #[test]
    fn empty_schema_listing_says_so() {
        let out = format_schemas_markdown(&[], "main", DetailLevel::Concise);
        assert!(out.contains("No schemas found"));
    }

    #[test]
    fn tables_detailed_includes_columns() {
        let tables = vec![json!({
            "name": "events",
            "table_type": "MANAGED",
            "columns": [
                {"name": "id", "type_name": "BIGINT"},
                {"name": "payload", "type_name": "STRING"}
            ]
        })];

        let out = format_tables_markdown(&tables, "analytics", DetailLevel::Detailed);
        assert!(out.contains("### events"));
        assert!(out.contains("- id (BIGINT)"));
    }

    #[test]
    fn oversized_listing_is_capped() {
        let catalogs: Vec<Value> = (0..3000)
            .map(|i| json!({"name": format!("catalog_{}", i), "comment": "padding".repeat(4)}))
            .collect();
        let out = format_catalogs_markdown(&catalogs, DetailLevel::Concise);
        assert!(out.contains("[response truncated"));
    }

    #[test]
    fn detail_level_parsing() {
        assert_eq!("concise".parse::<DetailLevel>().unwrap(), DetailLevel::Concise);
        assert_eq!("DETAILED".parse::<DetailLevel>().unwrap(), DetailLevel::Detailed);
        assert!("verbose".parse::<DetailLevel>().is_err());
    }
}
