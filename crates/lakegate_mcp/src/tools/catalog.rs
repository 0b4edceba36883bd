//! Unity Catalog tools.
//!
//! Listing tools render JSON by default; pass `format: "markdown"` for the
//! context-optimized renderers in [`crate::format`].

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use lakegate_client::catalog;

use crate::format::{
    format_catalogs_markdown, format_schemas_markdown, format_tables_markdown, DetailLevel,
};
use crate::types::{parse_args, Tool, ToolContext, ToolError, ToolInputSchema, ToolResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ListingFormat {
    #[default]
    Json,
    Markdown,
}

#[derive(Debug, Default, Deserialize)]
struct ListingOptions {
    #[serde(default)]
    format: ListingFormat,

    detail_level: Option<String>,
}

impl ListingOptions {
    fn detail_level(&self) -> Result<DetailLevel, ToolError> {
        match self.detail_level.as_deref() {
            None => Ok(DetailLevel::default()),
            Some(s) => s.parse().map_err(ToolError::InvalidParams),
        }
    }
}

fn listing_properties() -> Value {
    json!({
        "format": {"type": "string", "enum": ["json", "markdown"], "default": "json"},
        "detail_level": {"type": "string", "enum": ["concise", "detailed"], "default": "concise"}
    })
}

// ============================================================================
// list_catalogs
// ============================================================================

pub struct ListCatalogsTool;

#[async_trait]
impl Tool for ListCatalogsTool {
    fn name(&self) -> &'static str {
        "list_catalogs"
    }

    fn description(&self) -> &'static str {
        "List catalogs in Unity Catalog"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::with_properties(listing_properties(), vec![])
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let opts: ListingOptions = parse_args(args)?;
        let result = catalog::list_catalogs(&ctx.api).await?;

        match opts.format {
            ListingFormat::Json => ToolResult::json(&result),
            ListingFormat::Markdown => {
                let catalogs = result
                    .get("catalogs")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default();
                Ok(ToolResult::text(format_catalogs_markdown(
                    &catalogs,
                    opts.detail_level()?,
                )))
            }
        }
    }
}

// ============================================================================
// create_catalog
// ============================================================================

pub struct CreateCatalogTool;

#[derive(Debug, Deserialize)]
struct CreateCatalogArgs {
    name: String,
    comment: Option<String>,
}

#[async_trait]
impl Tool for CreateCatalogTool {
    fn name(&self) -> &'static str {
        "create_catalog"
    }

    fn description(&self) -> &'static str {
        "Create a catalog"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::with_properties(
            json!({
                "name": {"type": "string"},
                "comment": {"type": "string"}
            }),
            vec!["name".to_string()],
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let args: CreateCatalogArgs = parse_args(args)?;
        let result = catalog::create_catalog(&ctx.api, &args.name, args.comment).await?;
        ToolResult::json(&result)
    }
}

// ============================================================================
// list_schemas
// ============================================================================

pub struct ListSchemasTool;

#[derive(Debug, Deserialize)]
struct ListSchemasArgs {
    catalog_name: String,

    #[serde(flatten)]
    listing: ListingOptions,
}

#[async_trait]
impl Tool for ListSchemasTool {
    fn name(&self) -> &'static str {
        "list_schemas"
    }

    fn description(&self) -> &'static str {
        "List schemas in a catalog"
    }

    fn input_schema(&self) -> ToolInputSchema {
        let mut properties = listing_properties();
        properties["catalog_name"] = json!({"type": "string"});
        ToolInputSchema::with_properties(properties, vec!["catalog_name".to_string()])
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let args: ListSchemasArgs = parse_args(args)?;
        let result = catalog::list_schemas(&ctx.api, &args.catalog_name).await?;

        match args.listing.format {
            ListingFormat::Json => ToolResult::json(&result),
            ListingFormat::Markdown => {
                let schemas = result
                    .get("schemas")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default();
                Ok(ToolResult::text(format_schemas_markdown(
                    &schemas,
                    &args.catalog_name,
                    args.listing.detail_level()?,
                )))
            }
        }
    }
}

// ============================================================================
// create_schema
// ============================================================================

pub struct CreateSchemaTool;

#[derive(Debug, Deserialize)]
struct CreateSchemaArgs {
    catalog_name: String,
    name: String,
    comment: Option<String>,
}

#[async_trait]
impl Tool for CreateSchemaTool {
    fn name(&self) -> &'static str {
        "create_schema"
    }

    fn description(&self) -> &'static str {
        "Create a schema in a catalog"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::with_properties(
            json!({
                "catalog_name": {"type": "string"},
                "name": {"type": "string"},
                "comment": {"type": "string"}
            }),
            vec!["catalog_name".to_string(), "name".to_string()],
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let args: CreateSchemaArgs = parse_args(args)?;
        let result =
            catalog::create_schema(&ctx.api, &args.catalog_name, &args.name, args.comment).await?;
        ToolResult::json(&result)
    }
}

// ============================================================================
// list_tables
// ============================================================================

pub struct ListTablesTool;

#[derive(Debug, Deserialize)]
struct ListTablesArgs {
    catalog_name: String,
    schema_name: String,

    #[serde(flatten)]
    listing: ListingOptions,
}

#[async_trait]
impl Tool for ListTablesTool {
    fn name(&self) -> &'static str {
        "list_tables"
    }

    fn description(&self) -> &'static str {
        "List tables in a schema"
    }

    fn input_schema(&self) -> ToolInputSchema {
        let mut properties = listing_properties();
        properties["catalog_name"] = json!({"type": "string"});
        properties["schema_name"] = json!({"type": "string"});
        ToolInputSchema::with_properties(
            properties,
            vec!["catalog_name".to_string(), "schema_name".to_string()],
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let args: ListTablesArgs = parse_args(args)?;
        let result = catalog::list_tables(&ctx.api, &args.catalog_name, &args.schema_name).await?;

        match args.listing.format {
            ListingFormat::Json => ToolResult::json(&result),
            ListingFormat::Markdown => {
                let tables = result
                    .get("tables")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default();
                Ok(ToolResult::text(format_tables_markdown(
                    &tables,
                    &args.schema_name,
                    args.listing.detail_level()?,
                )))
            }
        }
    }
}

// ============================================================================
// create_table
// ============================================================================

pub struct CreateTableTool;

#[derive(Debug, Deserialize)]
struct CreateTableArgs {
    warehouse_id: String,
    statement: String,
}

#[async_trait]
impl Tool for CreateTableTool {
    fn name(&self) -> &'static str {
        "create_table"
    }

    fn description(&self) -> &'static str {
        "Create a table by executing a CREATE TABLE statement via the SQL API"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::with_properties(
            json!({
                "warehouse_id": {"type": "string"},
                "statement": {"type": "string"}
            }),
            vec!["warehouse_id".to_string(), "statement".to_string()],
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let args: CreateTableArgs = parse_args(args)?;
        let result = catalog::create_table(&ctx.api, &args.warehouse_id, &args.statement).await?;
        ToolResult::json(&result)
    }
}

// ============================================================================
// get_table_lineage
// ============================================================================

pub struct GetTableLineageTool;

#[derive(Debug, Deserialize)]
struct LineageArgs {
    full_name: String,
}

#[async_trait]
impl Tool for GetTableLineageTool {
    fn name(&self) -> &'static str {
        "get_table_lineage"
    }

    fn description(&self) -> &'static str {
        "Get lineage for a table (full_name: catalog.schema.table)"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::with_properties(
            json!({"full_name": {"type": "string"}}),
            vec!["full_name".to_string()],
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let args: LineageArgs = parse_args(args)?;
        let result = catalog::get_table_lineage(&ctx.api, &args.full_name).await?;
        ToolResult::json(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_options_default_to_json() {
        let opts: ListingOptions = parse_args(json!({})).unwrap();
        assert_eq!(opts.format, ListingFormat::Json);
        assert_eq!(opts.detail_level().unwrap(), DetailLevel::Concise);
    }

    #[test]
    fn listing_options_parse_markdown() {
        let opts: ListingOptions =
            parse_args(json!({"format": "markdown", "detail_level": "detailed"})).unwrap();
        assert_eq!(opts.format, ListingFormat::Markdown);
        assert_eq!(opts.detail_level().unwrap(), DetailLevel::Detailed);
    }

    #[test]
    fn bad_detail_level_is_invalid_params() {
        let opts: ListingOptions = parse_args(json!({"detail_level": "verbose"})).unwrap();
        assert!(opts.detail_level().is_err());
    }
}
