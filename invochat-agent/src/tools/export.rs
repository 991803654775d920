use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use invochat_core::{ObjectStore, Tool, ToolError, Value};
use invochat_sql::{to_csv, QueryExecutor};
use serde::Deserialize;
use serde_json::json;

const DEFAULT_EXPIRY_MINUTES: u32 = 60;

/// Runs a SELECT, serializes the rows to CSV, uploads the file, and returns a
/// short-lived download link.
pub struct SqlExportTool {
    executor: QueryExecutor,
    store: Arc<dyn ObjectStore>,
}

#[derive(Deserialize)]
struct SqlExportArgs {
    sql_query: String,
    expiry_minutes: Option<u32>,
}

impl SqlExportTool {
    pub const NAME: &'static str = "export_sql_query_to_csv_tool";

    pub fn new(executor: QueryExecutor, store: Arc<dyn ObjectStore>) -> Self {
        Self { executor, store }
    }
}

#[async_trait]
impl Tool for SqlExportTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Execute a single read-only SELECT query and export the results as a CSV file. \
         Returns a short-lived URL for downloading the CSV."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "sql_query": {
                    "type": "string",
                    "description": "A single SELECT statement to execute and export."
                },
                "expiry_minutes": {
                    "type": "integer",
                    "description": "How many minutes the generated URL should remain valid. Default is 60."
                }
            },
            "required": ["sql_query"]
        })
    }

    async fn invoke(&self, arguments: &str) -> Result<Value, ToolError> {
        let args: SqlExportArgs = serde_json::from_str(arguments)?;
        let output = self
            .executor
            .run(&args.sql_query)
            .await
            .map_err(|err| ToolError::ExecutionFailed(err.to_string()))?;

        let csv_bytes = to_csv(&output);
        let filename = format!("{}_query_result.csv", Utc::now().format("%Y%m%d_%H%M%S"));
        let expiry = args.expiry_minutes.unwrap_or(DEFAULT_EXPIRY_MINUTES);

        let stored = self
            .store
            .put(&filename, csv_bytes, expiry)
            .await
            .map_err(|err| ToolError::ExecutionFailed(err.to_string()))?;
        tracing::info!(filename = %stored.filename, "CSV export uploaded");

        Ok(json!({ "csv_url": stored.url, "filename": stored.filename }))
    }
}
