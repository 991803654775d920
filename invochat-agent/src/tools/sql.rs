use async_trait::async_trait;
use invochat_core::{Tool, ToolError, Value};
use invochat_sql::QueryExecutor;
use serde::Deserialize;
use serde_json::json;

use crate::schema::schema_overview;

/// Read-only SELECT execution with SIMILARITY fuzzy matching.
pub struct SqlQueryTool {
    executor: QueryExecutor,
}

#[derive(Deserialize)]
struct SqlQueryArgs {
    sql_query: String,
}

impl SqlQueryTool {
    pub const NAME: &'static str = "execute_sql_query_tool";

    pub fn new(executor: QueryExecutor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl Tool for SqlQueryTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Execute a read-only SELECT query against the configured database. \
         Only single SELECT statements are permitted; any other SQL will be rejected. \
         You can call:\n\
         \x20 SIMILARITY(ColumnName, 'search_term') \u{2014} returns a 0\u{2013}100 similarity score.\n\
         Filter by adding `WHERE SIMILARITY(...) >= <threshold>` (e.g. 60).\n\
         Example usage on your data:\n\
         \x20 SELECT Column1, SIMILARITY(Column1, 'YourSearchTerm') AS SimScore\n\
         \x20   FROM YourTableName\n\
         \x20  WHERE SIMILARITY(Column1, 'YourSearchTerm') >= 60;"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "sql_query": {
                    "type": "string",
                    "description": format!(
                        "A single SELECT statement. Use SIMILARITY(column, 'term') and a \
                         `WHERE ... >= threshold` to perform fuzzy matching on any text column.\n\
                         Allowed tables & columns:\n{}",
                        schema_overview()
                    )
                }
            },
            "required": ["sql_query"]
        })
    }

    async fn invoke(&self, arguments: &str) -> Result<Value, ToolError> {
        let args: SqlQueryArgs = serde_json::from_str(arguments)?;
        let output = self
            .executor
            .run(&args.sql_query)
            .await
            .map_err(|err| ToolError::ExecutionFailed(err.to_string()))?;
        Ok(json!({ "results": output.rows }))
    }
}
