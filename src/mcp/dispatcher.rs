use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::database::{quote_identifier, release, Connector, DatabaseError, JsonRow};

use super::statement::blocked_keyword;
use super::{McpRequest, McpResponse, Resource};

/// Row cap applied to every `read`
pub const READ_ROW_LIMIT: usize = 100;

pub const VERB_LIST_RESOURCES: &str = "list_resources";
pub const VERB_READ: &str = "read";
pub const VERB_EXECUTE: &str = "execute";

const MISSING_TABLE_NAME: &str = "Table name is required for read verb.";
const MISSING_STATEMENT: &str = "SQL statement is required for execute verb.";
const STATEMENT_REJECTED: &str = "Only SELECT statements are allowed for security reasons.";

/// Routes a request to its verb. Each verb that touches the database opens
/// one connection, runs one statement and closes the connection again.
///
/// Business-rule failures come back as `Ok(McpResponse::Error)`; only
/// connectivity problems (and query failures outside `execute`) are `Err`.
#[derive(Clone)]
pub struct Dispatcher {
    connector: Arc<dyn Connector>,
}

impl Dispatcher {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self { connector }
    }

    pub async fn dispatch(&self, request: &McpRequest) -> Result<McpResponse, DatabaseError> {
        match request.verb.as_str() {
            Some(VERB_LIST_RESOURCES) => self.list_resources().await,
            Some(VERB_READ) => match request.string_param("name") {
                Some(table) => self.read(table).await,
                None => Ok(McpResponse::error(MISSING_TABLE_NAME)),
            },
            Some(VERB_EXECUTE) => match request.string_param("statement") {
                Some(statement) => self.execute(statement).await,
                None => Ok(McpResponse::error(MISSING_STATEMENT)),
            },
            _ => Ok(McpResponse::error(format!(
                "Unsupported verb: {}",
                request.verb_label()
            ))),
        }
    }

    async fn list_resources(&self) -> Result<McpResponse, DatabaseError> {
        let rows = self.run_once("SHOW TABLES").await?;
        let resources = rows
            .into_iter()
            .filter_map(first_column)
            .map(Resource::table)
            .collect();
        Ok(McpResponse::Resources { resources })
    }

    async fn read(&self, table: &str) -> Result<McpResponse, DatabaseError> {
        let sql = format!(
            "SELECT * FROM {} LIMIT {}",
            quote_identifier(table),
            READ_ROW_LIMIT
        );
        let data = self.run_once(&sql).await?;
        Ok(McpResponse::Data { data })
    }

    async fn execute(&self, statement: &str) -> Result<McpResponse, DatabaseError> {
        if let Some(keyword) = blocked_keyword(statement) {
            debug!("Rejected statement containing '{}'", keyword);
            return Ok(McpResponse::error(STATEMENT_REJECTED));
        }

        match self.run_once(statement).await {
            Ok(results) => Ok(McpResponse::Results { results }),
            Err(e @ DatabaseError::Query(_)) => {
                Ok(McpResponse::error(format!("SQL Error: {}", e.driver_message())))
            }
            Err(e) => Err(e),
        }
    }

    /// Open a connection, run one statement, close the connection on every path
    async fn run_once(&self, sql: &str) -> Result<Vec<JsonRow>, DatabaseError> {
        let mut session = self.connector.connect().await?;
        let outcome = session.fetch_rows(sql).await;
        release(session).await;
        outcome
    }
}

fn first_column(row: JsonRow) -> Option<String> {
    match row.into_iter().next()?.1 {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
