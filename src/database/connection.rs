use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlDatabaseError};
use sqlx::{ConnectOptions, Connection, Executor};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::DatabaseConfig;
use crate::database::row::row_to_json;

/// One result row, keyed by column name in result-set order
pub type JsonRow = Map<String, Value>;

/// Errors from the database layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("Query error: {0}")]
    Query(#[source] sqlx::Error),

    #[error("Failed to close connection: {0}")]
    Close(#[source] sqlx::Error),
}

impl DatabaseError {
    /// Driver text as a MySQL client would print it, e.g.
    /// `1064 (42000): You have an error in your SQL syntax ...`
    pub fn driver_message(&self) -> String {
        let err = match self {
            DatabaseError::Connection(e) | DatabaseError::Query(e) | DatabaseError::Close(e) => e,
        };
        match err.as_database_error() {
            Some(db) => {
                let number = db
                    .try_downcast_ref::<MySqlDatabaseError>()
                    .map(|e| e.number());
                match (number, db.code()) {
                    (Some(number), Some(state)) => format!("{} ({}): {}", number, state, db.message()),
                    _ => db.message().to_string(),
                }
            }
            None => err.to_string(),
        }
    }
}

/// Opens database sessions. One call yields one fresh connection.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn Session>, DatabaseError>;
}

/// A single open connection
#[async_trait]
pub trait Session: Send {
    /// Run one statement and materialize every row it returns
    async fn fetch_rows(&mut self, sql: &str) -> Result<Vec<JsonRow>, DatabaseError>;

    /// Close the connection, consuming the session
    async fn close(self: Box<Self>) -> Result<(), DatabaseError>;
}

/// Close a session, logging rather than propagating a failed close
pub async fn release(session: Box<dyn Session>) {
    if let Err(e) = session.close().await {
        warn!("{}", e);
    }
}

/// Connector that opens a brand-new MySQL connection per call
#[derive(Clone)]
pub struct MySqlConnector {
    options: MySqlConnectOptions,
}

impl MySqlConnector {
    pub fn new(config: &DatabaseConfig) -> Self {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.name)
            .disable_statement_logging();
        Self { options }
    }
}

#[async_trait]
impl Connector for MySqlConnector {
    async fn connect(&self) -> Result<Box<dyn Session>, DatabaseError> {
        let conn = self.options.connect().await.map_err(|e| {
            tracing::error!("Database connection failed: {}", e);
            DatabaseError::Connection(e)
        })?;
        debug!("Opened database connection");
        Ok(Box::new(MySqlSession { conn }))
    }
}

pub struct MySqlSession {
    conn: MySqlConnection,
}

#[async_trait]
impl Session for MySqlSession {
    async fn fetch_rows(&mut self, sql: &str) -> Result<Vec<JsonRow>, DatabaseError> {
        // A bare &str goes over the text protocol, so statements MySQL will not prepare still run
        let rows = self
            .conn
            .fetch_all(sql)
            .await
            .map_err(DatabaseError::Query)?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    async fn close(self: Box<Self>) -> Result<(), DatabaseError> {
        self.conn.close().await.map_err(DatabaseError::Close)?;
        debug!("Closed database connection");
        Ok(())
    }
}

/// Quote a MySQL identifier with backticks, doubling any embedded backtick
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_plain_identifier() {
        assert_eq!(quote_identifier("users"), "`users`");
    }

    #[test]
    fn doubles_embedded_backticks() {
        assert_eq!(quote_identifier("a`; SELECT 1; --"), "`a``; SELECT 1; --`");
    }

    #[test]
    fn driver_message_for_non_database_error() {
        let err = DatabaseError::Query(sqlx::Error::RowNotFound);
        assert_eq!(err.driver_message(), sqlx::Error::RowNotFound.to_string());
    }
}
