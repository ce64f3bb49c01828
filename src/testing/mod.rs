//! In-memory stand-in for MySQL used by unit and integration tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::database::{quote_identifier, Connector, DatabaseError, JsonRow, Session};

/// Build a row from column/value pairs, keeping their order
pub fn row(columns: &[(&str, Value)]) -> JsonRow {
    let mut map = Map::new();
    for (name, value) in columns {
        map.insert(name.to_string(), value.clone());
    }
    map
}

#[derive(Default)]
struct FakeState {
    tables: Vec<(String, Vec<JsonRow>)>,
    queries: HashMap<String, Vec<JsonRow>>,
    unreachable: bool,
    failing_close: bool,
    opened: AtomicUsize,
    closed: AtomicUsize,
    statements: Mutex<Vec<String>>,
}

/// Connector over fixed tables and canned query results. Counts opened and
/// closed sessions and records every statement it receives.
#[derive(Clone, Default)]
pub struct FakeConnector {
    state: Arc<FakeState>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    fn edit(mut self, f: impl FnOnce(&mut FakeState)) -> Self {
        let state = Arc::get_mut(&mut self.state).expect("configure before sharing");
        f(state);
        self
    }

    pub fn with_table(self, name: &str, rows: Vec<JsonRow>) -> Self {
        self.edit(|s| s.tables.push((name.to_string(), rows)))
    }

    pub fn with_query(self, sql: &str, rows: Vec<JsonRow>) -> Self {
        self.edit(|s| {
            s.queries.insert(sql.to_string(), rows);
        })
    }

    pub fn unreachable(self) -> Self {
        self.edit(|s| s.unreachable = true)
    }

    pub fn failing_close(self) -> Self {
        self.edit(|s| s.failing_close = true)
    }

    pub fn opened(&self) -> usize {
        self.state.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.state.closed.load(Ordering::SeqCst)
    }

    pub fn statements(&self) -> Vec<String> {
        self.state.statements.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for FakeConnector {
    async fn connect(&self) -> Result<Box<dyn Session>, DatabaseError> {
        if self.state.unreachable {
            return Err(DatabaseError::Connection(sqlx::Error::Protocol(
                "2003 (HY000): Can't connect to MySQL server".into(),
            )));
        }
        self.state.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession { state: self.state.clone() }))
    }
}

struct FakeSession {
    state: Arc<FakeState>,
}

#[async_trait]
impl Session for FakeSession {
    async fn fetch_rows(&mut self, sql: &str) -> Result<Vec<JsonRow>, DatabaseError> {
        self.state.statements.lock().unwrap().push(sql.to_string());

        if sql == "SHOW TABLES" {
            return Ok(self
                .state
                .tables
                .iter()
                .map(|(name, _)| row(&[("Tables_in_test", Value::String(name.clone()))]))
                .collect());
        }

        for (name, rows) in &self.state.tables {
            let prefix = format!("SELECT * FROM {} LIMIT ", quote_identifier(name));
            if let Some(limit) = sql.strip_prefix(&prefix) {
                let limit: usize = limit.parse().unwrap_or(usize::MAX);
                return Ok(rows.iter().take(limit).cloned().collect());
            }
        }

        match self.state.queries.get(sql) {
            Some(rows) => Ok(rows.clone()),
            None => Err(DatabaseError::Query(sqlx::Error::Protocol(format!(
                "1064 (42000): You have an error in your SQL syntax near '{}'",
                sql
            )))),
        }
    }

    async fn close(self: Box<Self>) -> Result<(), DatabaseError> {
        self.state.closed.fetch_add(1, Ordering::SeqCst);
        if self.state.failing_close {
            return Err(DatabaseError::Close(sqlx::Error::PoolClosed));
        }
        Ok(())
    }
}
