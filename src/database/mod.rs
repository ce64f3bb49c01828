pub mod connection;
pub mod row;

pub use connection::{
    quote_identifier, release, Connector, DatabaseError, JsonRow, MySqlConnector, Session,
};
pub use row::row_to_json;
