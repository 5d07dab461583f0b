//! Request and response types for the query API

pub mod query;
pub mod response;

pub use query::QueryRequest;
pub use response::{Confidence, QueryResponse};
