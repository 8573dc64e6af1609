//! History Loading
//!
//! Request/response backfill of the durable message backlog, fetched once
//! per conversation selection.

pub mod loader;

pub use loader::{HistoryApi, HistoryError, MockHistoryLoader, RestHistoryLoader};
