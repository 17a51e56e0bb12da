//! Database repositories for the data access layer
//
// Event rows, lifecycle transitions and media counts
pub mod event;
//
// Pool construction and migrations
pub mod pool;

pub use event::{EventRow, PgEventRepository};
pub use pool::setup_database;
