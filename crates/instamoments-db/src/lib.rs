//! InstaMoments database layer
//!
//! Postgres implementation of the core [`instamoments_core::EventRepository`].

pub mod db;

pub use db::{setup_database, EventRow, PgEventRepository};
