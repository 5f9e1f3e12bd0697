//! # educollab-store
//!
//! Resource storage for EduCollab.
//!
//! Every entity lives in a named REST collection and is reached through the
//! [`ResourceStore`] interface (`list / get / create / update / delete`).
//! Two implementations are provided: [`SqliteStore`], an embedded store that
//! keeps each collection as JSON documents in SQLite, and [`HttpStore`], a
//! client for a json-server style REST backend. [`ResourceClient`] layers
//! typed access to the entity [`models`] on top of either.

pub mod database;
pub mod documents;
pub mod http;
pub mod migrations;
pub mod models;
pub mod resource;
pub mod sqlite;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
pub use http::HttpStore;
pub use models::*;
pub use resource::{Filter, FilterValue, Resource, ResourceClient, ResourceStore, SortOrder};
pub use sqlite::SqliteStore;
