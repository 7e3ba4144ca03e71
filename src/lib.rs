//! Profile intake store with cascading location lookups and durable
//! client-side snapshots.
//!
//! # Examples
//!
//! In-memory usage with [`core::store::ProfileStore`]:
//! ```
//! use profilog::{
//!     core::store::ProfileStore,
//!     profile::{NotificationPrefs, ProfileDraft, PushMode, Residency},
//! };
//!
//! let mut store = ProfileStore::new();
//! let id = store.create(ProfileDraft {
//!     username: "asha".to_string(),
//!     about: String::new(),
//!     first_name: "Asha".to_string(),
//!     last_name: "Rao".to_string(),
//!     email: "asha@example.com".to_string(),
//!     residency: Residency::India {
//!         state: "Karnataka".to_string(),
//!         district: "Bengaluru".to_string(),
//!         postal_code: "560034".to_string(),
//!     },
//!     street_address: "12 MG Road".to_string(),
//!     avatar_data_url: None,
//!     notifications: NotificationPrefs::default(),
//!     push_notifications: PushMode::default(),
//! });
//! assert!(store.get(&id).is_some());
//! assert_eq!(store.len(), 1);
//! ```
//!
//! Runtime usage with a SQLite sink and a live selector:
//! ```no_run
//! use std::sync::Arc;
//!
//! use profilog::{
//!     cascade::driver::spawn_selector,
//!     lookup::http::HttpLocationClient,
//!     persist::sqlite::SqliteStateSink,
//!     runtime::handle::{RuntimeConfig, spawn_profilog},
//!     types::Country,
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let sink = SqliteStateSink::open("profilog.db").expect("open sqlite");
//! let store = sink.load_store().expect("load");
//! let handle = spawn_profilog(store, Some(Box::new(sink)), RuntimeConfig::default());
//!
//! let selector = spawn_selector(Arc::new(HttpLocationClient::new()));
//! selector
//!     .select_country(Some(Country::India))
//!     .await
//!     .expect("select country");
//!
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```
#![deny(missing_docs)]

/// Cascading dependent-selection state machine and async driver.
pub mod cascade;
/// Core in-memory store and filtering.
pub mod core;
/// Intake form values and validation.
pub mod form;
/// Location lookup contract, HTTP client, and option derivation.
pub mod lookup;
/// Persistence abstraction and SQLite implementation.
pub mod persist;
/// Profile domain records and patches.
pub mod profile;
/// Single-writer runtime handle and events.
pub mod runtime;
/// Shared primitive types and enums.
pub mod types;
