//! bizdesk - back-office records with an audit trail
//!
//! This library provides the core of the bizdesk CLI: JSON-file persistence
//! for clients, products, quotes, invoices, web orders, support tickets and
//! back-office users, plus an append-only audit trail fed by a generic
//! lifecycle interceptor.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `logging`: Diagnostic `tracing` setup
//! - `models`: Entity types, kinds and schemas
//! - `events`: Lifecycle notifications and the observer registry
//! - `storage`: JSON repositories, activity log and the generic write path
//! - `audit`: The audit interceptor, redaction, diffing and records
//! - `auth`: Acting principal and password handling
//! - `services`: Business logic layer
//! - `display`, `export`, `cli`: Terminal output, audit export, commands
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use bizdesk::auth::NoActor;
//! use bizdesk::config::{BizdeskPaths, Settings};
//! use bizdesk::storage::Storage;
//!
//! let paths = BizdeskPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let storage = Storage::open(paths, &settings, Arc::new(NoActor))?;
//! ```

pub mod audit;
pub mod auth;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod events;
pub mod export;
pub mod logging;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{BizdeskError, BizdeskResult};
