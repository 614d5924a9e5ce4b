#![forbid(unsafe_code)]

//! Core domain model and business logic for the workout session draft engine.
//!
//! This crate provides:
//! - Domain types (draft, exercises, sets, prescriptions, history)
//! - Draft construction from a bootstrap payload
//! - Persistence (local store, remote store with debounced sync)
//! - Boot resolution across the two stores
//! - Pure mutation, autofill, selector, and review functions

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod builder;
pub mod local_store;
pub mod remote_store;
pub mod boot;
pub mod mutate;
pub mod autofill;
pub mod selectors;
pub mod review;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use builder::{build_draft, BootstrapPayload, BootstrapSource, FileBootstrap};
pub use local_store::LocalStore;
pub use remote_store::{FileRemote, MemoryRemote, RemoteRow, RemoteStore, RemoteSync};
pub use boot::{complete_session, discard_session, resolve_session, BootRequest};
pub use mutate::SetPatch;
pub use autofill::{autofill_set, estimate_one_rep_max};
pub use review::{build_review, Review, ReviewIssue, ReviewSummary};
