//! Careerbot - menu-driven Telegram bot for career-coaching support
//!
//! Users pick from a fixed reply keyboard; every selection sends a canned
//! text/link response and records the interaction into a durable store
//! (MySQL upsert + event log, or a CSV sheet fallback).
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, and logging
//! - `storage`: store backends and the best-effort recorder
//! - `telegram`: bot construction, menu content, and handlers

pub mod core;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use crate::core::{config, StoreError, StoreResult};
pub use crate::storage::{store_from_env, InteractionStore, RecordOutcome, Recorder};
pub use crate::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};
