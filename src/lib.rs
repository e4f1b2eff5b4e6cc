//! # puzzle-tracker
//!
//! REST backend for a jigsaw puzzle application: stores square puzzle
//! images on disk, puzzle records in PostgreSQL, and each puzzle's best
//! completion time.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── PuzzleService (service/)
//!     │
//!     ├── ImageStore (storage/)      ── flat upload directory
//!     └── PuzzleRepository (persistence/) ── PostgreSQL
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod storage;
