//! Data Transfer Objects for REST request/response serialization.
//!
//! Field names are camelCase on the wire (`bestTime`, `lastPlayed`, ...)
//! and the stored image reference is exposed as `img`.

pub mod puzzle_dto;

pub use puzzle_dto::*;
