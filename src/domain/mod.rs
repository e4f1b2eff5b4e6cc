//! Domain layer: puzzle identity, the puzzle aggregate, and time.
//!
//! This module holds the server-side domain model: the [`PuzzleId`]
//! newtype, the [`Puzzle`] record with its best-time policy, and the
//! [`Clock`] abstraction used for every timestamp the service writes.

pub mod clock;
pub mod puzzle;
pub mod puzzle_id;

pub use clock::{Clock, ManualClock, SystemClock};
pub use puzzle::{NewPuzzle, Puzzle, PuzzleChanges};
pub use puzzle_id::PuzzleId;
