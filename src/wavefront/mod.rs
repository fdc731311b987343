pub mod diagonal;
pub mod partition;
pub mod recurrence;

pub use diagonal::{diagonal_coords, diagonal_length, Diagonal, DiagonalLayout, Diagonals};
pub use partition::{active_cores, partition, segment_for, CoreSegment};
pub use recurrence::{cell_score, score_cell, Neighbors};
