//! Diff data model, unified-diff parser, and git2-backed acquisition for
//! the four review modes (staged, commit, branch, files).

pub mod acquire;
pub mod errors;
pub mod model;
pub mod parser;

pub use acquire::{DiffRefs, ReviewMode};
pub use errors::{DiffError, DiffResult, ParseError};
pub use model::{Diff, DiffLine, FileDiff, FileStatus, Hunk};
pub use parser::parse_diff;
