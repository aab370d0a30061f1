//! Application ports (traits) for external dependencies.
//!
//! Adapters in `kiln-adapters` and `kiln-cli` implement these.
//!
//! - `Filesystem`: where composed files land
//! - `AnswerSource`: where answers come from (prompt, file, `--data`)

pub mod output;

pub use output::{AnswerSource, Filesystem};
