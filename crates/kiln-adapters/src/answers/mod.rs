//! Answer sources that do not need a terminal, plus the answers record.

mod layered;
mod map_source;
mod record;

pub use layered::LayeredAnswerSource;
pub use map_source::{MapAnswerSource, RecordFormat};
pub use record::{ANSWERS_FILE, answers_record, render_record};
