// Calendar event engine: OnCalendar-style expression parsing and
// next-occurrence computation for the operations toolkit.

pub mod errors;
pub mod parser;
pub mod pattern;
pub mod search;

pub use errors::{ParseError, SearchError};
pub use pattern::{FieldSpec, TimePattern};
pub use search::next_occurrence;
