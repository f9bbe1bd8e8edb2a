//! Calendar objects looked up while resolving note deep links.

pub mod note;
pub mod routine;

pub use note::Note;
pub use routine::Routine;
