//! Musical timing: note events and tempo arithmetic.

pub mod note;
pub mod tempo;

pub use note::{NoteEvent, StringId};
pub use tempo::Tempo;
