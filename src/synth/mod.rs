// Purpose: voices - strings plus the note scheduler that plucks them
// This layer sits above the resonators and below the engine

pub mod voice;

pub use voice::{NoteTrigger, Tick, Voice};
