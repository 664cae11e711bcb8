/// Index of a string in the owning voice's string arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StringId(pub usize);

impl StringId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A scheduled pluck: which string, and how many beats into the measure.
///
/// Notes only refer to strings; the voice owns them. Several notes may point
/// at the same string to re-pluck it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    /// Beats from the start of the measure. Ascending within a voice.
    pub beat_offset: f32,
    /// The string to pluck.
    pub string: StringId,
}

impl NoteEvent {
    pub fn new(beat_offset: f32, string: StringId) -> Self {
        Self { beat_offset, string }
    }
}

/// Index of the note preceding `index` in a cyclic list of `len` notes.
#[inline]
pub fn previous_note(index: usize, len: usize) -> usize {
    debug_assert!(len > 0 && index < len);
    if index == 0 {
        len - 1
    } else {
        index - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn previous_wraps_to_last() {
        assert_eq!(previous_note(0, 12), 11);
        assert_eq!(previous_note(5, 12), 4);
        assert_eq!(previous_note(0, 1), 0);
    }
}
