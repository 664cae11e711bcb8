use tracing::trace;

use crate::dsp::resonator::Resonator;
use crate::sequencing::note::previous_note;
use crate::sequencing::{NoteEvent, StringId, Tempo};

/// What the scheduler did on a tick that fired a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteTrigger {
    /// Index of the note that came due.
    pub note: usize,
    /// String of the previous note in cyclic order, now damped.
    pub muted: StringId,
    /// String of the due note, now excited.
    pub plucked: StringId,
}

/// Output of one scheduler tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub sample: f32,
    pub trigger: Option<NoteTrigger>,
}

/// One instrument: a set of strings and a cyclic note list played against a
/// sample clock.
///
/// There is no explicit state enum; the state is (sample counter, next note).
/// The voice never stops. When the counter reaches the measure length it
/// wraps to zero and the note list starts over, so output is exactly periodic
/// in the trigger schedule.
pub struct Voice {
    strings: Vec<Resonator>,
    notes: Vec<NoteEvent>,
    tempo: Tempo,
    sample_index: u32,
    next_note: usize,
}

impl Voice {
    /// Build a voice. Every note must reference a string in `strings`, the
    /// note list must be non-empty and the measure at least one sample long.
    pub fn new(strings: Vec<Resonator>, notes: Vec<NoteEvent>, tempo: Tempo) -> Self {
        debug_assert!(!notes.is_empty());
        debug_assert!(notes.iter().all(|n| n.string.index() < strings.len()));
        debug_assert!(tempo.measure_samples() > 0);

        Self {
            strings,
            notes,
            tempo,
            sample_index: 0,
            next_note: 0,
        }
    }

    /// Advance one sample, reporting any note fired on this tick.
    ///
    /// At most one note fires per tick. If two notes fall due within the
    /// same tick the second waits for the next one.
    pub fn tick(&mut self) -> Tick {
        let trigger = self.schedule();

        let sample = self.strings.iter_mut().map(Resonator::sample).sum();

        self.sample_index += 1;
        if self.sample_index >= self.tempo.measure_samples() {
            self.sample_index = 0;
            self.next_note = 0;
        }

        Tick { sample, trigger }
    }

    /// Advance one sample.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        self.tick().sample
    }

    /// Fill `out` with consecutive samples.
    pub fn render(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = self.next_sample();
        }
    }

    fn schedule(&mut self) -> Option<NoteTrigger> {
        let note = *self.notes.get(self.next_note)?;
        if self.tempo.beats_at(self.sample_index) < note.beat_offset {
            return None;
        }

        let muted = self.notes[previous_note(self.next_note, self.notes.len())].string;
        self.strings[muted.index()].mute();
        self.strings[note.string.index()].pluck();

        let trigger = NoteTrigger {
            note: self.next_note,
            muted,
            plucked: note.string,
        };
        trace!(
            note = trigger.note,
            muted = muted.index(),
            plucked = note.string.index(),
            sample = self.sample_index,
            "note triggered"
        );

        self.next_note += 1;
        Some(trigger)
    }

    pub fn strings(&self) -> &[Resonator] {
        &self.strings
    }

    pub fn notes(&self) -> &[NoteEvent] {
        &self.notes
    }

    pub fn tempo(&self) -> &Tempo {
        &self.tempo
    }

    /// Position within the current measure, in samples.
    pub fn sample_index(&self) -> u32 {
        self.sample_index
    }

    /// Index of the next note waiting to fire; equals the note count once the
    /// whole measure has been played.
    pub fn next_note(&self) -> usize {
        self.next_note
    }

    pub fn measure_samples(&self) -> u32 {
        self.tempo.measure_samples()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string(values: &[f32]) -> Resonator {
        Resonator::with_excitation(values.to_vec(), 0.99)
    }

    fn triggers(voice: &mut Voice, ticks: u32) -> Vec<(u32, NoteTrigger)> {
        (0..ticks)
            .filter_map(|t| voice.tick().trigger.map(|trig| (t, trig)))
            .collect()
    }

    #[test]
    fn single_note_replucks_every_measure() {
        // 60 BPM, 1 beat measure at 8Hz: N = 8 samples
        let tempo = Tempo::new(60.0, 1.0, 8.0);
        let mut voice = Voice::new(
            vec![string(&[0.5, -0.5])],
            vec![NoteEvent::new(0.0, StringId(0))],
            tempo,
        );
        assert_eq!(voice.measure_samples(), 8);

        let first = voice.tick();
        assert_eq!(
            first.trigger,
            Some(NoteTrigger {
                note: 0,
                muted: StringId(0),
                plucked: StringId(0),
            })
        );
        assert_eq!(first.sample, 0.5);

        for _ in 1..8 {
            assert_eq!(voice.tick().trigger, None);
        }
        assert_eq!(voice.sample_index(), 0);
        assert_eq!(voice.next_note(), 0);

        assert!(voice.tick().trigger.is_some(), "tick N should pluck again");
    }

    #[test]
    fn mutes_previous_note_and_plucks_due_note() {
        let tempo = Tempo::new(60.0, 3.0, 4.0);
        let mut voice = Voice::new(
            vec![string(&[1.0]), string(&[1.0]), string(&[1.0])],
            vec![
                NoteEvent::new(0.0, StringId(0)),
                NoteEvent::new(1.0, StringId(2)),
                NoteEvent::new(2.0, StringId(1)),
            ],
            tempo,
        );

        let fired = triggers(&mut voice, 12);
        let summary: Vec<(u32, usize, usize)> = fired
            .iter()
            .map(|(t, trig)| (*t, trig.muted.index(), trig.plucked.index()))
            .collect();

        // note 0 wraps to mute the last note's string
        assert_eq!(summary, vec![(0, 1, 0), (4, 0, 2), (8, 2, 1)]);

        let strings = voice.strings();
        assert_eq!(strings[1].loop_gain(), 0.99);
        assert!(strings[0].loop_gain() < 0.99);
        assert!(strings[2].loop_gain() < 0.99);
    }

    #[test]
    fn sums_every_string_each_tick() {
        let tempo = Tempo::new(60.0, 2.0, 2.0);
        let mut voice = Voice::new(
            vec![string(&[0.25, 0.0]), string(&[0.5, 0.0])],
            vec![
                NoteEvent::new(0.0, StringId(0)),
                NoteEvent::new(1.0, StringId(1)),
            ],
            tempo,
        );

        // tick 0: only string 0 plucked
        assert_eq!(voice.next_sample(), 0.25);
        assert_eq!(voice.next_sample(), 0.0);
        // tick 2: string 1 plucked, its cursor is on cell 0 again
        let third = voice.next_sample();
        let string0 = 0.99 * (0.95 * 0.25);
        assert!((third - (string0 + 0.5)).abs() < 1e-6, "got {third}");
    }

    #[test]
    fn at_most_one_note_per_tick() {
        // tick resolution is 0.5 beats; both notes are due by tick 1
        let tempo = Tempo::new(60.0, 2.0, 2.0);
        let mut voice = Voice::new(
            vec![string(&[1.0]), string(&[1.0])],
            vec![
                NoteEvent::new(0.2, StringId(0)),
                NoteEvent::new(0.3, StringId(1)),
            ],
            tempo,
        );

        let fired = triggers(&mut voice, 3);
        let ticks: Vec<u32> = fired.iter().map(|(t, _)| *t).collect();
        assert_eq!(ticks, vec![1, 2], "overdue note fires on the following tick");
    }

    #[test]
    fn overdue_note_is_skipped_at_measure_end() {
        // notes 1 and 2 both come due on the last tick; the wrap drops note 2
        let tempo = Tempo::new(60.0, 2.0, 2.0);
        let mut voice = Voice::new(
            vec![string(&[1.0]), string(&[1.0]), string(&[1.0])],
            vec![
                NoteEvent::new(0.0, StringId(0)),
                NoteEvent::new(1.2, StringId(1)),
                NoteEvent::new(1.4, StringId(2)),
            ],
            tempo,
        );
        assert_eq!(voice.measure_samples(), 4);

        for _ in 0..2 {
            let fired = triggers(&mut voice, 4);
            let schedule: Vec<(u32, usize)> = fired.iter().map(|(t, trig)| (*t, trig.note)).collect();
            assert_eq!(schedule, vec![(0, 0), (3, 1)]);
        }
        assert_eq!(voice.strings()[2].loop_gain(), 0.955 + 0.99 - 0.995);
    }

    #[test]
    fn trigger_schedule_is_periodic() {
        let tempo = Tempo::new(150.0, 6.0, 100.0);
        let mut voice = Voice::new(
            vec![string(&[0.1, 0.2, 0.3]), string(&[0.3, 0.2]), string(&[0.4])],
            vec![
                NoteEvent::new(0.0, StringId(0)),
                NoteEvent::new(1.0, StringId(1)),
                NoteEvent::new(2.5, StringId(0)),
                NoteEvent::new(4.0, StringId(2)),
                NoteEvent::new(5.25, StringId(1)),
            ],
            tempo,
        );
        let n = voice.measure_samples();
        assert_eq!(n, 240);

        let first = triggers(&mut voice, n);
        let second = triggers(&mut voice, n);

        assert_eq!(first.len(), 5);
        assert_eq!(first, second);
    }
}
