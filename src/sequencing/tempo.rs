/// Tempo-derived timing constants for one voice.
///
/// Conversions stay in `f32` so beat positions are computed the same way on
/// every tick: `elapsed_beats = sample * seconds_per_sample * beats_per_second`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tempo {
    beats_per_second: f32,
    seconds_per_sample: f32,
    measure_samples: u32,
}

impl Tempo {
    /// `bpm` and `sample_rate` must be positive.
    pub fn new(bpm: f32, beats_per_measure: f32, sample_rate: f32) -> Self {
        debug_assert!(bpm > 0.0 && sample_rate > 0.0);

        let seconds_per_beat = 60.0 / bpm;
        Self {
            beats_per_second: bpm / 60.0,
            seconds_per_sample: 1.0 / sample_rate,
            measure_samples: (beats_per_measure * seconds_per_beat * sample_rate) as u32,
        }
    }

    pub fn beats_per_second(&self) -> f32 {
        self.beats_per_second
    }

    pub fn seconds_per_sample(&self) -> f32 {
        self.seconds_per_sample
    }

    /// Measure length in samples, truncated.
    pub fn measure_samples(&self) -> u32 {
        self.measure_samples
    }

    /// Beat position reached after `sample` ticks.
    #[inline]
    pub fn beats_at(&self, sample: u32) -> f32 {
        sample as f32 * self.seconds_per_sample * self.beats_per_second
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_length_in_samples() {
        // 12 beats at 420 BPM is 1.714s
        let tempo = Tempo::new(420.0, 12.0, 44_100.0);
        assert_eq!(tempo.beats_per_second(), 7.0);
        assert!((tempo.measure_samples() as i64 - 75_600).abs() <= 1);
    }

    #[test]
    fn one_beat_per_second() {
        let tempo = Tempo::new(60.0, 4.0, 100.0);

        assert_eq!(tempo.measure_samples(), 400);
        assert_eq!(tempo.beats_at(0), 0.0);
        assert!((tempo.beats_at(100) - 1.0).abs() < 1e-5);
        assert!((tempo.beats_at(250) - 2.5).abs() < 1e-5);
    }
}
