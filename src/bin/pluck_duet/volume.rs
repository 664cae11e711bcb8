use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

const STEP: u8 = 10;
const MIN: u8 = 10;
const MAX: u8 = 100;

/// Output volume in percent, shared between the input thread and the audio
/// callback.
#[derive(Debug, Clone)]
pub struct Volume {
    percent: Arc<AtomicU8>,
}

impl Volume {
    /// `None` unless `percent` is within 10..=100.
    pub fn new(percent: u8) -> Option<Self> {
        (MIN..=MAX).contains(&percent).then(|| Self {
            percent: Arc::new(AtomicU8::new(percent)),
        })
    }

    pub fn percent(&self) -> u8 {
        self.percent.load(Ordering::Relaxed)
    }

    /// Gain applied to a full-scale sample.
    #[inline]
    pub fn gain(&self) -> f32 {
        f32::from(self.percent()) / 100.0
    }

    /// Raise by one step, wrapping past the top back to the quietest setting.
    /// Returns the new percentage.
    pub fn step(&self) -> u8 {
        let next = next_step(self.percent());
        self.percent.store(next, Ordering::Relaxed);
        next
    }
}

fn next_step(percent: u8) -> u8 {
    let raised = percent + STEP;
    if raised > MAX {
        MIN
    } else {
        raised
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_wrap_to_quietest() {
        let volume = Volume::new(80).unwrap();
        assert_eq!(volume.step(), 90);
        assert_eq!(volume.step(), 100);
        assert_eq!(volume.step(), 10);
        assert_eq!(volume.step(), 20);
    }

    #[test]
    fn clones_share_the_setting() {
        let volume = Volume::new(50).unwrap();
        let audio_side = volume.clone();

        volume.step();
        assert_eq!(audio_side.percent(), 60);
        assert!((audio_side.gain() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(Volume::new(0).is_none());
        assert!(Volume::new(9).is_none());
        assert!(Volume::new(101).is_none());
    }
}
