//! Device playback: a foreground refill loop feeding a cpal output stream.
//!
//! The foreground owns the engine and a [`DoubleBuffer`] used as staging.
//! Rendered halves are pushed into a sample ring sized to the whole double
//! buffer; the audio callback drains it and posts a refill notification each
//! time it finishes a half, which frees exactly one half of ring space.

use std::io::BufRead;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SampleFormat, SizedSample, StreamConfig};
use pluck_duet::dsp::PeakLevel;
use pluck_duet::io::refill::{refill_channel, DoubleBuffer, HalfCursor, RefillNotifier};
use pluck_duet::io::{interleave, StereoFrame};
use pluck_duet::Engine;
use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{debug_span, error, info, warn};

use crate::volume::Volume;

const POLL_INTERVAL: Duration = Duration::from_millis(1);

pub struct PlayerOptions {
    /// Both halves together.
    pub buffer_frames: usize,
    pub volume: Volume,
}

/// Dropouts seen by the audio thread, reported from the foreground.
#[derive(Default)]
struct Dropouts {
    underruns: AtomicU64,
    overruns: AtomicU64,
}

/// Callback-side state.
struct Playback {
    samples: Consumer<i16>,
    cursor: HalfCursor,
    notifier: RefillNotifier,
    volume: Volume,
    dropouts: Arc<Dropouts>,
}

impl Playback {
    fn render<T>(&mut self, data: &mut [T], channels: usize)
    where
        T: SizedSample + FromSample<f32>,
    {
        let played = write_frames(data, channels, &mut self.samples, self.volume.gain());
        if played < data.len() / channels {
            self.dropouts.underruns.fetch_add(1, Ordering::Relaxed);
        }

        let notifier = &mut self.notifier;
        let dropouts = &self.dropouts;
        self.cursor.advance(played, |half| {
            if notifier.notify(half).is_err() {
                dropouts.overruns.fetch_add(1, Ordering::Relaxed);
            }
        });
    }
}

/// Render forever (until the stream dies).
pub fn run(mut engine: Engine, options: PlayerOptions) -> EyreResult<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let supported = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let channels = supported.channels() as usize;
    let config = StreamConfig {
        channels: supported.channels(),
        sample_rate: cpal::SampleRate(engine.sample_rate() as u32),
        buffer_size: cpal::BufferSize::Default,
    };

    let half_len = options.buffer_frames / 2;
    let mut buffer = DoubleBuffer::new(half_len);
    let (mut producer, consumer) = RingBuffer::<i16>::new(buffer.len() * StereoFrame::CHANNELS);
    let (notifier, mut listener) = refill_channel();
    let dropouts = Arc::new(Dropouts::default());

    info!(
        device = %device.name().unwrap_or_else(|_| "unknown".into()),
        sample_rate = config.sample_rate.0,
        channels,
        format = ?supported.sample_format(),
        buffer_frames = buffer.len(),
        volume = options.volume.percent(),
        "starting playback"
    );

    let mut peak = engine.fill(buffer.frames_mut(), PeakLevel::UNITY);
    push_frames(&mut producer, buffer.frames());

    let playback = Playback {
        samples: consumer,
        cursor: HalfCursor::new(half_len),
        notifier,
        volume: options.volume.clone(),
        dropouts: Arc::clone(&dropouts),
    };

    let stream = match supported.sample_format() {
        SampleFormat::F32 => build_stream::<f32>(&device, &config, playback)?,
        SampleFormat::I16 => build_stream::<i16>(&device, &config, playback)?,
        SampleFormat::U16 => build_stream::<u16>(&device, &config, playback)?,
        other => return Err(eyre!("unsupported sample format {other:?}")),
    };
    stream.play()?;

    spawn_volume_control(options.volume);

    let mut reported = (0, 0);
    loop {
        match listener.poll() {
            Some(half) => {
                let _refill = debug_span!("refill", ?half).entered();
                peak = engine.refill(&mut buffer, half, peak);
                push_frames(&mut producer, buffer.half(half));
            }
            None if listener.is_abandoned() => {
                return Err(eyre!("audio stream stopped"));
            }
            None => thread::sleep(POLL_INTERVAL),
        }

        let now = (
            dropouts.underruns.load(Ordering::Relaxed),
            dropouts.overruns.load(Ordering::Relaxed),
        );
        if now.0 > reported.0 {
            warn!(total = now.0, "playback ran out of rendered audio");
        }
        if now.1 > reported.1 {
            warn!(total = now.1, "refill request dropped, foreground fell behind");
        }
        reported = now;
    }
}

fn build_stream<T>(device: &cpal::Device, config: &StreamConfig, mut playback: Playback) -> EyreResult<cpal::Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels as usize;
    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _| playback.render(data, channels),
        |err| error!("audio stream error: {err}"),
        None,
    )?;
    Ok(stream)
}

/// Copy frames into the device buffer, scaled by `gain`. Left and right go to
/// the first two channels (a mono device gets their average), any further
/// channels are silent. Frames missing from the ring are written as silence.
///
/// Returns the number of frames taken from the ring.
fn write_frames<T>(data: &mut [T], channels: usize, samples: &mut Consumer<i16>, gain: f32) -> usize
where
    T: SizedSample + FromSample<f32>,
{
    let scale = gain / f32::from(i16::MAX);
    let silence = T::from_sample(0.0f32);
    let mut played = 0;

    for out in data.chunks_mut(channels) {
        let frame = if samples.slots() >= StereoFrame::CHANNELS {
            match (samples.pop(), samples.pop()) {
                (Ok(left), Ok(right)) => Some((f32::from(left) * scale, f32::from(right) * scale)),
                _ => None,
            }
        } else {
            None
        };

        match frame {
            Some((left, right)) => {
                played += 1;
                match out {
                    [mono] => *mono = T::from_sample(0.5 * (left + right)),
                    [l, r, rest @ ..] => {
                        *l = T::from_sample(left);
                        *r = T::from_sample(right);
                        rest.fill(silence);
                    }
                    [] => {}
                }
            }
            None => out.fill(silence),
        }
    }

    played
}

fn push_frames(producer: &mut Producer<i16>, frames: &[StereoFrame]) {
    for sample in interleave(frames) {
        if producer.push(sample).is_err() {
            warn!("sample ring full, dropping the rest of the block");
            return;
        }
    }
}

/// Every line on stdin (i.e. Enter) steps the volume.
fn spawn_volume_control(volume: Volume) {
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            if line.is_err() {
                break;
            }
            info!(volume = volume.step(), "volume changed");
        }
    });
}
