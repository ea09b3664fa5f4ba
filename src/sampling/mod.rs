// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! The frame-sampling pipeline.
//!
//! A [`SampleRun`] steps the media source through a deterministic
//! timestamp sequence and captures one composited frame per step. The
//! run is a cooperative stepper: each [`SampleRun::step`] call performs
//! exactly one slice (request a seek, poll for settlement, wait one
//! paint tick, or capture), so the host loop stays responsive and
//! progress is observable between frames. Dropping the run, or starting
//! another, discards its partial output.

pub mod compositor;

use anyhow::{anyhow, Result};

use crate::io::media::{MediaSource, SeekStatus};
use crate::models::annotation::AnnotationStore;
use crate::models::frame::{Frame, FrameSet};
use crate::models::session::TimeRange;

/// Target timestamps for a range at `hz` samples per second.
///
/// `t_i = start + i/hz` computed by a single division per step; the
/// first raw value that reaches `end` is clamped to exactly `end` and
/// terminates the sequence, so both boundaries are always present.
pub fn sample_times(range: TimeRange, hz: f64) -> Vec<f64> {
    let mut times = Vec::new();
    let mut i: u64 = 0;
    loop {
        let raw = range.start + i as f64 / hz;
        if raw >= range.end {
            times.push(range.end);
            break;
        }
        times.push(raw);
        i += 1;
    }
    times
}

/// Transport state preserved around a run.
#[derive(Debug, Clone, Copy)]
struct TransportSnapshot {
    paused: bool,
    rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Ask the source for the next target timestamp.
    Request,
    /// Waiting for the source to report the seek settled.
    Settling,
    /// One extra tick so the settled frame is actually painted.
    Paint,
    /// Grab, composite, and encode the current frame.
    Capture,
}

/// Progress of one step call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// More slices remain; call `step` again next tick.
    Pending,
    /// All frames captured; call `finish`.
    Done,
}

/// One in-flight sampling run.
pub struct SampleRun {
    sequence_tag: String,
    range: TimeRange,
    hz: f64,
    burn_in: bool,
    targets: Vec<f64>,
    next: usize,
    phase: Phase,
    frames: Vec<Frame>,
    progress: u8,
    saved: TransportSnapshot,
}

impl SampleRun {
    /// Validate inputs, snapshot the transport, and force paused
    /// playback at rate 1 for the duration of the run.
    ///
    /// Fails before any seeking when no selection is given, the rate is
    /// not positive, or the source reports a zero-sized surface.
    pub fn begin(
        media: &mut dyn MediaSource,
        selection: Option<TimeRange>,
        hz: f64,
        burn_in: bool,
        sequence_tag: &str,
    ) -> Result<Self> {
        let range = selection.ok_or_else(|| anyhow!("no selection defined"))?;
        if hz <= 0.0 {
            return Err(anyhow!("sampling rate must be positive"));
        }
        let (w, h) = media.dimensions();
        if w == 0 || h == 0 {
            return Err(anyhow!("media source has no drawable surface"));
        }

        let saved = TransportSnapshot {
            paused: media.is_paused(),
            rate: media.rate(),
        };
        media.set_paused(true)?;
        media.set_rate(1.0);

        let targets = sample_times(range, hz);
        log::info!(
            "sampling {} frames over [{:.3}, {:.3}] at {hz} Hz",
            targets.len(),
            range.start,
            range.end
        );

        Ok(Self {
            sequence_tag: sequence_tag.to_string(),
            range,
            hz,
            burn_in,
            targets,
            next: 0,
            phase: Phase::Request,
            frames: Vec::new(),
            progress: 0,
            saved,
        })
    }

    /// Monotone percentage, 100 exactly when the run is complete.
    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn captured(&self) -> usize {
        self.frames.len()
    }

    pub fn total(&self) -> usize {
        self.targets.len()
    }

    /// Perform one suspension slice. An error aborts the run; the
    /// caller restores the transport via [`SampleRun::abort`].
    pub fn step(
        &mut self,
        media: &mut dyn MediaSource,
        store: &AnnotationStore,
    ) -> Result<StepOutcome> {
        match self.phase {
            Phase::Request => {
                media.request_seek(self.targets[self.next]);
                self.phase = Phase::Settling;
                Ok(StepOutcome::Pending)
            }
            Phase::Settling => {
                match media.poll_seek() {
                    SeekStatus::Pending => {}
                    SeekStatus::Settled => self.phase = Phase::Paint,
                    SeekStatus::Failed | SeekStatus::Idle => {
                        // Best effort: capture whatever frame is
                        // currently displayed at this step.
                        log::warn!(
                            "seek to {:.3}s did not settle, capturing current frame",
                            self.targets[self.next]
                        );
                        self.phase = Phase::Paint;
                    }
                }
                Ok(StepOutcome::Pending)
            }
            Phase::Paint => {
                self.phase = Phase::Capture;
                Ok(StepOutcome::Pending)
            }
            Phase::Capture => {
                let target = self.targets[self.next];
                let mut img = media.frame()?.clone();

                if self.burn_in {
                    let active: Vec<_> = store.active_at(target).collect();
                    compositor::burn_in(&mut img, &active);
                }

                let data = compositor::encode_png(&img)?;
                self.frames.push(Frame {
                    index: self.next,
                    time: target,
                    data,
                });

                self.next += 1;
                self.progress =
                    (100.0 * self.next as f64 / self.targets.len() as f64).round() as u8;

                if self.next == self.targets.len() {
                    Ok(StepOutcome::Done)
                } else {
                    self.phase = Phase::Request;
                    Ok(StepOutcome::Pending)
                }
            }
        }
    }

    /// Restore the transport and hand over the captured frames. The
    /// returned set replaces any previous one wholesale.
    pub fn finish(self, media: &mut dyn MediaSource) -> FrameSet {
        restore(media, self.saved);
        FrameSet {
            sequence_tag: self.sequence_tag,
            range: self.range,
            sample_hz: self.hz,
            burn_in: self.burn_in,
            frames: self.frames,
        }
    }

    /// Discard the partial output and restore the transport.
    pub fn abort(self, media: &mut dyn MediaSource) {
        restore(media, self.saved);
    }
}

fn restore(media: &mut dyn MediaSource, saved: TransportSnapshot) {
    media.set_rate(saved.rate);
    if let Err(e) = media.set_paused(saved.paused) {
        log::warn!("could not restore playback state: {e:#}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::{Annotation, Color};
    use image::RgbaImage;

    /// Deterministic in-memory source: settles a seek after a fixed
    /// number of polls and can be told to fail specific targets.
    struct MockSource {
        duration: f64,
        position: f64,
        paused: bool,
        rate: f64,
        pending: Option<f64>,
        polls_left: u32,
        settle_after: u32,
        fail_seeks_at: Vec<f64>,
        frame: RgbaImage,
        seeks: Vec<f64>,
    }

    impl MockSource {
        fn new(duration: f64) -> Self {
            Self {
                duration,
                position: 0.0,
                paused: false,
                rate: 2.0,
                pending: None,
                polls_left: 0,
                settle_after: 1,
                fail_seeks_at: Vec::new(),
                frame: RgbaImage::from_pixel(64, 48, image::Rgba([10, 10, 10, 255])),
                seeks: Vec::new(),
            }
        }
    }

    impl MediaSource for MockSource {
        fn dimensions(&self) -> (u32, u32) {
            self.frame.dimensions()
        }

        fn duration(&self) -> f64 {
            self.duration
        }

        fn position(&self) -> f64 {
            self.position
        }

        fn request_seek(&mut self, time: f64) {
            self.pending = Some(time);
            self.polls_left = self.settle_after;
            self.seeks.push(time);
        }

        fn poll_seek(&mut self) -> SeekStatus {
            match self.pending {
                None => SeekStatus::Idle,
                Some(target) => {
                    if self.polls_left > 0 {
                        self.polls_left -= 1;
                        return SeekStatus::Pending;
                    }
                    self.pending = None;
                    if self.fail_seeks_at.iter().any(|t| (t - target).abs() < 1e-9) {
                        SeekStatus::Failed
                    } else {
                        self.position = target;
                        SeekStatus::Settled
                    }
                }
            }
        }

        fn frame(&mut self) -> Result<&RgbaImage> {
            Ok(&self.frame)
        }

        fn is_paused(&self) -> bool {
            self.paused
        }

        fn set_paused(&mut self, paused: bool) -> Result<()> {
            self.paused = paused;
            Ok(())
        }

        fn rate(&self) -> f64 {
            self.rate
        }

        fn set_rate(&mut self, rate: f64) {
            self.rate = rate;
        }

        fn advance(&mut self, _dt: f64) {}

        fn name(&self) -> &str {
            "mock"
        }
    }

    fn run_to_completion(
        run: &mut SampleRun,
        media: &mut MockSource,
        store: &AnnotationStore,
    ) -> Vec<u8> {
        let mut progress_log = Vec::new();
        for _ in 0..100_000 {
            let outcome = run.step(media, store).unwrap();
            progress_log.push(run.progress());
            if outcome == StepOutcome::Done {
                return progress_log;
            }
        }
        panic!("run did not terminate");
    }

    #[test]
    fn test_sample_times_include_both_bounds() {
        let times = sample_times(TimeRange::new(0.0, 10.0), 2.0);
        assert_eq!(times.len(), 21);
        assert_eq!(times[0], 0.0);
        assert_eq!(times[1], 0.5);
        assert_eq!(*times.last().unwrap(), 10.0);
    }

    #[test]
    fn test_sample_times_clamp_final_to_end() {
        let times = sample_times(TimeRange::new(0.1, 0.7), 3.0);
        assert_eq!(*times.last().unwrap(), 0.7);
        assert!(times.windows(2).all(|w| w[0] < w[1]));
        // Interior steps are exact divisions, not accumulations.
        assert!((times[1] - (0.1 + 1.0 / 3.0)).abs() < 1e-12);
    }

    #[test]
    fn test_sample_times_zero_width_range() {
        let times = sample_times(TimeRange::new(4.0, 4.0), 2.0);
        assert_eq!(times, vec![4.0]);
    }

    #[test]
    fn test_run_produces_ordered_frames_and_restores_transport() {
        let mut media = MockSource::new(60.0);
        media.paused = false;
        media.rate = 2.0;
        let store = AnnotationStore::new();

        let mut run = SampleRun::begin(
            &mut media,
            Some(TimeRange::new(0.0, 10.0)),
            2.0,
            false,
            "abcd1234",
        )
        .unwrap();

        // The run owns the transport while active.
        assert!(media.paused);
        assert_eq!(media.rate, 1.0);

        let progress = run_to_completion(&mut run, &mut media, &store);
        let set = run.finish(&mut media);

        assert_eq!(set.len(), 21);
        for (i, frame) in set.frames.iter().enumerate() {
            assert_eq!(frame.index, i);
            assert!((frame.time - i as f64 * 0.5).abs() < 1e-9);
        }
        assert_eq!(set.frames.last().unwrap().time, 10.0);

        // Progress is monotone and terminal at 100.
        assert!(progress.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*progress.last().unwrap(), 100);

        // Transport restored afterwards.
        assert!(!media.paused);
        assert_eq!(media.rate, 2.0);
    }

    #[test]
    fn test_burn_in_only_within_marker_range() {
        let mut media = MockSource::new(60.0);
        let mut store = AnnotationStore::new();
        let mut a = Annotation::at(0.5, 0.5, 0.0, 60.0);
        a.start = 2.0;
        a.end = 4.0;
        a.color = Color::new(255, 0, 0);
        store.push(a);

        let mut run = SampleRun::begin(
            &mut media,
            Some(TimeRange::new(0.0, 6.0)),
            1.0,
            true,
            "abcd1234",
        )
        .unwrap();
        run_to_completion(&mut run, &mut media, &store);
        let set = run.finish(&mut media);

        for frame in &set.frames {
            let img = image::load_from_memory(&frame.data).unwrap().to_rgba8();
            let has_red = img.pixels().any(|p| p.0 == [255, 0, 0, 255]);
            let in_range = (2.0..=4.0).contains(&frame.time);
            assert_eq!(has_red, in_range, "frame at t={}", frame.time);
        }
    }

    #[test]
    fn test_failed_seek_does_not_abort_run() {
        let mut media = MockSource::new(60.0);
        media.fail_seeks_at = vec![1.0];
        let store = AnnotationStore::new();

        let mut run = SampleRun::begin(
            &mut media,
            Some(TimeRange::new(0.0, 2.0)),
            1.0,
            false,
            "abcd1234",
        )
        .unwrap();
        run_to_completion(&mut run, &mut media, &store);
        let set = run.finish(&mut media);

        assert_eq!(set.len(), 3);
        assert_eq!(set.frames[1].time, 1.0);
    }

    #[test]
    fn test_begin_requires_selection() {
        let mut media = MockSource::new(60.0);
        assert!(SampleRun::begin(&mut media, None, 2.0, false, "t").is_err());
    }

    #[test]
    fn test_begin_requires_positive_rate() {
        let mut media = MockSource::new(60.0);
        let sel = Some(TimeRange::new(0.0, 5.0));
        assert!(SampleRun::begin(&mut media, sel, 0.0, false, "t").is_err());
    }

    #[test]
    fn test_begin_rejects_zero_surface_before_seeking() {
        let mut media = MockSource::new(60.0);
        media.frame = RgbaImage::new(0, 0);
        let sel = Some(TimeRange::new(0.0, 5.0));
        assert!(SampleRun::begin(&mut media, sel, 2.0, false, "t").is_err());
        assert!(media.seeks.is_empty());
    }

    #[test]
    fn test_restart_discards_partial_output() {
        let mut media = MockSource::new(60.0);
        let store = AnnotationStore::new();

        let mut first = SampleRun::begin(
            &mut media,
            Some(TimeRange::new(0.0, 10.0)),
            2.0,
            false,
            "abcd1234",
        )
        .unwrap();
        // Capture a few frames, then abandon the run mid-flight.
        for _ in 0..10 {
            first.step(&mut media, &store).unwrap();
        }
        assert!(first.captured() > 0);
        first.abort(&mut media);

        let mut second = SampleRun::begin(
            &mut media,
            Some(TimeRange::new(0.0, 1.0)),
            1.0,
            false,
            "abcd1234",
        )
        .unwrap();
        run_to_completion(&mut second, &mut media, &store);
        let set = second.finish(&mut media);

        assert_eq!(set.len(), 2);
        assert!(set.frames.iter().all(|f| f.time <= 1.0));
    }
}
