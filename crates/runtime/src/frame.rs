use foundation::time::Time;

/// Metadata for one presented frame.
///
/// Frames are paced by the host (display refresh), so `dt_s` varies from tick
/// to tick. The index is 0-based and strictly increasing.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    pub index: u64,
    /// Seconds since the previous frame.
    pub dt_s: f64,
    /// Time at the start of the frame (seconds since the clock started).
    pub time: Time,
}

impl Frame {
    pub fn first(dt_s: f64) -> Self {
        Self {
            index: 0,
            dt_s,
            time: Time::ZERO,
        }
    }

    pub fn next(self, dt_s: f64) -> Self {
        Self {
            index: self.index + 1,
            dt_s,
            time: self.time + self.dt_s,
        }
    }
}

/// Source of frame ticks.
///
/// The native viewer backs this with a paced timer; tests use
/// [`ManualFrameSource`] to step a fixed number of frames without sleeping.
pub trait FrameSource {
    /// Returns the next frame, or `None` once the source is exhausted.
    fn next_frame(&mut self) -> Option<Frame>;
}

/// Frame clock that hands out frames from externally measured deltas.
#[derive(Debug, Default)]
pub struct FrameClock {
    last: Option<Frame>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, dt_s: f64) -> Frame {
        let dt_s = dt_s.max(0.0);
        let frame = match self.last {
            None => Frame::first(dt_s),
            Some(prev) => prev.next(dt_s),
        };
        self.last = Some(frame);
        frame
    }

    pub fn frames_elapsed(&self) -> u64 {
        self.last.map(|f| f.index + 1).unwrap_or(0)
    }
}

/// Deterministic frame source producing `remaining` frames at a fixed delta.
#[derive(Debug)]
pub struct ManualFrameSource {
    clock: FrameClock,
    dt_s: f64,
    remaining: u64,
}

impl ManualFrameSource {
    pub fn new(frames: u64, dt_s: f64) -> Self {
        Self {
            clock: FrameClock::new(),
            dt_s,
            remaining: frames,
        }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }
}

impl FrameSource for ManualFrameSource {
    fn next_frame(&mut self) -> Option<Frame> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.clock.advance(self.dt_s))
    }
}

#[cfg(test)]
mod tests {
    use super::{Frame, FrameClock, FrameSource, ManualFrameSource};
    use foundation::time::Time;

    #[test]
    fn next_advances_index_and_time() {
        let f0 = Frame::first(0.5);
        let f1 = f0.next(0.25);
        assert_eq!(f1.index, 1);
        assert_eq!(f1.time, Time(0.5));
        assert_eq!(f1.dt_s, 0.25);
    }

    #[test]
    fn clock_clamps_negative_deltas() {
        let mut clock = FrameClock::new();
        let f = clock.advance(-1.0);
        assert_eq!(f.dt_s, 0.0);
        assert_eq!(clock.frames_elapsed(), 1);
    }

    #[test]
    fn manual_source_is_finite() {
        let mut src = ManualFrameSource::new(3, 1.0 / 60.0);
        let indices: Vec<u64> = std::iter::from_fn(|| src.next_frame())
            .map(|f| f.index)
            .collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(src.remaining(), 0);
    }
}
