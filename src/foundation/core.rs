use std::fmt;
use std::time::Duration;

/// Identifier minted for every animation instance.
///
/// Monotonically increasing per [`crate::Orchestrator`], never reused (not even after the instance
/// is destroyed). Every channel message for the instance carries it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Host-assigned identifier of a document element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "el{}", self.0)
    }
}

/// Identity of a decode worker: the pool generation it belongs to and its slot.
///
/// The generation changes every time the pool is torn down, so replies from a terminated pool can
/// be recognised and dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorkerId {
    /// Pool generation.
    pub generation: u32,
    /// Slot index within the pool, `0..pool size`.
    pub index: usize,
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.generation, self.index)
    }
}

/// Playback rate, clamped to `[1, 60]` frames per second.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Fps(f64);

impl Fps {
    /// Lowest accepted rate.
    pub const MIN: f64 = 1.0;
    /// Highest accepted rate.
    pub const MAX: f64 = 60.0;
    /// Rate used when the animation does not declare a usable one.
    pub const DEFAULT: Fps = Fps(60.0);

    /// Clamp a declared rate. Missing, zero and non-finite values fall back to [`Fps::DEFAULT`].
    pub fn clamped(raw: Option<f64>) -> Self {
        match raw {
            Some(v) if v.is_finite() && v != 0.0 => Self(v.clamp(Self::MIN, Self::MAX)),
            _ => Self::DEFAULT,
        }
    }

    /// Rate as floating point.
    pub fn as_f64(self) -> f64 {
        self.0
    }

    /// Time budget of one frame (`1000 / fps` ms).
    pub fn frame_interval(self) -> Duration {
        Duration::from_secs_f64(1.0 / self.0)
    }

    /// Frame queue capacity for this rate: a quarter second of frames, rounded up.
    pub fn queue_capacity(self) -> usize {
        ((self.0 / 4.0).ceil() as usize).max(1)
    }
}

/// Pixel dimensions of a presentation surface (already scaled by the device ratio).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixelSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelSize {
    /// Create a size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Byte length of a tightly packed RGBA8 frame of this size.
    pub fn byte_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }

    /// `true` when either dimension is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for PixelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
