//! Binary layout of the shared velocity record.
//!
//! ```text
//! ┌───────────────────────┬───────────────────────┐
//! │ velocity: f32 (4B)    │ active: u32 (4B)      │
//! │ offset 0              │ offset 4              │
//! └───────────────────────┴───────────────────────┘
//! ```
//!
//! Packed, native endian, 8 bytes. The producer owns the region; this side
//! only ever reads it.

use std::mem::size_of;

pub const SIGNAL_RECORD_SIZE: usize = 8;

#[repr(C, packed)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SignalRecord {
    /// Producer-normalized velocity, nominally in [-1.0, 1.0].
    pub velocity: f32,
    /// 0 = producer paused or absent, anything else = live.
    pub active: u32,
}

const _: () = assert!(size_of::<SignalRecord>() == SIGNAL_RECORD_SIZE);

impl SignalRecord {
    pub fn live(velocity: f32) -> Self {
        Self { velocity, active: 1 }
    }

    pub fn paused(velocity: f32) -> Self {
        Self { velocity, active: 0 }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active != 0
    }

    /// The value the layer should see: `velocity` verbatim while live,
    /// 0.0 while paused. No clamping here.
    #[inline]
    pub fn signal(&self) -> f32 {
        if self.is_active() { self.velocity } else { 0.0 }
    }

    /// Reads a record from the start of a mapped region.
    ///
    /// # Safety
    /// `base` must point to at least `SIGNAL_RECORD_SIZE` readable bytes.
    #[inline]
    pub unsafe fn load(base: *const u8) -> Self {
        // SAFETY: size guaranteed by the caller; packed means align 1, and
        // volatile keeps the compiler from caching a value another process
        // keeps rewriting.
        unsafe { std::ptr::read_volatile(base as *const SignalRecord) }
    }
}
