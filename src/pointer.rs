use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use egui::{pos2, Pos2, Rect};

/// "No position known yet."
pub const UNSET: Pos2 = pos2(-1.0, -1.0);

pub fn is_unset(p: Pos2) -> bool {
    p.x == -1.0
}

/// Latest known pointer position in grid space.
///
/// Written by the input side whenever the pointer moves and read by the
/// pipeline once per tick. Only the most recent value is kept; neither side
/// ever blocks.
#[derive(Debug, Clone)]
pub struct SharedPointer {
    packed: Arc<AtomicU64>,
}

impl Default for SharedPointer {
    fn default() -> Self {
        Self {
            packed: Arc::new(AtomicU64::new(pack(UNSET))),
        }
    }
}

impl SharedPointer {
    pub fn store(&self, position: Pos2) {
        self.packed.store(pack(position), Ordering::Relaxed);
    }

    pub fn load(&self) -> Pos2 {
        unpack(self.packed.load(Ordering::Relaxed))
    }

    /// Back to "no position known", e.g. after the grid was rebuilt at a
    /// different scale.
    pub fn clear(&self) {
        self.store(UNSET);
    }
}

fn pack(p: Pos2) -> u64 {
    ((p.x.to_bits() as u64) << 32) | p.y.to_bits() as u64
}

fn unpack(bits: u64) -> Pos2 {
    pos2(f32::from_bits((bits >> 32) as u32), f32::from_bits(bits as u32))
}

/// Pointer samples of the current and previous tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerHistory {
    pub previous: Pos2,
    pub current: Pos2,
}

impl Default for PointerHistory {
    fn default() -> Self {
        Self {
            previous: UNSET,
            current: UNSET,
        }
    }
}

impl PointerHistory {
    /// Records this tick's sample; the old current becomes previous.
    pub fn advance(&mut self, sample: Pos2) {
        self.previous = self.current;
        self.current = sample;
    }
}

/// Maps a screen position to grid space. Grid y grows upward while screen y
/// grows downward.
///
/// Positions outside `viewport` give `None`; the caller keeps publishing the
/// last position that was inside it.
pub fn screen_to_grid(screen: Pos2, viewport: Rect, scale: f32, grid_height: usize) -> Option<Pos2> {
    if !viewport.contains(screen) {
        return None;
    }
    let local = screen - viewport.min;
    Some(pos2(local.x * scale, grid_height as f32 - local.y * scale))
}
