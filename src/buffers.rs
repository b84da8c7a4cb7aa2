use egui::Vec2;

use crate::error::Result;
use crate::grid::{allocate_field, GridSize};
use crate::mask::ObstacleMask;

/// Identifies a double-buffered field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Velocity,
    Pressure,
}

/// Two allocations of the same field. One slot is the readable front, the
/// other the writable back; only `swap` changes which is which.
#[derive(Debug)]
pub struct DoubleBuffer<T> {
    slots: [Vec<T>; 2],
    front: usize,
}

impl<T: Clone + Default> DoubleBuffer<T> {
    pub fn zeroed(grid: GridSize) -> Result<Self> {
        Ok(Self {
            slots: [allocate_field(grid)?, allocate_field(grid)?],
            front: 0,
        })
    }
}

impl<T> DoubleBuffer<T> {
    pub fn front(&self) -> &[T] {
        &self.slots[self.front]
    }

    /// Front for reading and back for writing. The two never alias.
    pub fn split(&mut self) -> (&[T], &mut [T]) {
        let (first, second) = self.slots.split_at_mut(1);
        if self.front == 0 {
            (&first[0], &mut second[0])
        } else {
            (&second[0], &mut first[0])
        }
    }

    pub fn swap(&mut self) {
        self.front ^= 1;
    }

    pub(crate) fn slots(&self) -> &[Vec<T>; 2] {
        &self.slots
    }
}

/// All per-cell storage for one simulation instance.
///
/// Built once per reset and dropped wholesale on the next one.
#[derive(Debug)]
pub struct GridBufferSet {
    pub(crate) grid: GridSize,
    pub(crate) velocity: DoubleBuffer<Vec2>,
    pub(crate) pressure: DoubleBuffer<f32>,
    pub(crate) divergence: Vec<f32>,
    pub(crate) obstacles: ObstacleMask,
}

impl GridBufferSet {
    pub fn new(grid: GridSize, obstacles: ObstacleMask) -> Result<Self> {
        debug_assert_eq!(obstacles.grid(), grid);
        Ok(Self {
            grid,
            velocity: DoubleBuffer::zeroed(grid)?,
            pressure: DoubleBuffer::zeroed(grid)?,
            divergence: allocate_field(grid)?,
            obstacles,
        })
    }

    pub fn grid(&self) -> GridSize {
        self.grid
    }

    pub fn swap(&mut self, kind: FieldKind) {
        match kind {
            FieldKind::Velocity => self.velocity.swap(),
            FieldKind::Pressure => self.pressure.swap(),
        }
    }

    pub fn velocity(&self) -> &[Vec2] {
        self.velocity.front()
    }

    pub fn pressure(&self) -> &[f32] {
        self.pressure.front()
    }

    pub fn obstacles(&self) -> &ObstacleMask {
        &self.obstacles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_never_aliases() {
        let grid = GridSize::new(2, 2).unwrap();
        let mut buffer: DoubleBuffer<f32> = DoubleBuffer::zeroed(grid).unwrap();
        {
            let (front, back) = buffer.split();
            assert_ne!(front.as_ptr(), back.as_ptr() as *const f32);
            back.fill(1.0);
        }
        // Nothing is visible until the swap.
        assert!(buffer.front().iter().all(|&p| p == 0.0));
        buffer.swap();
        assert!(buffer.front().iter().all(|&p| p == 1.0));
    }

    #[test]
    fn test_swap_is_per_field() {
        let grid = GridSize::new(2, 1).unwrap();
        let mut set = GridBufferSet::new(grid, ObstacleMask::empty(grid).unwrap()).unwrap();
        set.pressure.split().1.fill(3.0);
        set.velocity.split().1.fill(Vec2::new(1.0, 2.0));

        set.swap(FieldKind::Pressure);
        assert_eq!(set.pressure(), &[3.0, 3.0]);
        assert_eq!(set.velocity(), &[Vec2::ZERO, Vec2::ZERO]);

        set.swap(FieldKind::Velocity);
        assert_eq!(set.velocity(), &[Vec2::new(1.0, 2.0), Vec2::new(1.0, 2.0)]);
        // A second pressure swap brings the untouched slot back.
        set.swap(FieldKind::Pressure);
        assert_eq!(set.pressure(), &[0.0, 0.0]);
    }
}
