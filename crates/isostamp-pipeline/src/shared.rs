//! Shared state container: lock-free arenas for the working image and
//! the classification grid.
//!
//! Both buffers are pre-allocated before any worker launches and shared
//! by reference across the pool. Cells are `AtomicU8` with relaxed
//! loads/stores: within a phase every byte is written by at most one
//! worker (the partitioning contract), and the coordinator's barrier
//! provides the cross-phase ordering, so no stronger ordering and no
//! locks are needed.

use std::sync::atomic::{AtomicU8, Ordering};

use image::{Rgb, RgbImage};

use crate::types::Dimensions;

/// A 3-channel 8-bit image whose pixels may be written concurrently by
/// workers holding disjoint partitions.
pub struct SharedImage {
    width: u32,
    height: u32,
    data: Vec<AtomicU8>,
}

impl SharedImage {
    /// A zero-filled (black) image of the given dimensions.
    #[must_use]
    pub fn blank(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize * 3;
        let mut data = Vec::with_capacity(len);
        data.resize_with(len, || AtomicU8::new(0));
        Self {
            width,
            height,
            data,
        }
    }

    /// Copy an existing image into a shared arena.
    #[must_use]
    pub fn from_image(image: &RgbImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            data: image.as_raw().iter().map(|&b| AtomicU8::new(b)).collect(),
        }
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Width and height together.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        (y as usize * self.width as usize + x as usize) * 3
    }

    /// Read the pixel at `(x, y)`.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let at = self.offset(x, y);
        [
            self.data[at].load(Ordering::Relaxed),
            self.data[at + 1].load(Ordering::Relaxed),
            self.data[at + 2].load(Ordering::Relaxed),
        ]
    }

    /// Write the pixel at `(x, y)`. Caller contract: within a phase,
    /// no other worker writes the same pixel.
    pub fn set_pixel(&self, x: u32, y: u32, rgb: [u8; 3]) {
        let at = self.offset(x, y);
        self.data[at].store(rgb[0], Ordering::Relaxed);
        self.data[at + 1].store(rgb[1], Ordering::Relaxed);
        self.data[at + 2].store(rgb[2], Ordering::Relaxed);
    }

    /// Extract the arena into an owned `RgbImage`.
    #[must_use]
    pub fn to_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| Rgb(self.pixel(x, y)))
    }
}

/// The binary classification grid: `rows x cols` single-byte cells,
/// sized `(p + 1) x (q + 1)` for a `p x q` cell-block space.
///
/// Populated entirely during the sampling phase (each cell written
/// exactly once), read-only during marching.
pub struct SharedGrid {
    rows: usize,
    cols: usize,
    cells: Vec<AtomicU8>,
}

impl SharedGrid {
    /// A zero-filled grid with the given dimensions.
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        let mut cells = Vec::with_capacity(rows * cols);
        cells.resize_with(rows * cols, || AtomicU8::new(0));
        Self {
            rows,
            cols,
            cells,
        }
    }

    /// Number of grid rows (`p + 1`).
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of grid columns (`q + 1`).
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Read the cell at `(row, col)`.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        debug_assert!(row < self.rows && col < self.cols, "cell out of bounds");
        self.cells[row * self.cols + col].load(Ordering::Relaxed)
    }

    /// Write the cell at `(row, col)`. Caller contract: each cell is
    /// written by exactly one worker during the sampling phase.
    pub fn set(&self, row: usize, col: usize, value: u8) {
        debug_assert!(row < self.rows && col < self.cols, "cell out of bounds");
        self.cells[row * self.cols + col].store(value, Ordering::Relaxed);
    }

    /// Snapshot the grid contents row-major, for inspection and tests.
    #[must_use]
    pub fn snapshot(&self) -> Vec<u8> {
        self.cells
            .iter()
            .map(|cell| cell.load(Ordering::Relaxed))
            .collect()
    }
}
