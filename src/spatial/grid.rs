//! Generic row-major grid for per-cell data

/// Offsets of the 8-cell Moore neighbourhood
const MOORE_OFFSETS: [(i32, i32); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0),           (1, 0),
    (-1, 1),  (0, 1),  (1, 1),
];

/// Generic 2D grid stored row-major
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T: Clone + Default> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if self.contains(x, y) {
            Some(y as usize * self.width + x as usize)
        } else {
            None
        }
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<&T> {
        self.index(x, y).map(|i| &self.data[i])
    }

    #[inline]
    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut T> {
        self.index(x, y).map(move |i| &mut self.data[i])
    }

    #[inline]
    pub fn set(&mut self, x: i32, y: i32, value: T) {
        if let Some(i) = self.index(x, y) {
            self.data[i] = value;
        }
    }

    /// All coordinates, y outer and x inner
    pub fn coords(&self) -> impl Iterator<Item = (i32, i32)> {
        let (width, height) = (self.width as i32, self.height as i32);
        (0..height).flat_map(move |y| (0..width).map(move |x| (x, y)))
    }

    /// In-bounds Moore neighbours of a cell, in fixed scan order
    pub fn moore_neighbors(&self, x: i32, y: i32) -> Vec<(i32, i32)> {
        MOORE_OFFSETS
            .iter()
            .map(|(dx, dy)| (x + dx, y + dy))
            .filter(|&(nx, ny)| self.contains(nx, ny))
            .collect()
    }
}
