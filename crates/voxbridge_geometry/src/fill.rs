//! Interior fill for dense cell arrays.
//!
//! Cells are laid out x-major: `index = (x * size_y + y) * size_z + z`.
//! `None` is empty, `Some(i)` is solid with palette index `i`.

use std::collections::VecDeque;

/// Dense cell layout helper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellLayout {
    size: [usize; 3],
}

impl CellLayout {
    /// Layout for a grid of `size` cells.
    #[must_use]
    pub const fn new(size: [usize; 3]) -> Self {
        Self { size }
    }

    /// Total cell count.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.size[0] * self.size[1] * self.size[2]
    }

    /// True when any axis is zero.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Linear index of `(x, y, z)`.
    #[inline]
    #[must_use]
    pub const fn index(&self, [x, y, z]: [usize; 3]) -> usize {
        (x * self.size[1] + y) * self.size[2] + z
    }

    /// Coordinate of linear index `i`.
    #[inline]
    #[must_use]
    pub const fn coord(&self, i: usize) -> [usize; 3] {
        let z = i % self.size[2];
        let y = (i / self.size[2]) % self.size[1];
        let x = i / (self.size[1] * self.size[2]);
        [x, y, z]
    }

    /// True when the cell touches the outside of the grid.
    #[must_use]
    pub const fn on_boundary(&self, [x, y, z]: [usize; 3]) -> bool {
        x == 0
            || y == 0
            || z == 0
            || x + 1 == self.size[0]
            || y + 1 == self.size[1]
            || z + 1 == self.size[2]
    }

    /// Face-adjacent neighbours of cell `i` (up to 6).
    pub fn neighbors(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        let c = self.coord(i);
        (0..3).flat_map(move |axis| {
            let below = (c[axis] > 0).then(|| {
                let mut n = c;
                n[axis] -= 1;
                self.index(n)
            });
            let above = (c[axis] + 1 < self.size[axis]).then(|| {
                let mut n = c;
                n[axis] += 1;
                self.index(n)
            });
            below.into_iter().chain(above)
        })
    }
}

/// Fills empty cells that cannot reach the grid boundary through other empty
/// cells (6-connected). Each filled cell takes the palette index of its
/// nearest solid cell by breadth-first distance. Returns the number of cells
/// filled.
pub fn fill_interior(layout: CellLayout, cells: &mut [Option<u8>]) -> usize {
    debug_assert_eq!(cells.len(), layout.len());

    // Pass 1: flood outside space from every empty boundary cell.
    let mut outside = vec![false; cells.len()];
    let mut queue = VecDeque::new();
    for i in 0..cells.len() {
        if cells[i].is_none() && layout.on_boundary(layout.coord(i)) {
            outside[i] = true;
            queue.push_back(i);
        }
    }
    while let Some(i) = queue.pop_front() {
        for n in layout.neighbors(i) {
            if cells[n].is_none() && !outside[n] {
                outside[n] = true;
                queue.push_back(n);
            }
        }
    }

    // Pass 2: multi-source propagation from solid cells into enclosed space.
    let enclosed = |cells: &[Option<u8>], i: usize| cells[i].is_none() && !outside[i];
    for i in 0..cells.len() {
        if cells[i].is_some() && layout.neighbors(i).any(|n| enclosed(cells, n)) {
            queue.push_back(i);
        }
    }
    let mut filled = 0;
    while let Some(i) = queue.pop_front() {
        let index = cells[i];
        for n in layout.neighbors(i) {
            if enclosed(cells, n) {
                cells[n] = index;
                filled += 1;
                queue.push_back(n);
            }
        }
    }
    filled
}
