//! Rectangular row-major grids and the transforms generators share.
//!
//! A [`Grid<T>`] stores `width * height` values in row-major order. All
//! transforms (`map`, `mirror`, `convolve`) allocate a fresh grid and leave
//! the receiver untouched.

use crate::error::ProcgenError;
use serde::ser::{Serialize, SerializeSeq, Serializer};

/// A fixed-size 2D grid with `height` rows of `width` elements each.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

/// Validates dimensions and returns the cell count.
fn cell_count(width: usize, height: usize) -> Result<usize, ProcgenError> {
    if width == 0 || height == 0 {
        return Err(ProcgenError::InvalidDimensions);
    }
    width
        .checked_mul(height)
        .ok_or(ProcgenError::InvalidDimensions)
}

impl<T: Clone> Grid<T> {
    /// Creates a grid with every cell set to `value`.
    ///
    /// Returns `ProcgenError::InvalidDimensions` if either dimension is zero
    /// or if `width * height` overflows `usize`.
    pub fn filled(width: usize, height: usize, value: T) -> Result<Self, ProcgenError> {
        let len = cell_count(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![value; len],
        })
    }

    /// Produces a grid where column `x` and column `w-1-x` both hold the
    /// source value at column `min(x, w-1-x)`.
    ///
    /// The left half (including the centre column for odd widths) is kept;
    /// the right half of the source is discarded.
    pub fn mirror(&self) -> Grid<T> {
        let w = self.width;
        let data = (0..self.height)
            .flat_map(|y| (0..w).map(move |x| (x.min(w - 1 - x), y)))
            .map(|(sx, y)| self.data[y * w + sx].clone())
            .collect();
        Grid {
            width: w,
            height: self.height,
            data,
        }
    }
}

impl<T> Grid<T> {
    /// Creates a grid by calling `f(x, y)` for every cell.
    ///
    /// Cells are visited row by row (`y` outer, `x` inner), so a stateful
    /// `f` such as one drawing from a random stream sees a stable order.
    pub fn from_fn(
        width: usize,
        height: usize,
        mut f: impl FnMut(usize, usize) -> T,
    ) -> Result<Self, ProcgenError> {
        let len = cell_count(width, height)?;
        let mut data = Vec::with_capacity(len);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Builds a grid from nested rows.
    ///
    /// Returns `ProcgenError::InvalidDimensions` for no rows or empty rows and
    /// `ProcgenError::DimensionMismatch` if any row differs in length from
    /// the first.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, ProcgenError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let len = cell_count(width, height)?;
        let mut data = Vec::with_capacity(len);
        for row in rows {
            if row.len() != width {
                return Err(ProcgenError::DimensionMismatch {
                    lhs_w: width,
                    lhs_h: height,
                    rhs_w: row.len(),
                    rhs_h: 1,
                });
            }
            data.extend(row);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Grid width in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Read-only access to the underlying row-major data.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Returns the cell at `(x, y)`, or `None` when out of bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if x < self.width && y < self.height {
            self.data.get(y * self.width + x)
        } else {
            None
        }
    }

    /// Mutable access to the cell at `(x, y)`, or `None` when out of bounds.
    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut T> {
        if x < self.width && y < self.height {
            self.data.get_mut(y * self.width + x)
        } else {
            None
        }
    }

    /// Returns the cell at `(x, y)` with toroidal wrapping, so negative and
    /// overflowing coordinates address the opposite edge.
    pub fn get_wrapped(&self, x: isize, y: isize) -> &T {
        let xi = x.rem_euclid(self.width as isize) as usize;
        let yi = y.rem_euclid(self.height as isize) as usize;
        &self.data[yi * self.width + xi]
    }

    /// Iterates over rows as slices, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> + '_ {
        self.data.chunks(self.width)
    }

    /// Iterates over all cells yielding `(x, y, &value)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> + '_ {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| (i % self.width, i / self.width, v))
    }

    /// Pure element-wise transform; `f` receives `(value, x, y)`.
    pub fn map<U>(&self, mut f: impl FnMut(&T, usize, usize) -> U) -> Grid<U> {
        Grid {
            width: self.width,
            height: self.height,
            data: self.iter().map(|(x, y, v)| f(v, x, y)).collect(),
        }
    }
}

impl Grid<f64> {
    /// 2D correlation with zero padding outside the grid.
    ///
    /// The kernel is not flipped. Its anchor sits at `(kw / 2, kh / 2)`
    /// (integer division), so even-sized kernels lean toward the lower-right.
    /// The output has the same dimensions as `self`.
    pub fn convolve(&self, kernel: &Grid<f64>) -> Grid<f64> {
        let (w, h) = (self.width as isize, self.height as isize);
        let (kw, kh) = (kernel.width as isize, kernel.height as isize);
        let (ox, oy) = (kw / 2, kh / 2);
        let data = (0..h)
            .flat_map(|y| (0..w).map(move |x| (x, y)))
            .map(|(x, y)| {
                let mut sum = 0.0;
                for ky in 0..kh {
                    let gy = y + ky - oy;
                    if gy < 0 || gy >= h {
                        continue;
                    }
                    for kx in 0..kw {
                        let gx = x + kx - ox;
                        if gx < 0 || gx >= w {
                            continue;
                        }
                        sum += self.data[(gy * w + gx) as usize]
                            * kernel.data[(ky * kw + kx) as usize];
                    }
                }
                sum
            })
            .collect();
        Grid {
            width: self.width,
            height: self.height,
            data,
        }
    }
}

/// Serializes as an array of rows, the shape renderers index as `[y][x]`.
impl<T: Serialize> Serialize for Grid<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.height))?;
        for row in self.rows() {
            seq.serialize_element(row)?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(width: usize, height: usize) -> Grid<f64> {
        Grid::from_fn(width, height, |x, y| (y * width + x) as f64).unwrap()
    }

    // -- Construction --

    #[test]
    fn filled_creates_constant_grid() {
        let grid = Grid::filled(4, 3, 7u8).unwrap();
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.data().len(), 12);
        assert!(grid.data().iter().all(|&v| v == 7));
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(matches!(
            Grid::filled(0, 5, 0.0),
            Err(ProcgenError::InvalidDimensions)
        ));
        assert!(Grid::filled(5, 0, 0.0).is_err());
        assert!(Grid::from_fn(0, 0, |_, _| 0.0).is_err());
    }

    #[test]
    fn overflowing_dimensions_are_rejected() {
        assert!(Grid::filled(usize::MAX, 2, 0u8).is_err());
    }

    #[test]
    fn from_fn_visits_cells_row_major() {
        let mut order = Vec::new();
        let grid = Grid::from_fn(3, 2, |x, y| {
            order.push((x, y));
            x + 10 * y
        })
        .unwrap();
        assert_eq!(order, vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]);
        assert_eq!(grid.get(2, 1), Some(&12));
    }

    #[test]
    fn from_rows_rejects_ragged_rows() {
        let result = Grid::from_rows(vec![vec![1.0, 2.0], vec![3.0]]);
        assert!(matches!(
            result,
            Err(ProcgenError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn from_rows_rejects_empty_input() {
        assert!(Grid::<f64>::from_rows(vec![]).is_err());
        assert!(Grid::<f64>::from_rows(vec![vec![]]).is_err());
    }

    // -- Access --

    #[test]
    fn get_out_of_bounds_is_none() {
        let grid = numbered(3, 3);
        assert_eq!(grid.get(3, 0), None);
        assert_eq!(grid.get(0, 3), None);
        assert_eq!(grid.get(2, 2), Some(&8.0));
    }

    #[test]
    fn get_wrapped_wraps_both_axes() {
        let grid = numbered(4, 3);
        assert_eq!(*grid.get_wrapped(-1, 0), 3.0);
        assert_eq!(*grid.get_wrapped(0, -1), 8.0);
        assert_eq!(*grid.get_wrapped(5, 4), 5.0);
    }

    #[test]
    fn get_mut_writes_cell() {
        let mut grid = Grid::filled(2, 2, 0).unwrap();
        *grid.get_mut(1, 1).unwrap() = 5;
        assert_eq!(grid.data(), &[0, 0, 0, 5]);
        assert!(grid.get_mut(2, 0).is_none());
    }

    #[test]
    fn rows_yield_height_slices_of_width() {
        let grid = numbered(3, 2);
        let rows: Vec<&[f64]> = grid.rows().collect();
        assert_eq!(rows, vec![&[0.0, 1.0, 2.0][..], &[3.0, 4.0, 5.0][..]]);
    }

    // -- map --

    #[test]
    fn map_passes_value_and_coordinates() {
        let grid = numbered(3, 2);
        let mapped = grid.map(|v, x, y| v + (x * 100 + y * 1000) as f64);
        assert_eq!(mapped.get(2, 1), Some(&(5.0 + 200.0 + 1000.0)));
        assert_eq!(mapped.width(), 3);
        assert_eq!(mapped.height(), 2);
        // Source untouched.
        assert_eq!(grid.get(2, 1), Some(&5.0));
    }

    // -- mirror --

    #[test]
    fn mirror_even_width_copies_left_half_onto_right() {
        let grid = Grid::from_rows(vec![vec![1, 2, 3, 4]]).unwrap();
        assert_eq!(grid.mirror().data(), &[1, 2, 2, 1]);
    }

    #[test]
    fn mirror_odd_width_keeps_centre_column() {
        let grid = Grid::from_rows(vec![vec![1, 2, 3, 4, 5]]).unwrap();
        assert_eq!(grid.mirror().data(), &[1, 2, 3, 2, 1]);
    }

    #[test]
    fn mirror_of_symmetric_grid_is_unchanged() {
        let grid = Grid::from_rows(vec![vec![1, 2, 2, 1], vec![3, 4, 4, 3]]).unwrap();
        assert_eq!(grid.mirror(), grid);
        assert_eq!(grid.mirror().mirror(), grid);
    }

    #[test]
    fn mirror_single_column_is_identity() {
        let grid = Grid::from_rows(vec![vec![1], vec![2]]).unwrap();
        assert_eq!(grid.mirror(), grid);
    }

    // -- convolve --

    #[test]
    fn convolve_with_unit_kernel_is_identity() {
        let grid = numbered(5, 4);
        let kernel = Grid::filled(1, 1, 1.0).unwrap();
        assert_eq!(grid.convolve(&kernel), grid);
    }

    #[test]
    fn convolve_with_zero_kernel_is_all_zero() {
        let grid = numbered(5, 4);
        let kernel = Grid::filled(3, 3, 0.0).unwrap();
        let out = grid.convolve(&kernel);
        assert_eq!(out.width(), 5);
        assert_eq!(out.height(), 4);
        assert!(out.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn convolve_box_kernel_zero_pads_edges() {
        let grid = Grid::filled(3, 3, 1.0).unwrap();
        let kernel = Grid::filled(3, 3, 1.0).unwrap();
        let out = grid.convolve(&kernel);
        assert_eq!(out.get(1, 1), Some(&9.0));
        assert_eq!(out.get(0, 0), Some(&4.0));
        assert_eq!(out.get(1, 0), Some(&6.0));
    }

    #[test]
    fn convolve_is_correlation_not_flipped() {
        // Kernel [0, 0, 1] reads the right-hand neighbour.
        let grid = Grid::from_rows(vec![vec![1.0, 2.0, 3.0]]).unwrap();
        let kernel = Grid::from_rows(vec![vec![0.0, 0.0, 1.0]]).unwrap();
        assert_eq!(grid.convolve(&kernel).data(), &[2.0, 3.0, 0.0]);
    }

    #[test]
    fn convolve_even_kernel_anchors_at_integer_half() {
        // kw = 2 => ox = 1, so the kernel covers columns x-1 and x.
        let grid = Grid::from_rows(vec![vec![1.0, 2.0, 3.0]]).unwrap();
        let kernel = Grid::from_rows(vec![vec![1.0, 10.0]]).unwrap();
        assert_eq!(grid.convolve(&kernel).data(), &[10.0, 21.0, 32.0]);
    }

    // -- Serialization --

    #[test]
    fn serializes_as_nested_rows() {
        let grid = Grid::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap();
        let json = serde_json::to_value(&grid).unwrap();
        assert_eq!(json, serde_json::json!([[1, 2], [3, 4]]));
    }

    // -- Property-based tests --

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn mirror_is_idempotent(w in 1_usize..12, h in 1_usize..6, salt: u32) {
                let grid = Grid::from_fn(w, h, |x, y| (x * 31 + y * 7) as u32 ^ salt).unwrap();
                let once = grid.mirror();
                prop_assert_eq!(once.mirror(), once.clone());
                for y in 0..h {
                    for x in 0..w {
                        prop_assert_eq!(once.get(x, y), once.get(w - 1 - x, y));
                    }
                }
            }

            #[test]
            fn map_preserves_dimensions(w in 1_usize..20, h in 1_usize..20) {
                let grid = Grid::filled(w, h, 1.0_f64).unwrap();
                let mapped = grid.map(|v, _, _| v * 2.0);
                prop_assert_eq!(mapped.width(), w);
                prop_assert_eq!(mapped.height(), h);
            }

            #[test]
            fn convolve_preserves_dimensions(
                w in 1_usize..10,
                h in 1_usize..10,
                kw in 1_usize..5,
                kh in 1_usize..5,
            ) {
                let grid = Grid::filled(w, h, 1.0).unwrap();
                let kernel = Grid::filled(kw, kh, 0.5).unwrap();
                let out = grid.convolve(&kernel);
                prop_assert_eq!(out.width(), w);
                prop_assert_eq!(out.height(), h);
            }
        }
    }
}
