//! Spatial index mapping building floor-space to materials.
//!
//! The grid is a flat array of palette indices with `(row, col) → index`
//! arithmetic; empty cells use a `None` sentinel. Materials are interned by
//! value into a small palette, so a wall spanning thousands of cells stores
//! its material once.

use crate::error::Error;
use crate::materials::Material;

/// 2D material occupancy grid over a rectangular building extent.
///
/// Built incrementally by axis-aligned rectangle paints ([`MaterialGrid::place`])
/// and never mutated once handed to the ray tracer, so it can be shared
/// read-only across sample points without locking.
#[derive(Debug, Clone)]
pub struct MaterialGrid {
    width_m: f64,
    height_m: f64,
    resolution_m: f64,
    cols: usize,
    rows: usize,
    /// Row-major cell contents; `None` marks free space.
    cells: Vec<Option<u16>>,
    /// Distinct materials placed so far, indexed by the cell values.
    palette: Vec<Material>,
}

impl MaterialGrid {
    /// Create an empty grid covering `width_m × height_m` meters at the given
    /// cell resolution (meters per cell).
    ///
    /// Grid dimensions are `ceil(height/resolution) × ceil(width/resolution)`.
    pub fn new(width_m: f64, height_m: f64, resolution_m: f64) -> Result<Self, Error> {
        if !(width_m > 0.0) || !(height_m > 0.0) {
            return Err(Error::InvalidGrid(format!(
                "extent must be positive, got {width_m} x {height_m} m"
            )));
        }
        if !(resolution_m > 0.0) {
            return Err(Error::InvalidGrid(format!(
                "resolution must be positive, got {resolution_m} m"
            )));
        }
        let cols = (width_m / resolution_m).ceil() as usize;
        let rows = (height_m / resolution_m).ceil() as usize;
        Ok(Self {
            width_m,
            height_m,
            resolution_m,
            cols,
            rows,
            cells: vec![None; cols * rows],
            palette: Vec::new(),
        })
    }

    pub fn width_m(&self) -> f64 {
        self.width_m
    }

    pub fn height_m(&self) -> f64 {
        self.height_m
    }

    pub fn resolution_m(&self) -> f64 {
        self.resolution_m
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Paint an axis-aligned rectangle of material.
    ///
    /// `(x, y)` is the bottom-left corner and `w`/`h` the extent, all in
    /// meters. Every covered cell is overwritten (last write wins; rectangles
    /// may overlap). Portions outside the grid are silently dropped, the
    /// building exterior is expected, not exceptional.
    pub fn place(&mut self, material: &Material, x: f64, y: f64, w: f64, h: f64) {
        let palette_id = self.intern(material);

        let col_start = self.clamp_col(x);
        let col_end = self.clamp_col(x + w);
        let row_start = self.clamp_row(y);
        let row_end = self.clamp_row(y + h);

        for row in row_start..row_end {
            for col in col_start..col_end {
                self.cells[row * self.cols + col] = Some(palette_id);
            }
        }
    }

    /// Material occupying the cell containing the point `(x, y)` in meters.
    ///
    /// Returns `None` for free-space cells and for points outside the grid.
    pub fn material_at(&self, x: f64, y: f64) -> Option<&Material> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let col = (x / self.resolution_m).floor() as usize;
        let row = (y / self.resolution_m).floor() as usize;
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.cells[row * self.cols + col]
            .map(|palette_id| &self.palette[palette_id as usize])
    }

    /// Intern a material by value equality, returning its palette index.
    fn intern(&mut self, material: &Material) -> u16 {
        if let Some(found) = self.palette.iter().position(|known| known == material) {
            return found as u16;
        }
        self.palette.push(material.clone());
        (self.palette.len() - 1) as u16
    }

    fn clamp_col(&self, x: f64) -> usize {
        ((x / self.resolution_m).floor().max(0.0) as usize).min(self.cols)
    }

    fn clamp_row(&self, y: f64) -> usize {
        ((y / self.resolution_m).floor().max(0.0) as usize).min(self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::{concrete, glass};

    #[test]
    fn dimensions_round_up_to_whole_cells() {
        let grid = MaterialGrid::new(20.0, 15.0, 0.5).unwrap();
        assert_eq!(40, grid.cols());
        assert_eq!(30, grid.rows());

        // Fractional extent still gets a full trailing cell
        let grid = MaterialGrid::new(10.3, 4.1, 0.5).unwrap();
        assert_eq!(21, grid.cols());
        assert_eq!(9, grid.rows());
    }

    #[test]
    fn invalid_geometry_is_rejected() {
        assert!(MaterialGrid::new(0.0, 10.0, 0.5).is_err());
        assert!(MaterialGrid::new(10.0, -1.0, 0.5).is_err());
        assert!(MaterialGrid::new(10.0, 10.0, 0.0).is_err());
    }

    #[test]
    fn place_and_lookup() {
        let mut grid = MaterialGrid::new(10.0, 10.0, 0.5).unwrap();
        grid.place(&concrete(), 2.0, 2.0, 1.0, 3.0);

        assert_eq!(Some(&concrete()), grid.material_at(2.25, 4.75));
        assert_eq!(None, grid.material_at(1.75, 2.25));
        assert_eq!(None, grid.material_at(2.25, 5.25));
    }

    #[test]
    fn last_write_wins_on_overlap() {
        let mut grid = MaterialGrid::new(10.0, 10.0, 0.5).unwrap();
        grid.place(&concrete(), 0.0, 0.0, 4.0, 4.0);
        grid.place(&glass(), 1.0, 1.0, 1.0, 1.0);

        assert_eq!(Some(&glass()), grid.material_at(1.25, 1.25));
        assert_eq!(Some(&concrete()), grid.material_at(0.25, 0.25));
    }

    #[test]
    fn out_of_range_paint_is_clamped_silently() {
        let mut grid = MaterialGrid::new(5.0, 5.0, 0.5).unwrap();
        // Rectangle mostly outside the extent; only the overlap is painted
        grid.place(&concrete(), -2.0, -2.0, 4.0, 4.0);
        grid.place(&glass(), 4.0, 4.0, 10.0, 10.0);

        assert_eq!(Some(&concrete()), grid.material_at(0.25, 0.25));
        assert_eq!(Some(&glass()), grid.material_at(4.75, 4.75));
        assert_eq!(None, grid.material_at(3.0, 3.0));
    }

    #[test]
    fn lookup_outside_grid_is_none() {
        let grid = MaterialGrid::new(5.0, 5.0, 0.5).unwrap();
        assert_eq!(None, grid.material_at(-0.1, 1.0));
        assert_eq!(None, grid.material_at(1.0, 5.1));
        assert_eq!(None, grid.material_at(5.1, 1.0));
    }

    #[test]
    fn equal_materials_share_a_palette_entry() {
        let mut grid = MaterialGrid::new(5.0, 5.0, 0.5).unwrap();
        grid.place(&concrete(), 0.0, 0.0, 1.0, 1.0);
        grid.place(&concrete().clone(), 3.0, 3.0, 1.0, 1.0);
        assert_eq!(1, grid.palette.len());
    }
}
