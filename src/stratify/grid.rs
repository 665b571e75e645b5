//! Grid geometry: dividers, breakpoints, cell lookup and cell areas.
//!
//! Dividers are stored as percentages in (0, 100). Lookup happens in the
//! normalized unit square, where row 0 is the top band and col 0 the left band.

use serde::{Deserialize, Serialize};

use crate::error::{Axis, Error, Result};

/// Lowest position a dragged divider may take (percent).
pub const DIVIDER_MIN: f64 = 5.0;

/// Highest position a dragged divider may take (percent).
pub const DIVIDER_MAX: f64 = 95.0;

/// Minimum distance kept between neighbouring dividers when one is moved (percent).
pub const DIVIDER_MIN_GAP: f64 = 1.0;

/// Row/column address of a grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellIndex {
    pub row: usize,
    pub col: usize,
}

impl CellIndex {
    #[inline]
    pub fn new(row: usize, col: usize) -> Self {
        CellIndex { row, col }
    }
}

/// Normalized axis-aligned rectangle `[x0, x1) x [y0, y1)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellRect {
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
}

impl CellRect {
    #[inline]
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }
}

/// Sorted interval boundaries `[0, d1/100, ..., dk/100, 1]` along one axis.
///
/// This is the only place that decides which band a coordinate falls in.
#[derive(Clone, Debug, PartialEq)]
pub struct Breakpoints(Vec<f64>);

impl Breakpoints {
    /// Build from divider percentages. No validation: candidate partitions in
    /// the surface search may place a divider on the boundary itself.
    pub fn from_dividers(dividers: &[f64]) -> Self {
        let mut points = Vec::with_capacity(dividers.len() + 2);
        points.push(0.0);
        points.extend(dividers.iter().map(|p| p / 100.0));
        points.push(1.0);
        Breakpoints(points)
    }

    /// Number of bands.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len() - 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn points(&self) -> &[f64] {
        &self.0
    }

    /// Band whose half-open interval `[p[i], p[i+1])` contains `v`.
    /// Falls back to the last band when nothing matches (e.g. `v == 1.0`).
    #[inline]
    pub fn locate(&self, v: f64) -> usize {
        locate_band(&self.0, v)
    }

    #[inline]
    pub fn start(&self, band: usize) -> f64 {
        self.0[band]
    }

    #[inline]
    pub fn end(&self, band: usize) -> f64 {
        self.0[band + 1]
    }

    #[inline]
    pub fn width(&self, band: usize) -> f64 {
        self.0[band + 1] - self.0[band]
    }
}

/// Band lookup over raw boundaries `[0, ..., 1]`, shared by [`Breakpoints`]
/// and the fixed-size candidate partitions of the surface search.
#[inline]
pub fn locate_band(points: &[f64], v: f64) -> usize {
    let bands = points.len() - 1;
    for i in 0..bands {
        if v >= points[i] && v < points[i + 1] {
            return i;
        }
    }
    bands - 1
}

/// Both axes' breakpoints of one grid, built once for repeated lookups.
#[derive(Clone, Debug, PartialEq)]
pub struct CellLocator {
    ys: Breakpoints,
    xs: Breakpoints,
}

impl CellLocator {
    #[inline]
    pub fn cell_for(&self, x: f64, y: f64) -> CellIndex {
        CellIndex {
            row: self.ys.locate(y),
            col: self.xs.locate(x),
        }
    }
}

/// Serialized form, validated on the way in.
#[derive(Deserialize)]
struct RawGrid {
    rows: usize,
    cols: usize,
    horizontal_dividers: Vec<f64>,
    vertical_dividers: Vec<f64>,
}

impl TryFrom<RawGrid> for GridConfiguration {
    type Error = Error;

    fn try_from(raw: RawGrid) -> Result<Self> {
        GridConfiguration::new(
            raw.rows,
            raw.cols,
            raw.horizontal_dividers,
            raw.vertical_dividers,
        )
    }
}

/// Partition of the unit square into `rows x cols` cells.
///
/// Divider arrays always hold exactly `dimension - 1` strictly increasing
/// entries in (0, 100).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct GridConfiguration {
    rows: usize,
    cols: usize,
    horizontal_dividers: Vec<f64>,
    vertical_dividers: Vec<f64>,
}

impl Default for GridConfiguration {
    fn default() -> Self {
        GridConfiguration {
            rows: 2,
            cols: 2,
            horizontal_dividers: vec![50.0],
            vertical_dividers: vec![50.0],
        }
    }
}

fn validate_dividers(axis: Axis, dividers: &[f64], dimension: usize) -> Result<()> {
    if dividers.len() != dimension - 1 {
        return Err(Error::InvalidDividers {
            axis,
            reason: format!("expected {} dividers, got {}", dimension - 1, dividers.len()),
        });
    }
    if let Some(bad) = dividers
        .iter()
        .find(|p| !p.is_finite() || **p <= 0.0 || **p >= 100.0)
    {
        return Err(Error::InvalidDividers {
            axis,
            reason: format!("position {} outside (0, 100)", bad),
        });
    }
    if dividers.windows(2).any(|w| w[0] >= w[1]) {
        return Err(Error::InvalidDividers {
            axis,
            reason: "positions must be strictly increasing".to_string(),
        });
    }
    Ok(())
}

fn even_dividers(n: usize) -> Vec<f64> {
    (1..n).map(|i| i as f64 / n as f64 * 100.0).collect()
}

impl GridConfiguration {
    /// Build a grid from explicit divider positions.
    pub fn new(
        rows: usize,
        cols: usize,
        horizontal_dividers: Vec<f64>,
        vertical_dividers: Vec<f64>,
    ) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidDimensions { rows, cols });
        }
        validate_dividers(Axis::Horizontal, &horizontal_dividers, rows)?;
        validate_dividers(Axis::Vertical, &vertical_dividers, cols)?;
        Ok(GridConfiguration {
            rows,
            cols,
            horizontal_dividers,
            vertical_dividers,
        })
    }

    /// Evenly spaced grid: divider `i` sits at `i / n * 100`.
    pub fn uniform(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidDimensions { rows, cols });
        }
        Ok(GridConfiguration {
            rows,
            cols,
            horizontal_dividers: even_dividers(rows),
            vertical_dividers: even_dividers(cols),
        })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    pub fn horizontal_dividers(&self) -> &[f64] {
        &self.horizontal_dividers
    }

    pub fn vertical_dividers(&self) -> &[f64] {
        &self.vertical_dividers
    }

    pub fn dividers(&self, axis: Axis) -> &[f64] {
        match axis {
            Axis::Horizontal => &self.horizontal_dividers,
            Axis::Vertical => &self.vertical_dividers,
        }
    }

    /// Y breakpoints (one band per row).
    pub fn row_breakpoints(&self) -> Breakpoints {
        Breakpoints::from_dividers(&self.horizontal_dividers)
    }

    /// X breakpoints (one band per column).
    pub fn col_breakpoints(&self) -> Breakpoints {
        Breakpoints::from_dividers(&self.vertical_dividers)
    }

    /// Cell containing the normalized point `(x, y)`.
    ///
    /// Builds the breakpoints on every call; use [`Self::locator`] in loops.
    pub fn cell_for(&self, x: f64, y: f64) -> CellIndex {
        self.locator().cell_for(x, y)
    }

    pub fn locator(&self) -> CellLocator {
        CellLocator {
            ys: self.row_breakpoints(),
            xs: self.col_breakpoints(),
        }
    }

    #[inline]
    pub fn contains(&self, cell: CellIndex) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }

    /// Row-major linear index of a cell.
    #[inline]
    pub fn index_of(&self, cell: CellIndex) -> usize {
        cell.row * self.cols + cell.col
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellIndex> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| CellIndex { row, col }))
    }

    /// Normalized rectangle of a cell. Panics if the cell is outside the grid.
    pub fn cell_bounds(&self, cell: CellIndex) -> CellRect {
        let ys = self.row_breakpoints();
        let xs = self.col_breakpoints();
        CellRect {
            x0: xs.start(cell.col),
            x1: xs.end(cell.col),
            y0: ys.start(cell.row),
            y1: ys.end(cell.row),
        }
    }

    /// Area fraction of a cell.
    pub fn cell_area(&self, cell: CellIndex) -> f64 {
        self.row_breakpoints().width(cell.row) * self.col_breakpoints().width(cell.col)
    }

    /// Area fractions of every cell, row-major.
    pub fn cell_areas(&self) -> Vec<f64> {
        let ys = self.row_breakpoints();
        let xs = self.col_breakpoints();
        self.cells()
            .map(|c| ys.width(c.row) * xs.width(c.col))
            .collect()
    }

    /// Change the dimensions and reset dividers to even spacing.
    pub fn set_dimensions(&mut self, rows: usize, cols: usize) -> Result<()> {
        *self = GridConfiguration::uniform(rows, cols)?;
        Ok(())
    }

    /// Reset dividers to even spacing, keeping the dimensions.
    pub fn reset_dividers(&mut self) {
        self.horizontal_dividers = even_dividers(self.rows);
        self.vertical_dividers = even_dividers(self.cols);
    }

    /// Move one divider, clamping it to `[DIVIDER_MIN, DIVIDER_MAX]` and to
    /// at least `DIVIDER_MIN_GAP` from its neighbours. Returns the applied position.
    pub fn move_divider(&mut self, axis: Axis, index: usize, position: f64) -> Result<f64> {
        if !position.is_finite() {
            return Err(Error::InvalidDividers {
                axis,
                reason: format!("position {} is not finite", position),
            });
        }
        let dividers = match axis {
            Axis::Horizontal => &mut self.horizontal_dividers,
            Axis::Vertical => &mut self.vertical_dividers,
        };
        let len = dividers.len();
        if index >= len {
            return Err(Error::DividerIndexOutOfRange { axis, index, len });
        }

        let mut lower = DIVIDER_MIN;
        let mut upper = DIVIDER_MAX;
        if index > 0 {
            lower = lower.max(dividers[index - 1] + DIVIDER_MIN_GAP);
        }
        if index + 1 < len {
            upper = upper.min(dividers[index + 1] - DIVIDER_MIN_GAP);
        }
        // Neighbours already tighter than the gap: leave the divider where it is.
        if lower > upper {
            return Ok(dividers[index]);
        }

        let applied = position.clamp(lower, upper);
        dividers[index] = applied;
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_dividers() {
        let grid = GridConfiguration::uniform(4, 2).unwrap();
        assert_eq!(grid.horizontal_dividers(), &[25.0, 50.0, 75.0]);
        assert_eq!(grid.vertical_dividers(), &[50.0]);
        assert_eq!(grid.cell_count(), 8);

        let single = GridConfiguration::uniform(1, 1).unwrap();
        assert!(single.horizontal_dividers().is_empty());
        assert_eq!(single.cell_for(0.3, 0.9), CellIndex::new(0, 0));
    }

    #[test]
    fn test_new_rejects_bad_dividers() {
        assert!(matches!(
            GridConfiguration::new(0, 2, vec![], vec![50.0]),
            Err(Error::InvalidDimensions { .. })
        ));
        // wrong count
        assert!(GridConfiguration::new(3, 1, vec![50.0], vec![]).is_err());
        // not increasing
        assert!(GridConfiguration::new(3, 1, vec![60.0, 40.0], vec![]).is_err());
        assert!(GridConfiguration::new(3, 1, vec![40.0, 40.0], vec![]).is_err());
        // boundary
        assert!(GridConfiguration::new(2, 1, vec![100.0], vec![]).is_err());
        assert!(GridConfiguration::new(2, 1, vec![0.0], vec![]).is_err());
        assert!(GridConfiguration::new(2, 1, vec![f64::NAN], vec![]).is_err());
        assert!(GridConfiguration::new(2, 2, vec![30.0], vec![70.0]).is_ok());
    }

    #[test]
    fn test_cell_for_half_open_bands() {
        let grid = GridConfiguration::new(2, 3, vec![40.0], vec![20.0, 60.0]).unwrap();

        assert_eq!(grid.cell_for(0.0, 0.0), CellIndex::new(0, 0));
        assert_eq!(grid.cell_for(0.19, 0.39), CellIndex::new(0, 0));
        // divider positions belong to the band below / to the right
        assert_eq!(grid.cell_for(0.2, 0.4), CellIndex::new(1, 1));
        assert_eq!(grid.cell_for(0.6, 0.1), CellIndex::new(0, 2));
        // upper boundary falls back to the last band
        assert_eq!(grid.cell_for(1.0, 1.0), CellIndex::new(1, 2));
    }

    #[test]
    fn test_cell_bounds_and_area() {
        let grid = GridConfiguration::new(2, 2, vec![25.0], vec![60.0]).unwrap();
        let rect = grid.cell_bounds(CellIndex::new(1, 0));
        assert_eq!(rect.y0, 0.25);
        assert_eq!(rect.y1, 1.0);
        assert_eq!(rect.x0, 0.0);
        assert_eq!(rect.x1, 0.6);
        assert!((grid.cell_area(CellIndex::new(1, 0)) - 0.45).abs() < 1e-12);

        let total: f64 = grid.cell_areas().iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cells_row_major() {
        let grid = GridConfiguration::uniform(2, 3).unwrap();
        let cells: Vec<CellIndex> = grid.cells().collect();
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[0], CellIndex::new(0, 0));
        assert_eq!(cells[2], CellIndex::new(0, 2));
        assert_eq!(cells[3], CellIndex::new(1, 0));
        for (i, cell) in cells.iter().enumerate() {
            assert_eq!(grid.index_of(*cell), i);
        }
    }

    #[test]
    fn test_move_divider_clamps() {
        let mut grid = GridConfiguration::uniform(3, 2).unwrap();

        // outer clamp
        assert_eq!(grid.move_divider(Axis::Vertical, 0, 99.0).unwrap(), 95.0);
        assert_eq!(grid.move_divider(Axis::Vertical, 0, -3.0).unwrap(), 5.0);

        // neighbour clamp keeps the order
        let h1 = grid.horizontal_dividers()[1];
        let applied = grid.move_divider(Axis::Horizontal, 0, 90.0).unwrap();
        assert_eq!(applied, h1 - DIVIDER_MIN_GAP);
        assert!(grid.horizontal_dividers()[0] < grid.horizontal_dividers()[1]);

        assert!(matches!(
            grid.move_divider(Axis::Horizontal, 2, 50.0),
            Err(Error::DividerIndexOutOfRange { len: 2, .. })
        ));
        assert!(grid.move_divider(Axis::Horizontal, 0, f64::NAN).is_err());
    }

    #[test]
    fn test_set_dimensions_and_reset() {
        let mut grid = GridConfiguration::uniform(2, 2).unwrap();
        grid.move_divider(Axis::Horizontal, 0, 30.0).unwrap();
        grid.reset_dividers();
        assert_eq!(grid.horizontal_dividers(), &[50.0]);

        grid.set_dimensions(1, 4).unwrap();
        assert_eq!(grid.rows(), 1);
        assert_eq!(grid.vertical_dividers(), &[25.0, 50.0, 75.0]);
        assert!(grid.set_dimensions(0, 4).is_err());
        // failed resize leaves the grid unchanged
        assert_eq!(grid.cols(), 4);
    }

    #[test]
    fn test_breakpoints_boundary_divider() {
        // candidate partitions may put a divider at 100
        let bp = Breakpoints::from_dividers(&[100.0]);
        assert_eq!(bp.len(), 2);
        assert_eq!(bp.locate(0.999), 0);
        assert_eq!(bp.locate(1.0), 1);
        assert_eq!(bp.width(1), 0.0);
        assert_eq!(locate_band(&[0.0, 1.0, 1.0], 1.0), 1);
    }

    #[test]
    fn test_locator_agrees_with_cell_for() {
        let grid = GridConfiguration::new(3, 4, vec![12.5, 61.0], vec![5.0, 33.0, 90.0]).unwrap();
        let locator = grid.locator();
        for &(x, y) in &[(0.0, 0.0), (0.05, 0.125), (0.5, 0.6), (0.9, 0.61), (1.0, 1.0)] {
            assert_eq!(locator.cell_for(x, y), grid.cell_for(x, y));
        }
        assert_eq!(locator.cell_for(0.05, 0.125), CellIndex::new(1, 1));
    }

    #[test]
    fn test_serde_validates() {
        let grid = GridConfiguration::new(2, 2, vec![30.0], vec![70.0]).unwrap();
        let json = serde_json::to_string(&grid).unwrap();
        let back: GridConfiguration = serde_json::from_str(&json).unwrap();
        assert_eq!(back, grid);

        let bad = r#"{"rows":2,"cols":1,"horizontal_dividers":[],"vertical_dividers":[]}"#;
        assert!(serde_json::from_str::<GridConfiguration>(bad).is_err());
    }
}
