//! Uniform grid spatial index
//!
//! Buckets entity indices by `(floor(x / cell), floor(y / cell))` in a dense
//! 2D array. A neighbor query returns everything in the 3x3 block around an
//! entity's cell, so with `cell_size >= max collision distance` no colliding
//! pair is ever missed. False positives are filtered by the resolver.

use glam::Vec2;

use crate::consts::MAX_GRID_CELLS;
use crate::error::ConfigError;

/// Marker for an index that was not inserted this tick
const NOT_INSERTED: usize = usize::MAX;

/// Cells needed to cover `width x height`, computed without overflow
pub fn cell_count(cell_size: f32, width: f32, height: f32) -> f64 {
    let cols = (width.max(0.0) as f64 / cell_size as f64).floor() + 1.0;
    let rows = (height.max(0.0) as f64 / cell_size as f64).floor() + 1.0;
    cols * rows
}

/// Reject arenas whose grid would not fit in memory
pub fn check_size(cell_size: f32, width: f32, height: f32) -> Result<(), ConfigError> {
    let cells = cell_count(cell_size, width, height);
    if !cells.is_finite() || cells > MAX_GRID_CELLS as f64 {
        return Err(ConfigError::Invalid {
            field: "cell_size",
            reason: "arena needs too many grid cells",
        });
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    cols: usize,
    rows: usize,
    /// Row-major buckets, `row * cols + col`
    buckets: Vec<Vec<usize>>,
    /// Bucket each entity index was inserted into
    cells: Vec<usize>,
}

impl SpatialGrid {
    /// Grid covering `[0, width] x [0, height]`
    pub fn new(cell_size: f32, width: f32, height: f32) -> Result<Self, ConfigError> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "cell_size",
                reason: "must be a positive number",
            });
        }
        check_size(cell_size, width, height)?;
        let cols = (width.max(0.0) / cell_size).floor() as usize + 1;
        let rows = (height.max(0.0) / cell_size).floor() as usize + 1;
        Ok(Self {
            cell_size,
            cols,
            rows,
            buckets: vec![Vec::new(); cols * rows],
            cells: Vec::new(),
        })
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Grid dimensions in cells `(cols, rows)`
    pub fn dimensions(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    /// Empty every bucket (keeps allocations)
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.cells.clear();
    }

    /// Column/row for a position, clamped onto the grid
    #[inline]
    pub fn cell_coords(&self, pos: Vec2) -> (usize, usize) {
        let col = (pos.x / self.cell_size).floor().max(0.0) as usize;
        let row = (pos.y / self.cell_size).floor().max(0.0) as usize;
        (col.min(self.cols - 1), row.min(self.rows - 1))
    }

    /// Bucket entity `index` at `pos`
    pub fn insert(&mut self, index: usize, pos: Vec2) {
        let (col, row) = self.cell_coords(pos);
        let cell = row * self.cols + col;
        self.buckets[cell].push(index);
        if index >= self.cells.len() {
            self.cells.resize(index + 1, NOT_INSERTED);
        }
        self.cells[index] = cell;
    }

    /// Clear and insert every position in order
    pub fn rebuild<'a>(&mut self, positions: impl IntoIterator<Item = &'a Vec2>) {
        self.clear();
        for (index, pos) in positions.into_iter().enumerate() {
            self.insert(index, *pos);
        }
    }

    /// Candidates in the 3x3 block around `index`'s cell, excluding itself.
    /// `out` is cleared first; nothing is returned for unknown indices.
    pub fn query_neighbors(&self, index: usize, out: &mut Vec<usize>) {
        out.clear();
        let Some(&cell) = self.cells.get(index) else {
            return;
        };
        if cell == NOT_INSERTED {
            return;
        }
        let col = cell % self.cols;
        let row = cell / self.cols;

        for r in row.saturating_sub(1)..=(row + 1).min(self.rows - 1) {
            for c in col.saturating_sub(1)..=(col + 1).min(self.cols - 1) {
                out.extend(
                    self.buckets[r * self.cols + c]
                        .iter()
                        .copied()
                        .filter(|&other| other != index),
                );
            }
        }
    }

    /// Change the covered area; buckets are emptied.
    /// Callers check the new size with [`check_size`] first.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.cols = (width.max(0.0) / self.cell_size).floor() as usize + 1;
        self.rows = (height.max(0.0) / self.cell_size).floor() as usize + 1;
        self.buckets = vec![Vec::new(); self.cols * self.rows];
        self.cells.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neighbors(grid: &SpatialGrid, index: usize) -> Vec<usize> {
        let mut out = Vec::new();
        grid.query_neighbors(index, &mut out);
        out.sort_unstable();
        out
    }

    #[test]
    fn test_rejects_bad_cell_size() {
        assert!(SpatialGrid::new(0.0, 100.0, 100.0).is_err());
        assert!(SpatialGrid::new(-3.0, 100.0, 100.0).is_err());
        assert!(SpatialGrid::new(f32::NAN, 100.0, 100.0).is_err());
    }

    #[test]
    fn test_rejects_oversized_grid() {
        assert!(matches!(
            SpatialGrid::new(10.0, 1e9, 1e9),
            Err(ConfigError::Invalid {
                field: "cell_size",
                ..
            })
        ));
        assert!(check_size(10.0, 800.0, 600.0).is_ok());
        assert_eq!(cell_count(10.0, 800.0, 600.0), 81.0 * 61.0);
    }

    #[test]
    fn test_close_but_not_colliding_pair_is_candidate() {
        let mut grid = SpatialGrid::new(50.0, 800.0, 600.0).unwrap();
        let positions = [Vec2::new(10.0, 10.0), Vec2::new(40.0, 40.0)];
        grid.rebuild(&positions);

        assert_eq!(neighbors(&grid, 0), vec![1]);
        assert_eq!(neighbors(&grid, 1), vec![0]);
        // The exact check still rejects them
        let reach = 5.0 + 5.0;
        assert!(positions[0].distance(positions[1]) > reach);
    }

    #[test]
    fn test_adjacent_cells_are_included() {
        let mut grid = SpatialGrid::new(50.0, 800.0, 600.0).unwrap();
        let positions = [
            Vec2::new(49.0, 49.0),  // cell (0, 0)
            Vec2::new(51.0, 51.0),  // cell (1, 1), diagonal neighbor
            Vec2::new(149.0, 49.0), // cell (2, 0), two columns away
        ];
        grid.rebuild(&positions);

        assert_eq!(neighbors(&grid, 0), vec![1]);
        assert_eq!(neighbors(&grid, 1), vec![0, 2]);
        assert_eq!(neighbors(&grid, 2), vec![1]);
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut grid = SpatialGrid::new(10.0, 100.0, 100.0).unwrap();
        grid.rebuild(&[Vec2::new(5.0, 5.0), Vec2::new(6.0, 6.0)]);
        grid.clear();
        assert!(neighbors(&grid, 0).is_empty());
    }

    #[test]
    fn test_out_of_bounds_positions_clamp_onto_edges() {
        let grid = SpatialGrid::new(10.0, 100.0, 50.0).unwrap();
        assert_eq!(grid.dimensions(), (11, 6));
        assert_eq!(grid.cell_coords(Vec2::new(-4.0, -4.0)), (0, 0));
        assert_eq!(grid.cell_coords(Vec2::new(1000.0, 1000.0)), (10, 5));
    }

    #[test]
    fn test_no_false_negatives_against_brute_force() {
        use rand::{Rng, SeedableRng};
        let mut rng = rand_pcg::Pcg32::seed_from_u64(7);
        let radius = 6.0;
        let mut grid = SpatialGrid::new(radius * 2.0, 300.0, 200.0).unwrap();
        let positions: Vec<Vec2> = (0..300)
            .map(|_| Vec2::new(rng.random_range(0.0..300.0), rng.random_range(0.0..200.0)))
            .collect();
        grid.rebuild(&positions);

        for i in 0..positions.len() {
            let found = neighbors(&grid, i);
            for j in 0..positions.len() {
                if i != j && positions[i].distance(positions[j]) < radius * 2.0 {
                    assert!(found.binary_search(&j).is_ok(), "missed pair ({i}, {j})");
                }
            }
        }
    }
}
