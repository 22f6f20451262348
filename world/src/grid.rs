//! Hex grid generation and cell bookkeeping.

use std::collections::BTreeMap;

use hex_defence_core::{HexCoord, MapBounds, Position, TowerId};

/// Mutable state tracked for a single generated cell.
///
/// Cells are created once at map-generation time and never destroyed during a
/// session; only the occupancy fields mutate.
#[derive(Clone, Copy, Debug)]
pub(crate) struct CellState {
    pub(crate) position: Position,
    pub(crate) occupied: bool,
    pub(crate) tower: Option<TowerId>,
}

/// Dense axial-coordinate hex tiling bounded by a world-space box.
#[derive(Clone, Debug, Default)]
pub(crate) struct HexGrid {
    cells: BTreeMap<HexCoord, CellState>,
}

impl HexGrid {
    /// Generates a flat-top hex tiling covering the provided bounds.
    ///
    /// Columns are spaced three quarters of the hex width apart and odd
    /// columns shift down half a row; any cell whose center falls outside
    /// the bounds is skipped. Generation is deterministic for equal inputs.
    pub(crate) fn generate(bounds: MapBounds, hex_radius: f32) -> Self {
        let mut cells = BTreeMap::new();
        if hex_radius <= 0.0 {
            return Self { cells };
        }

        let hex_width = hex_radius * 2.0;
        let hex_height = 3.0_f32.sqrt() * hex_radius;
        let column_stride = hex_width * 0.75;

        let min_q = (bounds.min().x() / column_stride).floor() as i32;
        let max_q = (bounds.max().x() / column_stride).ceil() as i32;
        let min_r = (bounds.min().y() / hex_height).floor() as i32;
        let max_r = (bounds.max().y() / hex_height).ceil() as i32;

        for q in min_q..=max_q {
            for r in min_r..=max_r {
                let x = q as f32 * column_stride;
                let y = hex_height * (r as f32 + 0.5 * (q % 2) as f32);
                let position = Position::new(x, y);

                if !bounds.contains(position) {
                    continue;
                }

                let _ = cells.insert(
                    HexCoord::new(q, r),
                    CellState {
                        position,
                        occupied: false,
                        tower: None,
                    },
                );
            }
        }

        Self { cells }
    }

    pub(crate) fn cell(&self, coord: HexCoord) -> Option<&CellState> {
        self.cells.get(&coord)
    }

    pub(crate) fn cell_mut(&mut self, coord: HexCoord) -> Option<&mut CellState> {
        self.cells.get_mut(&coord)
    }

    pub(crate) fn len(&self) -> usize {
        self.cells.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&HexCoord, &CellState)> {
        self.cells.iter()
    }
}
