//! Neighbor adjacency under toroid or island boundary handling.

use crate::config::WorldConfig;
use crate::grid::Coord;
use serde::{Deserialize, Serialize};

/// Adjacency pattern, named after chess moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Movement {
    /// Four orthogonal neighbors
    Rook,
    /// Four diagonal neighbors
    Bishop,
    /// All eight neighbors
    Queen,
}

// Offsets are listed in row-major order; candidate lists keep this order,
// which makes uniform index draws reproducible for a given seed.
const ROOK_OFFSETS: [(i64, i64); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];
const BISHOP_OFFSETS: [(i64, i64); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const QUEEN_OFFSETS: [(i64, i64); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

impl Movement {
    fn offsets(&self) -> &'static [(i64, i64)] {
        match self {
            Movement::Rook => &ROOK_OFFSETS,
            Movement::Bishop => &BISHOP_OFFSETS,
            Movement::Queen => &QUEEN_OFFSETS,
        }
    }
}

/// Neighbor coordinates of `origin` under the given adjacency pattern.
///
/// Toroid worlds wrap both axes. Island worlds shift a border coordinate
/// inward by one before computing neighbors, which keeps every result in
/// range but makes corner and edge neighbor sets approximate: a corner
/// sees eight neighbors, one of which is the corner itself. The result is
/// never deduplicated; callers apply their own occupancy checks.
pub fn neighbor_coords(world: &WorldConfig, origin: Coord, movement: Movement) -> Vec<Coord> {
    let rows = world.north_south_length as i64;
    let cols = world.west_east_length as i64;

    let (ns, we) = if world.is_toroid {
        (origin.ns as i64, origin.we as i64)
    } else {
        (
            shift_inward(origin.ns as i64, rows),
            shift_inward(origin.we as i64, cols),
        )
    };

    movement
        .offsets()
        .iter()
        .map(|&(d_ns, d_we)| {
            if world.is_toroid {
                Coord::new(
                    (ns + d_ns).rem_euclid(rows) as usize,
                    (we + d_we).rem_euclid(cols) as usize,
                )
            } else {
                Coord::new((ns + d_ns) as usize, (we + d_we) as usize)
            }
        })
        .collect()
}

// Border coordinates move one step off the border; interior ones are kept.
// Assumes the axis length is at least 3, which island config validation
// guarantees.
fn shift_inward(pos: i64, len: i64) -> i64 {
    if pos == 0 {
        1
    } else if pos == len - 1 {
        len - 2
    } else {
        pos
    }
}
