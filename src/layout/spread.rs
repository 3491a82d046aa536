//! Anti-overlap spreading of storm anchors that share a grid cell.

use std::collections::BTreeMap;
use std::f64::consts::TAU;

use rand::Rng;

/// How many anchors fit on one ring before the next ring opens.
const RING_CAPACITY: usize = 8;
/// Random wobble applied to each slot angle, in radians.
const ANGLE_JITTER: f64 = 0.12;

/// Grid cell containing a pixel position. Floor division keeps cells
/// consistent for anchors left of or above the canvas origin.
pub fn cell_of(pos: (f64, f64), grid_size: u32) -> (i64, i64) {
    let grid = grid_size.max(1) as f64;
    ((pos.0 / grid).floor() as i64, (pos.1 / grid).floor() as i64)
}

/// Pixel offsets that fan out anchors sharing a grid cell.
///
/// Anchors alone in their cell keep a zero offset. Crowded cells place
/// members on concentric rings of up to eight slots, radius growing by
/// `spread_radius` per ring, with a little angular jitter so dense basins
/// do not look like a lattice. Cells are visited in sorted key order, so
/// the result depends only on the anchors and the RNG state.
pub fn spread_offsets<R: Rng>(
    anchors: &[(f64, f64)],
    grid_size: u32,
    spread_radius: f64,
    rng: &mut R,
) -> Vec<(i32, i32)> {
    let mut cells: BTreeMap<(i64, i64), Vec<usize>> = BTreeMap::new();
    for (idx, anchor) in anchors.iter().enumerate() {
        cells.entry(cell_of(*anchor, grid_size)).or_default().push(idx);
    }

    let mut offsets = vec![(0, 0); anchors.len()];
    for members in cells.values() {
        if members.len() < 2 {
            continue;
        }
        for (pos, &idx) in members.iter().enumerate() {
            let ring = pos / RING_CAPACITY;
            let slot = pos % RING_CAPACITY;
            let slots = (members.len() - ring * RING_CAPACITY).min(RING_CAPACITY);
            let angle =
                TAU * slot as f64 / slots as f64 + rng.gen_range(-ANGLE_JITTER..=ANGLE_JITTER);
            let radius = spread_radius * (ring + 1) as f64;
            offsets[idx] = (
                (radius * angle.cos()).round() as i32,
                (radius * angle.sin()).round() as i32,
            );
        }
    }
    offsets
}
