//! Ray marching through the material grid.
//!
//! Walks the straight segment between an access point and a sample point and
//! records which distinct materials the signal crosses. This is a deliberate
//! approximation: each material contributes one default-thickness layer the
//! first time it is encountered, regardless of the true traversed length
//! through it.

use std::collections::HashSet;

use crate::Point;
use crate::grid::MaterialGrid;
use crate::materials::SignalPath;

/// Discover the materials between `ap` and `target`.
///
/// Marches `max(round(2·distance), 1)` evenly spaced points along the segment
/// (both ends included), at least two samples per meter so thin walls are not
/// skipped. Points outside the grid are ignored. Materials are deduplicated
/// by name, so a wall spanning many cells contributes exactly one layer, in
/// first-encounter order walking from the AP.
///
/// A zero-length ray yields an empty path (no medium to traverse), as does a
/// ray short enough to round to a single march step.
pub fn trace(ap: Point, target: Point, grid: &MaterialGrid) -> SignalPath {
    let mut path = SignalPath::new();

    let distance = ap.distance_to(target);
    if distance == 0.0 {
        return path;
    }

    let steps = ((distance * 2.0).round() as usize).max(1);
    if steps < 2 {
        // A single sample would land on the AP's own cell; such a short ray
        // crosses no medium worth counting.
        return path;
    }
    let dx = target.x - ap.x;
    let dy = target.y - ap.y;

    let mut seen: HashSet<String> = HashSet::new();
    for i in 0..steps {
        let t = i as f64 / (steps - 1) as f64;
        let sample_x = ap.x + dx * t;
        let sample_y = ap.y + dy * t;

        if let Some(material) = grid.material_at(sample_x, sample_y) {
            if seen.insert(material.name.clone()) {
                path.add_layer(material.clone(), 1.0);
            }
        }
    }

    path
}
