use super::distance::distance_transform_edt;
use super::labeling::connected_components;
use super::types::{BinaryMask, DistanceField, LabelMask, Labeler, OBJECT_CONNECTIVITY};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Number the local maxima of a distance field
///
/// A foreground pixel with positive distance is a maximum when no pixel in
/// its 3x3 neighbourhood is larger. Touching maxima (8-connectivity) form
/// one seed, numbered in row-major order of first appearance.
pub fn find_seeds(distance: &DistanceField, mask: &BinaryMask) -> (LabelMask, u32) {
    let (rows, cols) = distance.dim();
    let peaks = BinaryMask::from_shape_fn((rows, cols), |(row, col)| {
        let value = distance[[row, col]];
        mask[[row, col]]
            && value > 0.0
            && OBJECT_CONNECTIVITY
                .neighbors(row, col, rows, cols)
                .all(|p| distance[p] <= value)
    });
    connected_components(&peaks, OBJECT_CONNECTIVITY)
}

/// Frontier pixel waiting to be flooded
#[derive(Debug)]
struct FloodEntry {
    level: f64,
    age: u64,
    row: usize,
    col: usize,
}

impl Ord for FloodEntry {
    // Deepest basin point (largest distance) first, then first come first served
    fn cmp(&self, other: &Self) -> Ordering {
        self.level
            .total_cmp(&other.level)
            .then_with(|| other.age.cmp(&self.age))
    }
}

impl PartialOrd for FloodEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FloodEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloodEntry {}

/// Flood `markers` over `-distance`, restricted to `mask`
///
/// Each unlabeled mask pixel takes the label of the frontier pixel that
/// reaches it first. Equal levels are resolved by queue order, and
/// neighbours are visited in raster order, so the result is reproducible.
pub fn watershed(distance: &DistanceField, markers: &LabelMask, mask: &BinaryMask) -> LabelMask {
    let (rows, cols) = distance.dim();
    let mut labels = LabelMask::zeros((rows, cols));
    let mut queue = BinaryHeap::new();
    let mut age = 0u64;

    for ((row, col), &marker) in markers.indexed_iter() {
        if marker != 0 && mask[[row, col]] {
            labels[[row, col]] = marker;
            queue.push(FloodEntry {
                level: distance[[row, col]],
                age,
                row,
                col,
            });
            age += 1;
        }
    }

    while let Some(FloodEntry { row, col, .. }) = queue.pop() {
        let label = labels[[row, col]];
        for (r, c) in OBJECT_CONNECTIVITY.neighbors(row, col, rows, cols) {
            if mask[[r, c]] && labels[[r, c]] == 0 {
                labels[[r, c]] = label;
                queue.push(FloodEntry {
                    level: distance[[r, c]],
                    age,
                    row: r,
                    col: c,
                });
                age += 1;
            }
        }
    }

    labels
}

/// Distance transform + seeded watershed
///
/// Basins grow outward from nucleus centres and meet along the narrow
/// necks between touching nuclei.
pub struct WatershedSplitter;

impl Labeler for WatershedSplitter {
    fn label(&self, mask: &BinaryMask) -> LabelMask {
        let distance = distance_transform_edt(mask);
        let (markers, count) = find_seeds(&distance, mask);
        tracing::debug!("Watershed seeds: {}", count);
        watershed(&distance, &markers, mask)
    }

    fn name(&self) -> &'static str {
        "watershed"
    }
}
