use super::labeling::connected_components;
use super::types::{BinaryMask, Connectivity, OBJECT_CONNECTIVITY};
use std::collections::VecDeque;

/// Offsets `(d_row, d_col)` of a disk footprint: `dr^2 + dc^2 <= radius^2`
pub fn disk(radius: usize) -> Vec<(isize, isize)> {
    let r = radius as isize;
    let mut footprint = Vec::new();
    for dr in -r..=r {
        for dc in -r..=r {
            if dr * dr + dc * dc <= r * r {
                footprint.push((dr, dc));
            }
        }
    }
    footprint
}

/// Visit the in-bounds footprint positions around `(row, col)`
fn footprint_at<'a>(
    footprint: &'a [(isize, isize)],
    row: usize,
    col: usize,
    (rows, cols): (usize, usize),
) -> impl Iterator<Item = (usize, usize)> + 'a {
    footprint.iter().filter_map(move |&(dr, dc)| {
        let r = row.checked_add_signed(dr)?;
        let c = col.checked_add_signed(dc)?;
        (r < rows && c < cols).then_some((r, c))
    })
}

/// Binary dilation: a pixel is set if any footprint neighbour is set
pub fn dilate(mask: &BinaryMask, footprint: &[(isize, isize)]) -> BinaryMask {
    let dim = mask.dim();
    BinaryMask::from_shape_fn(dim, |(row, col)| {
        footprint_at(footprint, row, col, dim).any(|p| mask[p])
    })
}

/// Binary erosion: a pixel stays set only if every footprint neighbour is set
///
/// Out-of-bounds neighbours are ignored, so objects touching the border
/// keep their border pixels.
pub fn erode(mask: &BinaryMask, footprint: &[(isize, isize)]) -> BinaryMask {
    let dim = mask.dim();
    BinaryMask::from_shape_fn(dim, |(row, col)| {
        mask[[row, col]] && footprint_at(footprint, row, col, dim).all(|p| mask[p])
    })
}

/// Morphological closing with a disk of the given radius
///
/// A disk spanning the whole image fills it whenever any pixel is set, so
/// such radii are answered without building the footprint.
pub fn closing(mask: &BinaryMask, radius: usize) -> BinaryMask {
    if radius == 0 {
        return mask.clone();
    }
    let (rows, cols) = mask.dim();
    let diagonal_sq = rows.saturating_sub(1).pow(2) + cols.saturating_sub(1).pow(2);
    if radius.checked_mul(radius).map_or(true, |r_sq| r_sq >= diagonal_sq) {
        let any = mask.iter().any(|&m| m);
        return BinaryMask::from_elem((rows, cols), any);
    }
    let footprint = disk(radius);
    erode(&dilate(mask, &footprint), &footprint)
}

/// Fill background regions that cannot reach the image border
///
/// Background is flooded from the border with 4-connectivity, the dual of
/// the 8-connected foreground; everything left unreached becomes foreground.
pub fn fill_holes(mask: &BinaryMask) -> BinaryMask {
    let (rows, cols) = mask.dim();
    let mut outside = BinaryMask::from_elem((rows, cols), false);
    let mut queue = VecDeque::new();

    for row in 0..rows {
        for col in 0..cols {
            let on_border = row == 0 || col == 0 || row + 1 == rows || col + 1 == cols;
            if on_border && !mask[[row, col]] {
                outside[[row, col]] = true;
                queue.push_back((row, col));
            }
        }
    }

    while let Some((row, col)) = queue.pop_front() {
        for (r, c) in Connectivity::Four.neighbors(row, col, rows, cols) {
            if !mask[[r, c]] && !outside[[r, c]] {
                outside[[r, c]] = true;
                queue.push_back((r, c));
            }
        }
    }

    outside.mapv(|reached| !reached)
}

/// Drop connected components with `area <= max_size` pixels
pub fn remove_small_objects(mask: &BinaryMask, max_size: usize) -> BinaryMask {
    let (labels, num_labels) = connected_components(mask, OBJECT_CONNECTIVITY);

    let mut areas = vec![0usize; num_labels as usize + 1];
    for &label in labels.iter() {
        areas[label as usize] += 1;
    }

    labels.mapv(|label| label != 0 && areas[label as usize] > max_size)
}

/// Closing, hole filling and debris removal, in that order
pub struct MorphologyCleaner {
    closing_radius: usize,
    max_size: usize,
}

impl MorphologyCleaner {
    pub fn new(closing_radius: usize, max_size: usize) -> Self {
        Self {
            closing_radius,
            max_size,
        }
    }

    pub fn clean(&self, mask: &BinaryMask) -> BinaryMask {
        let _span = tracing::debug_span!("cleanup").entered();

        let closed = closing(mask, self.closing_radius);
        let filled = fill_holes(&closed);
        let cleaned = remove_small_objects(&filled, self.max_size);

        tracing::debug!(
            "Cleanup: {} -> {} foreground pixels",
            mask.iter().filter(|&&m| m).count(),
            cleaned.iter().filter(|&&m| m).count()
        );
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    fn count(mask: &BinaryMask) -> usize {
        mask.iter().filter(|&&m| m).count()
    }

    #[test]
    fn disk_footprint_sizes() {
        assert_eq!(disk(0), vec![(0, 0)]);
        assert_eq!(disk(1).len(), 5);
        assert_eq!(disk(3).len(), 29);
    }

    #[test]
    fn closing_bridges_one_pixel_gap() {
        let mut mask = BinaryMask::from_elem((7, 11), false);
        for row in 2..5 {
            for col in 1..5 {
                mask[[row, col]] = true;
            }
            for col in 6..10 {
                mask[[row, col]] = true;
            }
        }
        let closed = closing(&mask, 1);
        assert!(closed[[3, 5]]);
        // Nothing removed by closing
        assert!(mask.iter().zip(closed.iter()).all(|(&m, &c)| !m || c));
    }

    #[test]
    fn closing_keeps_border_objects() {
        let mut mask = BinaryMask::from_elem((6, 6), false);
        for row in 0..3 {
            for col in 0..3 {
                mask[[row, col]] = true;
            }
        }
        assert_eq!(closing(&mask, 2), mask);
    }

    #[test]
    fn closing_wider_than_image_fills_it() {
        let mut mask = BinaryMask::from_elem((5, 8), false);
        mask[[4, 0]] = true;
        mask[[0, 7]] = true;
        assert!(closing(&mask, usize::MAX).iter().all(|&m| m));
        // Radius equal to the diagonal matches the explicit footprint
        assert_eq!(closing(&mask, 9), erode(&dilate(&mask, &disk(9)), &disk(9)));

        let empty = BinaryMask::from_elem((5, 8), false);
        assert_eq!(closing(&empty, 1_000_000), empty);
    }

    #[test]
    fn fill_holes_closes_enclosed_background() {
        let mask = arr2(&[
            [false, false, false, false, false],
            [false, true, true, true, false],
            [false, true, false, true, false],
            [false, true, true, true, false],
            [false, false, false, false, false],
        ]);
        let filled = fill_holes(&mask);
        assert!(filled[[2, 2]]);
        assert_eq!(count(&filled), 9);
    }

    #[test]
    fn fill_holes_leaves_border_touching_background() {
        let mask = arr2(&[
            [true, true, true],
            [true, false, false],
            [true, true, true],
        ]);
        assert_eq!(fill_holes(&mask), mask);
    }

    #[test]
    fn diagonal_gap_does_not_leak_background() {
        // The centre is enclosed for 8-connected foreground
        let mask = arr2(&[
            [false, true, false],
            [true, false, true],
            [false, true, false],
        ]);
        let mut padded = BinaryMask::from_elem((5, 5), false);
        padded.slice_mut(ndarray::s![1..4, 1..4]).assign(&mask);
        assert!(fill_holes(&padded)[[2, 2]]);
    }

    #[test]
    fn small_object_bound_is_inclusive() {
        let mut mask = BinaryMask::from_elem((10, 20), false);
        // 4-pixel object
        for col in 1..5 {
            mask[[1, col]] = true;
        }
        // 5-pixel object
        for col in 10..15 {
            mask[[6, col]] = true;
        }

        let cleaned = remove_small_objects(&mask, 4);
        assert_eq!(count(&cleaned), 5);
        assert!(!cleaned[[1, 1]]);
        assert!(cleaned[[6, 10]]);

        let cleaned = remove_small_objects(&mask, 5);
        assert_eq!(count(&cleaned), 0);
    }

    #[test]
    fn diagonal_pixels_count_as_one_object() {
        let mask = arr2(&[[true, false], [false, true]]);
        assert_eq!(count(&remove_small_objects(&mask, 1)), 2);
    }

    #[test]
    fn cleaner_runs_all_steps() {
        let mut mask = BinaryMask::from_elem((20, 20), false);
        for row in 3..12 {
            for col in 3..12 {
                mask[[row, col]] = true;
            }
        }
        mask[[7, 7]] = false;
        mask[[17, 17]] = true;

        let cleaned = MorphologyCleaner::new(1, 3).clean(&mask);
        assert!(cleaned[[7, 7]]);
        assert!(!cleaned[[17, 17]]);
        assert_eq!(count(&cleaned), 81);
    }
}
