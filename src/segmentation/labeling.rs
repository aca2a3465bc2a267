use super::types::{BinaryMask, Connectivity, LabelMask, Labeler, OBJECT_CONNECTIVITY};

/// Find connected components in a binary mask
///
/// Pixels are scanned in row-major order and each new component takes the
/// next label, so numbering is stable for a given mask.
///
/// # Returns
///
/// The label mask and the number of components found
pub fn connected_components(mask: &BinaryMask, connectivity: Connectivity) -> (LabelMask, u32) {
    let (rows, cols) = mask.dim();
    let mut labels = LabelMask::zeros((rows, cols));
    let mut label_counter = 0;
    let mut stack = Vec::new();

    for row in 0..rows {
        for col in 0..cols {
            if !mask[[row, col]] || labels[[row, col]] != 0 {
                continue;
            }

            label_counter += 1;
            labels[[row, col]] = label_counter;
            stack.push((row, col));

            while let Some((y, x)) = stack.pop() {
                for (ny, nx) in connectivity.neighbors(y, x, rows, cols) {
                    if mask[[ny, nx]] && labels[[ny, nx]] == 0 {
                        labels[[ny, nx]] = label_counter;
                        stack.push((ny, nx));
                    }
                }
            }
        }
    }

    (labels, label_counter)
}

/// Labels every 8-connected foreground component without splitting
pub struct ConnectedComponents;

impl Labeler for ConnectedComponents {
    fn label(&self, mask: &BinaryMask) -> LabelMask {
        let (labels, count) = connected_components(mask, OBJECT_CONNECTIVITY);
        tracing::debug!("Connected components: {}", count);
        labels
    }

    fn name(&self) -> &'static str {
        "connected"
    }
}
