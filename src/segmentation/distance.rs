use super::types::{BinaryMask, DistanceField};
use ndarray::{Array2, Axis};

/// Distance of every foreground pixel to the nearest background pixel
///
/// Background pixels get 0. A mask without any background pixel gets a
/// constant field larger than any in-image distance.
pub fn distance_transform_edt(mask: &BinaryMask) -> DistanceField {
    let (rows, cols) = mask.dim();
    // Exceeds any squared in-image distance
    let far = ((rows * rows + cols * cols) as f64) + 1.0;

    let mut squared: Array2<f64> = mask.mapv(|fg| if fg { far } else { 0.0 });

    for axis in [Axis(0), Axis(1)] {
        let len = squared.len_of(axis);
        let mut line = vec![0.0; len];
        let mut envelope = LowerEnvelope::with_capacity(len);
        for mut lane in squared.lanes_mut(axis) {
            line.iter_mut().zip(lane.iter()).for_each(|(dst, &src)| *dst = src);
            envelope.transform(&line, far);
            lane.iter_mut()
                .zip(envelope.output.iter())
                .for_each(|(dst, &src)| *dst = src);
        }
    }

    squared.mapv(f64::sqrt)
}

/// Scratch buffers for the 1D squared distance transform
struct LowerEnvelope {
    vertices: Vec<usize>,
    boundaries: Vec<f64>,
    output: Vec<f64>,
}

impl LowerEnvelope {
    fn with_capacity(len: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(len),
            boundaries: Vec::with_capacity(len + 1),
            output: vec![0.0; len],
        }
    }

    /// `output[q] = min_p (q - p)^2 + f[p]`, ignoring samples at `far`
    fn transform(&mut self, f: &[f64], far: f64) {
        self.vertices.clear();
        self.boundaries.clear();

        for (q, &fq) in f.iter().enumerate() {
            if fq >= far {
                continue;
            }
            while let Some(&p) = self.vertices.last() {
                let s = intersection(f, p, q);
                let last_boundary = self.boundaries[self.boundaries.len() - 1];
                if s <= last_boundary {
                    self.vertices.pop();
                    self.boundaries.pop();
                } else {
                    break;
                }
            }
            let start = match self.vertices.last() {
                Some(&p) => intersection(f, p, q),
                None => f64::NEG_INFINITY,
            };
            self.vertices.push(q);
            self.boundaries.push(start);
        }

        if self.vertices.is_empty() {
            self.output.iter_mut().for_each(|v| *v = far);
            return;
        }

        let mut k = 0;
        for q in 0..f.len() {
            while k + 1 < self.vertices.len() && self.boundaries[k + 1] < q as f64 {
                k += 1;
            }
            let p = self.vertices[k];
            let d = q as f64 - p as f64;
            self.output[q] = (d * d + f[p]).min(far);
        }
    }
}

/// Abscissa where the parabolas rooted at `p` and `q` intersect
fn intersection(f: &[f64], p: usize, q: usize) -> f64 {
    let (p_f, q_f) = (p as f64, q as f64);
    ((f[q] + q_f * q_f) - (f[p] + p_f * p_f)) / (2.0 * (q_f - p_f))
}
