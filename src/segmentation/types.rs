use ndarray::Array2;

/// Normalized intensities, indexed `[row, col]`
pub type FloatImage = Array2<f64>;

/// Foreground mask: true = nucleus candidate
pub type BinaryMask = Array2<bool>;

/// Label mask: 0 = background, 1..=n = objects, dense within one image
pub type LabelMask = Array2<u32>;

/// Euclidean distance of each foreground pixel to the nearest background pixel
pub type DistanceField = Array2<f64>;

/// Pixel neighbourhood used when walking a mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    Four,
    Eight,
}

impl Connectivity {
    /// Neighbour offsets `(d_row, d_col)` in raster order
    pub fn offsets(self) -> &'static [(isize, isize)] {
        const FOUR: [(isize, isize); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];
        const EIGHT: [(isize, isize); 8] = [
            (-1, -1),
            (-1, 0),
            (-1, 1),
            (0, -1),
            (0, 1),
            (1, -1),
            (1, 0),
            (1, 1),
        ];
        match self {
            Connectivity::Four => &FOUR,
            Connectivity::Eight => &EIGHT,
        }
    }

    /// In-bounds neighbours of `(row, col)` in a `rows x cols` grid
    pub fn neighbors(
        self,
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    ) -> impl Iterator<Item = (usize, usize)> {
        self.offsets().iter().filter_map(move |&(dr, dc)| {
            let r = row.checked_add_signed(dr)?;
            let c = col.checked_add_signed(dc)?;
            (r < rows && c < cols).then_some((r, c))
        })
    }
}

/// Connectivity shared by debris removal, labeling and seed merging
pub const OBJECT_CONNECTIVITY: Connectivity = Connectivity::Eight;

/// Trait for the final labeling step
/// Allows swapping between plain component labeling and watershed splitting
pub trait Labeler {
    /// Turn a cleaned mask into a dense label mask
    ///
    /// Must be deterministic: the same mask always yields the same labels.
    fn label(&self, mask: &BinaryMask) -> LabelMask;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}
