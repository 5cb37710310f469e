use std::ops::Range;

use ndarray::{Array2, ArrayView2, s};

use crate::{MlErr, Result};

/// An immutable supervised dataset, one sample per row.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    x: Array2<f32>,
    y: Array2<f32>,
}

impl Dataset {
    /// Creates a new `Dataset`.
    ///
    /// # Arguments
    /// * `x` - The features, shape `(samples, x_size)`.
    /// * `y` - The targets, shape `(samples, y_size)`.
    ///
    /// # Returns
    /// A new `Dataset`, or an error if there are no rows or the row counts differ.
    pub fn new(x: Array2<f32>, y: Array2<f32>) -> Result<Self> {
        if x.nrows() != y.nrows() {
            return Err(MlErr::ShapeMismatch {
                what: "dataset rows",
                got: vec![y.nrows()],
                expected: vec![x.nrows()],
            });
        }

        if x.nrows() == 0 {
            return Err(MlErr::EmptyDataset);
        }

        Ok(Self { x, y })
    }

    /// Creates a new `Dataset` out of a flat row-major buffer where every row holds the
    /// `x_size` features followed by the `y_size` targets.
    pub fn from_flat(data: Vec<f32>, x_size: usize, y_size: usize) -> Result<Self> {
        let row = x_size + y_size;
        if row == 0 || data.len() % row != 0 {
            return Err(MlErr::ShapeMismatch {
                what: "flat dataset",
                got: vec![data.len()],
                expected: vec![row],
            });
        }

        let rows = data.len() / row;
        let full = Array2::from_shape_vec((rows, row), data).map_err(|_| MlErr::ShapeMismatch {
            what: "flat dataset",
            got: vec![rows],
            expected: vec![row],
        })?;

        let x = full.slice(s![.., ..x_size]).to_owned();
        let y = full.slice(s![.., x_size..]).to_owned();
        Self::new(x, y)
    }

    pub fn x(&self) -> ArrayView2<'_, f32> {
        self.x.view()
    }

    pub fn y(&self) -> ArrayView2<'_, f32> {
        self.y.view()
    }

    /// Returns the amount of samples.
    pub fn len(&self) -> usize {
        self.x.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.x.nrows() == 0
    }

    /// Returns the amount of features per sample.
    pub fn x_size(&self) -> usize {
        self.x.ncols()
    }

    /// Returns the amount of targets per sample.
    pub fn y_size(&self) -> usize {
        self.y.ncols()
    }

    /// Copies a contiguous range of rows into a new dataset.
    pub fn rows(&self, range: Range<usize>) -> Result<Dataset> {
        if range.start >= range.end || range.end > self.len() {
            return Err(MlErr::ShapeMismatch {
                what: "dataset row range",
                got: vec![range.start, range.end],
                expected: vec![0, self.len()],
            });
        }

        let x = self.x.slice(s![range.clone(), ..]).to_owned();
        let y = self.y.slice(s![range, ..]).to_owned();
        Self::new(x, y)
    }

    /// Splits the dataset into `k` contiguous shards, the first `len % k` shards holding one
    /// extra row.
    pub fn partition(&self, k: usize) -> Result<Vec<Dataset>> {
        let len = self.len();
        if k == 0 || k > len {
            return Err(MlErr::ShapeMismatch {
                what: "dataset partition",
                got: vec![k],
                expected: vec![len],
            });
        }

        let (base, extra) = (len / k, len % k);
        let mut start = 0;

        (0..k)
            .map(|i| {
                let end = start + base + usize::from(i < extra);
                let shard = self.rows(start..end);
                start = end;
                shard
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    const AND2: [f32; 12] = [
        0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, //
        1.0, 0.0, 1.0, //
        1.0, 1.0, 1.0, //
    ];

    #[test]
    fn test_from_flat_splits_columns() {
        let ds = Dataset::from_flat(AND2.to_vec(), 2, 1).unwrap();

        assert_eq!(ds.len(), 4);
        assert_eq!(ds.x_size(), 2);
        assert_eq!(ds.y_size(), 1);
        assert_eq!(ds.x().row(2), array![1.0, 0.0]);
        assert_eq!(ds.y().column(0), array![0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_from_flat_rejects_ragged_buffer() {
        assert!(Dataset::from_flat(vec![0.0; 7], 2, 1).is_err());
    }

    #[test]
    fn test_new_rejects_empty_and_mismatched() {
        let empty = Array2::<f32>::zeros((0, 2));
        assert_eq!(
            Dataset::new(empty.clone(), Array2::zeros((0, 1))),
            Err(MlErr::EmptyDataset)
        );
        assert!(Dataset::new(Array2::zeros((2, 2)), Array2::zeros((3, 1))).is_err());
    }

    #[test]
    fn test_rows_and_partition() {
        let ds = Dataset::from_flat(AND2.to_vec(), 2, 1).unwrap();

        let first = ds.rows(0..2).unwrap();
        assert_eq!(first.x(), array![[0.0, 0.0], [0.0, 1.0]]);

        let shards = ds.partition(3).unwrap();
        let lens: Vec<_> = shards.iter().map(Dataset::len).collect();
        assert_eq!(lens, vec![2, 1, 1]);
        assert_eq!(shards[2].y(), array![[1.0]]);

        assert!(ds.partition(0).is_err());
        assert!(ds.partition(5).is_err());
        assert!(ds.rows(3..3).is_err());
    }
}
