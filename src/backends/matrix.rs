/// A trait for matrix-like types holding one set of variable values per row.
///
/// Row-wise evaluation copies each row into a scratch buffer before binding
/// it, so implementations are free to use any memory layout.
///
/// # Examples
///
/// ```rust
/// use eqnibbler::prelude::Matrix;
///
/// let rows = vec![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
/// assert_eq!(rows.dims(), (3, 2));
///
/// let mut buffer = [0.0; 2];
/// rows.row_into(1, &mut buffer);
/// assert_eq!(buffer, [3.0, 4.0]);
/// ```
pub trait Matrix {
    /// Returns the dimensions of the matrix as (rows, columns).
    fn dims(&self) -> (usize, usize);

    /// Copies row `row` into `out`.
    ///
    /// # Panics
    /// May panic if `row` is out of bounds or `out` is not exactly one row
    /// long.
    fn row_into(&self, row: usize, out: &mut [f64]);
}

/// Rows stored as fixed-size arrays.
impl<const N: usize> Matrix for Vec<[f64; N]> {
    fn dims(&self) -> (usize, usize) {
        (self.len(), N)
    }

    fn row_into(&self, row: usize, out: &mut [f64]) {
        out.copy_from_slice(&self[row]);
    }
}

/// Implementation of Matrix trait for ndarray's Array2<f64>.
///
/// # Examples
///
/// ```rust
/// use eqnibbler::prelude::Matrix;
/// use ndarray::array;
///
/// let mat = array![[1.0, 2.0], [3.0, 4.0]];
/// let mut buffer = [0.0; 2];
/// mat.row_into(1, &mut buffer);
/// assert_eq!(buffer, [3.0, 4.0]);
/// ```
#[cfg(feature = "ndarray")]
impl Matrix for ndarray::Array2<f64> {
    fn dims(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }

    fn row_into(&self, row: usize, out: &mut [f64]) {
        assert_eq!(out.len(), self.ncols(), "row buffer length mismatch");
        out.iter_mut()
            .zip(self.row(row))
            .for_each(|(slot, value)| *slot = *value);
    }
}

/// Implementation of Matrix trait for nalgebra's DMatrix<f64>.
///
/// nalgebra stores matrices column-major, so rows are gathered element by
/// element.
///
/// # Examples
///
/// ```rust
/// use eqnibbler::prelude::Matrix;
/// use nalgebra::DMatrix;
///
/// let mat = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
/// let mut buffer = [0.0; 2];
/// mat.row_into(1, &mut buffer);
/// assert_eq!(buffer, [3.0, 4.0]);
/// ```
#[cfg(feature = "nalgebra")]
impl Matrix for nalgebra::DMatrix<f64> {
    fn dims(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }

    fn row_into(&self, row: usize, out: &mut [f64]) {
        assert_eq!(out.len(), self.ncols(), "row buffer length mismatch");
        out.iter_mut()
            .zip(self.row(row).iter())
            .for_each(|(slot, value)| *slot = *value);
    }
}
