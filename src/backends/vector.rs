/// A trait for vector-like types that can bind values to an equation's
/// variables or receive batch results.
///
/// Values are always read and written through a contiguous `f64` slice, so
/// any container that can expose one can be passed to `Equation::eval`.
///
/// # Examples
///
/// ```rust
/// use eqnibbler::prelude::Vector;
///
/// // Create a zero vector
/// let vec: Vec<f64> = Vector::zeros(5);
/// assert_eq!(vec.len(), 5);
///
/// // Access elements
/// let vec = vec![1.0, 2.0, 3.0];
/// let slice = Vector::as_slice(&vec);
/// assert_eq!(slice[0], 1.0);
/// ```
pub trait Vector {
    /// Returns a reference to the vector's data as a slice.
    fn as_slice(&self) -> &[f64];

    /// Returns a mutable reference to the vector's data as a slice.
    fn as_mut_slice(&mut self) -> &mut [f64];

    /// Creates a new vector of the specified length filled with zeros.
    ///
    /// # Arguments
    /// * `len` - The length of the vector to create
    fn zeros(len: usize) -> Self;

    /// Returns the length of the vector.
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Checks if the vector is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Vector for Vec<f64> {
    fn as_slice(&self) -> &[f64] {
        self
    }

    fn as_mut_slice(&mut self) -> &mut [f64] {
        self
    }

    fn zeros(len: usize) -> Self {
        vec![0.0; len]
    }
}

/// Implementation of Vector trait for fixed-size arrays.
///
/// # Type Parameters
/// * `N` - The fixed size of the array
///
/// # Examples
///
/// ```rust
/// use eqnibbler::prelude::Vector;
///
/// let mut arr = <[f64; 3]>::zeros(3);
/// let slice = arr.as_mut_slice();
/// slice[0] = 1.0;
/// assert_eq!(arr[0], 1.0);
/// ```
impl<const N: usize> Vector for [f64; N] {
    fn as_slice(&self) -> &[f64] {
        self
    }

    fn as_mut_slice(&mut self) -> &mut [f64] {
        self
    }

    /// # Panics
    /// Panics if `len` differs from `N`.
    fn zeros(len: usize) -> Self {
        assert_eq!(len, N, "Array length must match const generic size");
        [0.0; N]
    }

    fn len(&self) -> usize {
        N
    }
}

/// Implementation of Vector trait for ndarray's Array1<f64>.
///
/// # Panics
/// Slice access panics if the array is not contiguous in memory, e.g. after
/// its axis was inverted.
///
/// # Examples
///
/// ```rust
/// use eqnibbler::prelude::Vector;
/// use ndarray::Array1;
///
/// let mut vec = <Array1<f64> as Vector>::zeros(3);
/// Vector::as_mut_slice(&mut vec)[0] = 1.0;
/// assert_eq!(vec[0], 1.0);
/// ```
#[cfg(feature = "ndarray")]
impl Vector for ndarray::Array1<f64> {
    fn as_slice(&self) -> &[f64] {
        ndarray::Array1::as_slice(self).expect("ndarray vector must be contiguous")
    }

    fn as_mut_slice(&mut self) -> &mut [f64] {
        self.as_slice_mut()
            .expect("ndarray vector must be contiguous")
    }

    fn zeros(len: usize) -> Self {
        ndarray::Array1::zeros(len)
    }

    fn len(&self) -> usize {
        ndarray::Array1::len(self)
    }
}

/// Implementation of Vector trait for nalgebra's DVector<f64>.
///
/// # Examples
///
/// ```rust
/// use eqnibbler::prelude::Vector;
/// use nalgebra::DVector;
///
/// let mut vec = <DVector<f64> as Vector>::zeros(3);
/// Vector::as_mut_slice(&mut vec)[0] = 1.0;
/// assert_eq!(vec[0], 1.0);
/// ```
#[cfg(feature = "nalgebra")]
impl Vector for nalgebra::DVector<f64> {
    fn as_slice(&self) -> &[f64] {
        nalgebra::DVector::as_slice(self)
    }

    fn as_mut_slice(&mut self) -> &mut [f64] {
        nalgebra::DVector::as_mut_slice(self)
    }

    fn zeros(len: usize) -> Self {
        nalgebra::DVector::zeros(len)
    }

    fn len(&self) -> usize {
        nalgebra::DVector::len(self)
    }
}
