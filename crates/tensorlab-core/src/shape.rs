use crate::error::{TensorError, TensorResult};
use serde::{Deserialize, Serialize};

/// Represents the shape of a tensor (dimensions).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    pub fn new(dims: Vec<usize>) -> Self {
        Shape { dims }
    }

    pub fn from_slice(dims: &[usize]) -> Self {
        Shape {
            dims: dims.to_vec(),
        }
    }

    pub fn scalar() -> Self {
        Shape { dims: vec![] }
    }

    /// Number of dimensions (rank).
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Size along a specific axis.
    pub fn dim(&self, axis: usize) -> TensorResult<usize> {
        self.dims.get(axis).copied().ok_or(TensorError::InvalidAxis {
            axis,
            ndim: self.ndim(),
        })
    }

    /// Total number of elements. A scalar shape holds exactly one.
    pub fn numel(&self) -> usize {
        self.dims.iter().product()
    }

    /// Element count, or `None` if it does not fit in a `usize`.
    pub fn checked_numel(&self) -> Option<usize> {
        self.dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn to_vec(&self) -> Vec<usize> {
        self.dims.clone()
    }

    /// Compute row-major (C-order) strides.
    pub fn strides(&self) -> Vec<usize> {
        if self.dims.is_empty() {
            return vec![];
        }
        let mut strides = vec![1usize; self.dims.len()];
        for i in (0..self.dims.len() - 1).rev() {
            strides[i] = strides[i + 1] * self.dims[i + 1];
        }
        strides
    }

    /// Convert a flat row-major offset back into per-axis indices.
    pub fn unravel(&self, flat: usize) -> TensorResult<Vec<usize>> {
        let numel = self.numel();
        if flat >= numel {
            return Err(TensorError::IndexOutOfBounds {
                index: flat,
                axis: 0,
                size: numel,
            });
        }
        let mut remaining = flat;
        Ok(self
            .strides()
            .into_iter()
            .map(|stride| {
                let idx = remaining / stride;
                remaining %= stride;
                idx
            })
            .collect())
    }

    /// Transpose shape: swap last two dims for matrices.
    pub fn transposed(&self) -> TensorResult<Shape> {
        if self.ndim() < 2 {
            return Err(TensorError::InvalidOperation(
                "Cannot transpose tensor with fewer than 2 dimensions".to_string(),
            ));
        }
        let mut dims = self.dims.clone();
        let n = dims.len();
        dims.swap(n - 2, n - 1);
        Ok(Shape::new(dims))
    }

    /// Shape with every size-1 dimension removed.
    pub fn squeezed(&self) -> Shape {
        Shape::new(self.dims.iter().copied().filter(|&d| d != 1).collect())
    }

    /// Shape with `axis` removed if it has size 1, unchanged otherwise.
    pub fn squeezed_dim(&self, axis: usize) -> TensorResult<Shape> {
        if self.dim(axis)? != 1 {
            return Ok(self.clone());
        }
        let mut dims = self.dims.clone();
        dims.remove(axis);
        Ok(Shape::new(dims))
    }
}

/// Prints like a Python tuple: `(2, 3)`, `(10,)`, `()`.
impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", d)?;
        }
        if self.dims.len() == 1 {
            write!(f, ",")?;
        }
        write!(f, ")")
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Shape::new(dims)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Shape::from_slice(dims)
    }
}
