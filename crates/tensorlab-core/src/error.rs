use thiserror::Error;

use crate::device::Device;

/// Core error type for all tensor operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TensorError {
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("Index out of bounds: index {index} for axis {axis} with size {size}")]
    IndexOutOfBounds {
        index: usize,
        axis: usize,
        size: usize,
    },

    #[error("Invalid axis: {axis} for tensor with {ndim} dimensions")]
    InvalidAxis { axis: usize, ndim: usize },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Empty tensor")]
    EmptyTensor,

    #[error("Invalid range: low ({low}) must be less than high ({high})")]
    InvalidRange { low: i64, high: i64 },

    #[error("Expected all tensors to be on the same device, found {lhs} and {rhs}")]
    DeviceMismatch { lhs: Device, rhs: Device },

    #[error("Device {0} is not available in this build")]
    DeviceUnavailable(Device),

    #[error("Invalid device string: {0:?}")]
    InvalidDevice(String),
}

pub type TensorResult<T> = Result<T, TensorError>;
