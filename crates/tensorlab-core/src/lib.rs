pub mod device;
pub mod dtype;
pub mod error;
pub mod random;
pub mod shape;
pub mod tensor;

pub use device::{Device, DevicePreference};
pub use dtype::{DType, Element, Float};
pub use error::{TensorError, TensorResult};
pub use random::Generator;
pub use shape::Shape;
pub use tensor::Tensor;
