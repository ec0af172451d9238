//! # TensorLab
//!
//! Tensor fundamentals: seeded random tensors, matrix products, extrema and
//! squeeze, with explicit device placement.
//!
//! ## Modules
//!
//! - **core**: Tensor engine: N-dimensional arrays, devices, seeded generators, matmul, reductions
//! - **exercises**: The fundamentals walkthrough: configuration, runners and printable reports

/// Core tensor engine.
pub use tensorlab_core as core;

/// Fundamentals exercises.
pub use tensorlab_exercises as exercises;
