use std::fmt;

use serde::Serialize;
use tensorlab_core::tensor::Extrema;
use tensorlab_core::{Device, Tensor};

/// `lhs @ rhs.T` on random uniform inputs.
#[derive(Debug, Clone, Serialize)]
pub struct MatmulReport {
    pub lhs: Tensor<f32>,
    pub rhs: Tensor<f32>,
    pub product: Tensor<f32>,
}

/// A product plus where its smallest and largest entries sit.
#[derive(Debug, Clone, Serialize)]
pub struct ExtremaReport {
    pub product: Tensor<f32>,
    pub extrema: Extrema<f32>,
}

/// A random integer tensor before and after squeezing.
#[derive(Debug, Clone, Serialize)]
pub struct SqueezeReport {
    pub original: Tensor<i64>,
    pub squeezed: Tensor<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "exercise", rename_all = "snake_case")]
pub enum ExerciseReport {
    Matmul(MatmulReport),
    Extrema(ExtremaReport),
    Squeeze(SqueezeReport),
}

/// Everything one invocation produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub device: Device,
    pub seed: u64,
    pub exercises: Vec<ExerciseReport>,
}

impl fmt::Display for MatmulReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.product)
    }
}

impl fmt::Display for ExtremaReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.product)?;
        writeln!(
            f,
            "Minimum at position {} is {:.4}",
            self.extrema.argmin, self.extrema.min
        )?;
        write!(
            f,
            "Maximum at position {} is {:.4}",
            self.extrema.argmax, self.extrema.max
        )
    }
}

impl fmt::Display for SqueezeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.original, self.original.shape())?;
        write!(f, "{} {}", self.squeezed, self.squeezed.shape())
    }
}

impl fmt::Display for ExerciseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExerciseReport::Matmul(r) => fmt::Display::fmt(r, f),
            ExerciseReport::Extrema(r) => fmt::Display::fmt(r, f),
            ExerciseReport::Squeeze(r) => fmt::Display::fmt(r, f),
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, report) in self.exercises.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{report}")?;
        }
        Ok(())
    }
}
