use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};
use tensorlab_core::{DevicePreference, Shape};

use crate::error::{ExerciseError, ExerciseResult};

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 7;

/// Settings for every exercise. Missing fields fall back to the defaults,
/// which reproduce the classic fundamentals walkthrough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExerciseConfig {
    pub seed: u64,
    pub device: DevicePreference,
    pub matmul: MatmulConfig,
    pub extrema: MatmulConfig,
    pub squeeze: SqueezeConfig,
}

/// Shapes for an `lhs @ rhs.T` product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatmulConfig {
    pub lhs: Vec<usize>,
    pub rhs: Vec<usize>,
}

/// Shape and `[low, high)` range of the integer tensor to squeeze.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SqueezeConfig {
    pub shape: Vec<usize>,
    pub low: i64,
    pub high: i64,
}

impl Default for ExerciseConfig {
    fn default() -> Self {
        ExerciseConfig {
            seed: DEFAULT_SEED,
            device: DevicePreference::Auto,
            matmul: MatmulConfig {
                lhs: vec![7, 7],
                rhs: vec![1, 7],
            },
            extrema: MatmulConfig {
                lhs: vec![2, 3],
                rhs: vec![2, 3],
            },
            squeeze: SqueezeConfig {
                shape: vec![1, 1, 1, 10],
                low: 0,
                high: 10,
            },
        }
    }
}

impl MatmulConfig {
    /// Shape of `lhs @ rhs.T`.
    pub fn product_shape(&self) -> Vec<usize> {
        vec![self.lhs[0], self.rhs[0]]
    }

    fn validate(&self, name: &str) -> ExerciseResult<()> {
        if self.lhs.len() != 2 || self.rhs.len() != 2 {
            return Err(ExerciseError::Config(format!(
                "{name}: lhs and rhs must be 2-D, got {:?} and {:?}",
                self.lhs, self.rhs
            )));
        }
        if self.lhs[1] != self.rhs[1] {
            return Err(ExerciseError::Config(format!(
                "{name}: cannot multiply {:?} by the transpose of {:?}",
                self.lhs, self.rhs
            )));
        }
        for dims in [&self.lhs, &self.rhs, &self.product_shape()] {
            check_size(name, dims)?;
        }
        Ok(())
    }
}

fn check_size(name: &str, dims: &[usize]) -> ExerciseResult<()> {
    if Shape::from_slice(dims).checked_numel().is_none() {
        return Err(ExerciseError::Config(format!(
            "{name}: shape {dims:?} has too many elements"
        )));
    }
    Ok(())
}

impl ExerciseConfig {
    /// Load a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> ExerciseResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ExerciseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> ExerciseResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reject settings that would fail halfway through a run.
    pub fn validate(&self) -> ExerciseResult<()> {
        self.matmul.validate("matmul")?;
        self.extrema.validate("extrema")?;
        if self.squeeze.low >= self.squeeze.high {
            return Err(ExerciseError::Config(format!(
                "squeeze: low ({}) must be less than high ({})",
                self.squeeze.low, self.squeeze.high
            )));
        }
        check_size("squeeze", &self.squeeze.shape)?;
        if self.squeeze.shape.iter().any(|&d| d == 0) {
            return Err(ExerciseError::Config(format!(
                "squeeze: shape {:?} has no elements",
                self.squeeze.shape
            )));
        }
        if self.extrema.lhs[0] == 0 || self.extrema.rhs[0] == 0 {
            return Err(ExerciseError::Config(
                "extrema: product must have at least one element".to_string(),
            ));
        }
        Ok(())
    }
}
