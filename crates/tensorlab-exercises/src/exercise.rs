use std::fmt;
use std::str::FromStr;

use log::info;
use serde::{Deserialize, Serialize};
use tensorlab_core::{Device, Generator, Tensor};

use crate::config::{ExerciseConfig, MatmulConfig, SqueezeConfig};
use crate::error::{ExerciseError, ExerciseResult};
use crate::report::{ExerciseReport, ExtremaReport, MatmulReport, RunReport, SqueezeReport};

/// One independent demonstration block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exercise {
    /// Random square matrix times the transpose of a random row.
    Matmul,
    /// Small product plus argmin/argmax over it.
    Extrema,
    /// Random integers with leading unit axes, squeezed flat.
    Squeeze,
}

impl Exercise {
    pub const ALL: [Exercise; 3] = [Exercise::Matmul, Exercise::Extrema, Exercise::Squeeze];

    pub fn name(&self) -> &'static str {
        match self {
            Exercise::Matmul => "matmul",
            Exercise::Extrema => "extrema",
            Exercise::Squeeze => "squeeze",
        }
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Exercise {
    type Err = ExerciseError;

    fn from_str(s: &str) -> ExerciseResult<Self> {
        Exercise::ALL
            .into_iter()
            .find(|e| e.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ExerciseError::Config(format!("unknown exercise {s:?}")))
    }
}

/// Resolved runtime settings shared by every exercise: the default device
/// new tensors land on and the seed each exercise starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExerciseContext {
    pub device: Device,
    pub seed: u64,
}

impl ExerciseContext {
    pub fn new(device: Device, seed: u64) -> Self {
        ExerciseContext { device, seed }
    }

    pub fn from_config(config: &ExerciseConfig) -> ExerciseResult<Self> {
        Ok(ExerciseContext {
            device: config.device.resolve()?,
            seed: config.seed,
        })
    }

    fn generator(&self) -> Generator {
        Generator::new(self.seed)
    }
}

/// Both operands are drawn straight onto the default device.
pub fn run_matmul(config: &MatmulConfig, ctx: &ExerciseContext) -> ExerciseResult<MatmulReport> {
    let mut generator = ctx.generator();
    let lhs = Tensor::<f32>::rand_on(config.lhs.clone(), &mut generator, ctx.device)?;
    let rhs = Tensor::<f32>::rand_on(config.rhs.clone(), &mut generator, ctx.device)?;
    let product = lhs.matmul(&rhs.t()?)?;
    Ok(MatmulReport { lhs, rhs, product })
}

/// Operands are drawn on the host and then moved to the default device.
pub fn run_extrema(config: &MatmulConfig, ctx: &ExerciseContext) -> ExerciseResult<ExtremaReport> {
    let mut generator = ctx.generator();
    let lhs = Tensor::<f32>::rand(config.lhs.clone(), &mut generator).to_device(ctx.device)?;
    let rhs = Tensor::<f32>::rand(config.rhs.clone(), &mut generator).to_device(ctx.device)?;
    let product = lhs.matmul(&rhs.t()?)?;
    let extrema = product.extrema()?;
    Ok(ExtremaReport { product, extrema })
}

pub fn run_squeeze(config: &SqueezeConfig, ctx: &ExerciseContext) -> ExerciseResult<SqueezeReport> {
    let mut generator = ctx.generator();
    let original = Tensor::<i64>::randint_on(
        config.low,
        config.high,
        config.shape.clone(),
        &mut generator,
        ctx.device,
    )?;
    let squeezed = original.squeeze();
    Ok(SqueezeReport { original, squeezed })
}

/// Run a single exercise.
pub fn run(
    exercise: Exercise,
    config: &ExerciseConfig,
    ctx: &ExerciseContext,
) -> ExerciseResult<ExerciseReport> {
    info!("running {exercise} on {} (seed {})", ctx.device, ctx.seed);
    let report = match exercise {
        Exercise::Matmul => ExerciseReport::Matmul(run_matmul(&config.matmul, ctx)?),
        Exercise::Extrema => ExerciseReport::Extrema(run_extrema(&config.extrema, ctx)?),
        Exercise::Squeeze => ExerciseReport::Squeeze(run_squeeze(&config.squeeze, ctx)?),
    };
    info!("finished {exercise}");
    Ok(report)
}

/// Validate `config`, pick the device, and run `exercises` in order.
pub fn run_all(config: &ExerciseConfig, exercises: &[Exercise]) -> ExerciseResult<RunReport> {
    config.validate()?;
    let ctx = ExerciseContext::from_config(config)?;
    let exercises = exercises
        .iter()
        .map(|&exercise| run(exercise, config, &ctx))
        .collect::<ExerciseResult<Vec<_>>>()?;
    Ok(RunReport {
        device: ctx.device,
        seed: ctx.seed,
        exercises,
    })
}
