pub mod config;
pub mod error;
pub mod exercise;
pub mod report;

pub use config::{ExerciseConfig, MatmulConfig, SqueezeConfig};
pub use error::{ExerciseError, ExerciseResult};
pub use exercise::{run, run_all, Exercise, ExerciseContext};
pub use report::{ExerciseReport, ExtremaReport, MatmulReport, RunReport, SqueezeReport};
