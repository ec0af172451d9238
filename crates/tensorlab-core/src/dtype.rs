use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Runtime tag for the element type stored in a tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    F32,
    F64,
    I32,
    I64,
}

impl DType {
    pub fn is_float(&self) -> bool {
        matches!(self, DType::F32 | DType::F64)
    }

    pub fn name(&self) -> &'static str {
        match self {
            DType::F32 => "float32",
            DType::F64 => "float64",
            DType::I32 => "int32",
            DType::I64 => "int64",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Trait bound for every numeric type a tensor can hold.
/// Supports `f32`, `f64`, `i32` and `i64`.
pub trait Element:
    Copy
    + Clone
    + Default
    + PartialOrd
    + fmt::Debug
    + fmt::Display
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + AddAssign
    + Sum
    + Serialize
    + for<'de> Deserialize<'de>
    + 'static
{
    const ZERO: Self;
    const ONE: Self;
    const DTYPE: DType;

    fn from_f64(v: f64) -> Self;
    fn to_f64(self) -> f64;
    fn from_i64(v: i64) -> Self;

    /// Integers are never NaN.
    fn is_nan_elem(self) -> bool;

    /// Write one element the way tensors print it.
    fn fmt_elem(self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

/// Floating-point elements (`f32`, `f64`).
pub trait Float: Element {
    /// Draw a value uniformly from `[0, 1)` at this type's own precision.
    fn sample_unit<R: Rng>(rng: &mut R) -> Self;
}

macro_rules! impl_float_element {
    ($t:ty, $dtype:expr) => {
        impl Element for $t {
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;
            const DTYPE: DType = $dtype;

            #[inline]
            fn from_f64(v: f64) -> Self {
                v as $t
            }

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_i64(v: i64) -> Self {
                v as $t
            }

            #[inline]
            fn is_nan_elem(self) -> bool {
                <$t>::is_nan(self)
            }

            fn fmt_elem(self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:.4}", self)
            }
        }

        impl Float for $t {
            #[inline]
            fn sample_unit<R: Rng>(rng: &mut R) -> Self {
                rng.gen::<$t>()
            }
        }
    };
}

macro_rules! impl_int_element {
    ($t:ty, $dtype:expr) => {
        impl Element for $t {
            const ZERO: Self = 0;
            const ONE: Self = 1;
            const DTYPE: DType = $dtype;

            #[inline]
            fn from_f64(v: f64) -> Self {
                v as $t
            }

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_i64(v: i64) -> Self {
                v as $t
            }

            #[inline]
            fn is_nan_elem(self) -> bool {
                false
            }

            fn fmt_elem(self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self)
            }
        }
    };
}

impl_float_element!(f32, DType::F32);
impl_float_element!(f64, DType::F64);
impl_int_element!(i32, DType::I32);
impl_int_element!(i64, DType::I64);

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_dtype_tags() {
        assert_eq!(<f32 as Element>::DTYPE, DType::F32);
        assert_eq!(<i64 as Element>::DTYPE, DType::I64);
        assert!(DType::F64.is_float());
        assert!(!DType::I32.is_float());
        assert_eq!(DType::I64.to_string(), "int64");
    }

    #[test]
    fn test_sample_unit_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..10_000 {
            let v = f32::sample_unit(&mut rng);
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_nan_only_for_floats() {
        assert!(f64::NAN.is_nan_elem());
        assert!(!1.5f64.is_nan_elem());
        assert!(!7i64.is_nan_elem());
    }
}
