use crate::device::Device;
use crate::dtype::{DType, Element, Float};
use crate::error::{TensorError, TensorResult};
use crate::random::Generator;
use crate::shape::Shape;

use log::{debug, log_enabled, trace, Level};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

/// Multiply-adds above which `matmul` splits output rows across rayon.
const PAR_MATMUL_THRESHOLD: usize = 1 << 15;

/// Axes longer than this print only their edges.
const SUMMARY_THRESHOLD: usize = 64;
const EDGE_ITEMS: usize = 3;

/// N-dimensional tensor, the fundamental data structure of TensorLab.
///
/// Stores data in a flat contiguous `Vec<T>` with row-major (C-order) layout,
/// tagged with the device it lives on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "T: Element", try_from = "RawTensor<T>")]
pub struct Tensor<T: Element> {
    data: Vec<T>,
    shape: Shape,
    device: Device,
}

/// Wire form of a tensor; checked through `Tensor::new` before use.
#[derive(Deserialize)]
#[serde(bound = "T: Element")]
struct RawTensor<T: Element> {
    data: Vec<T>,
    shape: Shape,
    #[serde(default)]
    device: Device,
}

impl<T: Element> TryFrom<RawTensor<T>> for Tensor<T> {
    type Error = TensorError;

    fn try_from(raw: RawTensor<T>) -> TensorResult<Self> {
        let mut tensor = Tensor::new(raw.data, raw.shape.to_vec())?;
        tensor.device = raw.device;
        Ok(tensor)
    }
}

/// Flat positions and values of the smallest and largest elements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: Element")]
pub struct Extrema<T: Element> {
    pub argmin: usize,
    pub min: T,
    pub argmax: usize,
    pub max: T,
}

// ─── Construction ───────────────────────────────────────────────────────────

impl<T: Element> Tensor<T> {
    /// Create a tensor from raw data and shape.
    pub fn new(data: Vec<T>, shape: Vec<usize>) -> TensorResult<Self> {
        let s = Shape::new(shape);
        if s.checked_numel() != Some(data.len()) {
            return Err(TensorError::ShapeMismatch {
                expected: s.to_vec(),
                got: vec![data.len()],
            });
        }
        Ok(Tensor {
            data,
            shape: s,
            device: Device::Cpu,
        })
    }

    /// Create a tensor filled with zeros.
    pub fn zeros(shape: Vec<usize>) -> Self {
        Self::full(shape, T::ZERO)
    }

    /// Create a tensor filled with ones.
    pub fn ones(shape: Vec<usize>) -> Self {
        Self::full(shape, T::ONE)
    }

    /// Create a tensor filled with a constant value.
    pub fn full(shape: Vec<usize>, value: T) -> Self {
        let s = Shape::new(shape);
        Tensor {
            data: vec![value; s.numel()],
            shape: s,
            device: Device::Cpu,
        }
    }

    /// Create a scalar tensor (0-d).
    pub fn scalar(value: T) -> Self {
        Tensor {
            data: vec![value],
            shape: Shape::scalar(),
            device: Device::Cpu,
        }
    }

    /// Create a 1-D tensor from a slice.
    pub fn from_slice(data: &[T]) -> Self {
        Tensor {
            data: data.to_vec(),
            shape: Shape::new(vec![data.len()]),
            device: Device::Cpu,
        }
    }

    /// Create a 2-D tensor from a nested slice.
    pub fn from_vec2d(data: &[Vec<T>]) -> TensorResult<Self> {
        if data.is_empty() {
            return Ok(Tensor::zeros(vec![0, 0]));
        }
        let rows = data.len();
        let cols = data[0].len();
        if data.iter().any(|row| row.len() != cols) {
            return Err(TensorError::InvalidOperation(
                "All rows must have the same number of columns".to_string(),
            ));
        }
        let flat: Vec<T> = data.iter().flat_map(|r| r.iter().copied()).collect();
        Tensor::new(flat, vec![rows, cols])
    }

    /// Random integers drawn uniformly from `[low, high)`.
    pub fn randint(
        low: i64,
        high: i64,
        shape: Vec<usize>,
        generator: &mut Generator,
    ) -> TensorResult<Self> {
        if low >= high {
            return Err(TensorError::InvalidRange { low, high });
        }
        let s = Shape::new(shape);
        let data = (0..s.numel())
            .map(|_| generator.randint(low, high).map(T::from_i64))
            .collect::<TensorResult<Vec<T>>>()?;
        debug!("randint [{low}, {high}) -> {s}");
        Ok(Tensor {
            data,
            shape: s,
            device: Device::Cpu,
        })
    }

    /// `randint` placed directly on `device`.
    pub fn randint_on(
        low: i64,
        high: i64,
        shape: Vec<usize>,
        generator: &mut Generator,
        device: Device,
    ) -> TensorResult<Self> {
        Self::randint(low, high, shape, generator)?.to_device(device)
    }
}

impl<T: Float> Tensor<T> {
    /// Random tensor with uniform distribution in [0, 1).
    pub fn rand(shape: Vec<usize>, generator: &mut Generator) -> Self {
        let s = Shape::new(shape);
        let data: Vec<T> = (0..s.numel()).map(|_| generator.uniform()).collect();
        debug!("rand {s} (seed {})", generator.initial_seed());
        Tensor {
            data,
            shape: s,
            device: Device::Cpu,
        }
    }

    /// `rand` placed directly on `device`.
    pub fn rand_on(
        shape: Vec<usize>,
        generator: &mut Generator,
        device: Device,
    ) -> TensorResult<Self> {
        Self::rand(shape, generator).to_device(device)
    }

    /// Random tensor with standard normal distribution.
    pub fn randn(shape: Vec<usize>, generator: &mut Generator) -> Self {
        let s = Shape::new(shape);
        let n = s.numel();
        let mut data = Vec::with_capacity(n + 1);
        while data.len() < n {
            let (z0, z1) = generator.normal_pair();
            data.push(T::from_f64(z0));
            data.push(T::from_f64(z1));
        }
        data.truncate(n);
        Tensor {
            data,
            shape: s,
            device: Device::Cpu,
        }
    }

    /// Mean of all elements.
    pub fn mean_all(&self) -> TensorResult<T> {
        if self.data.is_empty() {
            return Err(TensorError::EmptyTensor);
        }
        Ok(T::from_f64(self.sum_all().to_f64() / self.numel() as f64))
    }
}

// ─── Accessors ──────────────────────────────────────────────────────────────

impl<T: Element> Tensor<T> {
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn shape_vec(&self) -> Vec<usize> {
        self.shape.to_vec()
    }

    pub fn ndim(&self) -> usize {
        self.shape.ndim()
    }

    pub fn numel(&self) -> usize {
        self.data.len()
    }

    pub fn dtype(&self) -> DType {
        T::DTYPE
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn is_scalar(&self) -> bool {
        self.shape.ndim() == 0
    }

    /// Get a single element (scalar value).
    pub fn item(&self) -> TensorResult<T> {
        if self.data.len() != 1 {
            return Err(TensorError::InvalidOperation(format!(
                "item() requires exactly 1 element, got {}",
                self.data.len()
            )));
        }
        Ok(self.data[0])
    }

    fn offset_of(&self, indices: &[usize]) -> TensorResult<usize> {
        if indices.len() != self.ndim() {
            return Err(TensorError::DimensionMismatch(format!(
                "Expected {} indices, got {}",
                self.ndim(),
                indices.len()
            )));
        }
        let strides = self.shape.strides();
        let mut offset = 0;
        for (i, &idx) in indices.iter().enumerate() {
            let dim_size = self.shape.dim(i)?;
            if idx >= dim_size {
                return Err(TensorError::IndexOutOfBounds {
                    index: idx,
                    axis: i,
                    size: dim_size,
                });
            }
            offset += idx * strides[i];
        }
        Ok(offset)
    }

    /// Multi-dimensional indexing.
    pub fn get(&self, indices: &[usize]) -> TensorResult<T> {
        Ok(self.data[self.offset_of(indices)?])
    }

    /// Index into the flattened (row-major) tensor.
    pub fn get_flat(&self, index: usize) -> TensorResult<T> {
        self.data
            .get(index)
            .copied()
            .ok_or(TensorError::IndexOutOfBounds {
                index,
                axis: 0,
                size: self.numel(),
            })
    }

    // ─── Device Placement ───────────────────────────────────────────────────

    /// Copy of this tensor placed on `device`.
    pub fn to_device(&self, device: Device) -> TensorResult<Tensor<T>> {
        let device = device.ensure_available()?;
        if device != self.device {
            debug!("moving {} tensor {} -> {}", self.shape, self.device, device);
        }
        Ok(Tensor {
            data: self.data.clone(),
            shape: self.shape.clone(),
            device,
        })
    }

    /// Copy of this tensor on the host.
    pub fn cpu(&self) -> Tensor<T> {
        Tensor {
            data: self.data.clone(),
            shape: self.shape.clone(),
            device: Device::Cpu,
        }
    }

    /// Convert every element to another element type.
    pub fn cast<U: Element>(&self) -> Tensor<U> {
        Tensor {
            data: self.data.iter().map(|&x| U::from_f64(x.to_f64())).collect(),
            shape: self.shape.clone(),
            device: self.device,
        }
    }

    fn with_shape(&self, shape: Shape) -> Tensor<T> {
        Tensor {
            data: self.data.clone(),
            shape,
            device: self.device,
        }
    }

    // ─── Shape Manipulation ─────────────────────────────────────────────────

    /// Reshape the tensor (data remains the same, only shape changes).
    pub fn reshape(&self, new_shape: Vec<usize>) -> TensorResult<Tensor<T>> {
        let ns = Shape::new(new_shape);
        if self.numel() != ns.numel() {
            return Err(TensorError::ShapeMismatch {
                expected: ns.to_vec(),
                got: self.shape_vec(),
            });
        }
        Ok(self.with_shape(ns))
    }

    /// Flatten to 1-D.
    pub fn flatten(&self) -> Tensor<T> {
        self.with_shape(Shape::new(vec![self.numel()]))
    }

    /// Transpose the last two dimensions.
    pub fn t(&self) -> TensorResult<Tensor<T>> {
        let shape = self.shape.transposed()?;
        let dims = self.shape.dims();
        let rows = dims[dims.len() - 2];
        let cols = dims[dims.len() - 1];
        let mat_size = rows * cols;
        let batch_size: usize = dims[..dims.len() - 2].iter().product();

        let mut data = vec![T::ZERO; self.numel()];
        for b in 0..batch_size {
            let offset = b * mat_size;
            for i in 0..rows {
                for j in 0..cols {
                    data[offset + j * rows + i] = self.data[offset + i * cols + j];
                }
            }
        }
        Ok(Tensor {
            data,
            shape,
            device: self.device,
        })
    }

    /// Add a dimension of size 1 at the given axis.
    pub fn unsqueeze(&self, axis: usize) -> TensorResult<Tensor<T>> {
        let mut dims = self.shape.to_vec();
        if axis > dims.len() {
            return Err(TensorError::InvalidAxis {
                axis,
                ndim: self.ndim(),
            });
        }
        dims.insert(axis, 1);
        Ok(self.with_shape(Shape::new(dims)))
    }

    /// Remove all dimensions of size 1. Element order is unchanged; a tensor
    /// made only of size-1 dimensions becomes a scalar.
    pub fn squeeze(&self) -> Tensor<T> {
        let squeezed = self.shape.squeezed();
        debug!("squeeze {} -> {}", self.shape, squeezed);
        self.with_shape(squeezed)
    }

    /// Remove `axis` if it has size 1.
    pub fn squeeze_dim(&self, axis: usize) -> TensorResult<Tensor<T>> {
        Ok(self.with_shape(self.shape.squeezed_dim(axis)?))
    }

    // ─── Reduction Operations ───────────────────────────────────────────────

    /// Sum of all elements.
    pub fn sum_all(&self) -> T {
        self.data.iter().copied().sum()
    }

    /// Flat index of the first element that no later element beats under
    /// `better`. A NaN wins outright.
    fn arg_best(&self, better: impl Fn(T, T) -> bool) -> TensorResult<usize> {
        if self.data.is_empty() {
            return Err(TensorError::EmptyTensor);
        }
        let mut best = 0;
        for (i, &v) in self.data.iter().enumerate() {
            if v.is_nan_elem() {
                return Ok(i);
            }
            if better(v, self.data[best]) {
                best = i;
            }
        }
        Ok(best)
    }

    /// Argmax of all elements (flat index).
    pub fn argmax_all(&self) -> TensorResult<usize> {
        self.arg_best(|v, best| v > best)
    }

    /// Argmin of all elements (flat index).
    pub fn argmin_all(&self) -> TensorResult<usize> {
        self.arg_best(|v, best| v < best)
    }

    /// Max of all elements.
    pub fn max_all(&self) -> TensorResult<T> {
        Ok(self.data[self.argmax_all()?])
    }

    /// Min of all elements.
    pub fn min_all(&self) -> TensorResult<T> {
        Ok(self.data[self.argmin_all()?])
    }

    /// Both extremes with their flat positions.
    pub fn extrema(&self) -> TensorResult<Extrema<T>> {
        let argmin = self.argmin_all()?;
        let argmax = self.argmax_all()?;
        Ok(Extrema {
            argmin,
            min: self.data[argmin],
            argmax,
            max: self.data[argmax],
        })
    }

    // ─── Matrix Multiply ────────────────────────────────────────────────────

    /// Matrix multiply: supports 2D×2D and batched.
    pub fn matmul(&self, other: &Tensor<T>) -> TensorResult<Tensor<T>> {
        if self.device != other.device {
            return Err(TensorError::DeviceMismatch {
                lhs: self.device,
                rhs: other.device,
            });
        }
        if self.ndim() < 2 || other.ndim() < 2 {
            return Err(TensorError::InvalidOperation(
                "matmul requires tensors with at least 2 dimensions".to_string(),
            ));
        }

        let a_dims = self.shape.dims();
        let b_dims = other.shape.dims();
        let m = a_dims[a_dims.len() - 2];
        let k = a_dims[a_dims.len() - 1];
        let k2 = b_dims[b_dims.len() - 2];
        let n = b_dims[b_dims.len() - 1];

        if k != k2 {
            return Err(TensorError::DimensionMismatch(format!(
                "matmul: inner dimensions must match, got {} ({}) and {} ({})",
                k, self.shape, k2, other.shape
            )));
        }

        let a_batch = &a_dims[..a_dims.len() - 2];
        let b_batch = &b_dims[..b_dims.len() - 2];
        let a_unit = a_batch.iter().all(|&d| d == 1);
        let b_unit = b_batch.iter().all(|&d| d == 1);
        // batch dims must agree exactly unless one side is all ones
        let batch_dims = if a_batch == b_batch
            || (b_unit && (!a_unit || a_batch.len() >= b_batch.len()))
        {
            a_batch
        } else if a_unit {
            b_batch
        } else {
            return Err(TensorError::DimensionMismatch(format!(
                "matmul: batch dimensions {:?} and {:?} are incompatible",
                a_batch, b_batch
            )));
        };
        let batch_a: usize = a_batch.iter().product();
        let batch_b: usize = b_batch.iter().product();
        let batch: usize = batch_dims.iter().product();

        let mut out_shape = batch_dims.to_vec();
        out_shape.push(m);
        out_shape.push(n);

        let started = log_enabled!(Level::Trace).then(Instant::now);
        let mut data = vec![T::ZERO; batch * m * n];
        if m * n > 0 {
            let (a_mat, b_mat) = (m * k, k * n);
            for (b_idx, out) in data.chunks_mut(m * n).enumerate() {
                let a_off = if batch_a == 1 { 0 } else { b_idx * a_mat };
                let b_off = if batch_b == 1 { 0 } else { b_idx * b_mat };
                matmul_into(
                    &self.data[a_off..a_off + a_mat],
                    &other.data[b_off..b_off + b_mat],
                    out,
                    k,
                    n,
                );
            }
        }

        debug!("matmul {} @ {} -> {:?}", self.shape, other.shape, out_shape);
        if let Some(t) = started {
            trace!(
                "[perf] matmul {}x{}x{} batch={} {:.3}ms",
                m,
                k,
                n,
                batch,
                t.elapsed().as_secs_f64() * 1000.0
            );
        }

        let mut result = Tensor::new(data, out_shape)?;
        result.device = self.device;
        Ok(result)
    }
}

/// `out (m×n) = a (m×k) · b (k×n)`; rows go to rayon once the product is big
/// enough. Each output element is summed in the same order either way.
fn matmul_into<T: Element>(a: &[T], b: &[T], out: &mut [T], k: usize, n: usize) {
    let row = |(i, out_row): (usize, &mut [T])| {
        for (j, cell) in out_row.iter_mut().enumerate() {
            let mut sum = T::ZERO;
            for p in 0..k {
                sum += a[i * k + p] * b[p * n + j];
            }
            *cell = sum;
        }
    };
    if out.len() * k >= PAR_MATMUL_THRESHOLD {
        out.par_chunks_mut(n).enumerate().for_each(row);
    } else {
        out.chunks_mut(n).enumerate().for_each(row);
    }
}

impl<T: Element> PartialEq for Tensor<T> {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && self.device == other.device && self.data == other.data
    }
}

// ─── Display ────────────────────────────────────────────────────────────────

impl<T: Element> Tensor<T> {
    fn write_nested(
        &self,
        f: &mut fmt::Formatter<'_>,
        strides: &[usize],
        axis: usize,
        offset: usize,
    ) -> fmt::Result {
        let dims = self.shape.dims();
        let len = dims[axis];
        let last = axis + 1 == dims.len();

        let positions: Vec<Option<usize>> = if len > SUMMARY_THRESHOLD {
            (0..EDGE_ITEMS)
                .map(Some)
                .chain(std::iter::once(None))
                .chain((len - EDGE_ITEMS..len).map(Some))
                .collect()
        } else {
            (0..len).map(Some).collect()
        };

        write!(f, "[")?;
        for (pos, idx) in positions.into_iter().enumerate() {
            if pos > 0 {
                if last {
                    write!(f, ", ")?;
                } else {
                    write!(f, ",")?;
                    for _ in 0..dims.len() - axis - 1 {
                        writeln!(f)?;
                    }
                    // align under the opening bracket after "tensor("
                    write!(f, "{:width$}", "", width = "tensor(".len() + axis + 1)?;
                }
            }
            match idx {
                None => write!(f, "...")?,
                Some(i) if last => self.data[offset + i].fmt_elem(f)?,
                Some(i) => self.write_nested(f, strides, axis + 1, offset + i * strides[axis])?,
            }
        }
        write!(f, "]")
    }
}

impl<T: Element> fmt::Display for Tensor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tensor(")?;
        if self.is_scalar() {
            self.data[0].fmt_elem(f)?;
        } else if self.numel() == 0 {
            write!(f, "[]")?;
        } else {
            self.write_nested(f, &self.shape.strides(), 0, 0)?;
        }
        if !self.device.is_cpu() {
            write!(f, ", device='{}'", self.device)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn matrix(data: &[f64], rows: usize, cols: usize) -> Tensor<f64> {
        Tensor::new(data.to_vec(), vec![rows, cols]).unwrap()
    }

    #[test]
    fn test_creation() {
        let t: Tensor<f64> = Tensor::zeros(vec![3, 4]);
        assert_eq!(t.shape_vec(), vec![3, 4]);
        assert_eq!(t.numel(), 12);
        assert_eq!(t.device(), Device::Cpu);

        let t: Tensor<i64> = Tensor::ones(vec![2, 3]);
        assert_eq!(t.sum_all(), 6);
        assert_eq!(t.dtype(), DType::I64);

        assert!(Tensor::<f32>::new(vec![1.0, 2.0], vec![3]).is_err());
    }

    #[test]
    fn test_from_vec2d() {
        let t: Tensor<f64> =
            Tensor::from_vec2d(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(t.shape_vec(), vec![2, 3]);
        assert_eq!(t.get(&[1, 2]).unwrap(), 6.0);
        assert!(Tensor::<f64>::from_vec2d(&[vec![1.0], vec![1.0, 2.0]]).is_err());
    }

    #[test]
    fn test_rand_is_seeded() {
        let a: Tensor<f32> = Tensor::rand(vec![7, 7], &mut Generator::new(7));
        let b: Tensor<f32> = Tensor::rand(vec![7, 7], &mut Generator::new(7));
        let c: Tensor<f32> = Tensor::rand(vec![7, 7], &mut Generator::new(8));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.min_all().unwrap() >= 0.0);
        assert!(a.max_all().unwrap() < 1.0);
    }

    #[test]
    fn test_randint_range_and_errors() {
        let mut g = Generator::new(7);
        let t: Tensor<i64> = Tensor::randint(0, 10, vec![1, 1, 1, 10], &mut g).unwrap();
        assert_eq!(t.shape_vec(), vec![1, 1, 1, 10]);
        assert!(t.data().iter().all(|v| (0..10).contains(v)));

        let err = Tensor::<i64>::randint(3, 3, vec![2], &mut g).unwrap_err();
        assert_eq!(err, TensorError::InvalidRange { low: 3, high: 3 });
    }

    #[test]
    fn test_randn_shape() {
        let t: Tensor<f64> = Tensor::randn(vec![3, 3], &mut Generator::new(1));
        assert_eq!(t.numel(), 9);
        assert!(t.data().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_matmul() {
        let a = matrix(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
        let b = matrix(&[7.0, 8.0, 9.0, 10.0, 11.0, 12.0], 3, 2);
        let c = a.matmul(&b).unwrap();
        assert_eq!(c.shape_vec(), vec![2, 2]);
        assert_eq!(c.data(), &[58.0, 64.0, 139.0, 154.0]);
    }

    #[test]
    fn test_matmul_against_transpose() {
        let mut g = Generator::new(7);
        let a: Tensor<f32> = Tensor::rand(vec![7, 7], &mut g);
        let b: Tensor<f32> = Tensor::rand(vec![1, 7], &mut g);
        assert_eq!(a.matmul(&b.t().unwrap()).unwrap().shape_vec(), vec![7, 1]);

        let a: Tensor<f32> = Tensor::rand(vec![2, 3], &mut g);
        let b: Tensor<f32> = Tensor::rand(vec![2, 3], &mut g);
        let c = a.matmul(&b.t().unwrap()).unwrap();
        assert_eq!(c.shape_vec(), vec![2, 2]);
        let expected: f32 = (0..3).map(|p| a.data()[p] * b.data()[3 + p]).sum();
        assert_relative_eq!(c.get(&[0, 1]).unwrap(), expected, epsilon = 1e-6);
    }

    #[test]
    fn test_matmul_inner_mismatch() {
        let a: Tensor<f64> = Tensor::ones(vec![2, 3]);
        let b: Tensor<f64> = Tensor::ones(vec![2, 3]);
        assert!(matches!(a.matmul(&b), Err(TensorError::DimensionMismatch(_))));
        assert!(a.matmul(&Tensor::ones(vec![3])).is_err());
    }

    #[test]
    fn test_matmul_device_mismatch() {
        let a: Tensor<f64> = Tensor::ones(vec![2, 2]);
        let mut b: Tensor<f64> = Tensor::ones(vec![2, 2]);
        b.device = Device::Cuda(0);
        assert_eq!(
            a.matmul(&b).unwrap_err(),
            TensorError::DeviceMismatch {
                lhs: Device::Cpu,
                rhs: Device::Cuda(0)
            }
        );
    }

    #[test]
    fn test_matmul_batched() {
        let a: Tensor<f64> = Tensor::ones(vec![4, 2, 3]);
        let b: Tensor<f64> = Tensor::ones(vec![3, 5]).unsqueeze(0).unwrap();
        let c = a.matmul(&b).unwrap();
        assert_eq!(c.shape_vec(), vec![4, 2, 5]);
        assert!(c.data().iter().all(|&v| v == 3.0));

        let bad: Tensor<f64> = Tensor::ones(vec![3, 3, 5]);
        assert!(a.matmul(&bad).is_err());
    }

    #[test]
    fn test_matmul_batch_dims_must_match() {
        let a: Tensor<f64> = Tensor::ones(vec![2, 3, 2, 2]);
        let b: Tensor<f64> = Tensor::ones(vec![3, 2, 2, 2]);
        assert!(matches!(a.matmul(&b), Err(TensorError::DimensionMismatch(_))));

        let unit: Tensor<f64> = Tensor::ones(vec![1, 1, 2, 2]);
        assert_eq!(a.matmul(&unit).unwrap().shape_vec(), vec![2, 3, 2, 2]);
        assert_eq!(unit.matmul(&a).unwrap().shape_vec(), vec![2, 3, 2, 2]);

        let plain: Tensor<f64> = Tensor::ones(vec![2, 2]);
        assert_eq!(plain.matmul(&b).unwrap().shape_vec(), vec![3, 2, 2, 2]);
    }

    #[test]
    fn test_matmul_parallel_matches_naive() {
        let mut g = Generator::new(99);
        let (m, k, n) = (64, 48, 40);
        let a: Tensor<f64> = Tensor::rand(vec![m, k], &mut g);
        let b: Tensor<f64> = Tensor::rand(vec![k, n], &mut g);
        let c = a.matmul(&b).unwrap();
        for i in 0..m {
            for j in 0..n {
                let expected: f64 = (0..k).map(|p| a.data()[i * k + p] * b.data()[p * n + j]).sum();
                assert_relative_eq!(c.get(&[i, j]).unwrap(), expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_transpose() {
        let a = matrix(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
        let t = a.t().unwrap();
        assert_eq!(t.shape_vec(), vec![3, 2]);
        assert_eq!(t.get(&[1, 0]).unwrap(), 2.0);
        assert_eq!(t.get(&[2, 1]).unwrap(), 6.0);
        assert!(Tensor::from_slice(&[1.0f64]).t().is_err());
    }

    #[test]
    fn test_extrema_index_flat_tensor() {
        let a = matrix(&[0.5, -1.0, 3.0, 3.0, 2.0, -1.0], 2, 3);
        let e = a.extrema().unwrap();
        assert_eq!(e.argmin, 1);
        assert_eq!(e.argmax, 2);
        assert_eq!(a.flatten().get_flat(e.argmin).unwrap(), e.min);
        assert_eq!(a.flatten().get_flat(e.argmax).unwrap(), e.max);
        assert_eq!(a.min_all().unwrap(), -1.0);
        assert_eq!(a.max_all().unwrap(), 3.0);
    }

    #[test]
    fn test_extrema_nan_and_empty() {
        let a = Tensor::from_slice(&[1.0f64, f64::NAN, 5.0]);
        assert_eq!(a.argmax_all().unwrap(), 1);
        assert_eq!(a.argmin_all().unwrap(), 1);
        assert!(a.max_all().unwrap().is_nan());

        let empty: Tensor<f64> = Tensor::zeros(vec![0]);
        assert_eq!(empty.extrema().unwrap_err(), TensorError::EmptyTensor);
    }

    #[test]
    fn test_squeeze() {
        let mut g = Generator::new(7);
        let t: Tensor<i64> = Tensor::randint(0, 10, vec![1, 1, 1, 10], &mut g).unwrap();
        let s = t.squeeze();
        assert_eq!(s.shape_vec(), vec![10]);
        assert_eq!(s.data(), t.data());

        let one: Tensor<f64> = Tensor::full(vec![1, 1], 4.0);
        let s = one.squeeze();
        assert!(s.is_scalar());
        assert_eq!(s.item().unwrap(), 4.0);

        let t: Tensor<f64> = Tensor::zeros(vec![2, 1, 3]);
        assert_eq!(t.squeeze_dim(1).unwrap().shape_vec(), vec![2, 3]);
        assert_eq!(t.squeeze_dim(0).unwrap().shape_vec(), vec![2, 1, 3]);
    }

    #[test]
    fn test_reshape_and_unsqueeze() {
        let a = matrix(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
        let b = a.reshape(vec![3, 2]).unwrap();
        assert_eq!(b.data(), a.data());
        assert!(a.reshape(vec![4, 2]).is_err());
        assert_eq!(a.unsqueeze(0).unwrap().shape_vec(), vec![1, 2, 3]);
        assert!(a.unsqueeze(3).is_err());
    }

    #[test]
    fn test_get_flat_bounds() {
        let a = Tensor::from_slice(&[1i32, 2, 3]);
        assert_eq!(a.get_flat(2).unwrap(), 3);
        assert!(a.get_flat(3).is_err());
    }

    #[test]
    fn test_to_device() {
        let a: Tensor<f64> = Tensor::ones(vec![2]);
        assert_eq!(a.to_device(Device::Cpu).unwrap(), a);
        assert_eq!(
            a.to_device(Device::Cuda(0)).unwrap_err(),
            TensorError::DeviceUnavailable(Device::Cuda(0))
        );
        let mut on_gpu = a.clone();
        on_gpu.device = Device::Cuda(0);
        assert_eq!(on_gpu.cpu(), a);
    }

    #[test]
    fn test_cast() {
        let a = Tensor::from_slice(&[1i64, 2, 3]);
        let f: Tensor<f32> = a.cast();
        assert_eq!(f.data(), &[1.0, 2.0, 3.0]);
        assert_relative_eq!(f.mean_all().unwrap(), 2.0);
    }

    #[test]
    fn test_display() {
        let a = matrix(&[1.0, 2.0, 3.0, 4.0], 2, 2);
        assert_eq!(a.to_string(), "tensor([[1.0000, 2.0000],\n        [3.0000, 4.0000]])");

        let v = Tensor::from_slice(&[3i64, 0, 7]).reshape(vec![1, 1, 3]).unwrap();
        assert_eq!(v.to_string(), "tensor([[[3, 0, 7]]])");
        assert_eq!(v.squeeze().to_string(), "tensor([3, 0, 7])");

        assert_eq!(Tensor::scalar(2.5f64).to_string(), "tensor(2.5000)");

        let mut on_gpu = Tensor::from_slice(&[1i32]);
        on_gpu.device = Device::Cuda(0);
        assert_eq!(on_gpu.to_string(), "tensor([1], device='cuda:0')");
    }

    #[test]
    fn test_display_summarizes_long_axes() {
        let long: Tensor<i64> = Tensor::zeros(vec![100]);
        assert_eq!(long.to_string(), "tensor([0, 0, 0, ..., 0, 0, 0])");
    }

    #[test]
    fn test_serde_roundtrip_keeps_device() {
        let a = matrix(&[1.0, 2.0], 1, 2);
        let json = serde_json::to_string(&a).unwrap();
        assert!(json.contains("\"device\":\"cpu\""));
        let back: Tensor<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
    }

    #[test]
    fn test_deserialize_checks_length() {
        let bad = serde_json::from_str::<Tensor<f64>>(r#"{"data":[],"shape":[]}"#);
        assert!(bad.is_err());
        let bad = serde_json::from_str::<Tensor<i64>>(r#"{"data":[1,2,3],"shape":[2,2]}"#);
        assert!(bad.is_err());
        let huge = format!(r#"{{"data":[1],"shape":[{0},{0},{0}]}}"#, 1u64 << 32);
        assert!(serde_json::from_str::<Tensor<i64>>(&huge).is_err());

        let ok: Tensor<i64> =
            serde_json::from_str(r#"{"data":[1,2,3,4],"shape":[2,2]}"#).unwrap();
        assert_eq!(ok.device(), Device::Cpu);
        assert_eq!(ok.to_string(), "tensor([[1, 2],\n        [3, 4]])");
    }
}
