use std::fmt;
use std::io::{Read, Write};

use rand::prelude::*;

use crate::error::{Error, Result};
use crate::math::layout::Layout;
use crate::math::view::{TensorView, TensorViewMut};

/// Dense 2-D owner of a buffer of `f64`.
///
/// A `Tensor` is always contiguous and row-major. Strided access (rows,
/// columns, transposes, column slices) is obtained by borrowing it as a
/// `TensorView` / `TensorViewMut`; the buffer is freed exactly once, when
/// the owning `Tensor` is dropped.
#[derive(Clone, PartialEq)]
pub struct Tensor {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

impl Tensor {
    pub(crate) fn from_parts(rows: usize, cols: usize, data: Vec<f64>) -> Tensor {
        debug_assert_eq!(data.len(), rows * cols);
        Tensor { data, rows, cols }
    }

    pub fn zeros(rows: usize, cols: usize) -> Tensor {
        Tensor::from_parts(rows, cols, vec![0.0; rows * cols])
    }

    /// Entries drawn independently and uniformly from [-1, 1].
    pub fn random(rows: usize, cols: usize) -> Tensor {
        Tensor::random_with(rows, cols, &mut rand::thread_rng())
    }

    pub fn random_with<R: Rng>(rows: usize, cols: usize, rng: &mut R) -> Tensor {
        let data = (0..rows * cols).map(|_| rng.gen::<f64>() * 2.0 - 1.0).collect();
        Tensor::from_parts(rows, cols, data)
    }

    /// Wraps a row-major buffer.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Tensor> {
        if data.len() != rows * cols {
            return Err(Error::ElementCount { expected: rows * cols, got: data.len() });
        }
        Ok(Tensor::from_parts(rows, cols, data))
    }

    /// A single-column tensor holding `values`.
    pub fn column(values: &[f64]) -> Tensor {
        Tensor::from_parts(values.len(), 1, values.to_vec())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    fn layout(&self) -> Layout {
        Layout::contiguous(self.rows, self.cols)
    }

    pub fn view(&self) -> TensorView<'_> {
        TensorView::new(&self.data, self.layout())
    }

    pub fn view_mut(&mut self) -> TensorViewMut<'_> {
        let layout = self.layout();
        TensorViewMut::new(&mut self.data, layout)
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.view().get(i, j)
    }

    pub fn set(&mut self, i: usize, j: usize, v: f64) {
        self.view_mut().set(i, j, v);
    }

    pub fn transpose(&self) -> TensorView<'_> {
        self.view().transpose()
    }

    pub fn row(&self, i: usize) -> TensorView<'_> {
        self.view().row(i)
    }

    pub fn col(&self, j: usize) -> TensorView<'_> {
        self.view().col(j)
    }

    pub fn column_prefix(&self, k: usize) -> TensorView<'_> {
        self.view().column_prefix(k)
    }

    pub fn column_suffix(&self, k: usize) -> TensorView<'_> {
        self.view().column_suffix(k)
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    pub fn argmax_in_column(&self) -> usize {
        self.view().argmax_in_column()
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.data.clone()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Exchanges two whole rows in place.
    pub fn swap_rows(&mut self, a: usize, b: usize) {
        assert!(a < self.rows && b < self.rows, "swap_rows: ({a}, {b}) out of range for {} rows", self.rows);
        if a == b {
            return;
        }
        for k in 0..self.cols {
            self.data.swap(a * self.cols + k, b * self.cols + k);
        }
    }

    pub fn fill(&mut self, v: f64) -> &mut Tensor {
        self.data.iter_mut().for_each(|x| *x = v);
        self
    }

    pub fn add_assign<'s>(&mut self, src: impl Into<TensorView<'s>>) -> &mut Tensor {
        self.view_mut().add_assign(src);
        self
    }

    pub fn sub_assign<'s>(&mut self, src: impl Into<TensorView<'s>>) -> &mut Tensor {
        self.view_mut().sub_assign(src);
        self
    }

    pub fn hadamard_assign<'s>(&mut self, src: impl Into<TensorView<'s>>) -> &mut Tensor {
        self.view_mut().hadamard_assign(src);
        self
    }

    pub fn copy_from<'s>(&mut self, src: impl Into<TensorView<'s>>) -> &mut Tensor {
        self.view_mut().copy_from(src);
        self
    }

    pub fn scale(&mut self, k: f64) -> &mut Tensor {
        self.view_mut().scale(k);
        self
    }

    pub fn add_scaled<'s>(&mut self, src: impl Into<TensorView<'s>>, k: f64) -> &mut Tensor {
        self.view_mut().add_scaled(src, k);
        self
    }

    pub fn map_from<'s>(&mut self, src: impl Into<TensorView<'s>>, f: impl Fn(f64) -> f64) -> &mut Tensor {
        self.view_mut().map_from(src, f);
        self
    }

    pub fn matmul<'x, 'y>(&mut self, a: impl Into<TensorView<'x>>, b: impl Into<TensorView<'y>>) -> &mut Tensor {
        self.view_mut().matmul(a, b);
        self
    }

    pub fn matmul_accumulate<'x, 'y>(&mut self, a: impl Into<TensorView<'x>>, b: impl Into<TensorView<'y>>) -> &mut Tensor {
        self.view_mut().matmul_accumulate(a, b);
        self
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        self.view().write_to(w)?;
        Ok(())
    }

    /// Reads a tensor written by `write_to` into a fresh owner. A short read
    /// anywhere in the record is reported as `Error::Truncated`.
    pub fn read_from<R: Read>(r: &mut R) -> Result<Tensor> {
        let rows = read_size(r)?;
        let cols = read_size(r)?;
        let len = rows
            .checked_mul(cols)
            .ok_or_else(|| Error::CorruptModel(format!("tensor shape {rows}x{cols} overflows")))?;

        // The header is untrusted, so grow the buffer as entries actually arrive.
        let mut data = Vec::with_capacity(len.min(1 << 16));
        let mut buf = [0u8; 8];
        for _ in 0..len {
            r.read_exact(&mut buf).map_err(Error::reading("tensor data"))?;
            data.push(f64::from_ne_bytes(buf));
        }
        Ok(Tensor::from_parts(rows, cols, data))
    }
}

pub(crate) fn read_size<R: Read>(r: &mut R) -> Result<usize> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf).map_err(Error::reading("size header"))?;
    usize::try_from(u64::from_ne_bytes(buf))
        .map_err(|_| Error::CorruptModel("size does not fit in usize".into()))
}

pub(crate) fn write_size<W: Write>(w: &mut W, v: usize) -> Result<()> {
    w.write_all(&(v as u64).to_ne_bytes())?;
    Ok(())
}

impl Default for Tensor {
    fn default() -> Self {
        Tensor::zeros(0, 0)
    }
}

impl PartialEq<TensorView<'_>> for Tensor {
    fn eq(&self, other: &TensorView<'_>) -> bool {
        self.view() == *other
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("data", &self.data)
            .finish()
    }
}

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.view(), f)
    }
}
