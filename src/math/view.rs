use std::fmt;
use std::io::Write;

use crate::math::layout::Layout;
use crate::math::tensor::Tensor;

/// A read-only window onto some tensor's buffer.
///
/// Views never own memory; the borrow on the underlying buffer keeps the
/// owner alive for as long as the view exists, and dropping a view releases
/// nothing.
#[derive(Clone, Copy)]
pub struct TensorView<'a> {
    data: &'a [f64],
    layout: Layout,
}

/// A mutable window onto some tensor's buffer. All in-place arithmetic is
/// defined here; `Tensor` forwards to it.
pub struct TensorViewMut<'a> {
    data: &'a mut [f64],
    layout: Layout,
}

fn assert_same_shape(op: &str, dst: Layout, src: Layout) {
    assert!(
        dst.shape() == src.shape(),
        "{op}: shape mismatch, destination is {}x{} but source is {}x{}",
        dst.rows, dst.cols, src.rows, src.cols
    );
}

fn assert_matmul_shapes(op: &str, dst: Layout, a: Layout, b: Layout) {
    assert!(
        a.cols == b.rows && dst.rows == a.rows && dst.cols == b.cols,
        "{op}: cannot multiply {}x{} by {}x{} into {}x{}",
        a.rows, a.cols, b.rows, b.cols, dst.rows, dst.cols
    );
}

impl<'a> TensorView<'a> {
    pub(crate) fn new(data: &'a [f64], layout: Layout) -> TensorView<'a> {
        assert!(layout.extent() <= data.len(), "view exceeds its buffer");
        TensorView { data, layout }
    }

    pub fn rows(&self) -> usize {
        self.layout.rows
    }

    pub fn cols(&self) -> usize {
        self.layout.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        self.layout.shape()
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.rows() && j < self.cols(), "index ({i}, {j}) out of range for {}x{}", self.rows(), self.cols());
        self.data[self.layout.index(i, j)]
    }

    pub fn transpose(self) -> TensorView<'a> {
        TensorView { data: self.data, layout: self.layout.transpose() }
    }

    pub fn row(self, i: usize) -> TensorView<'a> {
        TensorView { data: self.data, layout: self.layout.row(i) }
    }

    pub fn col(self, j: usize) -> TensorView<'a> {
        TensorView { data: self.data, layout: self.layout.col(j) }
    }

    /// Rows in `[from, to)`.
    pub fn rows_range(self, from: usize, to: usize) -> TensorView<'a> {
        TensorView { data: self.data, layout: self.layout.row_range(from, to) }
    }

    /// The first `k` columns.
    pub fn column_prefix(self, k: usize) -> TensorView<'a> {
        TensorView { data: self.data, layout: self.layout.col_range(0, k) }
    }

    /// Every column from `k` onwards.
    pub fn column_suffix(self, k: usize) -> TensorView<'a> {
        let cols = self.cols();
        TensorView { data: self.data, layout: self.layout.col_range(k, cols) }
    }

    /// Logical entries in row-major order, regardless of the physical layout.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        let (rows, cols) = self.shape();
        (0..rows).flat_map(move |i| (0..cols).map(move |j| self.data[self.layout.index(i, j)]))
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.iter().collect()
    }

    /// Copies the logical contents into a fresh contiguous owner.
    pub fn to_owned(&self) -> Tensor {
        Tensor::from_parts(self.rows(), self.cols(), self.to_vec())
    }

    pub fn sum(&self) -> f64 {
        self.iter().sum()
    }

    /// Index of the largest entry of a single-column tensor. Ties go to the
    /// lowest index.
    pub fn argmax_in_column(&self) -> usize {
        assert!(self.cols() == 1, "argmax_in_column: expected one column, got {}", self.cols());
        assert!(self.rows() > 0, "argmax_in_column: empty tensor");
        let mut best = 0;
        let mut max = self.get(0, 0);
        for i in 1..self.rows() {
            let v = self.get(i, 0);
            if v > max {
                max = v;
                best = i;
            }
        }
        best
    }

    /// Writes `rows`, `cols` and then every entry in logical row-major order.
    pub fn write_to<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        w.write_all(&(self.rows() as u64).to_ne_bytes())?;
        w.write_all(&(self.cols() as u64).to_ne_bytes())?;
        for v in self.iter() {
            w.write_all(&v.to_ne_bytes())?;
        }
        Ok(())
    }
}

impl PartialEq for TensorView<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.shape() == other.shape() && self.iter().eq(other.iter())
    }
}

impl fmt::Debug for TensorView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TensorView")
            .field("shape", &self.shape())
            .field("data", &self.to_vec())
            .finish()
    }
}

impl fmt::Display for TensorView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.rows() {
            write!(f, "[")?;
            for j in 0..self.cols() {
                write!(f, " {:>7.3}", self.get(i, j))?;
            }
            writeln!(f, " ]")?;
        }
        Ok(())
    }
}

impl<'a> From<&'a Tensor> for TensorView<'a> {
    fn from(t: &'a Tensor) -> Self {
        t.view()
    }
}

impl<'a, 'b> From<&'a TensorViewMut<'b>> for TensorView<'a> {
    fn from(t: &'a TensorViewMut<'b>) -> Self {
        t.as_view()
    }
}

impl<'a> TensorViewMut<'a> {
    pub(crate) fn new(data: &'a mut [f64], layout: Layout) -> TensorViewMut<'a> {
        assert!(layout.extent() <= data.len(), "view exceeds its buffer");
        TensorViewMut { data, layout }
    }

    pub fn rows(&self) -> usize {
        self.layout.rows
    }

    pub fn cols(&self) -> usize {
        self.layout.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        self.layout.shape()
    }

    pub fn as_view(&self) -> TensorView<'_> {
        TensorView { data: &*self.data, layout: self.layout }
    }

    /// Shortens the borrow so the view can be handed out without giving up `self`.
    pub fn reborrow(&mut self) -> TensorViewMut<'_> {
        TensorViewMut { data: &mut *self.data, layout: self.layout }
    }

    pub fn transpose(self) -> TensorViewMut<'a> {
        TensorViewMut { data: self.data, layout: self.layout.transpose() }
    }

    pub fn row(self, i: usize) -> TensorViewMut<'a> {
        TensorViewMut { data: self.data, layout: self.layout.row(i) }
    }

    pub fn col(self, j: usize) -> TensorViewMut<'a> {
        TensorViewMut { data: self.data, layout: self.layout.col(j) }
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.as_view().get(i, j)
    }

    pub fn set(&mut self, i: usize, j: usize, v: f64) {
        assert!(i < self.rows() && j < self.cols(), "index ({i}, {j}) out of range for {}x{}", self.rows(), self.cols());
        self.data[self.layout.index(i, j)] = v;
    }

    fn update(&mut self, mut f: impl FnMut(usize, usize, f64) -> f64) {
        for i in 0..self.layout.rows {
            for j in 0..self.layout.cols {
                let at = self.layout.index(i, j);
                self.data[at] = f(i, j, self.data[at]);
            }
        }
    }

    fn zip_with<'s>(&mut self, op: &str, src: impl Into<TensorView<'s>>, f: impl Fn(f64, f64) -> f64) -> &mut Self {
        let src = src.into();
        assert_same_shape(op, self.layout, src.layout);
        self.update(|i, j, d| f(d, src.get(i, j)));
        self
    }

    pub fn fill(&mut self, v: f64) -> &mut Self {
        self.update(|_, _, _| v);
        self
    }

    pub fn add_assign<'s>(&mut self, src: impl Into<TensorView<'s>>) -> &mut Self {
        self.zip_with("add", src, |d, s| d + s)
    }

    pub fn sub_assign<'s>(&mut self, src: impl Into<TensorView<'s>>) -> &mut Self {
        self.zip_with("sub", src, |d, s| d - s)
    }

    /// Elementwise product.
    pub fn hadamard_assign<'s>(&mut self, src: impl Into<TensorView<'s>>) -> &mut Self {
        self.zip_with("hadamard", src, |d, s| d * s)
    }

    pub fn copy_from<'s>(&mut self, src: impl Into<TensorView<'s>>) -> &mut Self {
        self.zip_with("copy", src, |_, s| s)
    }

    pub fn scale(&mut self, k: f64) -> &mut Self {
        self.update(|_, _, d| d * k);
        self
    }

    /// `self += k · src`.
    pub fn add_scaled<'s>(&mut self, src: impl Into<TensorView<'s>>, k: f64) -> &mut Self {
        self.zip_with("add_scaled", src, |d, s| d + k * s)
    }

    /// `self = f(src)` elementwise.
    pub fn map_from<'s>(&mut self, src: impl Into<TensorView<'s>>, f: impl Fn(f64) -> f64) -> &mut Self {
        self.zip_with("map", src, |_, s| f(s))
    }

    /// `self = a · b`, overwriting the previous contents.
    pub fn matmul<'x, 'y>(&mut self, a: impl Into<TensorView<'x>>, b: impl Into<TensorView<'y>>) -> &mut Self {
        let (a, b) = (a.into(), b.into());
        assert_matmul_shapes("matmul", self.layout, a.layout, b.layout);
        self.update(|i, j, _| dot(a, b, i, j));
        self
    }

    /// `self += a · b`.
    pub fn matmul_accumulate<'x, 'y>(&mut self, a: impl Into<TensorView<'x>>, b: impl Into<TensorView<'y>>) -> &mut Self {
        let (a, b) = (a.into(), b.into());
        assert_matmul_shapes("matmul_accumulate", self.layout, a.layout, b.layout);
        self.update(|i, j, d| d + dot(a, b, i, j));
        self
    }
}

fn dot(a: TensorView<'_>, b: TensorView<'_>, i: usize, j: usize) -> f64 {
    let mut sum = 0.0;
    for k in 0..a.cols() {
        sum += a.data[a.layout.index(i, k)] * b.data[b.layout.index(k, j)];
    }
    sum
}

impl fmt::Debug for TensorViewMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.as_view(), f)
    }
}

#[cfg(test)]
mod tests {
    use crate::math::tensor::Tensor;

    fn seq(rows: usize, cols: usize) -> Tensor {
        Tensor::from_vec(rows, cols, (0..rows * cols).map(|v| v as f64).collect()).unwrap()
    }

    #[test]
    fn writes_through_a_view_reach_the_owner() {
        let mut t = Tensor::zeros(3, 2);
        t.view_mut().col(1).fill(7.0);
        assert_eq!(t.to_vec(), vec![0.0, 7.0, 0.0, 7.0, 0.0, 7.0]);
        t.view_mut().transpose().row(0).fill(1.0);
        assert_eq!(t.to_vec(), vec![1.0, 7.0, 1.0, 7.0, 1.0, 7.0]);
    }

    #[test]
    fn identity_product_is_a_no_op() {
        let a = seq(3, 4);
        let mut eye = Tensor::zeros(3, 3);
        for i in 0..3 {
            eye.set(i, i, 1.0);
        }
        let mut dst = Tensor::random(3, 4);
        dst.matmul(&eye, &a);
        assert_eq!(dst, a);
    }

    #[test]
    fn double_transpose_restores_values() {
        let a = seq(2, 5);
        assert_eq!(a.transpose().transpose(), a.view());
        assert_eq!(a.transpose().get(4, 1), a.get(1, 4));
    }

    #[test]
    fn matmul_through_transposed_operands() {
        let a = seq(2, 3);
        let mut dst = Tensor::zeros(2, 2);
        dst.matmul(&a, a.transpose());
        assert_eq!(dst.to_vec(), vec![5.0, 14.0, 14.0, 50.0]);
        dst.matmul_accumulate(&a, a.transpose());
        assert_eq!(dst.to_vec(), vec![10.0, 28.0, 28.0, 100.0]);
    }

    #[test]
    fn elementwise_ops_mutate_destination() {
        let mut a = seq(2, 2);
        let b = seq(2, 2);
        a.add_assign(&b);
        assert_eq!(a.to_vec(), vec![0.0, 2.0, 4.0, 6.0]);
        a.hadamard_assign(&b).scale(0.5);
        assert_eq!(a.to_vec(), vec![0.0, 1.0, 4.0, 9.0]);
        a.sub_assign(&b);
        assert_eq!(a.to_vec(), vec![0.0, 0.0, 2.0, 6.0]);
        assert_eq!(a.view().sum(), 8.0);
    }

    #[test]
    #[should_panic(expected = "shape mismatch")]
    fn mismatched_add_panics() {
        let mut a = Tensor::zeros(2, 2);
        a.add_assign(&Tensor::zeros(2, 3));
    }

    #[test]
    #[should_panic(expected = "cannot multiply")]
    fn mismatched_matmul_panics() {
        let mut dst = Tensor::zeros(2, 2);
        dst.matmul(&Tensor::zeros(2, 3), &Tensor::zeros(2, 2));
    }

    #[test]
    fn argmax_prefers_first_maximum() {
        let t = Tensor::from_vec(3, 1, vec![0.1, 0.9, 0.3]).unwrap();
        assert_eq!(t.view().argmax_in_column(), 1);
        let tie = Tensor::from_vec(2, 1, vec![0.5, 0.5]).unwrap();
        assert_eq!(tie.view().argmax_in_column(), 0);
    }

    #[test]
    fn column_prefix_and_suffix_split_rows() {
        let t = seq(2, 4);
        let x = t.view().column_prefix(3);
        let y = t.view().column_suffix(3);
        assert_eq!(x.to_vec(), vec![0.0, 1.0, 2.0, 4.0, 5.0, 6.0]);
        assert_eq!(y.to_vec(), vec![3.0, 7.0]);
        assert_eq!(y.shape(), (2, 1));
    }
}
