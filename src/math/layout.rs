/// Maps a logical `(row, col)` position onto a flat buffer.
///
/// Element `(i, j)` lives at `offset + i * row_stride + j * step`. Views,
/// transposes and column slices are all expressed by producing a new
/// `Layout` over the same buffer; no data ever moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub rows: usize,
    pub cols: usize,
    pub row_stride: usize,
    pub step: usize,
    pub offset: usize,
}

impl Layout {
    /// Dense row-major layout starting at the beginning of the buffer.
    pub fn contiguous(rows: usize, cols: usize) -> Layout {
        Layout { rows, cols, row_stride: cols, step: 1, offset: 0 }
    }

    #[inline]
    pub fn index(&self, i: usize, j: usize) -> usize {
        self.offset + i * self.row_stride + j * self.step
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of buffer slots this layout needs to be addressable.
    pub fn extent(&self) -> usize {
        if self.is_empty() {
            self.offset
        } else {
            self.index(self.rows - 1, self.cols - 1) + 1
        }
    }

    /// Swaps the logical axes by exchanging the strides.
    pub fn transpose(&self) -> Layout {
        Layout {
            rows: self.cols,
            cols: self.rows,
            row_stride: self.step,
            step: self.row_stride,
            offset: self.offset,
        }
    }

    pub fn row(&self, i: usize) -> Layout {
        assert!(i < self.rows, "row {i} out of range for {} rows", self.rows);
        Layout { rows: 1, offset: self.index(i, 0), ..*self }
    }

    pub fn col(&self, j: usize) -> Layout {
        assert!(j < self.cols, "column {j} out of range for {} columns", self.cols);
        Layout { cols: 1, offset: self.index(0, j), ..*self }
    }

    /// Rows in `[from, to)`.
    pub fn row_range(&self, from: usize, to: usize) -> Layout {
        assert!(from <= to && to <= self.rows, "row range {from}..{to} out of range for {} rows", self.rows);
        Layout { rows: to - from, offset: self.offset + from * self.row_stride, ..*self }
    }

    /// Columns in `[from, to)`.
    pub fn col_range(&self, from: usize, to: usize) -> Layout {
        assert!(from <= to && to <= self.cols, "column range {from}..{to} out of range for {} columns", self.cols);
        Layout { cols: to - from, offset: self.offset + from * self.step, ..*self }
    }
}
