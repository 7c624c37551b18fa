use std::fs::File;
use std::io::{BufRead, BufReader};

use rand::Rng;

use crate::error::{Error, Result};
use crate::math::{Tensor, TensorView};

/// Labeled samples stored one per row: feature columns first, then target
/// columns, contiguous per row.
///
/// The dataset owns its rows. Batches and feature/target splits are
/// `DatasetView`s and `TensorView`s borrowed from it, so the rows cannot be
/// shuffled while any of them is alive.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    rows: Tensor,
}

/// A borrowed run of consecutive rows of a `Dataset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatasetView<'a> {
    rows: TensorView<'a>,
}

impl Dataset {
    pub fn from_tensor(rows: Tensor) -> Dataset {
        Dataset { rows }
    }

    /// Builds a dataset from equal-length rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Dataset> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(Error::Parse {
                    line: i + 1,
                    message: format!("expected {cols} values, got {}", row.len()),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Dataset { rows: Tensor::from_vec(rows.len(), cols, data)? })
    }

    /// Joins separate input and target vectors row by row.
    pub fn from_pairs(inputs: &[Vec<f64>], targets: &[Vec<f64>]) -> Result<Dataset> {
        if inputs.len() != targets.len() {
            return Err(Error::ElementCount { expected: inputs.len(), got: targets.len() });
        }
        let rows: Vec<Vec<f64>> = inputs
            .iter()
            .zip(targets.iter())
            .map(|(x, y)| x.iter().chain(y.iter()).copied().collect())
            .collect();
        Dataset::from_rows(&rows)
    }

    /// Reads a delimited text file; see `read_delimited`.
    pub fn from_csv(path: &str, separator: char) -> Result<Dataset> {
        let file = File::open(path)?;
        let dataset = Dataset::read_delimited(BufReader::new(file), separator)?;
        log::debug!("loaded {} rows x {} columns from {path}", dataset.len(), dataset.cols());
        Ok(dataset)
    }

    /// Parses one record per non-empty line, fields split on `separator`
    /// (any whitespace when `separator` is itself whitespace). Every record
    /// must have as many fields as the first.
    pub fn read_delimited<R: BufRead>(reader: R, separator: char) -> Result<Dataset> {
        let mut rows: Vec<Vec<f64>> = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = if separator.is_whitespace() {
                line.split_whitespace().collect()
            } else {
                line.split(separator).map(str::trim).collect()
            };
            let row = fields
                .iter()
                .map(|f| {
                    f.parse::<f64>().map_err(|_| Error::Parse {
                        line: idx + 1,
                        message: format!("'{f}' is not a number"),
                    })
                })
                .collect::<Result<Vec<f64>>>()?;
            if let Some(first) = rows.first() {
                if first.len() != row.len() {
                    return Err(Error::Parse {
                        line: idx + 1,
                        message: format!("expected {} fields, got {}", first.len(), row.len()),
                    });
                }
            }
            rows.push(row);
        }
        Dataset::from_rows(&rows)
    }

    pub fn len(&self) -> usize {
        self.rows.rows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cols(&self) -> usize {
        self.rows.cols()
    }

    pub fn as_tensor(&self) -> &Tensor {
        &self.rows
    }

    pub fn view(&self) -> DatasetView<'_> {
        DatasetView { rows: self.rows.view() }
    }

    pub fn row(&self, i: usize) -> TensorView<'_> {
        self.rows.row(i)
    }

    pub fn batch(&self, from: usize, to: usize) -> DatasetView<'_> {
        self.view().batch(from, to)
    }

    pub fn batches(&self, size: usize) -> impl Iterator<Item = DatasetView<'_>> + '_ {
        self.view().batches(size)
    }

    pub fn split(&self, k: usize) -> Result<(TensorView<'_>, TensorView<'_>)> {
        self.view().split(k)
    }

    /// Fisher–Yates over whole rows, so each row keeps its features and
    /// targets together.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        let n = self.len();
        for i in 0..n {
            let j = rng.gen_range(i..n);
            self.rows.swap_rows(i, j);
        }
    }
}

impl<'a> DatasetView<'a> {
    pub fn len(&self) -> usize {
        self.rows.rows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cols(&self) -> usize {
        self.rows.cols()
    }

    pub fn as_tensor(&self) -> TensorView<'a> {
        self.rows
    }

    pub fn row(&self, i: usize) -> TensorView<'a> {
        self.rows.row(i)
    }

    /// Rows in `[from, to)`; `to` is clamped to the number of rows.
    pub fn batch(&self, from: usize, to: usize) -> DatasetView<'a> {
        let to = to.min(self.len());
        assert!(from <= to, "batch start {from} is past its end {to}");
        DatasetView { rows: self.rows.rows_range(from, to) }
    }

    /// Consecutive batches of `size` rows; the last one may be shorter.
    pub fn batches(&self, size: usize) -> impl Iterator<Item = DatasetView<'a>> {
        assert!(size > 0, "batch size must be at least 1");
        let view = *self;
        (0..self.len()).step_by(size).map(move |from| view.batch(from, from + size))
    }

    /// Features are columns `[0, k)`, targets columns `[k, cols)`.
    pub fn split(&self, k: usize) -> Result<(TensorView<'a>, TensorView<'a>)> {
        if k == 0 || k >= self.cols() {
            return Err(Error::InvalidConfig(format!(
                "cannot split {} columns into features and targets at {k}",
                self.cols()
            )));
        }
        Ok((self.rows.column_prefix(k), self.rows.column_suffix(k)))
    }

    /// Like `split`, but transposed so each sample is a column: features
    /// come back as (k × n) and targets as ((cols − k) × n).
    pub fn samples(&self, k: usize) -> Result<(TensorView<'a>, TensorView<'a>)> {
        let (x, y) = self.split(k)?;
        Ok((x.transpose(), y.transpose()))
    }
}
