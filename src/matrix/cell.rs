//! Matrix cells and matrix metadata kinds.

/// What the cells of a matrix mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MatrixKind {
    /// Integer entity counts.
    ContingencyTable,
    /// Probabilities summing to 1 over the full dimension set.
    GlobalFrequencyTable,
    /// Probabilities conditional on some context outside the matrix.
    LocalFrequencyTable,
}

impl MatrixKind {
    pub fn is_frequency(self) -> bool {
        !matches!(self, MatrixKind::ContingencyTable)
    }

    /// Zero cell of the matching flavour.
    pub fn zero(self) -> Cell {
        self.cell(0.0)
    }

    /// Wraps a raw number into a cell of the matching flavour.
    pub fn cell(self, value: f64) -> Cell {
        match self {
            MatrixKind::ContingencyTable => Cell::Count(to_count(value)),
            _ => Cell::Frequency(value),
        }
    }
}

/// A non-negative count or a frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Cell {
    Count(u64),
    Frequency(f64),
}

impl Cell {
    pub fn value(&self) -> f64 {
        match *self {
            Cell::Count(n) => n as f64,
            Cell::Frequency(x) => x,
        }
    }

    pub fn is_zero(&self) -> bool {
        match *self {
            Cell::Count(n) => n == 0,
            Cell::Frequency(x) => x == 0.0,
        }
    }

    /// Adds `x` in place. Counts round to the nearest integer and floor at 0.
    pub fn add(&mut self, x: f64) {
        match self {
            Cell::Count(n) => *n = to_count(*n as f64 + x),
            Cell::Frequency(f) => *f += x,
        }
    }

    /// Multiplies in place. Counts round to the nearest integer.
    pub fn multiply(&mut self, factor: f64) {
        match self {
            Cell::Count(n) => *n = to_count(*n as f64 * factor),
            Cell::Frequency(f) => *f *= factor,
        }
    }
}

fn to_count(x: f64) -> u64 {
    if x.is_finite() && x > 0.0 {
        x.round() as u64
    } else {
        0
    }
}
