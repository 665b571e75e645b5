//! Error type shared by the engine, the session state and the FFI layer.

use thiserror::Error;

/// Crate result type
pub type Result<T> = std::result::Result<T, Error>;

/// Which family of dividers an operation refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Dividers between rows (y positions).
    Horizontal,
    /// Dividers between columns (x positions).
    Vertical,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Horizontal => f.write_str("horizontal"),
            Axis::Vertical => f.write_str("vertical"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("grid must have at least one row and one column, got {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("invalid {axis} dividers: {reason}")]
    InvalidDividers { axis: Axis, reason: String },

    #[error("{axis} divider index {index} out of range ({len} dividers)")]
    DividerIndexOutOfRange { axis: Axis, index: usize, len: usize },

    #[error("cell ({row}, {col}) outside a {rows}x{cols} grid")]
    CellOutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("sample count must be between 1 and 10000, got {0}")]
    InvalidSampleCount(usize),

    #[error("standard deviation must be positive and finite, got {0}")]
    InvalidStdDev(f64),

    #[error("mean for cell ({row}, {col}) must be finite, got {mean}")]
    InvalidMean { row: usize, col: usize, mean: f64 },

    #[error("variance for cell ({row}, {col}) must be positive and finite, got {variance}")]
    InvalidVariance { row: usize, col: usize, variance: f64 },

    #[error("seed {0} is a fixed point of the generator")]
    ZeroSeed(u64),

    #[error("surface resolution must be at least 1, got {0}")]
    InvalidResolution(usize),

    #[error("cannot compute error surface: no samples")]
    EmptySamples,

    #[error("cannot compute error surface: no ground truth available")]
    MissingGroundTruth,

    #[error("worker {worker} failed: {reason}")]
    WorkerFailed { worker: usize, reason: String },

    #[error("surface computation cancelled")]
    Cancelled,

    #[error("error surface incomplete: {missing_rows} rows never arrived")]
    IncompleteSurface { missing_rows: usize },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("configuration I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration format: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    /// Status code reported across the C ABI.
    ///
    /// 0 is reserved for success and 1 for null handles.
    pub fn status_code(&self) -> i32 {
        match self {
            Error::InvalidDimensions { .. }
            | Error::InvalidDividers { .. }
            | Error::DividerIndexOutOfRange { .. }
            | Error::CellOutOfRange { .. }
            | Error::InvalidSampleCount(_)
            | Error::InvalidStdDev(_)
            | Error::InvalidMean { .. }
            | Error::InvalidVariance { .. }
            | Error::ZeroSeed(_)
            | Error::InvalidResolution(_)
            | Error::Config(_) => 2,
            Error::EmptySamples | Error::MissingGroundTruth => 3,
            Error::WorkerFailed { .. }
            | Error::Cancelled
            | Error::IncompleteSurface { .. }
            | Error::ThreadPool(_)
            | Error::Io(_) => 4,
        }
    }
}
