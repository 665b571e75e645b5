//! Sampling, estimation and error-surface search.
//!
//! Everything here is pure computation over owned values. The session state
//! in `state.rs` and the FFI layer in `ffi/` call into these functions.

pub mod distribution;
pub mod grid;
pub mod rng;
pub mod sampler;
pub mod stats;
pub mod surface;
pub mod truth;

pub use distribution::CellDistribution;
pub use grid::{Breakpoints, CellIndex, CellLocator, CellRect, GridConfiguration};
pub use rng::SeededRng;
pub use sampler::{
    generate, generate_with, DistributionParams, Generation, GenerationParams, Observation,
    ValueRange,
};
pub use stats::{aggregate, CellStats, EstimatorErrors, OverallStats, Statistics};
pub use surface::{compute_sequential, ErrorSurface, SurfaceCandidate, SurfaceEngine};
pub use truth::ground_truth;
