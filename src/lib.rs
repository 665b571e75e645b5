//! Post-stratification grid simulator.
//!
//! Draws noisy samples over the unit square, partitions it into a grid of
//! cells and compares the plain sample mean against the area-weighted
//! post-stratified mean. A parallel search scores every single-divider 2x2
//! partition to show where stratification helps most.
//!
//! The library exposes a C ABI (`ffi`) for a host renderer; the same
//! operations are available from Rust through `state::State`.

pub mod config;
pub mod error;
pub mod ffi;
pub mod state;
pub mod stratify;

pub use config::SimulationConfig;
pub use error::{Axis, Error, Result};
pub use state::State;
pub use stratify::{
    CellDistribution, CellIndex, ErrorSurface, Generation, GenerationParams, GridConfiguration,
    Observation, SeededRng, Statistics, SurfaceEngine,
};
