//! Parallel error-surface search over single-divider partitions.
//!
//! Candidate `(i, j)` of an `R x R` surface places one horizontal divider at
//! `(i + 1) / R * 100` and one vertical divider at `(j + 1) / R * 100`,
//! giving a 2x2 partition regardless of the live grid's shape. Its value is
//! the squared error of the post-stratified mean against the frozen ground
//! truth, or `None` when any of the four cells holds fewer than 2 samples.
//!
//! Rows are split into contiguous ranges, one per worker. Workers share only
//! immutable inputs and hand back owned `RowBlock`s over a channel; the
//! coordinator places each block by its start row, in whatever order blocks
//! arrive.
//!
//! Recovery policy: if any worker fails (error or panic), the remaining
//! workers are told to stop, every outcome is drained, the partial results
//! are thrown away and the whole surface is recomputed on the calling thread.
//! This redoes work that already succeeded, in exchange for never mixing
//! parallel and sequential output. A worker that hangs is not recovered.

use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::stratify::grid::locate_band;
use crate::stratify::sampler::Observation;
use crate::stratify::stats::post_stratified_sum;

/// Upper bound on parallel workers.
pub const MAX_WORKERS: usize = 24;

/// Minimum samples per candidate cell for the candidate to be scored.
pub const MIN_CELL_SAMPLES: usize = 2;

/// Divider percentages `(horizontal, vertical)` for candidate `(i, j)`.
#[inline]
pub fn candidate_dividers(i: usize, j: usize, resolution: usize) -> (f64, f64) {
    let r = resolution as f64;
    ((i + 1) as f64 / r * 100.0, (j + 1) as f64 / r * 100.0)
}

/// Squared error of the post-stratified mean for one 2x2 candidate partition.
///
/// `None` if any candidate cell has fewer than [`MIN_CELL_SAMPLES`] samples.
pub fn candidate_error(
    samples: &[Observation],
    ground_truth: f64,
    horizontal: f64,
    vertical: f64,
) -> Option<f64> {
    let ys = [0.0, horizontal / 100.0, 1.0];
    let xs = [0.0, vertical / 100.0, 1.0];

    let mut counts = [0usize; 4];
    let mut sums = [0.0f64; 4];
    for s in samples {
        let idx = locate_band(&ys, s.y) * 2 + locate_band(&xs, s.x);
        counts[idx] += 1;
        sums[idx] += s.value;
    }
    if counts.iter().any(|&n| n < MIN_CELL_SAMPLES) {
        return None;
    }

    let estimate = post_stratified_sum((0..4).map(|idx| {
        let (r, c) = (idx / 2, idx % 2);
        let area = (ys[r + 1] - ys[r]) * (xs[c + 1] - xs[c]);
        (area, counts[idx], sums[idx])
    }));
    Some((estimate - ground_truth).powi(2))
}

/// Immutable inputs shared by every worker of one computation.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceJob<'a> {
    pub samples: &'a [Observation],
    pub ground_truth: f64,
    pub resolution: usize,
}

/// Result of one worker: a contiguous range of surface rows.
#[derive(Clone, Debug, PartialEq)]
pub struct RowBlock {
    pub start_row: usize,
    /// Row-major, `row_count * resolution` entries.
    pub cells: Vec<Option<f64>>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl RowBlock {
    pub fn row_count(&self, resolution: usize) -> usize {
        self.cells.len() / resolution.max(1)
    }

    pub fn row_range(&self, resolution: usize) -> Range<usize> {
        self.start_row..self.start_row + self.row_count(resolution)
    }
}

fn fold_min(acc: Option<f64>, v: f64) -> Option<f64> {
    Some(acc.map_or(v, |m| m.min(v)))
}

fn fold_max(acc: Option<f64>, v: f64) -> Option<f64> {
    Some(acc.map_or(v, |m| m.max(v)))
}

/// Evaluate rows `rows` of the surface. Checks `cancel` before each row.
pub fn evaluate_rows(
    job: &SurfaceJob<'_>,
    rows: Range<usize>,
    cancel: &AtomicBool,
) -> Result<RowBlock> {
    let resolution = job.resolution;
    let mut cells = Vec::with_capacity(rows.len() * resolution);
    let mut min = None;
    let mut max = None;

    for i in rows.clone() {
        if cancel.load(Ordering::Relaxed) {
            return Err(Error::Cancelled);
        }
        for j in 0..resolution {
            let (h, v) = candidate_dividers(i, j, resolution);
            let error = candidate_error(job.samples, job.ground_truth, h, v);
            if let Some(e) = error {
                min = fold_min(min, e);
                max = fold_max(max, e);
            }
            cells.push(error);
        }
    }

    Ok(RowBlock {
        start_row: rows.start,
        cells,
        min,
        max,
    })
}

/// Computes a range of surface rows. The seam the engine schedules work through.
pub trait RowWorker: Sync {
    fn evaluate(
        &self,
        job: &SurfaceJob<'_>,
        rows: Range<usize>,
        cancel: &AtomicBool,
    ) -> Result<RowBlock>;
}

/// The standard worker: post-stratification error per candidate.
#[derive(Clone, Copy, Debug, Default)]
pub struct PostStratWorker;

impl RowWorker for PostStratWorker {
    fn evaluate(
        &self,
        job: &SurfaceJob<'_>,
        rows: Range<usize>,
        cancel: &AtomicBool,
    ) -> Result<RowBlock> {
        evaluate_rows(job, rows, cancel)
    }
}

/// Split `resolution` rows into at most `workers` contiguous ranges of
/// `ceil(resolution / workers)` rows.
pub fn partition_rows(resolution: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.clamp(1, resolution.max(1));
    let per_worker = resolution.div_ceil(workers);
    (0..workers)
        .map(|w| w * per_worker..((w + 1) * per_worker).min(resolution))
        .filter(|r| !r.is_empty())
        .collect()
}

/// Coordinator-side buffer that places blocks by row offset.
#[derive(Debug)]
pub struct SurfaceAssembler {
    resolution: usize,
    cells: Vec<Option<f64>>,
    filled: Vec<bool>,
    min: Option<f64>,
    max: Option<f64>,
}

impl SurfaceAssembler {
    pub fn new(resolution: usize) -> Self {
        SurfaceAssembler {
            resolution,
            cells: vec![None; resolution * resolution],
            filled: vec![false; resolution],
            min: None,
            max: None,
        }
    }

    /// Place a block at its start row and fold its min/max into the running totals.
    /// Blocks that do not fit the surface are dropped and reported as `false`.
    pub fn accept(&mut self, block: RowBlock) -> bool {
        let r = self.resolution;
        if r == 0 || block.cells.len() % r != 0 {
            return false;
        }
        let range = block.row_range(r);
        if range.end > r {
            return false;
        }

        let offset = range.start * r;
        self.cells[offset..offset + block.cells.len()].copy_from_slice(&block.cells);
        for row in range {
            self.filled[row] = true;
        }
        if let Some(m) = block.min {
            self.min = fold_min(self.min, m);
        }
        if let Some(m) = block.max {
            self.max = fold_max(self.max, m);
        }
        true
    }

    pub fn missing_rows(&self) -> usize {
        self.filled.iter().filter(|f| !**f).count()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_rows() == 0
    }

    pub fn finish(self, baseline_mse: f64) -> Result<ErrorSurface> {
        let missing_rows = self.missing_rows();
        if missing_rows > 0 {
            return Err(Error::IncompleteSurface { missing_rows });
        }
        Ok(ErrorSurface {
            resolution: self.resolution,
            cells: self.cells,
            min: self.min,
            max: self.max,
            baseline_mse,
        })
    }
}

/// Best-scoring candidate partition of a surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceCandidate {
    pub row: usize,
    pub col: usize,
    pub horizontal_divider: f64,
    pub vertical_divider: f64,
    pub mse: f64,
}

/// `R x R` matrix of candidate errors, row `i` = horizontal divider index.
#[derive(Clone, Debug, PartialEq)]
pub struct ErrorSurface {
    resolution: usize,
    cells: Vec<Option<f64>>,
    min: Option<f64>,
    max: Option<f64>,
    baseline_mse: f64,
}

impl ErrorSurface {
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i >= self.resolution || j >= self.resolution {
            return None;
        }
        self.cells[i * self.resolution + j]
    }

    /// Row `i`, or `None` past the last row.
    pub fn row(&self, i: usize) -> Option<&[Option<f64>]> {
        if i >= self.resolution {
            return None;
        }
        Some(&self.cells[i * self.resolution..(i + 1) * self.resolution])
    }

    /// All cells, row-major.
    pub fn cells(&self) -> &[Option<f64>] {
        &self.cells
    }

    /// Smallest non-null error.
    pub fn min(&self) -> Option<f64> {
        self.min
    }

    /// Largest non-null error.
    pub fn max(&self) -> Option<f64> {
        self.max
    }

    /// Squared error of the plain sample mean, kept for the renderer's normalization.
    pub fn baseline_mse(&self) -> f64 {
        self.baseline_mse
    }

    /// Candidate with the smallest error (first in row-major order on ties).
    /// Scoring only; nothing is applied to any grid.
    pub fn best_candidate(&self) -> Option<SurfaceCandidate> {
        let mut best: Option<SurfaceCandidate> = None;
        for (idx, cell) in self.cells.iter().enumerate() {
            let Some(mse) = *cell else { continue };
            if best.map_or(true, |b| mse < b.mse) {
                let (row, col) = (idx / self.resolution, idx % self.resolution);
                let (h, v) = candidate_dividers(row, col, self.resolution);
                best = Some(SurfaceCandidate {
                    row,
                    col,
                    horizontal_divider: h,
                    vertical_divider: v,
                    mse,
                });
            }
        }
        best
    }
}

fn check_preconditions(
    samples: &[Observation],
    ground_truth: Option<f64>,
    resolution: usize,
) -> Result<f64> {
    if resolution < 1 {
        return Err(Error::InvalidResolution(resolution));
    }
    if samples.is_empty() {
        return Err(Error::EmptySamples);
    }
    ground_truth.ok_or(Error::MissingGroundTruth)
}

/// Single-threaded surface computation. Also the fallback path of the engine.
pub fn compute_sequential(
    samples: &[Observation],
    ground_truth: Option<f64>,
    baseline_mse: f64,
    resolution: usize,
) -> Result<ErrorSurface> {
    let truth = check_preconditions(samples, ground_truth, resolution)?;
    let job = SurfaceJob {
        samples,
        ground_truth: truth,
        resolution,
    };
    sequential(&job, baseline_mse)
}

fn sequential(job: &SurfaceJob<'_>, baseline_mse: f64) -> Result<ErrorSurface> {
    let never = AtomicBool::new(false);
    let block = evaluate_rows(job, 0..job.resolution, &never)?;
    let mut assembler = SurfaceAssembler::new(job.resolution);
    assembler.accept(block);
    assembler.finish(baseline_mse)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

/// Owns the worker pool. Build once, reuse for every surface.
pub struct SurfaceEngine {
    pool: rayon::ThreadPool,
    threads: usize,
}

impl SurfaceEngine {
    /// Engine with `min(available_parallelism, max_workers, MAX_WORKERS)` threads (at least 1).
    pub fn new(max_workers: usize) -> Result<Self> {
        let available = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        let threads = available.min(max_workers).clamp(1, MAX_WORKERS);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("surface-worker-{}", i))
            .build()?;
        Ok(SurfaceEngine { pool, threads })
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Workers used for a surface of `resolution` rows.
    pub fn worker_count(&self, resolution: usize) -> usize {
        self.threads.min(resolution).max(1)
    }

    /// Compute the surface with the standard worker.
    ///
    /// Fails fast on `resolution < 1`, empty `samples` or missing `ground_truth`.
    pub fn compute(
        &self,
        samples: &[Observation],
        ground_truth: Option<f64>,
        baseline_mse: f64,
        resolution: usize,
    ) -> Result<ErrorSurface> {
        self.compute_with(&PostStratWorker, samples, ground_truth, baseline_mse, resolution)
    }

    /// Compute the surface, scheduling row ranges through `worker`.
    ///
    /// The sequential fallback always uses the standard evaluation, not `worker`.
    pub fn compute_with<W: RowWorker>(
        &self,
        worker: &W,
        samples: &[Observation],
        ground_truth: Option<f64>,
        baseline_mse: f64,
        resolution: usize,
    ) -> Result<ErrorSurface> {
        let truth = check_preconditions(samples, ground_truth, resolution)?;
        let job = SurfaceJob {
            samples,
            ground_truth: truth,
            resolution,
        };
        let ranges = partition_rows(resolution, self.worker_count(resolution));
        let total = ranges.len();
        let start = Instant::now();

        debug!(
            workers = total,
            resolution,
            points = resolution * resolution,
            "starting error surface"
        );

        let cancel = AtomicBool::new(false);
        let mut assembler = SurfaceAssembler::new(resolution);
        let mut failures = 0usize;
        let (tx, rx) = mpsc::channel::<(usize, Result<RowBlock>)>();

        self.pool.in_place_scope(|scope| {
            for (worker_idx, rows) in ranges.into_iter().enumerate() {
                let tx = tx.clone();
                let job = &job;
                let cancel = &cancel;
                scope.spawn(move |_| {
                    let outcome =
                        panic::catch_unwind(AssertUnwindSafe(|| worker.evaluate(job, rows, cancel)))
                            .unwrap_or_else(|payload| {
                                Err(Error::WorkerFailed {
                                    worker: worker_idx,
                                    reason: panic_message(payload.as_ref()),
                                })
                            });
                    if outcome.is_err() {
                        cancel.store(true, Ordering::Relaxed);
                    }
                    // Receiver outlives the scope; a send error cannot happen here.
                    let _ = tx.send((worker_idx, outcome));
                });
            }
            drop(tx);

            let mut completed = 0usize;
            for (worker_idx, outcome) in rx.iter() {
                completed += 1;
                match outcome {
                    Ok(block) => {
                        if failures == 0 && !assembler.accept(block) {
                            failures += 1;
                            warn!(worker = worker_idx, "surface worker returned a malformed block");
                        }
                        debug!(worker = worker_idx, completed, total, "surface worker completed");
                    }
                    Err(err) => {
                        failures += 1;
                        warn!(worker = worker_idx, error = %err, "surface worker failed");
                    }
                }
            }
        });

        let surface = if failures > 0 {
            warn!(
                failures,
                total, "falling back to single-threaded error surface"
            );
            sequential(&job, baseline_mse)?
        } else {
            assembler.finish(baseline_mse)?
        };

        info!(
            resolution,
            workers = total,
            fallback = failures > 0,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "error surface computed"
        );
        Ok(surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(x: f64, y: f64, value: f64) -> Observation {
        Observation { x, y, value }
    }

    /// Deterministic scatter with a left/right value split.
    fn scatter(n: usize) -> Vec<Observation> {
        let mut state = 12345u32;
        (0..n)
            .map(|_| {
                state = state.wrapping_mul(1103515245).wrapping_add(12345);
                let x = (state >> 8) as f64 / (1u32 << 24) as f64;
                state = state.wrapping_mul(1103515245).wrapping_add(12345);
                let y = (state >> 8) as f64 / (1u32 << 24) as f64;
                let base = if x < 0.5 { 1.0 } else { 3.0 };
                obs(x, y, base + y)
            })
            .collect()
    }

    struct FailingWorker;

    impl RowWorker for FailingWorker {
        fn evaluate(
            &self,
            _job: &SurfaceJob<'_>,
            rows: Range<usize>,
            _cancel: &AtomicBool,
        ) -> Result<RowBlock> {
            Err(Error::WorkerFailed {
                worker: rows.start,
                reason: "injected".to_string(),
            })
        }
    }

    struct PanickyWorker {
        bad_row: usize,
    }

    impl RowWorker for PanickyWorker {
        fn evaluate(
            &self,
            job: &SurfaceJob<'_>,
            rows: Range<usize>,
            cancel: &AtomicBool,
        ) -> Result<RowBlock> {
            if rows.contains(&self.bad_row) {
                panic!("row {} exploded", self.bad_row);
            }
            evaluate_rows(job, rows, cancel)
        }
    }

    #[test]
    fn test_partition_rows() {
        assert_eq!(partition_rows(10, 3), vec![0..4, 4..8, 8..10]);
        assert_eq!(partition_rows(4, 8), vec![0..1, 1..2, 2..3, 3..4]);
        assert_eq!(partition_rows(7, 1), vec![0..7]);
        // ceil split can leave trailing workers idle
        assert_eq!(partition_rows(9, 4), vec![0..3, 3..6, 6..9]);
        let covered: usize = partition_rows(1000, 24).iter().map(|r| r.len()).sum();
        assert_eq!(covered, 1000);
    }

    #[test]
    fn test_candidate_error_known_value() {
        // two samples per quadrant, divider at 50/50
        let samples = vec![
            obs(0.1, 0.1, 1.0),
            obs(0.2, 0.2, 3.0),
            obs(0.7, 0.1, 2.0),
            obs(0.8, 0.2, 2.0),
            obs(0.1, 0.7, 3.0),
            obs(0.2, 0.8, 3.0),
            obs(0.7, 0.7, 4.0),
            obs(0.8, 0.8, 4.0),
        ];
        // estimate = 0.25 * (2 + 2 + 3 + 4) = 2.75
        let e = candidate_error(&samples, 2.5, 50.0, 50.0).unwrap();
        assert!((e - 0.0625).abs() < 1e-12);
        // move the vertical divider left of every sample: left column is empty
        assert_eq!(candidate_error(&samples, 2.5, 50.0, 5.0), None);
    }

    #[test]
    fn test_null_cells_excluded_from_min_max() {
        // two samples in the top-left: every candidate leaves some quadrant short
        let samples = vec![obs(0.1, 0.1, 1.0), obs(0.2, 0.2, 2.0)];
        let surface = compute_sequential(&samples, Some(1.5), 0.0, 10).unwrap();
        assert!(surface.cells().iter().all(|c| c.is_none()));
        assert_eq!(surface.min(), None);
        assert_eq!(surface.max(), None);
        assert_eq!(surface.best_candidate(), None);
    }

    #[test]
    fn test_last_row_and_column_are_null() {
        // the divider at 100 leaves an empty band
        let samples = scatter(400);
        let surface = compute_sequential(&samples, Some(2.5), 1.0, 8).unwrap();
        for k in 0..8 {
            assert_eq!(surface.get(7, k), None);
            assert_eq!(surface.get(k, 7), None);
        }
        assert!(surface.get(3, 3).is_some());
        assert_eq!(surface.row(3).unwrap()[3], surface.get(3, 3));
        assert_eq!(surface.row(7).unwrap().len(), 8);
        assert_eq!(surface.row(8), None);
        assert_eq!(surface.get(8, 0), None);
        let min = surface.min().unwrap();
        let max = surface.max().unwrap();
        for cell in surface.cells().iter().flatten() {
            assert!(*cell >= min && *cell <= max);
        }
    }

    #[test]
    fn test_preconditions() {
        let engine = SurfaceEngine::new(2).unwrap();
        let samples = scatter(10);
        assert!(matches!(
            engine.compute(&[], Some(1.0), 0.0, 10),
            Err(Error::EmptySamples)
        ));
        assert!(matches!(
            engine.compute(&samples, None, 0.0, 10),
            Err(Error::MissingGroundTruth)
        ));
        assert!(matches!(
            engine.compute(&samples, Some(1.0), 0.0, 0),
            Err(Error::InvalidResolution(0))
        ));
        assert!(matches!(
            compute_sequential(&[], Some(1.0), 0.0, 10),
            Err(Error::EmptySamples)
        ));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let samples = scatter(300);
        let engine = SurfaceEngine::new(4).unwrap();
        let parallel = engine.compute(&samples, Some(2.5), 0.3, 37).unwrap();
        let sequential = compute_sequential(&samples, Some(2.5), 0.3, 37).unwrap();
        assert_eq!(parallel, sequential);
        assert_eq!(parallel.baseline_mse(), 0.3);
    }

    #[test]
    fn test_all_workers_fail_falls_back() {
        let samples = scatter(300);
        let engine = SurfaceEngine::new(4).unwrap();
        let recovered = engine
            .compute_with(&FailingWorker, &samples, Some(2.5), 0.0, 20)
            .unwrap();
        let direct = compute_sequential(&samples, Some(2.5), 0.0, 20).unwrap();
        assert_eq!(recovered, direct);
    }

    #[test]
    fn test_one_worker_panics_falls_back() {
        let samples = scatter(300);
        let engine = SurfaceEngine::new(4).unwrap();
        let recovered = engine
            .compute_with(&PanickyWorker { bad_row: 0 }, &samples, Some(2.5), 0.0, 16)
            .unwrap();
        let direct = compute_sequential(&samples, Some(2.5), 0.0, 16).unwrap();
        assert_eq!(recovered, direct);
    }

    #[test]
    fn test_reassembly_order_independent() {
        let samples = scatter(200);
        let job = SurfaceJob {
            samples: &samples,
            ground_truth: 2.5,
            resolution: 24,
        };
        let never = AtomicBool::new(false);
        let blocks: Vec<RowBlock> = partition_rows(24, 5)
            .into_iter()
            .map(|rows| evaluate_rows(&job, rows, &never).unwrap())
            .collect();

        let mut in_order = SurfaceAssembler::new(24);
        for b in blocks.iter().cloned() {
            assert!(in_order.accept(b));
        }

        let mut reversed = SurfaceAssembler::new(24);
        for b in blocks.iter().rev().cloned() {
            assert!(!reversed.is_complete());
            assert!(reversed.accept(b));
        }

        let mut shuffled = SurfaceAssembler::new(24);
        for idx in [2, 4, 0, 3, 1] {
            shuffled.accept(blocks[idx].clone());
        }

        let expected = in_order.finish(0.0).unwrap();
        assert_eq!(reversed.finish(0.0).unwrap(), expected);
        assert_eq!(shuffled.finish(0.0).unwrap(), expected);
    }

    #[test]
    fn test_incomplete_assembly_is_an_error() {
        let samples = scatter(50);
        let job = SurfaceJob {
            samples: &samples,
            ground_truth: 2.5,
            resolution: 6,
        };
        let never = AtomicBool::new(false);
        let mut assembler = SurfaceAssembler::new(6);
        assembler.accept(evaluate_rows(&job, 0..3, &never).unwrap());
        assert!(matches!(
            assembler.finish(0.0),
            Err(Error::IncompleteSurface { missing_rows: 3 })
        ));

        // block that overruns the surface is refused
        let mut assembler = SurfaceAssembler::new(6);
        let mut block = evaluate_rows(&job, 4..6, &never).unwrap();
        block.start_row = 5;
        assert!(!assembler.accept(block));
    }

    #[test]
    fn test_cancelled_worker_stops() {
        let samples = scatter(20);
        let job = SurfaceJob {
            samples: &samples,
            ground_truth: 2.5,
            resolution: 4,
        };
        let cancel = AtomicBool::new(true);
        assert!(matches!(
            evaluate_rows(&job, 0..4, &cancel),
            Err(Error::Cancelled)
        ));
    }

    #[test]
    fn test_best_candidate_is_min() {
        let samples = scatter(500);
        let surface = compute_sequential(&samples, Some(2.5), 0.0, 20).unwrap();
        let best = surface.best_candidate().unwrap();
        assert_eq!(Some(best.mse), surface.min());
        assert_eq!(surface.get(best.row, best.col), Some(best.mse));
        let (h, v) = candidate_dividers(best.row, best.col, 20);
        assert_eq!(best.horizontal_divider, h);
        assert_eq!(best.vertical_divider, v);
    }

    #[test]
    fn test_worker_count_bounded_by_resolution() {
        let engine = SurfaceEngine::new(64).unwrap();
        assert!(engine.threads() <= MAX_WORKERS);
        assert_eq!(engine.worker_count(1), 1);
        assert!(engine.worker_count(1000) <= engine.threads());
    }
}
