//! Shared simulation loop
//!
//! Every round owns an independent RNG stream derived from the run seed, so
//! the null sample is identical whether rounds execute sequentially or in
//! parallel.

use rand::prelude::*;
use seg_core::{ProgressSink, Result};

/// Run `iterations` independent simulation rounds
///
/// The round function receives its index and a freshly seeded RNG and
/// returns one candidate statistic. Per-round progress reporting happens on
/// the sequential path; the parallel path reports completion once.
pub(crate) fn simulate<F>(
    iterations: usize,
    seed: u64,
    sink: &mut dyn ProgressSink,
    round: F,
) -> Result<Vec<f64>>
where
    F: Fn(usize, &mut StdRng) -> Result<f64> + Send + Sync,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        let estimates = (0..iterations)
            .into_par_iter()
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
                round(i, &mut rng)
            })
            .collect::<Result<Vec<f64>>>()?;
        sink.on_round(iterations, iterations);
        Ok(estimates)
    }

    #[cfg(not(feature = "parallel"))]
    {
        let mut estimates = Vec::with_capacity(iterations);
        for i in 0..iterations {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
            estimates.push(round(i, &mut rng)?);
            sink.on_round(i + 1, iterations);
        }
        Ok(estimates)
    }
}
