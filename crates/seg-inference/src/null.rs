//! Random generation primitives behind the null models

use rand::prelude::*;
use rand_distr::{Binomial, Distribution};
use seg_core::{Error, Result, Site};

/// One binomial draw
pub(crate) fn binomial(rng: &mut StdRng, trials: u64, p: f64) -> Result<u64> {
    let dist = Binomial::new(trials, p)
        .map_err(|e| Error::Computation(format!("binomial draw failed: {e}")))?;
    Ok(dist.sample(rng))
}

/// One multinomial draw, composed from conditional binomials
pub(crate) fn multinomial(rng: &mut StdRng, trials: u64, probs: &[f64]) -> Result<Vec<u64>> {
    let mut counts = Vec::with_capacity(probs.len());
    let mut remaining = trials;
    let mut rest: f64 = probs.iter().sum();
    if rest <= 0.0 {
        return Err(Error::Computation(
            "multinomial draw requires a positive probability mass".to_string(),
        ));
    }
    for (k, &p) in probs.iter().enumerate() {
        if k + 1 == probs.len() {
            counts.push(remaining);
            break;
        }
        if remaining == 0 || rest <= 0.0 {
            counts.push(0);
            continue;
        }
        let drawn = binomial(rng, remaining, (p / rest).clamp(0.0, 1.0))?;
        counts.push(drawn);
        remaining -= drawn;
        rest -= p;
    }
    Ok(counts)
}

/// Bootstrap row indices: same sample size, drawn with replacement
pub(crate) fn bootstrap_indices(rng: &mut StdRng, n_units: usize) -> Vec<usize> {
    (0..n_units).map(|_| rng.gen_range(0..n_units)).collect()
}

/// Random reordering of spatial assignments
pub(crate) fn permuted_sites(rng: &mut StdRng, sites: &[Site]) -> Vec<Site> {
    let mut shuffled = sites.to_vec();
    shuffled.shuffle(rng);
    shuffled
}
