//! Train/test split compatible with scikit-learn's
//! `train_test_split(..., random_state=seed)`.
//!
//! The permutation is drawn exactly as numpy's legacy `RandomState` does it:
//! MT19937 seeded with `init_genrand(seed)`, a Fisher-Yates shuffle from the
//! last index down, and bounded integers by masked rejection sampling. The
//! first `ceil(test_fraction * n)` permuted indices form the test set.

use crate::config::SplitConfig;
use rand_mt::Mt;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum SplitError {
    #[error("test fraction must be in (0, 1), got {0}")]
    InvalidFraction(f64),

    #[error("with {n_samples} samples and test fraction {test_fraction} the train set would be empty")]
    EmptyTrainSet { n_samples: usize, test_fraction: f64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

pub fn train_test_split(n_samples: usize, config: &SplitConfig) -> Result<TrainTestSplit, SplitError> {
    let fraction = config.test_fraction;
    if !(fraction > 0.0 && fraction < 1.0) {
        return Err(SplitError::InvalidFraction(fraction));
    }

    let n_test = (fraction * n_samples as f64).ceil() as usize;
    let n_train = n_samples - n_test.min(n_samples);
    if n_train == 0 {
        return Err(SplitError::EmptyTrainSet {
            n_samples,
            test_fraction: fraction,
        });
    }

    let mut order = permutation(n_samples, config.seed);
    let train = order.split_off(n_test);
    Ok(TrainTestSplit { train, test: order })
}

/// `numpy.random.RandomState(seed).permutation(n)`.
pub fn permutation(n: usize, seed: u32) -> Vec<usize> {
    let mut rng = Mt::new(seed);
    let mut values: Vec<usize> = (0..n).collect();
    for i in (1..n).rev() {
        let j = bounded(&mut rng, i as u64) as usize;
        values.swap(i, j);
    }
    values
}

/// Uniform integer in `0..=max`.
fn bounded(rng: &mut Mt, max: u64) -> u64 {
    if max == 0 {
        return 0;
    }

    let mut mask = max;
    mask |= mask >> 1;
    mask |= mask >> 2;
    mask |= mask >> 4;
    mask |= mask >> 8;
    mask |= mask >> 16;
    mask |= mask >> 32;

    loop {
        let value = if max <= u32::MAX as u64 {
            (rng.next_u32() as u64) & mask
        } else {
            let hi = rng.next_u32() as u64;
            let lo = rng.next_u32() as u64;
            ((hi << 32) | lo) & mask
        };
        if value <= max {
            return value;
        }
    }
}
