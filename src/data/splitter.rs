// ============================================================
// Layer 4 - Train/Test Splitter
// ============================================================
// Randomly shuffles samples and splits them into two sets:
//   - Training set: what the grid search fits (and cross-validates) on
//   - Test set:     held out, only used for the final report
//
// Size rule: the test set gets ceil(n * test_fraction) samples
// and training gets the rest, so 100 rows at 0.2 → 80 / 20 and
// 101 rows → 80 / 21.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom.
// The caller owns the RNG: pass a seeded one for a reproducible
// split, or a fresh one from entropy otherwise.
//
// Reference: Rust Book §8 (Vectors)
//            rand crate documentation

use rand::seq::SliceRandom;
use rand::Rng;

/// Number of samples the test side receives for `total` samples.
pub fn test_count(total: usize, test_fraction: f64) -> usize {
    let n = ((total as f64) * test_fraction).ceil() as usize;
    n.min(total)
}

/// Randomly shuffle `samples` and split into (train, test).
///
/// # Arguments
/// * `samples`       - All available samples (consumed by this function)
/// * `test_fraction` - Proportion held out for testing, e.g. 0.2 = 20%
/// * `rng`           - Source of randomness for the shuffle
///
/// # Returns
/// A tuple (train_samples, test_samples). Every input sample ends up in
/// exactly one of the two.
pub fn split_train_test<T, R: Rng + ?Sized>(
    mut samples:   Vec<T>,
    test_fraction: f64,
    rng:           &mut R,
) -> (Vec<T>, Vec<T>) {
    samples.shuffle(rng);

    let total = samples.len();
    let n_test = test_count(total, test_fraction);

    // split_off(n) removes elements [n..] from the Vec and returns them
    let train = samples.split_off(n_test);
    let test  = samples;

    tracing::debug!(
        "Dataset split: {} training, {} test",
        train.len(),
        test.len(),
    );

    (train, test)
}
