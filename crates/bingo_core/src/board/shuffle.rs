//! Unbiased Fisher–Yates shuffle.

use rand::Rng;

/// Shuffles `items` in place.
///
/// Walks `i` from the last index down to 1 and swaps with `j` drawn
/// uniformly from `[0, i]`, so every permutation is equally likely.
pub fn shuffle_in_place<T, R>(items: &mut [T], rng: &mut R)
where
    R: Rng + ?Sized,
{
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// Returns a shuffled copy of `items`, leaving the input untouched.
pub fn shuffle<T, R>(items: &[T], rng: &mut R) -> Vec<T>
where
    T: Clone,
    R: Rng + ?Sized,
{
    let mut shuffled = items.to_vec();
    shuffle_in_place(&mut shuffled, rng);
    shuffled
}
