use std::fmt::Debug;
use std::ops::Range;
use std::ops::RangeInclusive;

use rand::Rng;
use rand::SeedableRng;

/// Abstraction for randomness, in order to swap out different sources of
/// randomness.
///
/// This is especially useful when testing, to control which values are
/// produced when random draws are required: the [`Random`] trait has a
/// deterministic test implementation which returns a scripted list of values.
pub trait Random: Debug {
    /// Generates a random usize in the provided range with equal probability;
    /// this can be seen as sampling from a uniform distribution in the range
    /// `[range.start, range.end)`.
    fn generate_usize_in_range(&mut self, range: Range<usize>) -> usize;

    /// Generates a random u64 in the provided inclusive range with equal
    /// probability.
    fn generate_u64_in_range(&mut self, range: RangeInclusive<u64>) -> u64;
}

// A blanket implementation for any regular random generator, so that e.g. a
// seeded `SmallRng` can be used wherever an implementation of `Random` is
// expected.
impl<T> Random for T
where
    T: SeedableRng + Rng + Debug,
{
    fn generate_usize_in_range(&mut self, range: Range<usize>) -> usize {
        self.gen_range(range)
    }

    fn generate_u64_in_range(&mut self, range: RangeInclusive<u64>) -> u64 {
        self.gen_range(range)
    }
}
