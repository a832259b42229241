//! Internal consistency checking. Every invariant check in the solver states
//! how expensive it is; how many of them are compiled in depends on the build.

/// The most thorough tier of internal checking compiled into this build.
/// Plain builds keep only the cheap sanity checks; test builds add the
/// moderately priced ones; the `debug-checks` feature compiles in everything,
/// including checks that slow the solver down by orders of magnitude.
pub const MAX_CHECK_LEVEL: u8 = if cfg!(feature = "debug-checks") {
    EXPENSIVE_CHECKS
} else if cfg!(test) {
    MODERATE_CHECKS
} else {
    SIMPLE_CHECKS
};

pub const SIMPLE_CHECKS: u8 = 1;
pub const MODERATE_CHECKS: u8 = 2;
pub const EXPENSIVE_CHECKS: u8 = 3;

/// Asserts an internal invariant at a stated cost tier: `simple` checks are
/// always active, `moderate` checks run in tests and under `debug-checks`,
/// and `expensive` checks only under `debug-checks`. Checks above
/// [`MAX_CHECK_LEVEL`](crate::asserts::MAX_CHECK_LEVEL) compile down to
/// nothing.
#[macro_export]
#[doc(hidden)]
macro_rules! subgraph_assert {
    (simple, $($check:tt)*) => {
        if $crate::asserts::MAX_CHECK_LEVEL >= $crate::asserts::SIMPLE_CHECKS {
            assert!($($check)*);
        }
    };
    (moderate, $($check:tt)*) => {
        if $crate::asserts::MAX_CHECK_LEVEL >= $crate::asserts::MODERATE_CHECKS {
            assert!($($check)*);
        }
    };
    (expensive, $($check:tt)*) => {
        if $crate::asserts::MAX_CHECK_LEVEL >= $crate::asserts::EXPENSIVE_CHECKS {
            assert!($($check)*);
        }
    };
}
