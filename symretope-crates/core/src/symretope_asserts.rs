//! Assertions which are grouped by cost; only the cheap ones are checked in release builds.

pub(crate) const SIMPLE: u8 = 1;
pub(crate) const MODERATE: u8 = 2;
pub(crate) const EXTREME: u8 = 3;

#[cfg(all(not(test), not(feature = "debug-checks")))]
pub(crate) const ASSERT_LEVEL: u8 = SIMPLE;

#[cfg(any(test, feature = "debug-checks"))]
pub(crate) const ASSERT_LEVEL: u8 = EXTREME;

#[macro_export]
#[doc(hidden)]
macro_rules! symretope_assert_at_level {
    ($level:ident, $($arg:tt)*) => {
        if $crate::symretope_asserts::ASSERT_LEVEL >= $crate::symretope_asserts::$level {
            assert!($($arg)*);
        }
    };
}

/// Checked in every build.
#[macro_export]
#[doc(hidden)]
macro_rules! symretope_assert_simple {
    ($($arg:tt)*) => {
        $crate::symretope_assert_at_level!(SIMPLE, $($arg)*)
    };
}

/// Checks which are linear in the size of the constraint.
#[macro_export]
#[doc(hidden)]
macro_rules! symretope_assert_moderate {
    ($($arg:tt)*) => {
        $crate::symretope_assert_at_level!(MODERATE, $($arg)*)
    };
}

/// Checks which rescan buffers after every call.
#[macro_export]
#[doc(hidden)]
macro_rules! symretope_assert_extreme {
    ($($arg:tt)*) => {
        $crate::symretope_assert_at_level!(EXTREME, $($arg)*)
    };
}
