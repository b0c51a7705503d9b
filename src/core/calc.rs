//! Integer arithmetic.

/// Adds two integers.
///
/// Returns `None` when the sum does not fit in an `i64`.
#[must_use]
pub const fn add(a: i64, b: i64) -> Option<i64> {
    a.checked_add(b)
}
