//! Float helpers that `core` does not provide on its own.

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("windowed-list needs either the `std` or the `libm` feature for float math");

#[cfg(feature = "std")]
pub(crate) fn round(v: f64) -> f64 {
    v.round()
}

#[cfg(all(not(feature = "std"), feature = "libm"))]
pub(crate) fn round(v: f64) -> f64 {
    libm::round(v)
}

#[cfg(feature = "std")]
pub(crate) fn abs(v: f64) -> f64 {
    v.abs()
}

#[cfg(all(not(feature = "std"), feature = "libm"))]
pub(crate) fn abs(v: f64) -> f64 {
    libm::fabs(v)
}

/// Maps NaN/infinite values to zero and clamps negatives to zero.
pub(crate) fn non_negative(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 { v } else { 0.0 }
}

/// Maps NaN/infinite values to zero, keeping the sign otherwise.
pub(crate) fn finite(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}
