//! Float helpers that `core` does not provide on its own.

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("windowed-list-driver needs either the `std` or the `libm` feature for float math");

#[cfg(feature = "std")]
pub(crate) fn sin(v: f64) -> f64 {
    v.sin()
}

#[cfg(all(not(feature = "std"), feature = "libm"))]
pub(crate) fn sin(v: f64) -> f64 {
    libm::sin(v)
}

#[cfg(feature = "std")]
pub(crate) fn abs(v: f64) -> f64 {
    v.abs()
}

#[cfg(all(not(feature = "std"), feature = "libm"))]
pub(crate) fn abs(v: f64) -> f64 {
    libm::fabs(v)
}
