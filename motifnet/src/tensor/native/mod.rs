#[cfg(feature = "approx")]
mod approx;
mod debug;
pub mod owned;
