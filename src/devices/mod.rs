//! Device implementations of the hardware boundary traits

#[cfg(any(test, feature = "mock"))]
pub mod mock;
