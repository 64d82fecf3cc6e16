pub mod riff;

#[cfg(any(test, feature = "test-util"))]
pub mod fixtures;
