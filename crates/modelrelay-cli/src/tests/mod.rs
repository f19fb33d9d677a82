//! Crate-level tests that drive the runner end to end.

mod support;
