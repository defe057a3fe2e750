//! Random session generation for benchmarks and load testing.

pub mod generator;
