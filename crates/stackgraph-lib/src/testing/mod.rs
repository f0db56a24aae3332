//! Test fixtures for stackgraph
//!
//! Isolated working directories with automatic cleanup, pre-populated the
//! way the services stack expects to find them.

pub mod filesystem;

pub use filesystem::TempDirFixture;
