pub mod fixtures;
pub mod test_env;

// Re-export key testing utilities
pub use fixtures::{AssemblyFixture, resources_of_type};
pub use test_env::TestEnvironment;
