//! Infrastructure domain
//!
//! Deferred tokens, typed resource declarations, the resource graph, the
//! services stack builder, synthesis and the cloud assembly writer.

pub mod assembly;
pub mod builder;
pub mod graph;
pub mod resources;
pub mod stack;
pub mod synth;
pub mod token;

pub use assembly::{CloudAssembly, WrittenAssembly};
pub use builder::{StartupScript, UserDataError, build_services_stack};
pub use graph::{Declaration, GraphError, Reference, ResourceGraph, ResourceRef};
pub use resources::{Resource, ResourceKind};
pub use stack::{Stack, StackEnvironment};
pub use synth::{SynthError, Template, synthesize};
pub use token::{Attribute, Expr, LogicalId};
