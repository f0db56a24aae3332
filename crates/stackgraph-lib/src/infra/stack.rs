//! Stack: target environment, resource graph, lookups and outputs

use crate::infra::graph::{GraphError, ResourceGraph, ResourceRef};
use crate::infra::resources::Resource;
use crate::infra::token::Expr;
use crate::primitives::ConfigError;
use std::fmt;

/// Account and region a stack is deployed into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackEnvironment {
    account: String,
    region: String,
}

impl StackEnvironment {
    /// Both values are required; blank counts as missing
    pub fn new(account: impl Into<String>, region: impl Into<String>) -> Result<Self, ConfigError> {
        let account = account.into();
        let region = region.into();
        if account.trim().is_empty() || region.trim().is_empty() {
            return Err(ConfigError::MissingStackEnvironment);
        }
        Ok(Self { account, region })
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

impl fmt::Display for StackEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "aws://{}/{}", self.account, self.region)
    }
}

/// Value looked up by the engine at deploy time (rendered as a parameter)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    pub name: String,
    pub parameter_type: String,
    pub description: String,
    pub default: Option<String>,
}

impl Lookup {
    pub fn value(&self) -> Expr {
        Expr::Param(self.name.clone())
    }
}

/// Value exported from the stack once provisioned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackOutput {
    pub id: String,
    pub value: Expr,
    pub description: String,
}

/// Everything handed to synthesis
#[derive(Debug, Clone)]
pub struct Stack {
    name: String,
    environment: StackEnvironment,
    description: Option<String>,
    graph: ResourceGraph,
    lookups: Vec<Lookup>,
    outputs: Vec<StackOutput>,
}

impl Stack {
    pub fn new(name: impl Into<String>, environment: StackEnvironment) -> Self {
        Self {
            name: name.into(),
            environment,
            description: None,
            graph: ResourceGraph::new(),
            lookups: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn declare(
        &mut self,
        construct_id: &str,
        resource: impl Into<Resource>,
    ) -> Result<ResourceRef, GraphError> {
        self.graph.declare(construct_id, resource)
    }

    /// Register a lookup (once per name) and return its deferred value
    pub fn lookup(&mut self, lookup: Lookup) -> Expr {
        let value = lookup.value();
        if !self.lookups.iter().any(|existing| existing.name == lookup.name) {
            self.lookups.push(lookup);
        }
        value
    }

    pub fn add_output(
        &mut self,
        id: impl Into<String>,
        value: Expr,
        description: impl Into<String>,
    ) {
        self.outputs.push(StackOutput {
            id: id.into(),
            value,
            description: description.into(),
        });
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn environment(&self) -> &StackEnvironment {
        &self.environment
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn graph(&self) -> &ResourceGraph {
        &self.graph
    }

    pub fn lookups(&self) -> &[Lookup] {
        &self.lookups
    }

    pub fn outputs(&self) -> &[StackOutput] {
        &self.outputs
    }
}

#[cfg(test)]
mod tests {
    include!("stack.test.rs");
}
