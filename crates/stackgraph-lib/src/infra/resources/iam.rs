//! Principals, roles and permission statements

use crate::infra::graph::GraphError;
use crate::infra::stack::StackEnvironment;
use crate::infra::token::{ArnComponents, Attribute, Expr, LogicalId, Pseudo};
use serde_json::{Value, json};

const POLICY_VERSION: &str = "2012-10-17";

/// Service allowed to assume a role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicePrincipal(String);

impl ServicePrincipal {
    pub fn new(service: impl Into<String>) -> Self {
        Self(service.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// AWS-managed policy referenced by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedPolicy {
    name: String,
}

impl ManagedPolicy {
    pub fn aws_managed(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arn(&self) -> Expr {
        Expr::concat([
            Expr::literal("arn:"),
            Expr::Pseudo(Pseudo::Partition),
            Expr::literal(format!(":iam::aws:policy/{}", self.name)),
        ])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Allow,
}

impl Effect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Effect::Allow => "Allow",
        }
    }
}

/// Inline permission: effect + actions + resource patterns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyStatement {
    pub effect: Effect,
    pub actions: Vec<String>,
    pub resources: Vec<Expr>,
}

impl PolicyStatement {
    pub fn allow<A: Into<String>>(actions: impl IntoIterator<Item = A>) -> Self {
        Self {
            effect: Effect::Allow,
            actions: actions.into_iter().map(Into::into).collect(),
            resources: Vec::new(),
        }
    }

    pub fn on(mut self, resource: impl Into<Expr>) -> Self {
        self.resources.push(resource.into());
        self
    }

    pub fn to_json(&self) -> Value {
        let action = match self.actions.as_slice() {
            [single] => json!(single),
            many => json!(many),
        };
        let resource = match self.resources.as_slice() {
            [single] => json!(single),
            many => json!(many),
        };
        json!({
            "Action": action,
            "Effect": self.effect.as_str(),
            "Resource": resource,
        })
    }
}

/// Path of a single SSM parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterPath(String);

impl ParameterPath {
    /// Reject anything that could match more than one parameter
    pub fn new(path: impl Into<String>) -> Result<Self, GraphError> {
        let path = path.into();
        let trimmed = path.trim_start_matches('/');
        if trimmed.is_empty() || path.contains('*') || path.contains('?') || path.ends_with('/') {
            return Err(GraphError::WildcardParameterPath { path });
        }
        Ok(Self(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `arn:<partition>:ssm:<region>:<account>:parameter/<path>`
    pub fn arn(&self, environment: &StackEnvironment) -> Expr {
        ArnComponents {
            service: "ssm",
            region: environment.region(),
            account: environment.account(),
            resource: "parameter",
            resource_name: Some(&self.0),
        }
        .format()
    }
}

/// Identity assumed by a service, with managed and inline permissions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub assumed_by: ServicePrincipal,
    pub description: Option<String>,
    pub managed_policies: Vec<ManagedPolicy>,
    pub statements: Vec<PolicyStatement>,
}

impl Role {
    pub fn new(assumed_by: ServicePrincipal) -> Self {
        Self {
            assumed_by,
            description: None,
            managed_policies: Vec::new(),
            statements: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_managed_policy(mut self, policy: ManagedPolicy) -> Self {
        self.managed_policies.push(policy);
        self
    }

    pub fn add_to_policy(mut self, statement: PolicyStatement) -> Self {
        self.statements.push(statement);
        self
    }

    pub(crate) fn references(&self) -> Vec<(LogicalId, Option<Attribute>)> {
        self.statements
            .iter()
            .flat_map(|statement| statement.resources.iter())
            .flat_map(|resource| resource.resource_refs())
            .map(|(id, attribute)| (id.clone(), attribute))
            .collect()
    }

    /// `AWS::IAM::Role` properties, inline statements under one policy
    pub fn properties(&self) -> Value {
        let mut properties = json!({
            "AssumeRolePolicyDocument": {
                "Statement": [{
                    "Action": "sts:AssumeRole",
                    "Effect": "Allow",
                    "Principal": { "Service": self.assumed_by.as_str() },
                }],
                "Version": POLICY_VERSION,
            },
        });

        if let Some(description) = &self.description {
            properties["Description"] = json!(description);
        }
        if !self.managed_policies.is_empty() {
            let arns: Vec<Expr> = self.managed_policies.iter().map(ManagedPolicy::arn).collect();
            properties["ManagedPolicyArns"] = json!(arns);
        }
        if !self.statements.is_empty() {
            let statements: Vec<Value> =
                self.statements.iter().map(PolicyStatement::to_json).collect();
            properties["Policies"] = json!([{
                "PolicyDocument": {
                    "Statement": statements,
                    "Version": POLICY_VERSION,
                },
                "PolicyName": "DefaultPolicy",
            }]);
        }

        properties
    }
}

#[cfg(test)]
mod tests {
    include!("iam.test.rs");
}
