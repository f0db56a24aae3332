//! Synthesis: resource graph -> CloudFormation template
//!
//! Declarations are rendered in dependency order. A declaration may expand
//! into several template resources (an instance and its instance profile, a
//! pipeline and its artifact bucket); children get logical ids derived from
//! the parent's construct path. The rendered template is then checked so
//! that every `Ref` and `Fn::GetAtt` lands on something it defines.

use crate::infra::graph::GraphError;
use crate::infra::stack::{Stack, StackEnvironment};
use crate::infra::token::{Expr, LogicalId};
use serde::Serialize;
use serde_json::Value;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::{debug, trace};

const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

/// Errors raised while rendering or writing a template
#[derive(Debug, Error)]
pub enum SynthError {
    #[error("Resource graph is invalid: {source}")]
    Graph {
        #[from]
        source: GraphError,
    },

    #[error("{location} references '{target}', which the template does not define")]
    UnresolvedReference { location: String, target: String },

    #[error("Failed to serialize template as {format}: {reason}")]
    Serialization { format: String, reason: String },

    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Rendering hook implemented by every declarable resource
pub trait Synthesize {
    fn synthesize(&self, ctx: &mut SynthContext<'_>);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateResource {
    #[serde(rename = "Type")]
    pub resource_type: String,

    #[serde(rename = "Properties")]
    pub properties: Value,

    #[serde(rename = "DependsOn", skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<LogicalId>,

    #[serde(rename = "UpdateReplacePolicy", skip_serializing_if = "Option::is_none")]
    pub update_replace_policy: Option<String>,

    #[serde(rename = "DeletionPolicy", skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<String>,
}

impl TemplateResource {
    /// Keep the physical resource when the stack replaces or deletes it
    pub fn retain(&mut self) -> &mut Self {
        self.update_replace_policy = Some("Retain".to_string());
        self.deletion_policy = Some("Retain".to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateParameter {
    #[serde(rename = "Type")]
    pub parameter_type: String,

    #[serde(rename = "Description")]
    pub description: String,

    #[serde(rename = "Default", skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateOutput {
    #[serde(rename = "Description")]
    pub description: String,

    #[serde(rename = "Value")]
    pub value: Expr,
}

/// A provider-applicable change template
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub format_version: String,

    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "Parameters", skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, TemplateParameter>,

    #[serde(rename = "Resources")]
    pub resources: BTreeMap<LogicalId, TemplateResource>,

    #[serde(rename = "Outputs", skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, TemplateOutput>,
}

impl Template {
    /// Resources of one template type, keyed by logical id
    pub fn resources_of_type<'a>(
        &'a self,
        resource_type: &'a str,
    ) -> impl Iterator<Item = (&'a LogicalId, &'a TemplateResource)> + 'a {
        self.resources
            .iter()
            .filter(move |(_, resource)| resource.resource_type == resource_type)
    }

    pub fn to_json_string(&self) -> Result<String, SynthError> {
        serde_json::to_string_pretty(self).map_err(|e| SynthError::Serialization {
            format: "json".to_string(),
            reason: e.to_string(),
        })
    }

    pub fn to_yaml_string(&self) -> Result<String, SynthError> {
        serde_saphyr::to_string(self).map_err(|e| SynthError::Serialization {
            format: "yaml".to_string(),
            reason: e.to_string(),
        })
    }
}

/// Per-declaration rendering state handed to [`Synthesize`]
pub struct SynthContext<'a> {
    stack_name: &'a str,
    environment: &'a StackEnvironment,
    construct_id: &'a str,
    logical_id: &'a LogicalId,
    depends_on: Vec<LogicalId>,
    resources: &'a mut BTreeMap<LogicalId, TemplateResource>,
}

impl SynthContext<'_> {
    pub fn environment(&self) -> &StackEnvironment {
        self.environment
    }

    pub fn logical_id(&self) -> &LogicalId {
        self.logical_id
    }

    /// `<stack>/<construct>`, used for `Name` tags
    pub fn construct_path(&self) -> String {
        format!("{}/{}", self.stack_name, self.construct_id)
    }

    /// Logical id of a child resource rendered alongside this declaration
    pub fn child_id(&self, child: &str) -> LogicalId {
        LogicalId::from_path(&[self.construct_id, child, "Resource"])
    }

    /// Emit the declaration's primary resource
    pub fn emit(&mut self, resource_type: &str, properties: Value) -> &mut TemplateResource {
        let id = self.logical_id.clone();
        let depends_on = self.depends_on.clone();
        self.insert(id, resource_type, properties, depends_on)
    }

    /// Emit a supporting resource owned by this declaration
    pub fn emit_child(
        &mut self,
        id: LogicalId,
        resource_type: &str,
        properties: Value,
    ) -> &mut TemplateResource {
        self.insert(id, resource_type, properties, Vec::new())
    }

    fn insert(
        &mut self,
        id: LogicalId,
        resource_type: &str,
        properties: Value,
        depends_on: Vec<LogicalId>,
    ) -> &mut TemplateResource {
        trace!(%id, resource_type, "Rendered template resource");
        let resource = TemplateResource {
            resource_type: resource_type.to_string(),
            properties,
            depends_on,
            update_replace_policy: None,
            deletion_policy: None,
        };
        match self.resources.entry(id) {
            Entry::Occupied(mut slot) => {
                slot.insert(resource);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(resource),
        }
    }
}

/// Render a stack into its template
pub fn synthesize(stack: &Stack) -> Result<Template, SynthError> {
    let graph = stack.graph();
    let mut resources = BTreeMap::new();

    for declaration in graph.topological_order()? {
        let depends_on: Vec<LogicalId> = graph
            .dependencies(&declaration.logical_id)
            .unwrap_or_default()
            .into_iter()
            .map(|(dependency, _)| dependency.logical_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut ctx = SynthContext {
            stack_name: stack.name(),
            environment: stack.environment(),
            construct_id: &declaration.construct_id,
            logical_id: &declaration.logical_id,
            depends_on,
            resources: &mut resources,
        };
        declaration.resource.synthesize(&mut ctx);
    }

    let parameters = stack
        .lookups()
        .iter()
        .map(|lookup| {
            (
                lookup.name.clone(),
                TemplateParameter {
                    parameter_type: lookup.parameter_type.clone(),
                    description: lookup.description.clone(),
                    default: lookup.default.clone(),
                },
            )
        })
        .collect();

    let outputs = stack
        .outputs()
        .iter()
        .map(|output| {
            (
                output.id.clone(),
                TemplateOutput {
                    description: output.description.clone(),
                    value: output.value.clone(),
                },
            )
        })
        .collect();

    let template = Template {
        format_version: TEMPLATE_FORMAT_VERSION.to_string(),
        description: stack.description().map(str::to_string),
        parameters,
        resources,
        outputs,
    };

    validate_references(&template)?;

    debug!(
        stack = stack.name(),
        resources = template.resources.len(),
        parameters = template.parameters.len(),
        outputs = template.outputs.len(),
        "Synthesized template"
    );

    Ok(template)
}

/// Every `Ref` / `Fn::GetAtt` must land on a resource, parameter or pseudo parameter
fn validate_references(template: &Template) -> Result<(), SynthError> {
    let known: BTreeSet<&str> = template
        .resources
        .keys()
        .map(LogicalId::as_str)
        .chain(template.parameters.keys().map(String::as_str))
        .collect();

    let check = |location: String, value: &Value| -> Result<(), SynthError> {
        let mut targets = Vec::new();
        collect_targets(value, &mut targets);
        match targets
            .into_iter()
            .find(|target| !target.starts_with("AWS::") && !known.contains(target))
        {
            Some(target) => Err(SynthError::UnresolvedReference {
                location,
                target: target.to_string(),
            }),
            None => Ok(()),
        }
    };

    for (id, resource) in &template.resources {
        check(format!("Resource {id}"), &resource.properties)?;
    }
    for (id, output) in &template.outputs {
        let value = serde_json::to_value(&output.value).map_err(|e| SynthError::Serialization {
            format: "json".to_string(),
            reason: e.to_string(),
        })?;
        check(format!("Output {id}"), &value)?;
    }

    Ok(())
}

fn collect_targets<'v>(value: &'v Value, targets: &mut Vec<&'v str>) {
    match value {
        Value::Object(map) => {
            if map.len() == 1 {
                if let Some(Value::String(target)) = map.get("Ref") {
                    targets.push(target);
                    return;
                }
                if let Some(Value::Array(args)) = map.get("Fn::GetAtt") {
                    if let Some(Value::String(target)) = args.first() {
                        targets.push(target);
                    }
                    return;
                }
            }
            map.values().for_each(|inner| collect_targets(inner, targets));
        }
        Value::Array(items) => items.iter().for_each(|inner| collect_targets(inner, targets)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    include!("synth.test.rs");
}
