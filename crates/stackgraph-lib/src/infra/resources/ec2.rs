//! Network boundary and compute instance

use super::owned_refs;
use crate::infra::graph::ResourceRef;
use crate::infra::stack::{Lookup, Stack};
use crate::infra::synth::{SynthContext, Synthesize};
use crate::infra::token::{Attribute, Expr, LogicalId};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::fmt;

const AL2023_AMI_PARAMETER: &str = "/aws/service/ami-amazon-linux-latest/al2023-ami-kernel-default-x86_64";

/// Lookup of an existing VPC, resolved by the engine at deploy time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VpcLookup {
    pub is_default: bool,
}

/// Ids of the looked-up network, all deferred
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    pub vpc_id: Expr,
    pub public_subnet_id: Expr,
}

impl VpcLookup {
    pub fn default_vpc() -> Self {
        Self { is_default: true }
    }

    fn prefix(&self) -> &'static str {
        if self.is_default { "DefaultVpc" } else { "Vpc" }
    }

    /// Register the lookups on the stack
    pub fn resolve(self, stack: &mut Stack) -> Network {
        let label = if self.is_default { "the account's default VPC" } else { "the target VPC" };
        let vpc_id = stack.lookup(Lookup {
            name: format!("{}Id", self.prefix()),
            parameter_type: "AWS::EC2::VPC::Id".to_string(),
            description: format!("Id of {label}"),
            default: None,
        });
        let public_subnet_id = stack.lookup(Lookup {
            name: format!("{}PublicSubnetId", self.prefix()),
            parameter_type: "AWS::EC2::Subnet::Id".to_string(),
            description: format!("Public subnet of {label}"),
            default: None,
        });

        Network {
            vpc_id,
            public_subnet_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Tcp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
        }
    }
}

/// Inclusive port range on one protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Port {
    pub protocol: Protocol,
    pub from: u16,
    pub to: u16,
}

impl Port {
    pub fn tcp(port: u16) -> Self {
        Self {
            protocol: Protocol::Tcp,
            from: port,
            to: port,
        }
    }
}

/// Source address range of an ingress rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    cidr: String,
}

impl Peer {
    pub fn any_ipv4() -> Self {
        Self::ipv4("0.0.0.0/0")
    }

    pub fn ipv4(cidr: impl Into<String>) -> Self {
        Self { cidr: cidr.into() }
    }

    pub fn cidr(&self) -> &str {
        &self.cidr
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngressRule {
    pub peer: Peer,
    pub port: Port,
    pub description: String,
}

/// Network boundary around the instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityGroup {
    pub vpc_id: Expr,
    pub description: String,
    pub allow_all_outbound: bool,
    pub ingress_rules: Vec<IngressRule>,
}

impl SecurityGroup {
    pub fn new(network: &Network, description: impl Into<String>) -> Self {
        Self {
            vpc_id: network.vpc_id.clone(),
            description: description.into(),
            allow_all_outbound: true,
            ingress_rules: Vec::new(),
        }
    }

    pub fn allow_all_outbound(mut self, allow: bool) -> Self {
        self.allow_all_outbound = allow;
        self
    }

    pub fn add_ingress_rule(mut self, peer: Peer, port: Port, description: impl Into<String>) -> Self {
        self.ingress_rules.push(IngressRule {
            peer,
            port,
            description: description.into(),
        });
        self
    }

    pub(crate) fn references(&self) -> Vec<(LogicalId, Option<Attribute>)> {
        owned_refs(&[&self.vpc_id])
    }
}

impl Synthesize for SecurityGroup {
    fn synthesize(&self, ctx: &mut SynthContext<'_>) {
        let ingress: Vec<Value> = self
            .ingress_rules
            .iter()
            .map(|rule| {
                json!({
                    "CidrIp": rule.peer.cidr(),
                    "Description": rule.description,
                    "FromPort": rule.port.from,
                    "IpProtocol": rule.port.protocol.as_str(),
                    "ToPort": rule.port.to,
                })
            })
            .collect();

        let mut properties = json!({
            "GroupDescription": self.description,
            "SecurityGroupIngress": ingress,
            "VpcId": self.vpc_id,
        });
        if self.allow_all_outbound {
            properties["SecurityGroupEgress"] = json!([{
                "CidrIp": "0.0.0.0/0",
                "Description": "Allow all outbound traffic by default",
                "IpProtocol": "-1",
            }]);
        }

        ctx.emit("AWS::EC2::SecurityGroup", properties);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceClass {
    T3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceSize {
    Micro,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceType {
    pub class: InstanceClass,
    pub size: InstanceSize,
}

impl InstanceType {
    pub fn of(class: InstanceClass, size: InstanceSize) -> Self {
        Self { class, size }
    }
}

impl fmt::Display for InstanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let class = match self.class {
            InstanceClass::T3 => "t3",
        };
        let size = match self.size {
            InstanceSize::Micro => "micro",
        };
        write!(f, "{class}.{size}")
    }
}

/// Machine images resolved through public SSM parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineImage {
    LatestAmazonLinux2023,
}

impl MachineImage {
    pub fn resolve(self, stack: &mut Stack) -> Expr {
        match self {
            MachineImage::LatestAmazonLinux2023 => stack.lookup(Lookup {
                name: "LatestAmazonLinux2023AmiId".to_string(),
                parameter_type: "AWS::SSM::Parameter::Value<AWS::EC2::Image::Id>".to_string(),
                description: "Latest Amazon Linux 2023 image".to_string(),
                default: Some(AL2023_AMI_PARAMETER.to_string()),
            }),
        }
    }
}

/// Boot script: shebang line followed by verbatim commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserData {
    shebang: String,
    commands: Vec<String>,
}

impl UserData {
    pub fn for_linux(shebang: impl Into<String>) -> Self {
        Self {
            shebang: shebang.into(),
            commands: Vec::new(),
        }
    }

    pub fn add_commands<C: Into<String>>(mut self, commands: impl IntoIterator<Item = C>) -> Self {
        self.commands.extend(commands.into_iter().map(Into::into));
        self
    }

    pub fn render(&self) -> String {
        std::iter::once(self.shebang.as_str())
            .chain(self.commands.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Compute instance bound to one role, one security group and one subnet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub instance_type: InstanceType,
    pub image_id: Expr,
    pub subnet_id: Expr,
    pub associate_public_ip: bool,
    pub security_group: ResourceRef,
    pub role: ResourceRef,
    pub user_data: UserData,
    pub tags: BTreeMap<String, String>,
}

impl Instance {
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub(crate) fn references(&self) -> Vec<(LogicalId, Option<Attribute>)> {
        let mut refs = vec![
            (self.role.logical_id.clone(), None),
            (self.security_group.logical_id.clone(), Some(Attribute::GroupId)),
        ];
        refs.extend(owned_refs(&[&self.image_id, &self.subnet_id]));
        refs
    }
}

impl Synthesize for Instance {
    fn synthesize(&self, ctx: &mut SynthContext<'_>) {
        let profile_id = ctx.child_id("InstanceProfile");
        ctx.emit_child(
            profile_id.clone(),
            "AWS::IAM::InstanceProfile",
            json!({ "Roles": [self.role.reference()] }),
        );

        let mut tags = self.tags.clone();
        tags.entry("Name".to_string())
            .or_insert_with(|| ctx.construct_path());
        let tags: Vec<Value> = tags
            .iter()
            .map(|(key, value)| json!({ "Key": key, "Value": value }))
            .collect();

        ctx.emit(
            "AWS::EC2::Instance",
            json!({
                "IamInstanceProfile": Expr::Ref(profile_id),
                "ImageId": self.image_id,
                "InstanceType": self.instance_type.to_string(),
                "NetworkInterfaces": [{
                    "AssociatePublicIpAddress": self.associate_public_ip,
                    "DeviceIndex": "0",
                    "GroupSet": [self.security_group.attr(Attribute::GroupId)],
                    "SubnetId": self.subnet_id,
                }],
                "Tags": tags,
                "UserData": Expr::base64(Expr::literal(self.user_data.render())),
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    include!("ec2.test.rs");
}
