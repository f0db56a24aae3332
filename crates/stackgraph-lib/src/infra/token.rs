//! Deferred values resolved by the provisioning engine
//!
//! Nothing that only exists after provisioning (a public DNS name, an API
//! endpoint, a role ARN) is ever a concrete string here. Declarations carry
//! [`Expr`] tokens instead, which serialize to CloudFormation intrinsic
//! functions and report which logical ids they point at.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

/// Path components that never contribute to the readable part of an id
const HIDDEN_PATH_COMPONENTS: [&str; 2] = ["Resource", "Default"];

/// Template-level key of a rendered resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LogicalId(String);

impl LogicalId {
    /// Derive a stable id from a construct path: the alphanumeric characters
    /// of the visible components followed by 8 upper-hex digits of the
    /// SHA-256 of the full path.
    pub fn from_path(path: &[&str]) -> Self {
        let readable: String = path
            .iter()
            .filter(|component| !HIDDEN_PATH_COMPONENTS.contains(*component))
            .flat_map(|component| component.chars())
            .filter(char::is_ascii_alphanumeric)
            .collect();

        let digest = Sha256::digest(path.join("/").as_bytes());
        let suffix: String = digest
            .iter()
            .take(4)
            .map(|byte| format!("{byte:02X}"))
            .collect();

        Self(format!("{readable}{suffix}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for LogicalId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Attributes read back from provisioned resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attribute {
    Arn,
    GroupId,
    PublicDnsName,
    PublicIp,
    ApiEndpoint,
}

impl Attribute {
    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Arn => "Arn",
            Attribute::GroupId => "GroupId",
            Attribute::PublicDnsName => "PublicDnsName",
            Attribute::PublicIp => "PublicIp",
            Attribute::ApiEndpoint => "ApiEndpoint",
        }
    }
}

/// Pseudo parameters supplied by the engine for every stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pseudo {
    Partition,
}

impl Pseudo {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pseudo::Partition => "AWS::Partition",
        }
    }
}

/// A value that is either known now or resolved at apply time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Literal(String),
    /// Physical id of a declared resource
    Ref(LogicalId),
    /// Value of a template parameter (lookups)
    Param(String),
    GetAtt(LogicalId, Attribute),
    Pseudo(Pseudo),
    Join(String, Vec<Expr>),
    Base64(Box<Expr>),
}

impl Expr {
    pub fn literal(value: impl Into<String>) -> Self {
        Expr::Literal(value.into())
    }

    /// Concatenate parts, folding adjacent literals together
    pub fn concat(parts: impl IntoIterator<Item = Expr>) -> Self {
        let mut folded: Vec<Expr> = Vec::new();
        for part in parts {
            if let (Some(Expr::Literal(prev)), Expr::Literal(next)) = (folded.last_mut(), &part) {
                prev.push_str(next);
                continue;
            }
            folded.push(part);
        }

        if folded.is_empty() {
            return Expr::Literal(String::new());
        }
        if folded.len() == 1 && matches!(folded[0], Expr::Literal(_)) {
            return folded.remove(0);
        }
        Expr::Join(String::new(), folded)
    }

    pub fn base64(inner: Expr) -> Self {
        Expr::Base64(Box::new(inner))
    }

    /// True when the value is only known after provisioning
    pub fn is_deferred(&self) -> bool {
        !matches!(self, Expr::Literal(_))
    }

    /// Literal text, if the value is already known
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Expr::Literal(value) => Some(value),
            _ => None,
        }
    }

    /// Resource ids this value depends on, in first-seen order
    pub fn resource_refs(&self) -> Vec<(&LogicalId, Option<Attribute>)> {
        let mut refs = Vec::new();
        self.collect_refs(&mut refs);
        refs
    }

    /// Template parameters this value reads
    pub fn param_refs(&self) -> Vec<&str> {
        match self {
            Expr::Param(name) => vec![name.as_str()],
            Expr::Join(_, parts) => parts.iter().flat_map(Expr::param_refs).collect(),
            Expr::Base64(inner) => inner.param_refs(),
            _ => Vec::new(),
        }
    }

    fn collect_refs<'a>(&'a self, refs: &mut Vec<(&'a LogicalId, Option<Attribute>)>) {
        match self {
            Expr::Ref(id) => refs.push((id, None)),
            Expr::GetAtt(id, attribute) => refs.push((id, Some(*attribute))),
            Expr::Join(_, parts) => parts.iter().for_each(|part| part.collect_refs(refs)),
            Expr::Base64(inner) => inner.collect_refs(refs),
            Expr::Literal(_) | Expr::Param(_) | Expr::Pseudo(_) => {}
        }
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Expr::Literal(value.to_string())
    }
}

impl From<String> for Expr {
    fn from(value: String) -> Self {
        Expr::Literal(value)
    }
}

struct GetAttArgs<'a>(&'a LogicalId, Attribute);

impl Serialize for GetAttArgs<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(2))?;
        seq.serialize_element(self.0)?;
        seq.serialize_element(self.1.as_str())?;
        seq.end()
    }
}

struct JoinArgs<'a>(&'a str, &'a [Expr]);

impl Serialize for JoinArgs<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(2))?;
        seq.serialize_element(self.0)?;
        seq.serialize_element(self.1)?;
        seq.end()
    }
}

impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Expr::Literal(value) => serializer.serialize_str(value),
            Expr::Ref(id) => single_key(serializer, "Ref", id),
            Expr::Param(name) => single_key(serializer, "Ref", name),
            Expr::Pseudo(pseudo) => single_key(serializer, "Ref", pseudo.as_str()),
            Expr::GetAtt(id, attribute) => {
                single_key(serializer, "Fn::GetAtt", &GetAttArgs(id, *attribute))
            }
            Expr::Join(separator, parts) => {
                single_key(serializer, "Fn::Join", &JoinArgs(separator, parts))
            }
            Expr::Base64(inner) => single_key(serializer, "Fn::Base64", inner.as_ref()),
        }
    }
}

fn single_key<S: Serializer, V: Serialize + ?Sized>(
    serializer: S,
    key: &str,
    value: &V,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(1))?;
    map.serialize_entry(key, value)?;
    map.end()
}

/// Components of an ARN, formatted with the partition left deferred
#[derive(Debug, Clone)]
pub struct ArnComponents<'a> {
    pub service: &'a str,
    pub region: &'a str,
    pub account: &'a str,
    pub resource: &'a str,
    pub resource_name: Option<&'a str>,
}

impl ArnComponents<'_> {
    pub fn format(&self) -> Expr {
        let mut tail = format!(
            ":{}:{}:{}:{}",
            self.service, self.region, self.account, self.resource
        );
        if let Some(name) = self.resource_name {
            tail.push('/');
            tail.push_str(name.trim_start_matches('/'));
        }
        Expr::concat([
            Expr::literal("arn:"),
            Expr::Pseudo(Pseudo::Partition),
            Expr::literal(tail),
        ])
    }
}

#[cfg(test)]
mod tests {
    include!("token.test.rs");
}
