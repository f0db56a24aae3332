//! HTTP gateway, API key and usage plan

use super::owned_refs;
use crate::infra::graph::ResourceRef;
use crate::infra::synth::{SynthContext, Synthesize};
use crate::infra::token::{Attribute, Expr, LogicalId};
use serde_json::{Value, json};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Any,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Any => "ANY",
            HttpMethod::Post => "POST",
        }
    }

    /// Spelling used inside CORS configuration
    fn cors_str(&self) -> &'static str {
        match self {
            HttpMethod::Any => "*",
            other => other.as_str(),
        }
    }
}

/// Browser preflight policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsPreflight {
    pub allow_headers: Vec<String>,
    pub allow_methods: Vec<HttpMethod>,
    pub allow_origins: Vec<String>,
}

impl CorsPreflight {
    fn to_json(&self) -> Value {
        let methods: Vec<&str> = self.allow_methods.iter().map(HttpMethod::cors_str).collect();
        json!({
            "AllowHeaders": self.allow_headers,
            "AllowMethods": methods,
            "AllowOrigins": self.allow_origins,
        })
    }
}

/// Proxy integration forwarding to a URL known only after provisioning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpUrlIntegration {
    pub id: String,
    pub url: Expr,
    pub method: HttpMethod,
}

impl HttpUrlIntegration {
    pub fn new(id: impl Into<String>, url: Expr, method: HttpMethod) -> Self {
        Self {
            id: id.into(),
            url,
            method,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteKey {
    /// Catch-all `$default`
    Default,
}

impl RouteKey {
    pub fn render(&self) -> String {
        match self {
            RouteKey::Default => "$default".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRoute {
    pub id: String,
    pub key: RouteKey,
    pub integration: HttpUrlIntegration,
}

/// HTTP API with its routes and auto-deployed default stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpGateway {
    pub name: String,
    pub description: Option<String>,
    pub cors: Option<CorsPreflight>,
    pub routes: Vec<HttpRoute>,
}

impl HttpGateway {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            cors: None,
            routes: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_cors(mut self, cors: CorsPreflight) -> Self {
        self.cors = Some(cors);
        self
    }

    pub fn add_route(mut self, id: impl Into<String>, key: RouteKey, integration: HttpUrlIntegration) -> Self {
        self.routes.push(HttpRoute {
            id: id.into(),
            key,
            integration,
        });
        self
    }

    /// The catch-all route, if declared
    pub fn default_route(&self) -> Option<&HttpRoute> {
        self.routes.iter().find(|route| route.key == RouteKey::Default)
    }

    pub(crate) fn references(&self) -> Vec<(LogicalId, Option<Attribute>)> {
        let urls: Vec<&Expr> = self.routes.iter().map(|route| &route.integration.url).collect();
        owned_refs(&urls)
    }
}

impl Synthesize for HttpGateway {
    fn synthesize(&self, ctx: &mut SynthContext<'_>) {
        let api_id = ctx.logical_id().clone();

        let mut properties = json!({
            "Name": self.name,
            "ProtocolType": "HTTP",
        });
        if let Some(description) = &self.description {
            properties["Description"] = json!(description);
        }
        if let Some(cors) = &self.cors {
            properties["CorsConfiguration"] = cors.to_json();
        }
        ctx.emit("AWS::ApiGatewayV2::Api", properties);

        let stage_id = ctx.child_id("DefaultStage");
        ctx.emit_child(
            stage_id,
            "AWS::ApiGatewayV2::Stage",
            json!({
                "ApiId": Expr::Ref(api_id.clone()),
                "AutoDeploy": true,
                "StageName": "$default",
            }),
        );

        for route in &self.routes {
            let integration_id = ctx.child_id(&format!("{}{}", route.id, route.integration.id));
            ctx.emit_child(
                integration_id.clone(),
                "AWS::ApiGatewayV2::Integration",
                json!({
                    "ApiId": Expr::Ref(api_id.clone()),
                    "IntegrationMethod": route.integration.method.as_str(),
                    "IntegrationType": "HTTP_PROXY",
                    "IntegrationUri": route.integration.url,
                    "PayloadFormatVersion": "1.0",
                }),
            );

            let route_id = ctx.child_id(&route.id);
            ctx.emit_child(
                route_id,
                "AWS::ApiGatewayV2::Route",
                json!({
                    "ApiId": Expr::Ref(api_id.clone()),
                    "AuthorizationType": "NONE",
                    "RouteKey": route.key.render(),
                    "Target": Expr::concat([
                        Expr::literal("integrations/"),
                        Expr::Ref(integration_id),
                    ]),
                }),
            );
        }
    }
}

/// Access credential handed to client applications
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKey {
    pub name: String,
    pub description: Option<String>,
    pub enabled: bool,
}

impl ApiKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            enabled: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Synthesize for ApiKey {
    fn synthesize(&self, ctx: &mut SynthContext<'_>) {
        let mut properties = json!({
            "Enabled": self.enabled,
            "Name": self.name,
        });
        if let Some(description) = &self.description {
            properties["Description"] = json!(description);
        }
        ctx.emit("AWS::ApiGateway::ApiKey", properties);
    }
}

/// Plan grouping API keys; throttling and quotas are not configured
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsagePlan {
    pub name: String,
    pub description: Option<String>,
    pub api_keys: Vec<ResourceRef>,
}

impl UsagePlan {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            api_keys: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn add_api_key(mut self, api_key: &ResourceRef) -> Self {
        self.api_keys.push(api_key.clone());
        self
    }

    pub(crate) fn references(&self) -> Vec<(LogicalId, Option<Attribute>)> {
        self.api_keys
            .iter()
            .map(|key| (key.logical_id.clone(), None))
            .collect()
    }
}

impl Synthesize for UsagePlan {
    fn synthesize(&self, ctx: &mut SynthContext<'_>) {
        let plan_id = ctx.logical_id().clone();

        let mut properties = json!({ "UsagePlanName": self.name });
        if let Some(description) = &self.description {
            properties["Description"] = json!(description);
        }
        ctx.emit("AWS::ApiGateway::UsagePlan", properties);

        for key in &self.api_keys {
            let key_id = ctx.child_id(&format!("UsagePlanKeyResource{}", key.construct_id));
            ctx.emit_child(
                key_id,
                "AWS::ApiGateway::UsagePlanKey",
                json!({
                    "KeyId": key.reference(),
                    "KeyType": "API_KEY",
                    "UsagePlanId": Expr::Ref(plan_id.clone()),
                }),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    include!("gateway.test.rs");
}
