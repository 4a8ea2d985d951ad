//! Route integrations for HTTP APIs.
//!
//! A [`RouteIntegration`] is attached to a route and bound once per route. The
//! only strategy shipped here is [`LambdaProxyIntegration`], which grants API
//! Gateway permission to invoke a function and emits the integration
//! configuration the route renders later.

pub mod lambda;
pub mod mapping;
pub mod payload;
pub mod route;

pub use lambda::{
    source_resource_name, LambdaProxyIntegration, LambdaProxyIntegrationProps,
    LambdaProxyIntegrationPropsBuilder,
};
pub use mapping::{MappingValue, ParameterMapping};
pub use payload::PayloadFormatVersion;
pub use route::{HttpMethod, HttpRoute, HttpRouteKey, RouteContext};

use permissions_broker::GrantError;
use routebind_core_types::CoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced while configuring or binding integrations.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum IntegrationError {
    #[error("integration target is required")]
    MissingTarget,
    #[error("invalid route key: {0}")]
    InvalidRouteKey(String),
    #[error("invalid payload format version: {0}")]
    InvalidPayloadFormatVersion(String),
    #[error(transparent)]
    Grant(#[from] GrantError),
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Backend invocation style of an integration.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum HttpIntegrationType {
    /// Lambda function proxy.
    #[serde(rename = "AWS_PROXY")]
    LambdaProxy,
    /// Plain HTTP backend proxy.
    #[serde(rename = "HTTP_PROXY")]
    HttpProxy,
}

impl HttpIntegrationType {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpIntegrationType::LambdaProxy => "AWS_PROXY",
            HttpIntegrationType::HttpProxy => "HTTP_PROXY",
        }
    }
}

/// Configuration a route attaches to once an integration is bound.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct IntegrationConfig {
    #[serde(rename = "type")]
    pub kind: HttpIntegrationType,
    pub uri: String,
    pub payload_format_version: PayloadFormatVersion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_mapping: Option<ParameterMapping>,
}

/// A backend strategy that can be attached to a route.
pub trait RouteIntegration: Send + Sync {
    /// Binds the integration to one route, registering whatever side effects
    /// the strategy needs before returning the route's configuration.
    fn bind(&self, context: &RouteContext) -> Result<IntegrationConfig, IntegrationError>;
}
