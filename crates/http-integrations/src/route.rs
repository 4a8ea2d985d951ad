use std::fmt;
use std::str::FromStr;

use routebind_core_types::{ConstructPath, StackEnv};
use serde::{Deserialize, Serialize};

use crate::IntegrationError;

const DEFAULT_ROUTE_KEY: &str = "$default";
const DEFAULT_ROUTE_ID: &str = "DefaultRoute";

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Any,
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Any => "ANY",
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = IntegrationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_uppercase().as_str() {
            "ANY" => Ok(HttpMethod::Any),
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            "HEAD" => Ok(HttpMethod::Head),
            "OPTIONS" => Ok(HttpMethod::Options),
            other => Err(IntegrationError::InvalidRouteKey(format!(
                "unknown method '{other}'"
            ))),
        }
    }
}

/// Method and path a route matches, or the catch-all `$default` key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HttpRouteKey {
    key: String,
    method: Option<HttpMethod>,
    path: Option<String>,
}

impl HttpRouteKey {
    /// Key matching `method` requests on `path`.
    pub fn with(path: &str, method: HttpMethod) -> Result<Self, IntegrationError> {
        if path != "/" && (!path.starts_with('/') || path.ends_with('/')) {
            return Err(IntegrationError::InvalidRouteKey(format!(
                "path '{path}' must start with '/' and must not end with '/'"
            )));
        }
        Ok(Self {
            key: format!("{method} {path}"),
            method: Some(method),
            path: Some(path.to_string()),
        })
    }

    pub fn default_route() -> Self {
        Self {
            key: DEFAULT_ROUTE_KEY.to_string(),
            method: None,
            path: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn method(&self) -> Option<HttpMethod> {
        self.method
    }

    /// `None` for the catch-all route.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Construct id of a route using this key, e.g. `GET--orders`.
    pub fn construct_id(&self) -> String {
        match (self.method, &self.path) {
            (Some(method), Some(path)) => format!("{method}{}", path.replace('/', "--")),
            _ => DEFAULT_ROUTE_ID.to_string(),
        }
    }
}

impl fmt::Display for HttpRouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl FromStr for HttpRouteKey {
    type Err = IntegrationError;

    /// Parses `"GET /orders"`, a bare path (matching any method) or `"$default"`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw == DEFAULT_ROUTE_KEY {
            return Ok(Self::default_route());
        }
        match raw.split_once(char::is_whitespace) {
            Some((method, path)) => Self::with(path.trim(), method.parse()?),
            None => Self::with(raw, HttpMethod::Any),
        }
    }
}

impl Serialize for HttpRouteKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.key)
    }
}

impl<'de> Deserialize<'de> for HttpRouteKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A route of an HTTP API as seen by integrations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRoute {
    pub api_id: String,
    pub api_node: ConstructPath,
    pub key: HttpRouteKey,
}

impl HttpRoute {
    pub fn new(api_id: impl Into<String>, api_node: ConstructPath, key: HttpRouteKey) -> Self {
        Self {
            api_id: api_id.into(),
            api_node,
            key,
        }
    }

    /// Path of the route node in the construct tree.
    pub fn node(&self) -> Result<ConstructPath, IntegrationError> {
        Ok(self.api_node.child(self.key.construct_id())?)
    }

    /// Context for binding an integration to this route. Grants are registered
    /// under the route node itself.
    pub fn context(&self, stack: &StackEnv) -> Result<RouteContext, IntegrationError> {
        let node = self.node()?;
        Ok(RouteContext {
            scope: node.clone(),
            route_node: node,
            path: self.key.path().map(str::to_string),
            api_id: self.api_id.clone(),
            stack: stack.clone(),
        })
    }
}

/// Everything an integration needs to bind to one route.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteContext {
    /// Stable identity of the route.
    pub route_node: ConstructPath,
    /// `None` for the catch-all `$default` route.
    pub path: Option<String>,
    /// Id of the API owning the route.
    pub api_id: String,
    /// Node side-effect resources are registered under.
    pub scope: ConstructPath,
    pub stack: StackEnv,
}
