use std::fmt;

/// An AWS service acting as the calling principal of a grant.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-full", serde(transparent))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ServicePrincipal(pub String);

impl ServicePrincipal {
    pub const API_GATEWAY: &'static str = "apigateway.amazonaws.com";

    pub fn new(service: impl Into<String>) -> Self {
        Self(service.into())
    }

    /// Principal API Gateway uses when invoking integrations.
    pub fn api_gateway() -> Self {
        Self::new(Self::API_GATEWAY)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServicePrincipal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
