use std::fmt;

use serde::{Deserialize, Serialize};

use crate::IntegrationError;

/// Version of the payload sent to a Lambda handler.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct PayloadFormatVersion(String);

impl PayloadFormatVersion {
    pub const VERSION_1_0: &'static str = "1.0";
    pub const VERSION_2_0: &'static str = "2.0";

    pub fn v1_0() -> Self {
        Self(Self::VERSION_1_0.to_string())
    }

    pub fn v2_0() -> Self {
        Self(Self::VERSION_2_0.to_string())
    }

    /// Any other version string API Gateway accepts.
    pub fn custom(version: impl Into<String>) -> Result<Self, IntegrationError> {
        let version = version.into();
        if version.trim().is_empty() {
            return Err(IntegrationError::InvalidPayloadFormatVersion(version));
        }
        Ok(Self(version))
    }

    pub fn version(&self) -> &str {
        &self.0
    }
}

impl Default for PayloadFormatVersion {
    fn default() -> Self {
        Self::v2_0()
    }
}

impl fmt::Display for PayloadFormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PayloadFormatVersion {
    type Error = IntegrationError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::custom(raw)
    }
}

impl From<PayloadFormatVersion> for String {
    fn from(version: PayloadFormatVersion) -> Self {
        version.0
    }
}
