//! Binding manifest: the stack, API, functions and routes to plan.

use std::collections::HashSet;
use std::env;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use http_integrations::{HttpRouteKey, ParameterMapping, PayloadFormatVersion};
use routebind_core_types::{format_arn, ArnComponents, ArnFormat, StackEnv};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const ENV_PREFIX: &str = "ROUTEBIND_STACK__";
const DEFAULT_API_CONSTRUCT_ID: &str = "HttpApi";

/// Manifest schema version this build understands.
pub const SUPPORTED_MANIFEST_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BindingManifest {
    pub version: u32,
    pub stack: StackSpec,
    pub api: ApiSpec,
    #[serde(default)]
    pub functions: Vec<FunctionSpec>,
    #[serde(default)]
    pub routes: Vec<RouteSpec>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StackSpec {
    pub name: String,
    #[serde(flatten)]
    pub env: StackEnv,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiSpec {
    pub id: String,
    #[serde(default = "default_api_construct_id")]
    pub construct_id: String,
}

fn default_api_construct_id() -> String {
    DEFAULT_API_CONSTRUCT_ID.to_string()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub name: String,
    /// Derived from the stack environment and name when omitted.
    pub arn: Option<String>,
}

impl FunctionSpec {
    pub fn resolved_arn(&self, env: &StackEnv) -> String {
        match &self.arn {
            Some(arn) => arn.clone(),
            None => format_arn(
                env,
                &ArnComponents::new("lambda", "function")
                    .resource_name(self.name.as_str())
                    .format(ArnFormat::ColonResourceName),
            ),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RouteSpec {
    pub key: HttpRouteKey,
    /// Name of the function in `functions` handling this route.
    pub handler: Option<String>,
    pub payload_format_version: Option<PayloadFormatVersion>,
    pub parameter_mapping: Option<ParameterMapping>,
}

/// Errors surfaced while loading a binding manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to deserialize manifest: {0}")]
    Deserialize(String),
    #[error("invalid manifest: {0}")]
    Invalid(String),
}

pub fn load_manifest_from_reader<R: Read>(mut reader: R) -> Result<BindingManifest, ManifestError> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf)?;
    parse_manifest_str(&buf)
}

pub fn load_manifest_from_path(path: impl AsRef<Path>) -> Result<BindingManifest, ManifestError> {
    let file = File::open(path.as_ref())?;
    load_manifest_from_reader(file)
}

/// Parses a manifest as JSON, falling back to YAML, then validates it.
pub fn parse_manifest_str(raw: &str) -> Result<BindingManifest, ManifestError> {
    let manifest: BindingManifest = match serde_json::from_str(raw) {
        Ok(manifest) => manifest,
        Err(json_err) => serde_yaml::from_str(raw).map_err(|yaml_err| {
            ManifestError::Deserialize(format!(
                "json error: {}; yaml error: {}",
                json_err, yaml_err
            ))
        })?,
    };
    validate_manifest(&manifest)?;
    Ok(manifest)
}

fn validate_manifest(manifest: &BindingManifest) -> Result<(), ManifestError> {
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        return Err(ManifestError::Invalid(format!(
            "unsupported manifest version {} (expected {SUPPORTED_MANIFEST_VERSION})",
            manifest.version
        )));
    }

    let env = &manifest.stack.env;
    for (field, value) in [
        ("stack.name", &manifest.stack.name),
        ("stack.partition", &env.partition),
        ("stack.region", &env.region),
        ("stack.account", &env.account),
        ("api.id", &manifest.api.id),
    ] {
        if value.trim().is_empty() {
            return Err(ManifestError::Invalid(format!("{field} must not be empty")));
        }
    }

    let mut seen = HashSet::new();
    for function in &manifest.functions {
        if !seen.insert(function.name.as_str()) {
            return Err(ManifestError::Invalid(format!(
                "function '{}' declared more than once",
                function.name
            )));
        }
    }
    Ok(())
}

/// Overlays `ROUTEBIND_STACK__*` environment variables onto the stack section.
pub fn apply_env_overrides(manifest: &mut BindingManifest) -> Result<(), ManifestError> {
    for (key, value) in env::vars() {
        let Some(field) = key.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        let field = field.to_ascii_lowercase();
        let target = match field.as_str() {
            "name" => &mut manifest.stack.name,
            "partition" => &mut manifest.stack.env.partition,
            "region" => &mut manifest.stack.env.region,
            "account" => &mut manifest.stack.env.account,
            _ => {
                warn!(variable = %key, "unknown stack override; skipping");
                continue;
            }
        };
        debug!(field = %field, value = %value, "applying stack override");
        *target = value;
    }
    validate_manifest(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const YAML: &str = r#"
version: 1
stack:
  name: OrdersStack
  account: "123456789012"
  region: us-east-1
api:
  id: abc123
functions:
  - name: order-handler
routes:
  - key: GET /orders
    handler: order-handler
  - key: $default
    handler: order-handler
    payload_format_version: "1.0"
    parameter_mapping:
      overwrite:header.x-env: prod
"#;

    #[test]
    fn parses_yaml_with_defaults() {
        let manifest = parse_manifest_str(YAML).unwrap();
        assert_eq!(manifest.stack.env.partition, "aws");
        assert_eq!(manifest.api.construct_id, "HttpApi");
        assert_eq!(manifest.routes.len(), 2);
        assert_eq!(manifest.routes[1].key, HttpRouteKey::default_route());
        assert_eq!(
            manifest.routes[1]
                .parameter_mapping
                .as_ref()
                .and_then(|m| m.get("overwrite:header.x-env"))
                .map(|v| v.as_str()),
            Some("prod")
        );
    }

    #[test]
    fn function_arn_is_derived_from_stack() {
        let manifest = parse_manifest_str(YAML).unwrap();
        assert_eq!(
            manifest.functions[0].resolved_arn(&manifest.stack.env),
            "arn:aws:lambda:us-east-1:123456789012:function:order-handler"
        );
    }

    #[test]
    fn loads_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.yaml");
        std::fs::write(&path, YAML).unwrap();
        let manifest = load_manifest_from_path(&path).unwrap();
        assert_eq!(manifest.stack.name, "OrdersStack");
        assert!(matches!(
            load_manifest_from_path(dir.path().join("missing.yaml")),
            Err(ManifestError::Io(_))
        ));
    }

    #[test]
    fn parses_json() {
        let raw = r#"{"version":1,"stack":{"name":"S","account":"1","region":"eu-west-1"},"api":{"id":"x"}}"#;
        let manifest = parse_manifest_str(raw).unwrap();
        assert!(manifest.routes.is_empty());
        assert_eq!(manifest.stack.env.region, "eu-west-1");
    }

    #[test]
    fn rejects_duplicate_functions_and_bad_routes() {
        let dup = YAML.replace(
            "functions:\n  - name: order-handler\n",
            "functions:\n  - name: order-handler\n  - name: order-handler\n",
        );
        assert!(matches!(
            parse_manifest_str(&dup),
            Err(ManifestError::Invalid(_))
        ));

        let bad_route = YAML.replace("GET /orders", "GET orders");
        assert!(matches!(
            parse_manifest_str(&bad_route),
            Err(ManifestError::Deserialize(_))
        ));
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let future = YAML.replace("version: 1", "version: 99");
        let err = parse_manifest_str(&future).unwrap_err();
        assert!(matches!(err, ManifestError::Invalid(_)));
        assert!(err.to_string().contains("unsupported manifest version 99"));
    }

    #[test]
    #[serial]
    fn env_overrides_replace_stack_fields() {
        let mut manifest = parse_manifest_str(YAML).unwrap();
        env::set_var("ROUTEBIND_STACK__REGION", "eu-central-1");
        env::set_var("ROUTEBIND_STACK__PARTITION", "aws-cn");
        let result = apply_env_overrides(&mut manifest);
        env::remove_var("ROUTEBIND_STACK__REGION");
        env::remove_var("ROUTEBIND_STACK__PARTITION");

        result.unwrap();
        assert_eq!(manifest.stack.env.region, "eu-central-1");
        assert_eq!(manifest.stack.env.partition, "aws-cn");
        assert_eq!(manifest.stack.env.account, "123456789012");
    }

    #[test]
    #[serial]
    fn blank_override_is_rejected() {
        let mut manifest = parse_manifest_str(YAML).unwrap();
        env::set_var("ROUTEBIND_STACK__ACCOUNT", "");
        let result = apply_env_overrides(&mut manifest);
        env::remove_var("ROUTEBIND_STACK__ACCOUNT");

        assert!(matches!(result, Err(ManifestError::Invalid(_))));
    }
}
