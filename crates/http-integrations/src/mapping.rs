use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Value side of a parameter mapping rule.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct MappingValue(String);

impl MappingValue {
    pub fn request_header(name: &str) -> Self {
        Self(format!("$request.header.{name}"))
    }

    pub fn request_query_string(name: &str) -> Self {
        Self(format!("$request.querystring.{name}"))
    }

    pub fn request_body(path: &str) -> Self {
        Self(format!("$request.body.{path}"))
    }

    pub fn request_path() -> Self {
        Self("$request.path".to_string())
    }

    pub fn request_path_param(name: &str) -> Self {
        Self(format!("$request.path.{name}"))
    }

    pub fn context_variable(variable: &str) -> Self {
        Self(format!("$context.{variable}"))
    }

    pub fn stage_variable(variable: &str) -> Self {
        Self(format!("$stageVariables.{variable}"))
    }

    pub fn custom(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn none() -> Self {
        Self(String::new())
    }
}

impl fmt::Display for MappingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rules transforming requests before they reach the backend.
///
/// Keys are kept sorted so rendered mappings are stable between runs.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ParameterMapping {
    mappings: BTreeMap<String, MappingValue>,
}

impl ParameterMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_header(self, name: &str, value: MappingValue) -> Self {
        self.custom(format!("append:header.{name}"), value)
    }

    pub fn overwrite_header(self, name: &str, value: MappingValue) -> Self {
        self.custom(format!("overwrite:header.{name}"), value)
    }

    pub fn remove_header(self, name: &str) -> Self {
        self.custom(format!("remove:header.{name}"), MappingValue::none())
    }

    pub fn append_query_string(self, name: &str, value: MappingValue) -> Self {
        self.custom(format!("append:querystring.{name}"), value)
    }

    pub fn overwrite_query_string(self, name: &str, value: MappingValue) -> Self {
        self.custom(format!("overwrite:querystring.{name}"), value)
    }

    pub fn remove_query_string(self, name: &str) -> Self {
        self.custom(format!("remove:querystring.{name}"), MappingValue::none())
    }

    pub fn overwrite_path(self, value: MappingValue) -> Self {
        self.custom("overwrite:path", value)
    }

    /// Adds a raw rule; a later rule with the same key replaces the earlier one.
    pub fn custom(mut self, key: impl Into<String>, value: MappingValue) -> Self {
        self.mappings.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&MappingValue> {
        self.mappings.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MappingValue)> {
        self.mappings.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_renders_rule_keys() {
        let mapping = ParameterMapping::new()
            .append_header("x-trace", MappingValue::context_variable("requestId"))
            .overwrite_header("x-env", MappingValue::custom("prod"))
            .remove_header("x-internal")
            .append_query_string("q", MappingValue::request_query_string("search"))
            .overwrite_query_string("page", MappingValue::request_path_param("page"))
            .remove_query_string("debug")
            .overwrite_path(MappingValue::request_path());

        assert_eq!(mapping.len(), 7);
        assert_eq!(
            mapping.get("append:header.x-trace").map(MappingValue::as_str),
            Some("$context.requestId")
        );
        assert_eq!(
            mapping.get("overwrite:querystring.page").map(MappingValue::as_str),
            Some("$request.path.page")
        );
        assert_eq!(
            mapping.get("remove:header.x-internal").map(MappingValue::as_str),
            Some("")
        );
        assert_eq!(
            mapping.get("overwrite:path").map(MappingValue::as_str),
            Some("$request.path")
        );
    }

    #[test]
    fn value_helpers() {
        assert_eq!(MappingValue::request_header("Host").as_str(), "$request.header.Host");
        assert_eq!(MappingValue::request_body("a.b").as_str(), "$request.body.a.b");
        assert_eq!(MappingValue::stage_variable("env").as_str(), "$stageVariables.env");
    }

    #[test]
    fn serializes_as_sorted_map() {
        let mapping = ParameterMapping::new()
            .overwrite_path(MappingValue::request_path())
            .append_header("a", MappingValue::custom("1"));
        let json = serde_json::to_string(&mapping).unwrap();
        assert_eq!(json, r#"{"append:header.a":"1","overwrite:path":"$request.path"}"#);
    }
}
