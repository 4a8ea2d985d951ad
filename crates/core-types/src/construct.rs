use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};

use crate::CoreError;

/// Components named `Default` are dropped from unique ids entirely.
const HIDDEN_ID: &str = "Default";
/// Components named `Resource` are hashed but left out of the human part.
const HIDDEN_FROM_HUMAN_ID: &str = "Resource";
const PATH_SEP: &str = "/";
const HASH_LEN: usize = 8;
const MAX_HUMAN_LEN: usize = 240;
const MAX_ID_LEN: usize = 255;

/// Path of a node in the construct tree, root first, e.g. `OrdersStack/HttpApi/GET--orders`.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-full", serde(try_from = "String", into = "String"))]
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ConstructPath(Vec<String>);

impl ConstructPath {
    pub fn new<I, S>(components: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut path = Vec::new();
        for component in components {
            let component = component.into();
            validate_id(&component)?;
            path.push(component);
        }
        if path.is_empty() {
            return Err(CoreError::EmptyPath);
        }
        Ok(Self(path))
    }

    /// Returns the path of a child node with the given id.
    pub fn child(&self, id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        validate_id(&id)?;
        let mut components = self.0.clone();
        components.push(id);
        Ok(Self(components))
    }

    pub fn components(&self) -> &[String] {
        &self.0
    }

    /// Id of the node itself (the last component).
    pub fn id(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or_default()
    }
}

fn validate_id(id: &str) -> Result<(), CoreError> {
    if id.is_empty() || id.contains(PATH_SEP) {
        return Err(CoreError::InvalidConstructId(id.to_string()));
    }
    Ok(())
}

impl fmt::Display for ConstructPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(PATH_SEP))
    }
}

impl FromStr for ConstructPath {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::new(raw.split(PATH_SEP))
    }
}

impl TryFrom<String> for ConstructPath {
    type Error = CoreError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<ConstructPath> for String {
    fn from(path: ConstructPath) -> Self {
        path.to_string()
    }
}

/// Computes a stable, graph-unique identifier for a node from its path.
///
/// A single remaining component is returned as-is (alphanumerics only) when it
/// fits. Otherwise the id is a readable prefix built from the components
/// followed by an 8 character hash of the full path, so two distinct paths
/// never share an id even when their readable parts collapse to the same text.
pub fn node_unique_id(path: &ConstructPath) -> Result<String, CoreError> {
    let components: Vec<&str> = path
        .components()
        .iter()
        .map(String::as_str)
        .filter(|c| *c != HIDDEN_ID)
        .collect();

    if components.is_empty() {
        return Err(CoreError::EmptyPath);
    }

    if let [single] = components.as_slice() {
        let top_level = remove_non_alphanumeric(single);
        if top_level.len() <= MAX_ID_LEN {
            return Ok(top_level);
        }
    }

    let hash = path_hash(&components);
    let mut human: String = remove_dupes(&components)
        .into_iter()
        .filter(|c| *c != HIDDEN_FROM_HUMAN_ID)
        .map(remove_non_alphanumeric)
        .collect();
    human.truncate(MAX_HUMAN_LEN);

    Ok(human + &hash)
}

fn path_hash(components: &[&str]) -> String {
    let digest = Sha256::digest(components.join(PATH_SEP).as_bytes());
    hex::encode_upper(digest)[..HASH_LEN].to_string()
}

/// Drops a component when the previous kept component already ends with it,
/// so `Bucket/BucketResource` style nesting does not stutter.
fn remove_dupes<'a>(components: &[&'a str]) -> Vec<&'a str> {
    let mut kept: Vec<&str> = Vec::with_capacity(components.len());
    for &component in components {
        match kept.last() {
            Some(last) if last.ends_with(component) => {}
            _ => kept.push(component),
        }
    }
    kept
}

fn remove_non_alphanumeric(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}
