use std::fmt;

/// Partition, region and account every ARN in a stack is formatted against.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct StackEnv {
    #[cfg_attr(feature = "serde-full", serde(default = "default_partition"))]
    pub partition: String,
    pub region: String,
    pub account: String,
}

#[cfg(feature = "serde-full")]
fn default_partition() -> String {
    StackEnv::DEFAULT_PARTITION.to_string()
}

impl StackEnv {
    pub const DEFAULT_PARTITION: &'static str = "aws";

    pub fn new(account: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            partition: Self::DEFAULT_PARTITION.to_string(),
            region: region.into(),
            account: account.into(),
        }
    }

    pub fn with_partition(mut self, partition: impl Into<String>) -> Self {
        self.partition = partition.into();
        self
    }
}

impl fmt::Display for StackEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.partition, self.account, self.region)
    }
}

/// How the resource name is joined to the resource in a formatted ARN.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ArnFormat {
    /// `arn:aws:service:region:account:resource/resourceName`
    #[default]
    SlashResourceName,
    /// `arn:aws:service:region:account:resource:resourceName`
    ColonResourceName,
    /// `arn:aws:service:region:account:resource`
    NoResourceName,
}

impl ArnFormat {
    fn separator(self) -> &'static str {
        match self {
            ArnFormat::SlashResourceName => "/",
            ArnFormat::ColonResourceName => ":",
            ArnFormat::NoResourceName => "",
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ArnComponents {
    pub service: String,
    pub resource: String,
    pub resource_name: Option<String>,
    pub format: ArnFormat,
}

impl ArnComponents {
    pub fn new(service: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            resource: resource.into(),
            resource_name: None,
            format: ArnFormat::default(),
        }
    }

    pub fn resource_name(mut self, name: impl Into<String>) -> Self {
        self.resource_name = Some(name.into());
        self
    }

    pub fn format(mut self, format: ArnFormat) -> Self {
        self.format = format;
        self
    }
}

/// Formats an ARN for `components` inside the given stack environment.
///
/// The resource name is not validated; patterns such as `*/*/orders` are
/// carried through verbatim.
pub fn format_arn(env: &StackEnv, components: &ArnComponents) -> String {
    let mut arn = format!(
        "arn:{}:{}:{}:{}:{}",
        env.partition, components.service, env.region, env.account, components.resource
    );
    if let Some(name) = &components.resource_name {
        if components.format != ArnFormat::NoResourceName {
            arn.push_str(components.format.separator());
            arn.push_str(name);
        }
    }
    arn
}
