use permissions_broker::{FunctionRef, Permission};
use routebind_core_types::{format_arn, node_unique_id, ArnComponents, ServicePrincipal};
use tracing::debug;

use crate::{
    HttpIntegrationType, IntegrationConfig, IntegrationError, ParameterMapping,
    PayloadFormatVersion, RouteContext, RouteIntegration,
};

const EXECUTE_API_SERVICE: &str = "execute-api";
const PERMISSION_SUFFIX: &str = "-Permission";

/// Lambda proxy integration properties.
#[derive(Clone, Debug)]
pub struct LambdaProxyIntegrationProps {
    handler: FunctionRef,
    payload_format_version: Option<PayloadFormatVersion>,
    parameter_mapping: Option<ParameterMapping>,
}

impl LambdaProxyIntegrationProps {
    pub fn builder() -> LambdaProxyIntegrationPropsBuilder {
        LambdaProxyIntegrationPropsBuilder::default()
    }

    /// Shorthand for props with only a handler.
    pub fn new(handler: FunctionRef) -> Self {
        Self {
            handler,
            payload_format_version: None,
            parameter_mapping: None,
        }
    }

    pub fn handler(&self) -> &FunctionRef {
        &self.handler
    }

    pub fn payload_format_version(&self) -> Option<&PayloadFormatVersion> {
        self.payload_format_version.as_ref()
    }

    pub fn parameter_mapping(&self) -> Option<&ParameterMapping> {
        self.parameter_mapping.as_ref()
    }
}

#[derive(Clone, Debug, Default)]
pub struct LambdaProxyIntegrationPropsBuilder {
    handler: Option<FunctionRef>,
    payload_format_version: Option<PayloadFormatVersion>,
    parameter_mapping: Option<ParameterMapping>,
}

impl LambdaProxyIntegrationPropsBuilder {
    pub fn handler(mut self, handler: FunctionRef) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Defaults to version 2.0 when unset.
    pub fn payload_format_version(mut self, version: PayloadFormatVersion) -> Self {
        self.payload_format_version = Some(version);
        self
    }

    /// Requests are sent to the backend unmodified when unset.
    pub fn parameter_mapping(mut self, mapping: ParameterMapping) -> Self {
        self.parameter_mapping = Some(mapping);
        self
    }

    pub fn build(self) -> Result<LambdaProxyIntegrationProps, IntegrationError> {
        let handler = self.handler.ok_or(IntegrationError::MissingTarget)?;
        Ok(LambdaProxyIntegrationProps {
            handler,
            payload_format_version: self.payload_format_version,
            parameter_mapping: self.parameter_mapping,
        })
    }
}

/// Routes requests to a Lambda function through a proxy integration.
#[derive(Clone, Debug)]
pub struct LambdaProxyIntegration {
    props: LambdaProxyIntegrationProps,
}

impl LambdaProxyIntegration {
    pub fn new(props: LambdaProxyIntegrationProps) -> Self {
        Self { props }
    }

    pub fn props(&self) -> &LambdaProxyIntegrationProps {
        &self.props
    }

    /// Statement id of the permission granted for the route at `context`.
    pub fn statement_id(context: &RouteContext) -> Result<String, IntegrationError> {
        Ok(format!(
            "{}{PERMISSION_SUFFIX}",
            node_unique_id(&context.route_node)?
        ))
    }

    /// ARN pattern of the API traffic allowed to invoke the handler.
    pub fn source_arn(context: &RouteContext) -> String {
        format_arn(
            &context.stack,
            &ArnComponents::new(EXECUTE_API_SERVICE, context.api_id.as_str())
                .resource_name(source_resource_name(context.path.as_deref())),
        )
    }
}

/// Resource name matching any stage and method on `path`; the catch-all
/// route has no path and matches with a bare `*/*`.
pub fn source_resource_name(path: Option<&str>) -> String {
    format!("*/*{}", path.unwrap_or_default())
}

impl RouteIntegration for LambdaProxyIntegration {
    fn bind(&self, context: &RouteContext) -> Result<IntegrationConfig, IntegrationError> {
        let statement_id = Self::statement_id(context)?;
        let source_arn = Self::source_arn(context);
        debug!(
            route = %context.route_node,
            function = self.props.handler.function_arn(),
            %statement_id,
            %source_arn,
            "binding lambda proxy integration"
        );

        self.props.handler.add_permission(
            statement_id,
            Permission {
                scope: context.scope.clone(),
                principal: ServicePrincipal::api_gateway(),
                source_arn,
                action: None,
            },
        )?;

        Ok(IntegrationConfig {
            kind: HttpIntegrationType::LambdaProxy,
            uri: self.props.handler.function_arn().to_string(),
            payload_format_version: self
                .props
                .payload_format_version
                .clone()
                .unwrap_or_default(),
            parameter_mapping: self.props.parameter_mapping.clone(),
        })
    }
}
