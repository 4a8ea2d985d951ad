use http_integrations::{
    HttpIntegrationType, HttpMethod, HttpRoute, HttpRouteKey, IntegrationError,
    LambdaProxyIntegration, LambdaProxyIntegrationProps, MappingValue, ParameterMapping,
    PayloadFormatVersion, RouteContext, RouteIntegration,
};
use parking_lot::Mutex;
use permissions_broker::{
    FunctionRef, GrantError, InvokeGrant, PermissionGrantor, PermissionLedger,
};
use routebind_core_types::StackEnv;
use std::sync::Arc;

struct RecordingGrantor {
    calls: Arc<Mutex<Vec<InvokeGrant>>>,
    fail_with: Option<GrantError>,
}

impl Default for RecordingGrantor {
    fn default() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }
}

impl PermissionGrantor for RecordingGrantor {
    fn grant_invoke(&self, grant: InvokeGrant) -> Result<(), GrantError> {
        self.calls.lock().push(grant);
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

fn stack() -> StackEnv {
    StackEnv::new("123456789012", "us-east-1")
}

fn route(key: HttpRouteKey) -> HttpRoute {
    HttpRoute::new("abc123", "OrdersStack/HttpApi".parse().unwrap(), key)
}

fn context_for(path: &str) -> RouteContext {
    route(HttpRouteKey::with(path, HttpMethod::Get).unwrap())
        .context(&stack())
        .unwrap()
}

fn recording() -> (Arc<RecordingGrantor>, FunctionRef) {
    let grantor = Arc::new(RecordingGrantor::default());
    let handler = FunctionRef::new("order-handler", "fn:order-handler", grantor.clone());
    (grantor, handler)
}

#[test]
fn default_props_bind_to_function_proxy_config() {
    let (grantor, handler) = recording();
    let integration = LambdaProxyIntegration::new(LambdaProxyIntegrationProps::new(handler));

    let config = integration.bind(&context_for("/orders")).unwrap();

    assert_eq!(config.kind, HttpIntegrationType::LambdaProxy);
    assert_eq!(config.uri, "fn:order-handler");
    assert_eq!(config.payload_format_version.version(), "2.0");
    assert!(config.parameter_mapping.is_none());

    let calls = grantor.calls.lock();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].source_arn,
        "arn:aws:execute-api:us-east-1:123456789012:abc123/*/*/orders"
    );
    assert_eq!(calls[0].principal.as_str(), "apigateway.amazonaws.com");
    assert_eq!(calls[0].action, "lambda:InvokeFunction");
    assert_eq!(calls[0].scope.to_string(), "OrdersStack/HttpApi/GET--orders");
    assert!(calls[0].statement_id.ends_with("-Permission"));
}

#[test]
fn path_parameters_are_kept_in_source_arn() {
    let (grantor, handler) = recording();
    let integration = LambdaProxyIntegration::new(LambdaProxyIntegrationProps::new(handler));

    integration.bind(&context_for("/orders/{id}")).unwrap();

    let calls = grantor.calls.lock();
    assert!(calls[0].source_arn.ends_with(":abc123/*/*/orders/{id}"));
}

#[test]
fn default_route_uses_bare_wildcard() {
    let (grantor, handler) = recording();
    let integration = LambdaProxyIntegration::new(LambdaProxyIntegrationProps::new(handler));
    let ctx = route(HttpRouteKey::default_route())
        .context(&stack())
        .unwrap();

    integration.bind(&ctx).unwrap();

    let calls = grantor.calls.lock();
    assert_eq!(
        calls[0].source_arn,
        "arn:aws:execute-api:us-east-1:123456789012:abc123/*/*"
    );
    assert!(calls[0].statement_id.starts_with("OrdersStackHttpApiDefaultRoute"));
}

#[test]
fn explicit_props_are_echoed() {
    let (_grantor, handler) = recording();
    let mapping = ParameterMapping::new()
        .overwrite_header("x-env", MappingValue::custom("prod"))
        .remove_query_string("debug");
    let props = LambdaProxyIntegrationProps::builder()
        .handler(handler)
        .payload_format_version(PayloadFormatVersion::v1_0())
        .parameter_mapping(mapping.clone())
        .build()
        .unwrap();

    let config = LambdaProxyIntegration::new(props)
        .bind(&context_for("/orders"))
        .unwrap();

    assert_eq!(config.payload_format_version, PayloadFormatVersion::v1_0());
    assert_eq!(config.parameter_mapping, Some(mapping));
}

#[test]
fn same_route_identity_yields_same_statement_id() {
    let (grantor, handler) = recording();
    let integration = LambdaProxyIntegration::new(LambdaProxyIntegrationProps::new(handler));

    integration.bind(&context_for("/orders")).unwrap();
    integration.bind(&context_for("/orders")).unwrap();
    integration.bind(&context_for("/customers")).unwrap();

    let calls = grantor.calls.lock();
    assert_eq!(calls[0].statement_id, calls[1].statement_id);
    assert_ne!(calls[0].statement_id, calls[2].statement_id);
}

#[test]
fn rebinding_route_against_ledger_is_a_duplicate() {
    let ledger = Arc::new(PermissionLedger::new());
    let handler = FunctionRef::new("order-handler", "fn:order-handler", ledger.clone());
    let integration = LambdaProxyIntegration::new(LambdaProxyIntegrationProps::new(handler));
    let ctx = context_for("/orders");

    integration.bind(&ctx).unwrap();
    let err = integration.bind(&ctx).unwrap_err();

    assert!(matches!(
        err,
        IntegrationError::Grant(GrantError::DuplicateGrant { .. })
    ));
    assert_eq!(ledger.len(), 1);
}

#[test]
fn shared_handler_gets_one_grant_per_route() {
    let ledger = Arc::new(PermissionLedger::new());
    let handler = FunctionRef::new("order-handler", "fn:order-handler", ledger.clone());
    let integration = LambdaProxyIntegration::new(LambdaProxyIntegrationProps::new(handler));

    let a = integration.bind(&context_for("/orders")).unwrap();
    let b = integration.bind(&context_for("/orders/{id}")).unwrap();

    assert_eq!(a, b);
    let grants = ledger.grants_for("fn:order-handler");
    assert_eq!(grants.len(), 2);
    assert_ne!(grants[0].statement_id, grants[1].statement_id);
}

#[test]
fn overlong_route_path_fails_the_grant() {
    let ledger = Arc::new(PermissionLedger::new());
    let handler = FunctionRef::new("order-handler", "fn:order-handler", ledger.clone());
    let integration = LambdaProxyIntegration::new(LambdaProxyIntegrationProps::new(handler));
    let path = format!("/{}", vec!["segment"; 20].join("/"));

    let err = integration.bind(&context_for(&path)).unwrap_err();

    assert!(matches!(
        err,
        IntegrationError::Grant(GrantError::StatementIdTooLong { max: 100, .. })
    ));
    assert!(ledger.is_empty());
}

#[test]
fn grantor_failure_propagates_unchanged() {
    let failure = GrantError::InvalidStatementId("boom".into());
    let grantor = Arc::new(RecordingGrantor {
        fail_with: Some(failure.clone()),
        ..RecordingGrantor::default()
    });
    let handler = FunctionRef::new("order-handler", "fn:order-handler", grantor.clone());
    let integration = LambdaProxyIntegration::new(LambdaProxyIntegrationProps::new(handler));

    let result = integration.bind(&context_for("/orders"));

    assert_eq!(result, Err(IntegrationError::Grant(failure)));
    assert_eq!(grantor.calls.lock().len(), 1);
}

#[test]
fn config_serializes_with_integration_type() {
    let (_grantor, handler) = recording();
    let config = LambdaProxyIntegration::new(LambdaProxyIntegrationProps::new(handler))
        .bind(&context_for("/orders"))
        .unwrap();

    let value = serde_json::to_value(&config).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "type": "AWS_PROXY",
            "uri": "fn:order-handler",
            "payload_format_version": "2.0"
        })
    );
}
