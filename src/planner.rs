//! Binds every route of a manifest and collects the resulting plan.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use http_integrations::{
    HttpRoute, IntegrationConfig, IntegrationError, LambdaProxyIntegration,
    LambdaProxyIntegrationProps, RouteIntegration,
};
use permissions_broker::{FunctionRef, InvokeGrant, PermissionLedger};
use routebind_core_types::{ConstructPath, CoreError, StackEnv};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::manifest::{BindingManifest, RouteSpec};

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("route '{route}' references unknown function '{function}'")]
    UnknownFunction { route: String, function: String },
    #[error("route '{route}': {source}")]
    Integration {
        route: String,
        #[source]
        source: IntegrationError,
    },
    #[error("route '{route}' resolves to node '{node}' which another route already uses")]
    DuplicateRoute { route: String, node: ConstructPath },
    #[error(transparent)]
    Core(#[from] CoreError),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlannedIntegration {
    pub route_key: String,
    pub route_node: ConstructPath,
    /// Manifest name of the function the route invokes.
    pub handler: String,
    pub config: IntegrationConfig,
}

/// Integration configs and invoke grants produced for one manifest.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanReport {
    pub stack: StackEnv,
    pub api_id: String,
    pub integrations: Vec<PlannedIntegration>,
    pub grants: Vec<InvokeGrant>,
}

/// A route paired with the integration that will be bound to it.
struct PreparedRoute {
    route: HttpRoute,
    integration: LambdaProxyIntegration,
}

struct Planner {
    stack: StackEnv,
    api_id: String,
    api_node: ConstructPath,
    functions: BTreeMap<String, FunctionRef>,
    ledger: Arc<PermissionLedger>,
}

impl Planner {
    fn new(manifest: &BindingManifest) -> Result<Self, PlanError> {
        let ledger = Arc::new(PermissionLedger::new());
        let stack = manifest.stack.env.clone();
        let api_node =
            ConstructPath::new([manifest.stack.name.as_str(), manifest.api.construct_id.as_str()])?;

        let functions = manifest
            .functions
            .iter()
            .map(|spec| {
                let handler =
                    FunctionRef::new(spec.name.as_str(), spec.resolved_arn(&stack), ledger.clone());
                (spec.name.clone(), handler)
            })
            .collect();

        Ok(Self {
            stack,
            api_id: manifest.api.id.clone(),
            api_node,
            functions,
            ledger,
        })
    }

    fn prepare(&self, spec: &RouteSpec) -> Result<PreparedRoute, PlanError> {
        let route_key = spec.key.to_string();
        let integration_err = |source| PlanError::Integration {
            route: route_key.clone(),
            source,
        };

        let mut builder = LambdaProxyIntegrationProps::builder();
        if let Some(name) = &spec.handler {
            let handler = self
                .functions
                .get(name)
                .ok_or_else(|| PlanError::UnknownFunction {
                    route: route_key.clone(),
                    function: name.clone(),
                })?;
            builder = builder.handler(handler.clone());
        }
        if let Some(version) = &spec.payload_format_version {
            builder = builder.payload_format_version(version.clone());
        }
        if let Some(mapping) = &spec.parameter_mapping {
            builder = builder.parameter_mapping(mapping.clone());
        }
        let props = builder.build().map_err(integration_err)?;

        Ok(PreparedRoute {
            route: HttpRoute::new(self.api_id.as_str(), self.api_node.clone(), spec.key.clone()),
            integration: LambdaProxyIntegration::new(props),
        })
    }
}

/// Fails when two routes resolve to the same construct node, which would
/// give them the same statement id.
fn check_unique_nodes(prepared: &[PreparedRoute]) -> Result<(), PlanError> {
    let mut seen = HashSet::with_capacity(prepared.len());
    for PreparedRoute { route, .. } in prepared {
        let route_key = route.key.to_string();
        let node = route.node().map_err(|source| PlanError::Integration {
            route: route_key.clone(),
            source,
        })?;
        if !seen.insert(node.clone()) {
            return Err(PlanError::DuplicateRoute {
                route: route_key,
                node,
            });
        }
    }
    Ok(())
}

fn prepare_all(
    planner: &Planner,
    manifest: &BindingManifest,
) -> Result<Vec<PreparedRoute>, PlanError> {
    let prepared = manifest
        .routes
        .iter()
        .map(|spec| planner.prepare(spec))
        .collect::<Result<Vec<_>, _>>()?;
    check_unique_nodes(&prepared)?;
    Ok(prepared)
}

/// Builds every route and its props without binding anything.
///
/// Returns the number of routes that would be bound.
pub fn validate(manifest: &BindingManifest) -> Result<usize, PlanError> {
    let planner = Planner::new(manifest)?;
    Ok(prepare_all(&planner, manifest)?.len())
}

/// Binds every route in manifest order against a fresh ledger.
///
/// All routes are prepared and checked for clashing nodes before the first
/// bind so configuration mistakes never leave a half-built plan behind.
pub fn plan(manifest: &BindingManifest) -> Result<PlanReport, PlanError> {
    let planner = Planner::new(manifest)?;
    let prepared = prepare_all(&planner, manifest)?;

    let mut integrations = Vec::with_capacity(prepared.len());
    for PreparedRoute { route, integration } in prepared {
        let route_key = route.key.to_string();
        let integration_err = |source| PlanError::Integration {
            route: route_key.clone(),
            source,
        };
        let context = route.context(&planner.stack).map_err(integration_err)?;
        let config = integration.bind(&context).map_err(integration_err)?;
        debug!(route = %route_key, uri = %config.uri, "route bound");
        integrations.push(PlannedIntegration {
            route_key,
            route_node: context.route_node,
            handler: integration.props().handler().function_name().to_string(),
            config,
        });
    }

    let grants = planner.ledger.grants();
    info!(
        routes = integrations.len(),
        grants = grants.len(),
        api = %planner.api_id,
        "plan complete"
    );

    Ok(PlanReport {
        stack: planner.stack,
        api_id: planner.api_id,
        integrations,
        grants,
    })
}
