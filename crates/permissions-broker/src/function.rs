use std::fmt;
use std::sync::Arc;

use routebind_core_types::{ConstructPath, ServicePrincipal};

use crate::{GrantError, InvokeGrant, PermissionGrantor, INVOKE_ACTION};

/// Options for a single invoke permission on a function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Permission {
    /// Node the permission is registered under.
    pub scope: ConstructPath,
    pub principal: ServicePrincipal,
    /// Restricts which source resources may invoke. Carried verbatim.
    pub source_arn: String,
    /// Defaults to `lambda:InvokeFunction`.
    pub action: Option<String>,
}

/// Handle to an invocable function and the grantor that owns its permissions.
#[derive(Clone)]
pub struct FunctionRef {
    name: String,
    arn: String,
    grantor: Arc<dyn PermissionGrantor>,
}

impl FunctionRef {
    pub fn new(
        name: impl Into<String>,
        arn: impl Into<String>,
        grantor: Arc<dyn PermissionGrantor>,
    ) -> Self {
        Self {
            name: name.into(),
            arn: arn.into(),
            grantor,
        }
    }

    pub fn function_name(&self) -> &str {
        &self.name
    }

    /// Canonical invocable address of the function.
    pub fn function_arn(&self) -> &str {
        &self.arn
    }

    pub fn add_permission(
        &self,
        statement_id: impl Into<String>,
        permission: Permission,
    ) -> Result<(), GrantError> {
        self.grantor.grant_invoke(InvokeGrant {
            function_arn: self.arn.clone(),
            statement_id: statement_id.into(),
            scope: permission.scope,
            principal: permission.principal,
            source_arn: permission.source_arn,
            action: permission
                .action
                .unwrap_or_else(|| INVOKE_ACTION.to_string()),
        })
    }
}

impl fmt::Debug for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRef")
            .field("name", &self.name)
            .field("arn", &self.arn)
            .finish_non_exhaustive()
    }
}
