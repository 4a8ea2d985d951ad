mod function;

pub use function::{FunctionRef, Permission};

use std::collections::HashSet;
use std::time::SystemTime;

use parking_lot::Mutex;
use routebind_core_types::{ConstructPath, ServicePrincipal};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, trace, warn};

/// Action granted when a permission does not name one explicitly.
pub const INVOKE_ACTION: &str = "lambda:InvokeFunction";

/// Longest statement id Lambda accepts on a function policy.
pub const MAX_STATEMENT_ID_LEN: usize = 100;

/// A declarative statement allowing `principal` to invoke a function.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvokeGrant {
    pub function_arn: String,
    pub statement_id: String,
    pub scope: ConstructPath,
    pub principal: ServicePrincipal,
    pub source_arn: String,
    pub action: String,
}

/// Event emitted whenever the ledger accepts a grant.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GrantEvent {
    pub function_arn: String,
    pub statement_id: String,
    pub scope: ConstructPath,
    pub source_arn: String,
    pub timestamp: SystemTime,
}

/// Errors produced by the grantor surface.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GrantError {
    #[error("duplicate grant '{statement_id}' on function {function_arn}")]
    DuplicateGrant {
        function_arn: String,
        statement_id: String,
    },
    #[error("invalid statement id '{0}': only letters, digits, '-' and '_' are allowed")]
    InvalidStatementId(String),
    #[error("statement id '{statement_id}' is longer than {max} characters")]
    StatementIdTooLong { statement_id: String, max: usize },
}

/// Capability to register invoke permissions on a function.
pub trait PermissionGrantor: Send + Sync {
    fn grant_invoke(&self, grant: InvokeGrant) -> Result<(), GrantError>;
}

#[derive(Default)]
struct LedgerState {
    grants: Vec<InvokeGrant>,
    index: HashSet<(String, String)>,
}

/// Append-only, in-memory record of every grant issued while building a graph.
///
/// Grants keep their registration order so that planning the same input twice
/// produces identical output.
pub struct PermissionLedger {
    state: Mutex<LedgerState>,
    events: broadcast::Sender<GrantEvent>,
}

impl PermissionLedger {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(128);
        Self {
            state: Mutex::new(LedgerState::default()),
            events: tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GrantEvent> {
        self.events.subscribe()
    }

    /// Snapshot of all grants in registration order.
    pub fn grants(&self) -> Vec<InvokeGrant> {
        self.state.lock().grants.clone()
    }

    pub fn grants_for(&self, function_arn: &str) -> Vec<InvokeGrant> {
        self.state
            .lock()
            .grants
            .iter()
            .filter(|grant| grant.function_arn == function_arn)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.state.lock().grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn publish_event(&self, grant: &InvokeGrant) {
        let event = GrantEvent {
            function_arn: grant.function_arn.clone(),
            statement_id: grant.statement_id.clone(),
            scope: grant.scope.clone(),
            source_arn: grant.source_arn.clone(),
            timestamp: SystemTime::now(),
        };

        if let Err(err) = self.events.send(event) {
            trace!(
                target = "permissions-broker",
                "no grant event subscribers: {err}"
            );
        }
    }
}

impl Default for PermissionLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl PermissionGrantor for PermissionLedger {
    fn grant_invoke(&self, grant: InvokeGrant) -> Result<(), GrantError> {
        validate_statement_id(&grant.statement_id)?;

        {
            let mut state = self.state.lock();
            let key = (grant.function_arn.clone(), grant.statement_id.clone());
            if !state.index.insert(key) {
                warn!(
                    target = "permissions-broker",
                    function = %grant.function_arn,
                    statement_id = %grant.statement_id,
                    "rejecting duplicate grant"
                );
                return Err(GrantError::DuplicateGrant {
                    function_arn: grant.function_arn,
                    statement_id: grant.statement_id,
                });
            }
            state.grants.push(grant.clone());
        }

        debug!(
            target = "permissions-broker",
            function = %grant.function_arn,
            statement_id = %grant.statement_id,
            principal = %grant.principal,
            source_arn = %grant.source_arn,
            "registered invoke grant"
        );
        self.publish_event(&grant);
        Ok(())
    }
}

fn validate_statement_id(statement_id: &str) -> Result<(), GrantError> {
    let valid = !statement_id.is_empty()
        && statement_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(GrantError::InvalidStatementId(statement_id.to_string()));
    }
    if statement_id.len() > MAX_STATEMENT_ID_LEN {
        return Err(GrantError::StatementIdTooLong {
            statement_id: statement_id.to_string(),
            max: MAX_STATEMENT_ID_LEN,
        });
    }
    Ok(())
}
