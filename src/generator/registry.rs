use crate::error::{GenError, Result};
use crate::naming::ServiceIdentity;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Accumulates per-run state shared across documents
///
/// Holds the set of claimed service names (for collision detection) and the
/// service-name → backend-URL map written to `config/settings/service.json`.
/// Entries keep claim order.
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    claimed: HashMap<String, String>,
    backends: Map<String, Value>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a service name for `file` and record its backend URL
    ///
    /// # Errors
    ///
    /// [`GenError::InvalidSpecification`] if another document already
    /// resolved to the same service name.
    pub fn claim(&mut self, identity: &ServiceIdentity, file: &str, backend_url: &str) -> Result<()> {
        if let Some(owner) = self.claimed.get(&identity.service_name) {
            return Err(GenError::invalid(
                file,
                format!(
                    "service name {} collides with {owner}",
                    identity.service_name
                ),
            ));
        }
        self.claimed
            .insert(identity.service_name.clone(), file.to_string());
        self.backends.insert(
            identity.service_name.clone(),
            Value::String(backend_url.to_string()),
        );
        Ok(())
    }

    /// Service-name → backend-URL map in claim order
    pub fn backends(&self) -> &Map<String, Value> {
        &self.backends
    }
}
