// crates/harvest-certification/src/protocol.rs
//
// Protocol requests: a producer asks the DAO to govern a protocol id.
// The flag is set here and cleared only by a passing proposal execution.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::info;

use harvest_core::error::HarvestError;
use harvest_core::events::HarvestEvent;
use harvest_core::identity::Role;
use harvest_core::traits::{ProtocolBook, RoleDirectory};
use harvest_core::{Address, ProtocolId};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProtocolRegistry {
    /// producer -> protocol ids with an open request.
    requested: BTreeMap<Address, BTreeSet<ProtocolId>>,
}

impl ProtocolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request flag for (caller, protocol_id). Producer only.
    ///
    /// Requesting an already-open protocol is accepted and emits again.
    pub fn request_protocol_with_dao(
        &mut self,
        roles: &dyn RoleDirectory,
        caller: &Address,
        protocol_id: ProtocolId,
    ) -> Result<HarvestEvent, HarvestError> {
        roles.require_role(caller, Role::Producer)?;

        self.requested.entry(*caller).or_default().insert(protocol_id);
        info!(protocol_id, producer = %caller, "Protocol requested with DAO");

        Ok(HarvestEvent::ProtocolRequested {
            protocol_id,
            producer: *caller,
        })
    }

    /// Open protocol requests of `producer`.
    pub fn requested_by(&self, producer: &Address) -> Vec<ProtocolId> {
        self.requested
            .get(producer)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }
}

impl ProtocolBook for ProtocolRegistry {
    fn is_protocol_requested(&self, producer: &Address, protocol_id: ProtocolId) -> bool {
        self.requested
            .get(producer)
            .map(|set| set.contains(&protocol_id))
            .unwrap_or(false)
    }

    fn clear_protocol_request(&mut self, producer: &Address, protocol_id: ProtocolId) {
        if let Some(set) = self.requested.get_mut(producer) {
            set.remove(&protocol_id);
            if set.is_empty() {
                self.requested.remove(producer);
            }
        }
    }
}
