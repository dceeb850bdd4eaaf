// crates/harvest-certification/src/workflow.rs
//
// Certification request state machine, one request per lot.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use harvest_core::error::HarvestError;
use harvest_core::events::HarvestEvent;
use harvest_core::identity::Role;
use harvest_core::traits::{LotBook, RoleDirectory};
use harvest_core::{Address, LotId};

/// An open certification request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificationRequest {
    pub lot_id: LotId,
    pub producer: Address,
    /// Set once an inspector accepts the request.
    pub inspector: Option<Address>,
    pub requested_at: DateTime<Utc>,
}

/// Open certification requests keyed by lot id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CertificationWorkflow {
    requests: BTreeMap<LotId, CertificationRequest>,
}

impl CertificationWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a certification request for `lot_id`.
    ///
    /// # Errors
    /// - `InsufficientRole` unless the caller is a producer.
    /// - `TokenDoesNotExist` if the lot is unknown or the caller holds none of it.
    /// - `AlreadyCertified` if the lot is already certified.
    /// - `CertificationAlreadyRequested` if a request is already open.
    pub fn request_certification(
        &mut self,
        roles: &dyn RoleDirectory,
        lots: &dyn LotBook,
        caller: &Address,
        lot_id: LotId,
        now: DateTime<Utc>,
    ) -> Result<HarvestEvent, HarvestError> {
        roles.require_role(caller, Role::Producer)?;

        if !lots.lot_exists(lot_id) || lots.units_of(caller, lot_id) == 0 {
            return Err(HarvestError::TokenDoesNotExist);
        }
        if lots.is_certified(lot_id) {
            return Err(HarvestError::AlreadyCertified);
        }
        if self.requests.contains_key(&lot_id) {
            return Err(HarvestError::CertificationAlreadyRequested);
        }

        self.requests.insert(
            lot_id,
            CertificationRequest {
                lot_id,
                producer: *caller,
                inspector: None,
                requested_at: now,
            },
        );
        info!(lot_id, producer = %caller, "Certification requested");

        Ok(HarvestEvent::CertificationRequested {
            lot_id,
            producer: *caller,
        })
    }

    /// Take an open request as the inspecting party.
    ///
    /// The last inspector to accept holds the request.
    pub fn accept_certification_request(
        &mut self,
        roles: &dyn RoleDirectory,
        caller: &Address,
        lot_id: LotId,
    ) -> Result<HarvestEvent, HarvestError> {
        roles.require_role(caller, Role::Inspector)?;

        let request = self
            .requests
            .get_mut(&lot_id)
            .ok_or(HarvestError::InspectionRequestNotFound)?;
        request.inspector = Some(*caller);
        info!(lot_id, inspector = %caller, "Certification request accepted");

        Ok(HarvestEvent::CertificationRequestAccepted {
            lot_id,
            inspector: *caller,
        })
    }

    /// Certify the lot and close the request.
    pub fn approve_certification(
        &mut self,
        roles: &dyn RoleDirectory,
        lots: &mut dyn LotBook,
        caller: &Address,
        lot_id: LotId,
    ) -> Result<HarvestEvent, HarvestError> {
        self.require_accepting_inspector(roles, caller, lot_id)?;

        lots.mark_certified(lot_id)?;
        self.requests.remove(&lot_id);
        info!(lot_id, inspector = %caller, "Certification approved");

        Ok(HarvestEvent::CertificationApproved {
            lot_id,
            inspector: *caller,
        })
    }

    /// Close the request without certifying. The lot may be re-requested.
    pub fn reject_certification(
        &mut self,
        roles: &dyn RoleDirectory,
        caller: &Address,
        lot_id: LotId,
    ) -> Result<HarvestEvent, HarvestError> {
        self.require_accepting_inspector(roles, caller, lot_id)?;

        self.requests.remove(&lot_id);
        info!(lot_id, inspector = %caller, "Certification rejected");

        Ok(HarvestEvent::CertificationRejected {
            lot_id,
            inspector: *caller,
        })
    }

    fn require_accepting_inspector(
        &self,
        roles: &dyn RoleDirectory,
        caller: &Address,
        lot_id: LotId,
    ) -> Result<(), HarvestError> {
        roles.require_role(caller, Role::Inspector)?;
        match self.inspector_of(lot_id) {
            Some(inspector) if inspector == *caller => Ok(()),
            _ => Err(HarvestError::YouDidntAcceptAnyRequestWithThisTokenId),
        }
    }

    pub fn request(&self, lot_id: LotId) -> Option<&CertificationRequest> {
        self.requests.get(&lot_id)
    }

    /// Accepting inspector of an open request.
    pub fn inspector_of(&self, lot_id: LotId) -> Option<Address> {
        self.requests.get(&lot_id).and_then(|r| r.inspector)
    }

    /// Open requests not yet accepted by any inspector.
    pub fn unaccepted(&self) -> Vec<&CertificationRequest> {
        self.requests
            .values()
            .filter(|r| r.inspector.is_none())
            .collect()
    }

    pub fn open_count(&self) -> usize {
        self.requests.len()
    }
}
