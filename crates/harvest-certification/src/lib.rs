// crates/harvest-certification/src/lib.rs
//
// harvest-certification: the producer and inspector sides of lot
// certification, plus the protocol-request flags governance consumes.
//
// Per lot: Requested -> Accepted -> Approved (lot certified) | Rejected.
// Both terminal states delete the request so the lot id is free again.

pub mod protocol;
pub mod workflow;

pub use protocol::ProtocolRegistry;
pub use workflow::{CertificationRequest, CertificationWorkflow};
