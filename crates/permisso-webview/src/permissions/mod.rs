//! Permission bridging between embedded-content capability requests and
//! the host OS permission system.
//!
//! The widget page asks for capabilities (camera, microphone); the
//! bridge maps them to OS permission identifiers, checks what is already
//! granted, and delegates anything missing to the host's
//! [`AuthorizationCallback`]. Every request resolves to exactly one
//! grant-or-deny outcome, including when the owning surface is torn down
//! with the request still in flight.

mod bridge;
mod types;

pub use bridge::PermissionBridge;
pub use types::{
    os_permission, AuthorizationCallback, AuthorizationResult, Capability, CapabilityRequest,
    PermissionDecision, PermissionProbe,
};
