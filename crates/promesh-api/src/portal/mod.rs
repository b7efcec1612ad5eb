// Event portal client: the design-time registry this tool promotes from.
//
// Two API surfaces share one base URL: `architecture/` (design + runtime
// objects) and `missionControl/` (broker services). Bearer-token auth.

pub mod client;
pub mod types;

pub use client::PortalClient;
