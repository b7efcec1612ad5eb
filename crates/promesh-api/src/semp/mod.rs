// Broker management (SEMP) client.
//
// Per-object-kind CRUD over VPN-scoped paths of the form
// `msgVpns/{vpn}/{collection}/{key}`, with nested child collections
// (`…/{key}/{childCollection}/{childKey}`). Basic-auth per broker.

pub mod client;
pub mod types;

pub use client::SempClient;
