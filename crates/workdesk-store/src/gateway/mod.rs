//! Gateway Layer
//!
//! Remote table access and the acting-user provider.
//! - traits: the table gateway contract and its error type
//! - auth: who is acting (sessions are established elsewhere)
//! - rest: REST implementation against the hosted table API
//! - realtime: change frames pushed by the backend's realtime socket

mod auth;
mod realtime;
mod rest;
mod traits;

pub use auth::{AuthProvider, Session, StaticAuth, UserId};
pub use realtime::{row_id, RealtimeChannel, RemoteChange};
pub use rest::{RestGateway, TableUrl};
pub use traits::{GatewayError, GatewayResult, OrderUpdate, TableGateway};
