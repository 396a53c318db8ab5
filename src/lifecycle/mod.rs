//! Connection lifecycle
//!
//! Turns gateway connect/disconnect events into registry writes, with the
//! authorization gate in front of every connect.
//!
//! | Case | Status | Body |
//! |---|---|---|
//! | missing dataset id or credential | 400 | `Bad request` |
//! | credential rejected by authorizer | 401 | `Unauthorized` |
//! | access denied | 403 | authorizer reason |
//! | authorizer or registry failure | 500 | `Internal server error` |
//! | connect accepted | 200 | `Connected` |
//! | disconnect | 200 | `Disconnected` |
//! | unknown event type | 500 | `Unrecognized event type` |

pub mod event;
pub mod manager;
pub mod outcome;

pub use event::{
    ConnectionEventPayload, CredentialPayload, GatewayRequest, LifecycleEvent, RequestContext,
    CONNECT, DISCONNECT,
};
pub use manager::{Clock, ConnectionManager};
pub use outcome::Outcome;
