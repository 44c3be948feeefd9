//! Admin REST surface for published resolutions.
//!
//! `router` builds the axum app over an `ApiState`; `serve` binds it to a
//! listener. `ApiResolutionSource` drives the same router in-process.

mod envelope;
mod error;
mod routes;
mod source;
mod state;

pub use envelope::Envelope;
pub use error::ApiError;
pub use routes::{router, serve};
pub use source::ApiResolutionSource;
pub use state::{ApiState, ADMIN_TOKEN_HEADER};
