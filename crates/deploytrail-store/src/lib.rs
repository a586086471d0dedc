//! DeployTrail Store: deployment API client
//!
//! This crate is the transport layer of DeployTrail. It owns the wire
//! schema of deployment records, the `DeploymentStore` abstraction, the
//! reqwest-backed HTTP implementation and the runtime config document that
//! tells the dashboard where the API lives.
//!
//! ## Key Components
//!
//! - `DeploymentRecord`: one deployment event as the API returns it
//! - `DeploymentStore`: list / delete / create seam
//! - `HttpDeploymentStore`: REST implementation
//! - `RuntimeConfig`: `API_URL` / `VERSION` document with safe fallback

mod config;
mod error;
pub mod fakes;
mod http;
mod schema;
pub mod storage_traits;

pub use config::{RuntimeConfig, DEFAULT_API_URL, DEFAULT_VERSION};
pub use error::StoreError;
pub use http::{decode_listing, HttpDeploymentStore};
pub use schema::{DeploymentId, DeploymentRecord, NewDeployment};
pub use storage_traits::{DeploymentStore, StoreResult};
