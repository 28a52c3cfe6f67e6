//! Lifecycle layer.
//!
//! A [`Service`] drives a heterogeneous set of modules. Capabilities are explicit
//! traits ([`Startable`], [`Stoppable`], [`HealthCheckable`], [`Endpoint`]) that a
//! [`Module`] advertises through its accessor methods; the service never
//! inspects concrete types.

mod capabilities;
mod health;
mod lifecycle;

pub use capabilities::{Endpoint, HealthCheckable, Module, ModuleError, Startable, Stoppable};
pub use health::HealthStatus;
pub use lifecycle::{FailureReason, ModuleFailure, Service, ServiceError};
