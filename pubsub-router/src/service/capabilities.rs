/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Optional lifecycle capabilities a module may advertise to the service.

use async_trait::async_trait;
use std::error::Error;

/// Error type returned by module lifecycle hooks.
pub type ModuleError = Box<dyn Error + Send + Sync>;

#[async_trait]
pub trait Startable: Send + Sync {
    async fn start(&self) -> Result<(), ModuleError>;
}

#[async_trait]
pub trait Stoppable: Send + Sync {
    async fn stop(&self) -> Result<(), ModuleError>;
}

#[async_trait]
pub trait HealthCheckable: Send + Sync {
    async fn check(&self) -> Result<(), ModuleError>;
}

/// A module reachable under a URL-style prefix, e.g. `/stream/`.
pub trait Endpoint: Send + Sync {
    fn prefix(&self) -> &str;
}

/// A component managed by [`Service`](crate::service::Service).
///
/// Each capability accessor defaults to `None`; a module opts in by returning
/// itself.
///
/// ```
/// use async_trait::async_trait;
/// use pubsub_router::service::{Module, ModuleError, Startable};
///
/// struct Cache;
///
/// #[async_trait]
/// impl Startable for Cache {
///     async fn start(&self) -> Result<(), ModuleError> {
///         Ok(())
///     }
/// }
///
/// impl Module for Cache {
///     fn name(&self) -> &str {
///         "cache"
///     }
///
///     fn as_startable(&self) -> Option<&dyn Startable> {
///         Some(self)
///     }
/// }
///
/// assert!(Cache.as_startable().is_some());
/// assert!(Cache.as_stoppable().is_none());
/// ```
pub trait Module: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn as_startable(&self) -> Option<&dyn Startable> {
        None
    }

    fn as_stoppable(&self) -> Option<&dyn Stoppable> {
        None
    }

    fn as_health_checkable(&self) -> Option<&dyn HealthCheckable> {
        None
    }

    fn as_endpoint(&self) -> Option<&dyn Endpoint> {
        None
    }
}
