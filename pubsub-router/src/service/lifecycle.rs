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

//! Module orchestration: start, health-check and bounded concurrent stop.

use crate::config::ServiceConfig;
use crate::observability::events;
use crate::service::health::{self, HealthRegistry, HealthStatus};
use crate::service::{Module, ModuleError};
use futures::future::join_all;
use std::collections::{BTreeMap, HashMap};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

const COMPONENT: &str = "service";

/// Why one module failed a lifecycle transition.
#[derive(Debug)]
pub enum FailureReason {
    Failed(ModuleError),
    TimedOut(Duration),
    Panicked,
    DuplicateEndpoint { prefix: String, registered_by: String },
}

impl Display for FailureReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::Failed(err) => write!(f, "{err}"),
            FailureReason::TimedOut(grace) => {
                write!(f, "did not stop after timeout {}ms", grace.as_millis())
            }
            FailureReason::Panicked => write!(f, "panicked"),
            FailureReason::DuplicateEndpoint {
                prefix,
                registered_by,
            } => write!(f, "endpoint prefix {prefix} already registered by {registered_by}"),
        }
    }
}

#[derive(Debug)]
pub struct ModuleFailure {
    pub module: String,
    pub reason: FailureReason,
}

impl Display for ModuleFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.module, self.reason)
    }
}

/// Aggregated lifecycle failures.
#[derive(Debug)]
pub enum ServiceError {
    Start(Vec<ModuleFailure>),
    Stop(Vec<ModuleFailure>),
}

impl ServiceError {
    pub fn failures(&self) -> &[ModuleFailure] {
        match self {
            ServiceError::Start(failures) | ServiceError::Stop(failures) => failures,
        }
    }
}

fn write_failures(f: &mut Formatter<'_>, failures: &[ModuleFailure]) -> std::fmt::Result {
    for (index, failure) in failures.iter().enumerate() {
        if index > 0 {
            write!(f, "; ")?;
        }
        write!(f, "{failure}")?;
    }
    Ok(())
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::Start(failures) => {
                write!(f, "errors while starting modules: ")?;
                write_failures(f, failures)
            }
            ServiceError::Stop(failures) => {
                write!(f, "errors while stopping modules: ")?;
                write_failures(f, failures)
            }
        }
    }
}

impl Error for ServiceError {}

///
/// [`Service`] owns a heterogeneous set of [`Module`]s and drives whichever
/// lifecycle capabilities each of them advertises.
///
/// Modules start sequentially in registration order. They stop concurrently in
/// reverse registration order; each stop gets its own grace period and a slow
/// module never holds up the others.
///
/// # Examples
///
/// ```
/// use pubsub_router::service::Service;
/// use pubsub_router::{RouterConfig, ServiceConfig, SubscriptionRouter};
/// use std::sync::Arc;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let router = Arc::new(SubscriptionRouter::new("router", RouterConfig::default()));
///
/// let mut service = Service::new(ServiceConfig::default());
/// service.register_module(router.clone());
///
/// service.start().await.unwrap();
/// assert!(router.is_running());
///
/// service.stop().await.unwrap();
/// assert!(!router.is_running());
/// # });
/// ```
pub struct Service {
    config: ServiceConfig,
    modules: Vec<Arc<dyn Module>>,
    endpoints: BTreeMap<String, String>,
    health: HealthRegistry,
    health_checkers: Vec<Arc<dyn Module>>,
    health_monitor: Option<JoinHandle<()>>,
}

impl Service {
    pub fn new(config: ServiceConfig) -> Self {
        let health = HealthRegistry::new(config.health_check_threshold);
        Self {
            config,
            modules: Vec::new(),
            endpoints: BTreeMap::new(),
            health,
            health_checkers: Vec::new(),
            health_monitor: None,
        }
    }

    pub fn register_module(&mut self, module: Arc<dyn Module>) {
        debug!(
            component = COMPONENT,
            module = module.name(),
            "registering module"
        );
        self.modules.push(module);
    }

    pub fn register_modules(&mut self, modules: impl IntoIterator<Item = Arc<dyn Module>>) {
        for module in modules {
            self.register_module(module);
        }
    }

    pub fn modules(&self) -> &[Arc<dyn Module>] {
        &self.modules
    }

    /// Registered endpoint prefixes mapped to the module serving them.
    pub fn endpoints(&self) -> &BTreeMap<String, String> {
        &self.endpoints
    }

    /// Starts every `Startable`, registers health checks and endpoints, then
    /// launches the periodic health monitor. Calling it again after
    /// [`stop`](Service::stop) replaces the previous registrations.
    ///
    /// A failing module does not prevent the others from starting; all failures
    /// are reported together.
    pub async fn start(&mut self) -> Result<(), ServiceError> {
        let mut failures = Vec::new();

        // Registrations are rebuilt on every start, so a restart sees a clean slate.
        if let Some(previous) = self.health_monitor.take() {
            previous.abort();
        }
        self.health_checkers.clear();
        self.endpoints.clear();
        self.health.clear();

        for module in self.modules.clone() {
            let name = module.name().to_string();

            if let Some(startable) = module.as_startable() {
                info!(
                    event = events::SERVICE_MODULE_START,
                    component = COMPONENT,
                    module = name.as_str(),
                    "starting module"
                );
                if let Err(err) = startable.start().await {
                    error!(
                        event = events::SERVICE_MODULE_START_FAILED,
                        component = COMPONENT,
                        module = name.as_str(),
                        err = %err,
                        "error while starting module"
                    );
                    failures.push(ModuleFailure {
                        module: name.clone(),
                        reason: FailureReason::Failed(err),
                    });
                }
            }

            if module.as_health_checkable().is_some() {
                info!(
                    event = events::SERVICE_REGISTER_HEALTH_CHECK,
                    component = COMPONENT,
                    module = name.as_str(),
                    "registering health check"
                );
                self.health.register(&name);
                self.health_checkers.push(Arc::clone(&module));
            }

            if let Some(endpoint) = module.as_endpoint() {
                let prefix = endpoint.prefix().to_string();
                if let Some(registered_by) = self.endpoints.get(&prefix) {
                    failures.push(ModuleFailure {
                        module: name.clone(),
                        reason: FailureReason::DuplicateEndpoint {
                            registered_by: registered_by.clone(),
                            prefix,
                        },
                    });
                } else {
                    info!(
                        event = events::SERVICE_REGISTER_ENDPOINT,
                        component = COMPONENT,
                        module = name.as_str(),
                        prefix = prefix.as_str(),
                        "registering endpoint"
                    );
                    self.endpoints.insert(prefix, name.clone());
                }
            }
        }

        if !self.health_checkers.is_empty() {
            self.health_monitor = Some(health::spawn_monitor(
                self.health.clone(),
                self.health_checkers.clone(),
                self.config.health_check_frequency(),
            ));
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::Start(failures))
        }
    }

    /// Stops every `Stoppable` concurrently, each bounded by the configured
    /// grace period. Failures are reported, never retried.
    pub async fn stop(&mut self) -> Result<(), ServiceError> {
        if let Some(monitor) = self.health_monitor.take() {
            monitor.abort();
        }

        let grace = self.config.stop_grace_period();
        let stoppables: Vec<Arc<dyn Module>> = self
            .modules
            .iter()
            .rev()
            .filter(|module| module.as_stoppable().is_some())
            .cloned()
            .collect();

        debug!(
            component = COMPONENT,
            modules = stoppables.len(),
            "stopping modules in reverse registration order"
        );

        let stops = stoppables
            .into_iter()
            .map(|module| stop_with_timeout(module, grace));
        let failures: Vec<ModuleFailure> = join_all(stops).await.into_iter().flatten().collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::Stop(failures))
        }
    }

    /// Runs every registered health check now.
    pub async fn check_health(&self) -> HashMap<String, HealthStatus> {
        health::check_all(&self.health, &self.health_checkers).await
    }

    /// Latest known status per health-checked module.
    pub fn health_status(&self) -> HashMap<String, HealthStatus> {
        self.health.statuses()
    }
}

impl Drop for Service {
    fn drop(&mut self) {
        if let Some(monitor) = self.health_monitor.take() {
            monitor.abort();
        }
    }
}

async fn stop_with_timeout(module: Arc<dyn Module>, grace: Duration) -> Option<ModuleFailure> {
    let name = module.name().to_string();
    info!(
        event = events::SERVICE_MODULE_STOP,
        component = COMPONENT,
        module = name.as_str(),
        "stopping module"
    );

    let task = tokio::spawn(async move {
        match module.as_stoppable() {
            Some(stoppable) => stoppable.stop().await,
            None => Ok(()),
        }
    });

    let reason = match tokio::time::timeout(grace, task).await {
        Ok(Ok(Ok(()))) => {
            info!(
                event = events::SERVICE_MODULE_STOP_OK,
                component = COMPONENT,
                module = name.as_str(),
                "stopped module"
            );
            return None;
        }
        Ok(Ok(Err(err))) => {
            error!(
                event = events::SERVICE_MODULE_STOP_FAILED,
                component = COMPONENT,
                module = name.as_str(),
                err = %err,
                "error while stopping module"
            );
            FailureReason::Failed(err)
        }
        Ok(Err(join_err)) => {
            error!(
                event = events::SERVICE_MODULE_STOP_FAILED,
                component = COMPONENT,
                module = name.as_str(),
                err = %join_err,
                "stop task did not complete"
            );
            FailureReason::Panicked
        }
        Err(_) => {
            error!(
                event = events::SERVICE_MODULE_STOP_TIMEOUT,
                component = COMPONENT,
                module = name.as_str(),
                grace_ms = grace.as_millis() as u64,
                "module did not stop after timeout"
            );
            FailureReason::TimedOut(grace)
        }
    };

    Some(ModuleFailure {
        module: name,
        reason,
    })
}
