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

//! Per-module health bookkeeping with a consecutive-failure threshold.

use crate::observability::events;
use crate::service::{Module, ModuleError};
use futures::future::join_all;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

const COMPONENT: &str = "health";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HealthStatus {
    /// Registered but not checked yet.
    Unknown,
    Healthy,
    Unhealthy,
}

#[derive(Debug)]
struct HealthState {
    status: HealthStatus,
    consecutive_failures: u32,
}

/// Shared health table. Clones observe the same state.
#[derive(Clone)]
pub(crate) struct HealthRegistry {
    threshold: u32,
    states: Arc<Mutex<HashMap<String, HealthState>>>,
}

impl HealthRegistry {
    pub(crate) fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            states: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub(crate) fn register(&self, module: &str) {
        self.states
            .lock()
            .entry(module.to_string())
            .or_insert(HealthState {
                status: HealthStatus::Unknown,
                consecutive_failures: 0,
            });
    }

    pub(crate) fn clear(&self) {
        self.states.lock().clear();
    }

    /// Records one check outcome and returns the resulting status.
    pub(crate) fn record(&self, module: &str, outcome: &Result<(), ModuleError>) -> HealthStatus {
        let mut states = self.states.lock();
        let state = states.entry(module.to_string()).or_insert(HealthState {
            status: HealthStatus::Unknown,
            consecutive_failures: 0,
        });

        let previous = state.status;
        match outcome {
            Ok(()) => {
                state.consecutive_failures = 0;
                state.status = HealthStatus::Healthy;
            }
            Err(err) => {
                state.consecutive_failures = state.consecutive_failures.saturating_add(1);
                warn!(
                    event = events::SERVICE_HEALTH_CHECK_FAILED,
                    component = COMPONENT,
                    module,
                    failures = state.consecutive_failures,
                    err = %err,
                    "health check failed"
                );
                if state.consecutive_failures >= self.threshold {
                    state.status = HealthStatus::Unhealthy;
                }
            }
        }

        if previous != state.status {
            info!(
                event = events::SERVICE_HEALTH_CHANGED,
                component = COMPONENT,
                module,
                from = ?previous,
                to = ?state.status,
                "health status changed"
            );
        }
        state.status
    }

    pub(crate) fn statuses(&self) -> HashMap<String, HealthStatus> {
        self.states
            .lock()
            .iter()
            .map(|(module, state)| (module.clone(), state.status))
            .collect()
    }
}

/// Runs every module's health check once, concurrently, and records the results.
pub(crate) async fn check_all(
    registry: &HealthRegistry,
    checkers: &[Arc<dyn Module>],
) -> HashMap<String, HealthStatus> {
    let checks = checkers.iter().map(|module| async move {
        let outcome = match module.as_health_checkable() {
            Some(checkable) => checkable.check().await,
            None => Ok(()),
        };
        (module.name().to_string(), outcome)
    });

    join_all(checks)
        .await
        .into_iter()
        .map(|(module, outcome)| {
            let status = registry.record(&module, &outcome);
            (module, status)
        })
        .collect()
}

/// Spawns the periodic health monitor. The first round runs one period after
/// the call.
pub(crate) fn spawn_monitor(
    registry: HealthRegistry,
    checkers: Vec<Arc<dyn Module>>,
    frequency: Duration,
) -> JoinHandle<()> {
    // A zero period would make `interval_at` panic.
    let frequency = frequency.max(Duration::from_millis(1));
    tokio::spawn(async move {
        let start = tokio::time::Instant::now() + frequency;
        let mut ticker = tokio::time::interval_at(start, frequency);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            check_all(&registry, &checkers).await;
        }
    })
}
