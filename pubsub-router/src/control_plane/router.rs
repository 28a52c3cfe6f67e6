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

//! Topic router fanning published messages out to subscriber routes.

use crate::config::{RouteConfig, RouterConfig};
use crate::control_plane::route_table::RouteTable;
use crate::data_plane::route::{Route, RouteError};
use crate::data_plane::route_messages::RouteMessages;
use crate::message::Message;
use crate::observability::{events, fields};
use crate::routing::RouteParams;
use crate::service::{HealthCheckable, Module, ModuleError, Startable, Stoppable};
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

const COMPONENT: &str = "router";

/// Failures for router operations.
#[derive(Debug)]
pub enum RouterError {
    NotRunning,
    NotFound,
    Route(RouteError),
}

impl Display for RouterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RouterError::NotRunning => write!(f, "router is not running"),
            RouterError::NotFound => write!(f, "route not found"),
            RouterError::Route(err) => write!(f, "route error: {err}"),
        }
    }
}

impl Error for RouterError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RouterError::Route(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RouteError> for RouterError {
    fn from(err: RouteError) -> Self {
        RouterError::Route(err)
    }
}

/// A registered route together with the consumer end of its stream.
#[derive(Debug)]
pub struct Subscription {
    pub route: Route,
    pub messages: RouteMessages,
}

/// Dispatcher contract consumed by connection handlers and publishers.
pub trait Router: Send + Sync {
    fn subscribe(&self, config: RouteConfig) -> Result<Subscription, RouterError>;

    fn unsubscribe(&self, route: &Route) -> Result<(), RouterError>;

    /// Offers `message` to every route on its path and returns how many routes
    /// it was offered to. Routes that turn out invalid are evicted.
    fn handle_message(&self, message: Arc<Message>) -> Result<usize, RouterError>;
}

///
/// [`SubscriptionRouter`] keeps routes grouped by topic path and is itself a
/// [`Module`] so a [`Service`](crate::service::Service) can start, stop and
/// health-check it.
///
/// # Examples
///
/// ```
/// use pubsub_router::service::Startable;
/// use pubsub_router::{Message, RouteParams, Router, RouterConfig, SubscriptionRouter};
/// use std::sync::Arc;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let router = SubscriptionRouter::new("router", RouterConfig::default());
/// router.start().await.unwrap();
///
/// let config = router.route_config("/chat", RouteParams::from_iter([("user_id", "u1")]));
/// let mut subscription = router.subscribe(config).unwrap();
///
/// let offered = router
///     .handle_message(Arc::new(Message::new(7, "/chat", b"hi".to_vec())))
///     .unwrap();
/// assert_eq!(offered, 1);
/// assert_eq!(subscription.messages.recv().await.unwrap().id, 7);
/// # });
/// ```
pub struct SubscriptionRouter {
    name: String,
    config: RouterConfig,
    routes: RouteTable,
    running: AtomicBool,
}

impl SubscriptionRouter {
    pub fn new(name: &str, config: RouterConfig) -> Self {
        Self {
            name: name.to_string(),
            config,
            routes: RouteTable::new(),
            running: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Builds a route configuration for `path` from the router's defaults.
    pub fn route_config(&self, path: &str, params: RouteParams) -> RouteConfig {
        self.config.route_config(path, params)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn routes(&self, path: &str) -> Vec<Route> {
        self.routes.routes_for(path)
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    fn ensure_running(&self) -> Result<(), RouterError> {
        if self.is_running() {
            Ok(())
        } else {
            Err(RouterError::NotRunning)
        }
    }

    fn evict(&self, route: &Route, reason: &str) {
        if self.routes.remove_route(route) {
            info!(
                event = events::ROUTER_EVICT_ROUTE,
                component = COMPONENT,
                route_id = %route.id(),
                path = route.path(),
                reason,
                "evicted route"
            );
        }
    }
}

impl Router for SubscriptionRouter {
    fn subscribe(&self, config: RouteConfig) -> Result<Subscription, RouterError> {
        self.ensure_running()?;

        let (route, messages) = Route::new(config)?;
        let Some(replaced) = self.routes.insert_route(route.clone()) else {
            // Stopped after the running check; the table already refused it.
            let _ = route.close();
            return Err(RouterError::NotRunning);
        };

        debug!(
            event = events::ROUTER_SUBSCRIBE,
            component = COMPONENT,
            route_id = %route.id(),
            path = route.path(),
            params = fields::format_params(route.params()).as_str(),
            "subscribed route"
        );

        for old in replaced {
            info!(
                event = events::ROUTER_SUBSCRIBE_REPLACE,
                component = COMPONENT,
                route_id = %old.id(),
                path = old.path(),
                reason = fields::REASON_REPLACED,
                "closing route replaced by new subscription"
            );
            // Already-invalid routes only report the double close.
            let _ = old.close();
        }

        Ok(Subscription { route, messages })
    }

    fn unsubscribe(&self, route: &Route) -> Result<(), RouterError> {
        if !self.routes.remove_route(route) {
            return Err(RouterError::NotFound);
        }

        debug!(
            event = events::ROUTER_UNSUBSCRIBE,
            component = COMPONENT,
            route_id = %route.id(),
            path = route.path(),
            reason = fields::REASON_UNSUBSCRIBED,
            "unsubscribed route"
        );
        let _ = route.close();
        Ok(())
    }

    fn handle_message(&self, message: Arc<Message>) -> Result<usize, RouterError> {
        self.ensure_running()?;

        let snapshot = self.routes.snapshot();
        let Some(routes) = snapshot.get(&message.path) else {
            trace!(
                event = events::ROUTER_DISPATCH_NO_ROUTES,
                component = COMPONENT,
                path = message.path.as_str(),
                msg_id = message.id,
                "no routes for path"
            );
            return Ok(0);
        };

        for route in routes {
            match route.deliver(Arc::clone(&message)) {
                Ok(()) if route.is_invalid() => self.evict(route, fields::REASON_INVALID),
                Ok(()) => {}
                Err(err) => {
                    warn!(
                        event = events::ROUTER_DISPATCH,
                        component = COMPONENT,
                        route_id = %route.id(),
                        path = route.path(),
                        msg_id = message.id,
                        err = %err,
                        "deliver failed; subscriber lost"
                    );
                    let reason = match err {
                        RouteError::QueueFull { .. } => fields::REASON_QUEUE_FULL,
                        _ => fields::REASON_INVALID,
                    };
                    self.evict(route, reason);
                }
            }
        }

        trace!(
            event = events::ROUTER_DISPATCH,
            component = COMPONENT,
            path = message.path.as_str(),
            msg_id = message.id,
            routes = routes.len(),
            "dispatched message"
        );
        Ok(routes.len())
    }
}

#[async_trait]
impl Startable for SubscriptionRouter {
    async fn start(&self) -> Result<(), ModuleError> {
        self.routes.open();
        self.running.store(true, Ordering::Release);
        info!(
            event = events::ROUTER_START,
            component = COMPONENT,
            name = self.name.as_str(),
            "router started"
        );
        Ok(())
    }
}

#[async_trait]
impl Stoppable for SubscriptionRouter {
    /// Refuses new work and closes every route so consumers see their streams end.
    async fn stop(&self) -> Result<(), ModuleError> {
        self.running.store(false, Ordering::Release);

        let routes = self.routes.close_and_drain();
        let closed = routes.len();
        for route in routes {
            let _ = route.close();
        }

        info!(
            event = events::ROUTER_STOP,
            component = COMPONENT,
            name = self.name.as_str(),
            closed,
            reason = fields::REASON_ROUTER_STOPPED,
            "router stopped"
        );
        Ok(())
    }
}

#[async_trait]
impl HealthCheckable for SubscriptionRouter {
    async fn check(&self) -> Result<(), ModuleError> {
        self.ensure_running().map_err(|err| Box::new(err) as ModuleError)
    }
}

impl Module for SubscriptionRouter {
    fn name(&self) -> &str {
        &self.name
    }

    fn as_startable(&self) -> Option<&dyn Startable> {
        Some(self)
    }

    fn as_stoppable(&self) -> Option<&dyn Stoppable> {
        Some(self)
    }

    fn as_health_checkable(&self) -> Option<&dyn HealthCheckable> {
        Some(self)
    }
}
