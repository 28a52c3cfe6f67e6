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

//! Per-subscriber delivery conduit: bounded channel, overflow queue and pump.

use crate::config::{ConfigError, QueueCapacity, RouteConfig};
use crate::data_plane::overflow_queue::OverflowQueue;
use crate::data_plane::pump;
use crate::data_plane::route_messages::RouteMessages;
use crate::message::Message;
use crate::observability::{events, fields};
use crate::routing::{matches, RouteParams};
use parking_lot::Mutex;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

const COMPONENT: &str = "route";

/// Failures reported by [`Route`] operations.
#[derive(Debug)]
pub enum RouteError {
    /// The route was invalidated; it never accepts messages again.
    InvalidRoute,
    /// The overflow queue was saturated. The route is invalid from now on.
    QueueFull { capacity: usize },
    InvalidConfig(ConfigError),
    /// The route was built outside of a Tokio runtime.
    RuntimeUnavailable,
}

impl Display for RouteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteError::InvalidRoute => write!(f, "route is invalid"),
            RouteError::QueueFull { capacity } => {
                write!(f, "route overflow queue is full (capacity {capacity})")
            }
            RouteError::InvalidConfig(err) => write!(f, "invalid route config: {err}"),
            RouteError::RuntimeUnavailable => {
                write!(f, "no Tokio runtime available to drive the route")
            }
        }
    }
}

impl Error for RouteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RouteError::InvalidConfig(err) => Some(err),
            _ => None,
        }
    }
}

/// Mutable route state. Every field is read and written under one lock so a
/// close can never race a send.
pub(crate) struct RouteState {
    pub(crate) sender: Option<mpsc::Sender<Arc<Message>>>,
    pub(crate) queue: OverflowQueue<Arc<Message>>,
    pub(crate) consuming: bool,
    pub(crate) invalid: bool,
}

pub(crate) struct RouteShared {
    pub(crate) id: Uuid,
    pub(crate) config: RouteConfig,
    pub(crate) state: Mutex<RouteState>,
    pub(crate) shutdown: watch::Sender<bool>,
    runtime: Handle,
}

impl RouteShared {
    /// Moves the route to its terminal state. Only the first call has an effect.
    ///
    /// Dropping the sender lets the consumer drain what is already buffered and
    /// then observe end-of-stream; queued overflow is discarded.
    pub(crate) fn invalidate(&self, state: &mut RouteState, reason: &'static str) -> bool {
        if state.invalid {
            return false;
        }

        state.invalid = true;
        state.consuming = false;
        state.sender = None;
        let discarded = state.queue.clear();
        self.shutdown.send_replace(true);

        info!(
            event = events::ROUTE_INVALIDATED,
            component = COMPONENT,
            route_id = %self.id,
            path = self.config.path.as_str(),
            reason,
            discarded,
            "route invalidated"
        );
        true
    }
}

///
/// [`Route`] carries messages from the dispatcher to exactly one consumer.
///
/// [`deliver`](Route::deliver) never blocks: it probes the bounded output channel
/// and falls back to the overflow queue according to the configured
/// [`QueueCapacity`]. A background pump moves queued messages into the channel,
/// giving up on the consumer once the delivery timeout expires. `Route` is a cheap
/// handle; clones refer to the same route.
///
/// # Examples
///
/// ```
/// use pubsub_router::{Message, Route, RouteConfig};
/// use std::sync::Arc;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let (route, mut messages) = Route::new(RouteConfig::new("/orders", 4)).unwrap();
///
/// route
///     .deliver(Arc::new(Message::new(1, "/orders", b"created".to_vec())))
///     .unwrap();
/// assert_eq!(messages.recv().await.unwrap().id, 1);
///
/// route.close().unwrap();
/// assert!(route.close().is_err());
/// assert!(messages.recv().await.is_none());
/// # });
/// ```
#[derive(Clone)]
pub struct Route {
    shared: Arc<RouteShared>,
}

impl Route {
    /// Creates a route driven by the current Tokio runtime.
    pub fn new(config: RouteConfig) -> Result<(Self, RouteMessages), RouteError> {
        let runtime = Handle::try_current().map_err(|_| RouteError::RuntimeUnavailable)?;
        Self::with_runtime(config, runtime)
    }

    /// Creates a route whose pump is spawned on `runtime`.
    pub fn with_runtime(
        config: RouteConfig,
        runtime: Handle,
    ) -> Result<(Self, RouteMessages), RouteError> {
        config.validate().map_err(RouteError::InvalidConfig)?;

        let id = Uuid::new_v4();
        let (sender, receiver) = mpsc::channel(config.channel_size);
        let (shutdown, _) = watch::channel(false);
        let queue_hint = match config.queue_size {
            QueueCapacity::Bounded(capacity) => capacity,
            _ => 0,
        };

        debug!(
            event = events::ROUTE_CREATE,
            component = COMPONENT,
            route_id = %id,
            path = config.path.as_str(),
            params = fields::format_params(&config.params).as_str(),
            channel_size = config.channel_size,
            queue_size = i64::from(config.queue_size),
            timeout = fields::format_timeout(config.timeout).as_str(),
            "creating route"
        );

        let shared = Arc::new(RouteShared {
            id,
            config,
            state: Mutex::new(RouteState {
                sender: Some(sender),
                queue: OverflowQueue::new(queue_hint),
                consuming: false,
                invalid: false,
            }),
            shutdown,
            runtime,
        });

        Ok((Self { shared }, RouteMessages::new(id, receiver)))
    }

    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    pub fn path(&self) -> &str {
        &self.shared.config.path
    }

    pub fn params(&self) -> &RouteParams {
        &self.shared.config.params
    }

    pub fn config(&self) -> &RouteConfig {
        &self.shared.config
    }

    /// Offers one message to the route without blocking.
    ///
    /// A message whose filter does not select this route is dropped and reported
    /// as success. When the channel is full and overflow is disabled the route is
    /// invalidated and the call still returns `Ok`; the consumer sees the stream
    /// end after draining. A saturated bounded queue invalidates the route and
    /// returns [`RouteError::QueueFull`].
    pub fn deliver(&self, message: Arc<Message>) -> Result<(), RouteError> {
        let shared = &self.shared;
        let mut state = shared.state.lock();

        if state.invalid {
            trace!(
                event = events::ROUTE_DELIVER_REJECTED,
                component = COMPONENT,
                route_id = %shared.id,
                msg_id = message.id,
                "route is invalid"
            );
            return Err(RouteError::InvalidRoute);
        }

        if !matches(&shared.config.params, message.filters()) {
            trace!(
                event = events::ROUTE_DELIVER_FILTERED,
                component = COMPONENT,
                route_id = %shared.id,
                msg_id = message.id,
                "message filter does not select route"
            );
            return Ok(());
        }

        // Bypassing a non-empty queue would reorder messages.
        let message = if state.queue.is_empty() {
            let Some(sender) = state.sender.as_ref() else {
                return Err(RouteError::InvalidRoute);
            };

            match sender.try_send(message) {
                Ok(()) => {
                    trace!(
                        event = events::ROUTE_DELIVER_DIRECT,
                        component = COMPONENT,
                        route_id = %shared.id,
                        "delivered to channel"
                    );
                    return Ok(());
                }
                Err(TrySendError::Full(message)) => message,
                Err(TrySendError::Closed(_)) => {
                    shared.invalidate(&mut state, fields::REASON_CONSUMER_GONE);
                    return Err(RouteError::InvalidRoute);
                }
            }
        } else {
            message
        };

        match shared.config.queue_size {
            QueueCapacity::Disabled => {
                debug!(
                    event = events::ROUTE_CHANNEL_FULL,
                    component = COMPONENT,
                    route_id = %shared.id,
                    msg_id = message.id,
                    channel_size = shared.config.channel_size,
                    "channel full and overflow disabled"
                );
                shared.invalidate(&mut state, fields::REASON_CHANNEL_FULL);
                Ok(())
            }
            QueueCapacity::Bounded(capacity) if state.queue.size() >= capacity => {
                warn!(
                    event = events::ROUTE_QUEUE_FULL,
                    component = COMPONENT,
                    route_id = %shared.id,
                    msg_id = message.id,
                    capacity,
                    "overflow queue saturated"
                );
                shared.invalidate(&mut state, fields::REASON_QUEUE_FULL);
                Err(RouteError::QueueFull { capacity })
            }
            _ => {
                state.queue.push(message);
                trace!(
                    event = events::ROUTE_DELIVER_QUEUED,
                    component = COMPONENT,
                    route_id = %shared.id,
                    queue_size = state.queue.size(),
                    "queued for pump"
                );

                if !state.consuming {
                    state.consuming = true;
                    shared.runtime.spawn(pump::run(Arc::clone(shared)));
                }
                Ok(())
            }
        }
    }

    /// Invalidates the route on request. A second close reports
    /// [`RouteError::InvalidRoute`].
    pub fn close(&self) -> Result<(), RouteError> {
        let mut state = self.shared.state.lock();
        if self.shared.invalidate(&mut state, fields::REASON_CLOSED) {
            Ok(())
        } else {
            debug!(
                event = events::ROUTE_CLOSE_REJECTED,
                component = COMPONENT,
                route_id = %self.shared.id,
                "route already invalid"
            );
            Err(RouteError::InvalidRoute)
        }
    }

    pub fn is_invalid(&self) -> bool {
        self.shared.state.lock().invalid
    }

    pub fn is_consuming(&self) -> bool {
        self.shared.state.lock().consuming
    }

    /// Current overflow queue depth.
    pub fn queue_size(&self) -> usize {
        self.shared.state.lock().queue.size()
    }
}

impl PartialEq for Route {
    fn eq(&self, other: &Self) -> bool {
        self.shared.id == other.shared.id
    }
}

impl Eq for Route {}

impl Debug for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("id", &self.shared.id)
            .field("path", &self.shared.config.path)
            .field("params", &self.shared.config.params)
            .finish_non_exhaustive()
    }
}
