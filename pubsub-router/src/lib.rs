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

//! # pubsub-router
//!
//! `pubsub-router` is the per-subscriber delivery core of a publish/subscribe
//! server. Each subscriber gets a [`Route`]: a bounded, filtered conduit that
//! carries messages from the dispatcher to one consumer while protecting the
//! process from slow readers.
//!
//! ## Quick start
//!
//! ```
//! use pubsub_router::service::Startable;
//! use pubsub_router::{Message, RouteParams, Router, RouterConfig, SubscriptionRouter};
//! use std::sync::Arc;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let router = SubscriptionRouter::new("quick-start", RouterConfig::default());
//! router.start().await.unwrap();
//!
//! let params = RouteParams::from_iter([("user_id", "u1")]);
//! let mut subscription = router
//!     .subscribe(router.route_config("/chat", params))
//!     .unwrap();
//!
//! let message = Message::new(7, "/chat", b"hello".to_vec()).with_filter("user_id", "u1");
//! assert_eq!(router.handle_message(Arc::new(message)).unwrap(), 1);
//!
//! let received = subscription.messages.recv().await.unwrap();
//! assert_eq!(received.id, 7);
//! # });
//! ```
//!
//! ## Delivery contract
//!
//! - `deliver` never blocks. A message goes straight into the route's output
//!   channel while the overflow queue is empty, and behind the queue otherwise.
//! - A full channel with the overflow queue disabled, a saturated bounded queue,
//!   a consumer that stops reading for longer than the delivery timeout and an
//!   explicit close all invalidate the route. Invalidation is permanent.
//! - Messages already in the channel stay readable after invalidation; the
//!   consumer stream ends once they are drained.
//!
//! ## Internal architecture map
//!
//! - Routing: subscription parameters and the pure filter predicate
//! - Data plane: route, overflow queue and the pump task draining it
//! - Control plane: route table and the topic router
//! - Service: module lifecycle, health checks and bounded concurrent stop
//! - Config: json5 configuration for the service and route defaults
//!
//! ## Observability model
//!
//! The crate uses `tracing` for logs/events.
//! Library code emits events and does not initialize a global subscriber.
//! Binaries and tests are responsible for one-time `tracing_subscriber`
//! initialization at process boundaries.

pub mod config;
pub use config::{
    Config, ConfigError, QueueCapacity, RouteConfig, RouteDefaults, RouterConfig, ServiceConfig,
};

mod control_plane;
pub use control_plane::router::{Router, RouterError, Subscription, SubscriptionRouter};

mod data_plane;
pub use data_plane::route::{Route, RouteError};
pub use data_plane::route_messages::RouteMessages;
pub use tokio::sync::mpsc::error::TryRecvError;

mod message;
pub use message::Message;

#[doc(hidden)]
pub mod observability;
pub mod routing;
pub use routing::RouteParams;

pub mod service;
