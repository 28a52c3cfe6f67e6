//! Data-plane layer.
//!
//! Owns the per-subscriber [`Route`](crate::Route): the bounded output channel on
//! the hot path, the policy-configured overflow queue behind it and the pump task
//! draining one into the other. `deliver` never blocks; only the pump waits, and
//! only up to the route's delivery timeout.
//!
//! ```
//! use pubsub_router::{Message, QueueCapacity, Route, RouteConfig};
//! use std::sync::Arc;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let config = RouteConfig::new("/telemetry", 1).with_queue_size(QueueCapacity::Bounded(1));
//! let (route, mut messages) = Route::new(config).unwrap();
//!
//! // One message fits the channel, one waits in the overflow queue.
//! route.deliver(Arc::new(Message::new(1, "/telemetry", Vec::new()))).unwrap();
//! route.deliver(Arc::new(Message::new(2, "/telemetry", Vec::new()))).unwrap();
//! assert_eq!(route.queue_size(), 1);
//!
//! // A third one saturates the queue and the route gives up.
//! assert!(route.deliver(Arc::new(Message::new(3, "/telemetry", Vec::new()))).is_err());
//! assert!(route.is_invalid());
//! assert_eq!(messages.recv().await.unwrap().id, 1);
//! # });
//! ```

pub(crate) mod overflow_queue;
pub(crate) mod pump;
pub(crate) mod route;
pub(crate) mod route_messages;
