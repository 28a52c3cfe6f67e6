//! Control-plane layer.
//!
//! Owns the route table and the [`Router`](crate::Router) that registers,
//! replaces and evicts routes. Subscribing with the same path and params as an
//! existing route closes the old one, so a reconnecting subscriber never ends up
//! with two live streams.
//!
//! ```
//! use pubsub_router::service::Startable;
//! use pubsub_router::{RouteParams, Router, RouterConfig, SubscriptionRouter};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let router = SubscriptionRouter::new("control-plane-doc", RouterConfig::default());
//! router.start().await.unwrap();
//!
//! let params = RouteParams::from_iter([("user_id", "u1")]);
//! let first = router.subscribe(router.route_config("/topic", params.clone())).unwrap();
//! let second = router.subscribe(router.route_config("/topic", params)).unwrap();
//!
//! assert!(first.route.is_invalid());
//! assert_eq!(router.route_count(), 1);
//! router.unsubscribe(&second.route).unwrap();
//! assert!(router.unsubscribe(&second.route).is_err());
//! # });
//! ```

pub(crate) mod route_table;
pub(crate) mod router;
