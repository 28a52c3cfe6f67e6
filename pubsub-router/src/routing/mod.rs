//! Routing layer.
//!
//! Owns subscription parameters and the pure filter predicate deciding whether a
//! published message is relevant to a route. Nothing here holds state or locks.
//!
//! ```
//! use pubsub_router::routing::{matches, RouteParams};
//! use std::collections::HashMap;
//!
//! let params = RouteParams::from_iter([("user_id", "u1"), ("device", "phone")]);
//!
//! let mut filter = HashMap::new();
//! assert!(matches(&params, &filter));
//!
//! filter.insert("user_id".to_string(), "u1".to_string());
//! assert!(matches(&params, &filter));
//!
//! filter.insert("region".to_string(), "eu".to_string());
//! assert!(!matches(&params, &filter));
//! ```

mod filter;
mod route_params;

pub use filter::matches;
pub use route_params::RouteParams;
