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

//! json5-backed configuration for routes, the router and the service.
//!
//! ```
//! use pubsub_router::config::{Config, QueueCapacity};
//! use std::time::Duration;
//!
//! let config = Config::from_json5_str(
//!     r#"{
//!         service: { stop_grace_period_ms: 500 },
//!         router: {
//!             route_defaults: { channel_size: 32, queue_size: -1, delivery_timeout_ms: 250 },
//!         },
//!     }"#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.service.stop_grace_period(), Duration::from_millis(500));
//! assert_eq!(config.router.route_defaults.queue_size, QueueCapacity::Unbounded);
//! ```

use crate::routing::RouteParams;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Duration;

const DEFAULT_CHANNEL_SIZE: usize = 10;
const DEFAULT_STOP_GRACE_PERIOD_MS: u64 = 2_000;
const DEFAULT_HEALTH_CHECK_FREQUENCY_MS: u64 = 60_000;
const DEFAULT_HEALTH_CHECK_THRESHOLD: u32 = 1;

/// Failures while loading or validating configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(json5::Error),
    InvalidChannelSize,
    InvalidQueueSize(i64),
    /// `Bounded(0)`; use `Disabled` to turn overflow off.
    EmptyBoundedQueue,
    InvalidHealthCheckThreshold,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "unable to read config file: {err}"),
            ConfigError::Parse(err) => write!(f, "unable to parse config: {err}"),
            ConfigError::InvalidChannelSize => write!(f, "channel_size must be positive"),
            ConfigError::InvalidQueueSize(size) => {
                write!(f, "queue_size must be -1, 0 or positive, got {size}")
            }
            ConfigError::EmptyBoundedQueue => {
                write!(f, "a bounded queue_size must be positive; use 0 to disable overflow")
            }
            ConfigError::InvalidHealthCheckThreshold => {
                write!(f, "health_check_threshold must be positive")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

/// Admission policy of a route's overflow queue.
///
/// Serialized as a plain integer: `0` disables overflow, `-1` is unbounded and a
/// positive value bounds the queue.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum QueueCapacity {
    #[default]
    Disabled,
    Bounded(usize),
    Unbounded,
}

impl TryFrom<i64> for QueueCapacity {
    type Error = ConfigError;

    fn try_from(size: i64) -> Result<Self, Self::Error> {
        match size {
            0 => Ok(QueueCapacity::Disabled),
            -1 => Ok(QueueCapacity::Unbounded),
            size if size > 0 => usize::try_from(size)
                .map(QueueCapacity::Bounded)
                .map_err(|_| ConfigError::InvalidQueueSize(size)),
            size => Err(ConfigError::InvalidQueueSize(size)),
        }
    }
}

impl From<QueueCapacity> for i64 {
    fn from(capacity: QueueCapacity) -> Self {
        match capacity {
            QueueCapacity::Disabled => 0,
            QueueCapacity::Bounded(capacity) => i64::try_from(capacity).unwrap_or(i64::MAX),
            QueueCapacity::Unbounded => -1,
        }
    }
}

/// Optional durations stored as whole milliseconds, `0` meaning "disabled".
mod optional_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub(super) fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let millis = value
            .map(|duration| u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0);
        serializer.serialize_u64(millis)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        let millis = u64::deserialize(deserializer)?;
        Ok((millis > 0).then(|| Duration::from_millis(millis)))
    }
}

/// Everything the router needs to build one [`Route`](crate::Route).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteConfig {
    pub path: String,
    #[serde(default)]
    pub params: RouteParams,
    pub channel_size: usize,
    #[serde(default)]
    pub queue_size: QueueCapacity,
    #[serde(default, rename = "timeout_ms", with = "optional_millis")]
    pub timeout: Option<Duration>,
}

impl RouteConfig {
    pub fn new(path: impl Into<String>, channel_size: usize) -> Self {
        Self {
            path: path.into(),
            params: RouteParams::default(),
            channel_size,
            queue_size: QueueCapacity::Disabled,
            timeout: None,
        }
    }

    pub fn with_params(mut self, params: RouteParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_queue_size(mut self, queue_size: QueueCapacity) -> Self {
        self.queue_size = queue_size;
        self
    }

    /// Sets the delivery timeout; a zero duration disables it.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channel_size == 0 {
            return Err(ConfigError::InvalidChannelSize);
        }
        if self.queue_size == QueueCapacity::Bounded(0) {
            return Err(ConfigError::EmptyBoundedQueue);
        }
        Ok(())
    }
}

/// Route settings applied when the router builds a route for a subscriber.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RouteDefaults {
    pub channel_size: usize,
    pub queue_size: QueueCapacity,
    pub delivery_timeout_ms: u64,
}

impl Default for RouteDefaults {
    fn default() -> Self {
        Self {
            channel_size: DEFAULT_CHANNEL_SIZE,
            queue_size: QueueCapacity::Disabled,
            delivery_timeout_ms: 0,
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RouterConfig {
    pub route_defaults: RouteDefaults,
}

impl RouterConfig {
    /// Builds a route configuration for `path` from the configured defaults.
    pub fn route_config(&self, path: impl Into<String>, params: RouteParams) -> RouteConfig {
        let defaults = &self.route_defaults;
        RouteConfig::new(path, defaults.channel_size)
            .with_params(params)
            .with_queue_size(defaults.queue_size)
            .with_timeout(Duration::from_millis(defaults.delivery_timeout_ms))
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ServiceConfig {
    pub stop_grace_period_ms: u64,
    pub health_check_frequency_ms: u64,
    pub health_check_threshold: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            stop_grace_period_ms: DEFAULT_STOP_GRACE_PERIOD_MS,
            health_check_frequency_ms: DEFAULT_HEALTH_CHECK_FREQUENCY_MS,
            health_check_threshold: DEFAULT_HEALTH_CHECK_THRESHOLD,
        }
    }
}

impl ServiceConfig {
    /// Time each module is given to stop.
    pub fn stop_grace_period(&self) -> Duration {
        Duration::from_millis(self.stop_grace_period_ms)
    }

    pub fn health_check_frequency(&self) -> Duration {
        Duration::from_millis(self.health_check_frequency_ms)
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    pub service: ServiceConfig,
    pub router: RouterConfig,
}

impl Config {
    pub fn from_json5_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = json5::from_str(contents).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_json5_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let defaults = &self.router.route_defaults;
        if defaults.channel_size == 0 {
            return Err(ConfigError::InvalidChannelSize);
        }
        if defaults.queue_size == QueueCapacity::Bounded(0) {
            return Err(ConfigError::EmptyBoundedQueue);
        }
        if self.service.health_check_threshold == 0 {
            return Err(ConfigError::InvalidHealthCheckThreshold);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, ConfigError, QueueCapacity, RouteConfig};
    use crate::routing::RouteParams;
    use std::time::Duration;

    #[test]
    fn empty_document_yields_defaults() {
        let config = Config::from_json5_str("{}").expect("empty config should parse");

        assert_eq!(config, Config::default());
        assert_eq!(config.service.stop_grace_period(), Duration::from_secs(2));
        assert_eq!(config.router.route_defaults.channel_size, 10);
    }

    #[test]
    fn queue_capacity_parses_integer_policies() {
        assert_eq!(QueueCapacity::try_from(0).ok(), Some(QueueCapacity::Disabled));
        assert_eq!(
            QueueCapacity::try_from(-1).ok(),
            Some(QueueCapacity::Unbounded)
        );
        assert_eq!(
            QueueCapacity::try_from(5).ok(),
            Some(QueueCapacity::Bounded(5))
        );
        assert!(matches!(
            QueueCapacity::try_from(-2),
            Err(ConfigError::InvalidQueueSize(-2))
        ));
    }

    #[test]
    fn invalid_queue_size_is_a_parse_error() {
        let result =
            Config::from_json5_str("{ router: { route_defaults: { queue_size: -3 } } }");

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn zero_channel_size_is_rejected() {
        let result =
            Config::from_json5_str("{ router: { route_defaults: { channel_size: 0 } } }");

        assert!(matches!(result, Err(ConfigError::InvalidChannelSize)));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(Config::from_json5_str("{ routr: {} }").is_err());
    }

    #[test]
    fn route_config_reads_timeout_in_millis() {
        let route: RouteConfig = json5::from_str(
            "{ path: '/topic', channel_size: 4, queue_size: 2, timeout_ms: 15, params: { user_id: 'u1' } }",
        )
        .expect("route config should parse");

        assert_eq!(route.queue_size, QueueCapacity::Bounded(2));
        assert_eq!(route.timeout, Some(Duration::from_millis(15)));
        assert_eq!(route.params.get("user_id"), Some("u1"));
    }

    #[test]
    fn zero_timeout_disables_delivery_timeout() {
        let route = RouteConfig::new("/topic", 1).with_timeout(Duration::ZERO);

        assert_eq!(route.timeout, None);
    }

    #[test]
    fn router_defaults_build_route_config() {
        let config = Config::from_json5_str(
            "{ router: { route_defaults: { channel_size: 3, queue_size: -1, delivery_timeout_ms: 20 } } }",
        )
        .expect("config should parse");

        let route = config
            .router
            .route_config("/orders", RouteParams::from_iter([("user_id", "u1")]));

        assert_eq!(route.path, "/orders");
        assert_eq!(route.channel_size, 3);
        assert_eq!(route.queue_size, QueueCapacity::Unbounded);
        assert_eq!(route.timeout, Some(Duration::from_millis(20)));
    }

    #[test]
    fn empty_bounded_queue_is_rejected() {
        let route = RouteConfig::new("/topic", 1).with_queue_size(QueueCapacity::Bounded(0));
        assert!(matches!(route.validate(), Err(ConfigError::EmptyBoundedQueue)));

        let mut config = Config::default();
        config.router.route_defaults.queue_size = QueueCapacity::Bounded(0);
        assert!(matches!(config.validate(), Err(ConfigError::EmptyBoundedQueue)));
    }
}
