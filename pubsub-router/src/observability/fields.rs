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

//! Canonical structured field keys and value-format helpers.

use crate::routing::RouteParams;
use std::time::Duration;

pub const EVENT: &str = "event";
pub const COMPONENT: &str = "component";
pub const ROUTE_ID: &str = "route_id";
pub const PATH: &str = "path";
pub const PARAMS: &str = "params";
pub const MSG_ID: &str = "msg_id";
pub const QUEUE_SIZE: &str = "queue_size";
pub const CAPACITY: &str = "capacity";
pub const MODULE: &str = "module";
pub const PREFIX: &str = "prefix";
pub const REASON: &str = "reason";
pub const ERR: &str = "err";

pub const NONE: &str = "none";

pub const REASON_CLOSED: &str = "closed";
pub const REASON_INVALID: &str = "invalid";
pub const REASON_CHANNEL_FULL: &str = "channel_full";
pub const REASON_QUEUE_FULL: &str = "queue_full";
pub const REASON_DELIVERY_TIMEOUT: &str = "delivery_timeout";
pub const REASON_CONSUMER_GONE: &str = "consumer_gone";
pub const REASON_REPLACED: &str = "replaced";
pub const REASON_UNSUBSCRIBED: &str = "unsubscribed";
pub const REASON_ROUTER_STOPPED: &str = "router_stopped";

/// Renders route params as `k1=v1,k2=v2` in key order, or `none` when empty.
pub fn format_params(params: &RouteParams) -> String {
    if params.is_empty() {
        return NONE.to_string();
    }

    params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(",")
}

pub fn format_timeout(timeout: Option<Duration>) -> String {
    timeout
        .map(|timeout| format!("{}ms", timeout.as_millis()))
        .unwrap_or_else(|| NONE.to_string())
}

#[cfg(test)]
mod tests {
    use super::{format_params, format_timeout, NONE};
    use crate::routing::RouteParams;
    use std::time::Duration;

    #[test]
    fn format_params_is_sorted_and_compact() {
        let params = RouteParams::from_iter([("user_id", "u1"), ("application_id", "app")]);

        assert_eq!(format_params(&params), "application_id=app,user_id=u1");
    }

    #[test]
    fn format_params_returns_none_when_empty() {
        assert_eq!(format_params(&RouteParams::default()), NONE);
    }

    #[test]
    fn format_timeout_falls_back_when_absent() {
        assert_eq!(format_timeout(None), NONE);
        assert_eq!(format_timeout(Some(Duration::from_millis(25))), "25ms");
    }
}
