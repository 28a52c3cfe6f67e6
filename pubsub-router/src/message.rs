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

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

///
/// [`Message`] is the unit a publisher hands to the router. It is shared as an
/// `Arc<Message>` once dispatched, so every route sees the same immutable value.
///
/// The optional filter narrows which routes on [`path`](Message::path) receive the
/// message; see [`matches`](crate::routing::matches).
///
/// # Examples
///
/// ```
/// use pubsub_router::Message;
///
/// let message = Message::new(42, "/orders", b"created".to_vec())
///     .with_filter("user_id", "u1");
///
/// assert_eq!(message.id, 42);
/// assert_eq!(message.filters().get("user_id").map(String::as_str), Some("u1"));
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub path: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub application_id: String,
    #[serde(default)]
    pub body: Vec<u8>,
    #[serde(default)]
    filters: HashMap<String, String>,
}

impl Message {
    pub fn new(id: u64, path: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            id,
            path: path.into(),
            body,
            ..Default::default()
        }
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_filter(key, value);
        self
    }

    pub fn set_filter(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.filters.insert(key.into(), value.into());
    }

    pub fn filters(&self) -> &HashMap<String, String> {
        &self.filters
    }
}
