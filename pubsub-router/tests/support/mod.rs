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

use pubsub_router::service::Startable;
use pubsub_router::{Message, RouteConfig, RouteMessages, RouterConfig, SubscriptionRouter};
use std::sync::Arc;
use std::time::Duration;

const RECV_TIMEOUT: Duration = Duration::from_secs(2);

pub(crate) fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[allow(dead_code)]
pub(crate) fn message(id: u64, path: &str) -> Arc<Message> {
    Arc::new(Message::new(id, path, id.to_be_bytes().to_vec()))
}

#[allow(dead_code)]
pub(crate) fn filtered_message(id: u64, path: &str, key: &str, value: &str) -> Arc<Message> {
    Arc::new(Message::new(id, path, Vec::new()).with_filter(key, value))
}

#[allow(dead_code)]
pub(crate) async fn started_router(name: &str, config: RouterConfig) -> SubscriptionRouter {
    let router = SubscriptionRouter::new(name, config);
    router
        .start()
        .await
        .expect("router start should succeed");
    router
}

#[allow(dead_code)]
pub(crate) fn route_config(path: &str, channel_size: usize) -> RouteConfig {
    RouteConfig::new(path, channel_size)
}

/// Receives the next message, failing the test instead of hanging.
#[allow(dead_code)]
pub(crate) async fn recv_id(messages: &mut RouteMessages) -> Option<u64> {
    tokio::time::timeout(RECV_TIMEOUT, messages.recv())
        .await
        .expect("receive should not hang")
        .map(|message| message.id)
}

/// Reads until end-of-stream and returns the ids seen.
#[allow(dead_code)]
pub(crate) async fn drain_ids(messages: &mut RouteMessages) -> Vec<u64> {
    let mut ids = Vec::new();
    while let Some(id) = recv_id(messages).await {
        ids.push(id);
    }
    ids
}
