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

//! Background task moving overflow-queued messages into a route's channel.

use crate::data_plane::route::RouteShared;
use crate::message::Message;
use crate::observability::{events, fields};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{OwnedPermit, Sender};
use tracing::{debug, trace, warn};

const COMPONENT: &str = "pump";

enum Reservation {
    Ready(OwnedPermit<Arc<Message>>),
    TimedOut,
    Closed,
}

/// Waits for one free channel slot, bounded by `timeout` when set.
async fn reserve_within(sender: Sender<Arc<Message>>, timeout: Option<Duration>) -> Reservation {
    let reserve = sender.reserve_owned();
    let reserved = match timeout {
        Some(timeout) => match tokio::time::timeout(timeout, reserve).await {
            Ok(reserved) => reserved,
            Err(_) => return Reservation::TimedOut,
        },
        None => reserve.await,
    };

    match reserved {
        Ok(permit) => Reservation::Ready(permit),
        Err(_) => Reservation::Closed,
    }
}

/// Drains the overflow queue of one route until it is empty or the route is
/// invalidated.
///
/// The head stays queued until a channel slot is held, so a concurrent
/// `deliver` always sees a non-empty queue while the pump has work and never
/// overtakes it.
pub(crate) async fn run(shared: Arc<RouteShared>) {
    let mut shutdown = shared.shutdown.subscribe();

    debug!(
        event = events::PUMP_START,
        component = COMPONENT,
        route_id = %shared.id,
        "pump started"
    );

    loop {
        let (msg_id, sender) = {
            let mut state = shared.state.lock();
            if state.invalid {
                break;
            }

            match (state.queue.peek(), state.sender.as_ref()) {
                (Some(head), Some(sender)) => (head.id, sender.clone()),
                _ => {
                    state.consuming = false;
                    debug!(
                        event = events::PUMP_DRAINED,
                        component = COMPONENT,
                        route_id = %shared.id,
                        "overflow queue drained"
                    );
                    return;
                }
            }
        };

        let reservation = tokio::select! {
            biased;
            _ = shutdown.changed() => None,
            reservation = reserve_within(sender, shared.config.timeout) => Some(reservation),
        };

        let Some(reservation) = reservation else {
            break;
        };

        match reservation {
            Reservation::Ready(permit) => {
                let mut state = shared.state.lock();
                if state.invalid {
                    break;
                }
                if let Some(message) = state.queue.remove() {
                    permit.send(message);
                    trace!(
                        event = events::PUMP_MOVE_OK,
                        component = COMPONENT,
                        route_id = %shared.id,
                        msg_id,
                        queue_size = state.queue.size(),
                        "moved queued message to channel"
                    );
                }
            }
            Reservation::TimedOut => {
                warn!(
                    event = events::PUMP_TIMEOUT,
                    component = COMPONENT,
                    route_id = %shared.id,
                    msg_id,
                    timeout = fields::format_timeout(shared.config.timeout).as_str(),
                    "consumer did not accept message in time"
                );
                let mut state = shared.state.lock();
                shared.invalidate(&mut state, fields::REASON_DELIVERY_TIMEOUT);
                break;
            }
            Reservation::Closed => {
                debug!(
                    event = events::PUMP_CONSUMER_GONE,
                    component = COMPONENT,
                    route_id = %shared.id,
                    "consumer dropped the stream"
                );
                let mut state = shared.state.lock();
                shared.invalidate(&mut state, fields::REASON_CONSUMER_GONE);
                break;
            }
        }
    }

    debug!(
        event = events::PUMP_STOPPED,
        component = COMPONENT,
        route_id = %shared.id,
        "pump stopped"
    );
}
