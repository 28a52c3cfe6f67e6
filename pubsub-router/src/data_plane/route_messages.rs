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

//! Consumer side of a route: the ordered message stream.

use crate::message::Message;
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::Receiver;
use uuid::Uuid;

/// Ordered stream of messages admitted by one [`Route`](crate::Route).
///
/// The stream ends exactly once, after the route is invalidated and everything
/// already buffered has been read. Dropping it tells the route its consumer is
/// gone.
#[derive(Debug)]
pub struct RouteMessages {
    route_id: Uuid,
    receiver: Receiver<Arc<Message>>,
}

impl RouteMessages {
    pub(crate) fn new(route_id: Uuid, receiver: Receiver<Arc<Message>>) -> Self {
        Self { route_id, receiver }
    }

    pub fn route_id(&self) -> Uuid {
        self.route_id
    }

    /// Waits for the next message; `None` once the route is closed and drained.
    pub async fn recv(&mut self) -> Option<Arc<Message>> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Result<Arc<Message>, TryRecvError> {
        self.receiver.try_recv()
    }
}

impl Stream for RouteMessages {
    type Item = Arc<Message>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::RouteMessages;
    use crate::message::Message;
    use futures::StreamExt;
    use std::sync::Arc;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    #[tokio::test]
    async fn stream_yields_in_order_then_ends() {
        let (sender, receiver) = mpsc::channel(4);
        let mut messages = RouteMessages::new(Uuid::new_v4(), receiver);

        for id in 0..3 {
            sender
                .send(Arc::new(Message::new(id, "/topic", Vec::new())))
                .await
                .expect("channel should accept message");
        }
        drop(sender);

        let ids: Vec<u64> = (&mut messages).map(|message| message.id).collect().await;
        assert_eq!(ids, vec![0, 1, 2]);
        assert!(messages.recv().await.is_none());
    }
}
