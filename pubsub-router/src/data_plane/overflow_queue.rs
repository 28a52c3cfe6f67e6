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

//! FIFO buffer absorbing messages that did not fit a route's output channel.

use std::collections::VecDeque;

/// Overflow FIFO owned by a single route.
///
/// Admission policy lives with the route; the queue only stores and orders.
#[derive(Debug)]
pub(crate) struct OverflowQueue<T> {
    items: VecDeque<T>,
}

impl<T> OverflowQueue<T> {
    /// Creates a queue pre-sized for `capacity_hint` entries.
    pub(crate) fn new(capacity_hint: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity_hint),
        }
    }

    pub(crate) fn push(&mut self, item: T) {
        self.items.push_back(item);
    }

    pub(crate) fn peek(&self) -> Option<&T> {
        self.items.front()
    }

    /// Removes the head. Popping an empty queue is a no-op.
    pub(crate) fn remove(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    pub(crate) fn size(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drops every queued entry and returns how many were discarded.
    pub(crate) fn clear(&mut self) -> usize {
        let discarded = self.items.len();
        self.items.clear();
        discarded
    }
}
