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

//! Route-table storage owner: routes grouped by topic path.

use crate::data_plane::route::Route;
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

pub(crate) type RouteSnapshot = HashMap<String, Vec<Route>>;

struct TableState {
    routes: RouteSnapshot,
    accepting: bool,
}

/// Writes are serialized through a lock; dispatch reads a published snapshot
/// without taking it.
///
/// The table starts closed. Inserts are refused until [`RouteTable::open`]
/// and again after [`RouteTable::close_and_drain`]; both checks happen under
/// the write lock so no route can slip in behind a drain.
pub(crate) struct RouteTable {
    state: Mutex<TableState>,
    snapshot: ArcSwap<RouteSnapshot>,
}

impl RouteTable {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(TableState {
                routes: HashMap::new(),
                accepting: false,
            }),
            snapshot: ArcSwap::from_pointee(HashMap::new()),
        }
    }

    fn publish(&self, routes: &RouteSnapshot) {
        self.snapshot.store(Arc::new(routes.clone()));
    }

    pub(crate) fn open(&self) {
        self.state.lock().accepting = true;
    }

    /// Inserts a route and returns the routes it replaced: those on the same
    /// path with identical params. Returns `None` and leaves the table
    /// untouched while it is closed.
    pub(crate) fn insert_route(&self, route: Route) -> Option<Vec<Route>> {
        let mut state = self.state.lock();
        if !state.accepting {
            return None;
        }

        let slot = state.routes.entry(route.path().to_string()).or_default();
        let (replaced, kept): (Vec<Route>, Vec<Route>) = slot
            .drain(..)
            .partition(|existing| existing.params() == route.params());
        *slot = kept;
        slot.push(route);

        self.publish(&state.routes);
        Some(replaced)
    }

    /// Removes a route. Returns `true` only when the route was present.
    pub(crate) fn remove_route(&self, route: &Route) -> bool {
        let mut state = self.state.lock();
        let Some(slot) = state.routes.get_mut(route.path()) else {
            return false;
        };

        let before = slot.len();
        slot.retain(|existing| existing != route);
        let removed = slot.len() != before;
        if slot.is_empty() {
            state.routes.remove(route.path());
        }

        if removed {
            self.publish(&state.routes);
        }
        removed
    }

    /// Stops accepting routes, then removes and returns every route.
    pub(crate) fn close_and_drain(&self) -> Vec<Route> {
        let mut state = self.state.lock();
        state.accepting = false;
        let drained = state.routes.drain().flat_map(|(_, slot)| slot).collect();
        self.publish(&state.routes);
        drained
    }

    pub(crate) fn snapshot(&self) -> Arc<RouteSnapshot> {
        self.snapshot.load_full()
    }

    pub(crate) fn routes_for(&self, path: &str) -> Vec<Route> {
        self.snapshot.load().get(path).cloned().unwrap_or_default()
    }

    pub(crate) fn len(&self) -> usize {
        self.snapshot.load().values().map(Vec::len).sum()
    }
}
