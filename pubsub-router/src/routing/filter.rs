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

//! Message-filter predicate applied by routes before admission.

use crate::routing::RouteParams;
use std::collections::HashMap;

/// Reports whether a message filter selects a route with the given params.
///
/// An empty filter is a broadcast and matches every route. Otherwise every
/// filter key must be present in `params` with an equal value; a filter key the
/// route does not know about is a non-match. Keys only present in `params` are
/// not consulted.
pub fn matches(params: &RouteParams, filter: &HashMap<String, String>) -> bool {
    filter
        .iter()
        .all(|(key, value)| params.get(key) == Some(value.as_str()))
}
