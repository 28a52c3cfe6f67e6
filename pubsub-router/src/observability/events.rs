//! Canonical structured event names used across `pubsub-router`.

// Route delivery events.
pub const ROUTE_CREATE: &str = "route_create";
pub const ROUTE_DELIVER_FILTERED: &str = "route_deliver_filtered";
pub const ROUTE_DELIVER_DIRECT: &str = "route_deliver_direct";
pub const ROUTE_DELIVER_QUEUED: &str = "route_deliver_queued";
pub const ROUTE_DELIVER_REJECTED: &str = "route_deliver_rejected";
pub const ROUTE_CHANNEL_FULL: &str = "route_channel_full";
pub const ROUTE_QUEUE_FULL: &str = "route_queue_full";
pub const ROUTE_INVALIDATED: &str = "route_invalidated";
pub const ROUTE_CLOSE_REJECTED: &str = "route_close_rejected";

// Pump events.
pub const PUMP_START: &str = "pump_start";
pub const PUMP_MOVE_OK: &str = "pump_move_ok";
pub const PUMP_DRAINED: &str = "pump_drained";
pub const PUMP_TIMEOUT: &str = "pump_timeout";
pub const PUMP_CONSUMER_GONE: &str = "pump_consumer_gone";
pub const PUMP_STOPPED: &str = "pump_stopped";

// Router events.
pub const ROUTER_SUBSCRIBE: &str = "router_subscribe";
pub const ROUTER_SUBSCRIBE_REPLACE: &str = "router_subscribe_replace";
pub const ROUTER_UNSUBSCRIBE: &str = "router_unsubscribe";
pub const ROUTER_DISPATCH: &str = "router_dispatch";
pub const ROUTER_DISPATCH_NO_ROUTES: &str = "router_dispatch_no_routes";
pub const ROUTER_EVICT_ROUTE: &str = "router_evict_route";
pub const ROUTER_START: &str = "router_start";
pub const ROUTER_STOP: &str = "router_stop";

// Service lifecycle events.
pub const SERVICE_MODULE_START: &str = "service_module_start";
pub const SERVICE_MODULE_START_FAILED: &str = "service_module_start_failed";
pub const SERVICE_REGISTER_HEALTH_CHECK: &str = "service_register_health_check";
pub const SERVICE_REGISTER_ENDPOINT: &str = "service_register_endpoint";
pub const SERVICE_MODULE_STOP: &str = "service_module_stop";
pub const SERVICE_MODULE_STOP_OK: &str = "service_module_stop_ok";
pub const SERVICE_MODULE_STOP_FAILED: &str = "service_module_stop_failed";
pub const SERVICE_MODULE_STOP_TIMEOUT: &str = "service_module_stop_timeout";
pub const SERVICE_HEALTH_CHECK_FAILED: &str = "service_health_check_failed";
pub const SERVICE_HEALTH_CHANGED: &str = "service_health_changed";
