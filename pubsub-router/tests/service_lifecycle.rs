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

mod support;

use async_trait::async_trait;
use pubsub_router::service::{
    Endpoint, FailureReason, HealthCheckable, HealthStatus, Module, ModuleError, Service,
    ServiceError, Startable, Stoppable,
};
use pubsub_router::{Config, RouteParams, Router, SubscriptionRouter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use support::{drain_ids, init_logging, message};

#[derive(Default)]
struct TestModule {
    name: String,
    prefix: Option<String>,
    fail_start: bool,
    fail_stop: bool,
    stop_delay: Duration,
    started: AtomicBool,
    stopped: AtomicBool,
    unhealthy: AtomicBool,
}

impl TestModule {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }
}

#[async_trait]
impl Startable for TestModule {
    async fn start(&self) -> Result<(), ModuleError> {
        if self.fail_start {
            return Err(format!("{} refused to start", self.name).into());
        }
        self.started.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl Stoppable for TestModule {
    async fn stop(&self) -> Result<(), ModuleError> {
        tokio::time::sleep(self.stop_delay).await;
        if self.fail_stop {
            return Err(format!("{} refused to stop", self.name).into());
        }
        self.stopped.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl HealthCheckable for TestModule {
    async fn check(&self) -> Result<(), ModuleError> {
        if self.unhealthy.load(Ordering::SeqCst) {
            Err("not responding".into())
        } else {
            Ok(())
        }
    }
}

impl Endpoint for TestModule {
    fn prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or_default()
    }
}

impl Module for TestModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn as_startable(&self) -> Option<&dyn Startable> {
        Some(self)
    }

    fn as_stoppable(&self) -> Option<&dyn Stoppable> {
        Some(self)
    }

    fn as_health_checkable(&self) -> Option<&dyn HealthCheckable> {
        Some(self)
    }

    fn as_endpoint(&self) -> Option<&dyn Endpoint> {
        self.prefix.as_ref().map(|_| self as &dyn Endpoint)
    }
}

fn config(json5: &str) -> Config {
    Config::from_json5_str(json5).expect("config should parse")
}

#[tokio::test]
async fn start_registers_every_capability() {
    init_logging();
    let router = Arc::new(SubscriptionRouter::new("router", Default::default()));
    let stream = Arc::new(TestModule::named("stream").with_prefix("/stream/"));

    let mut service = Service::new(Default::default());
    service.register_modules([
        router.clone() as Arc<dyn Module>,
        stream.clone() as Arc<dyn Module>,
    ]);
    assert_eq!(service.modules().len(), 2);

    service.start().await.expect("start should succeed");

    assert!(router.is_running());
    assert!(stream.started.load(Ordering::SeqCst));
    assert_eq!(
        service.endpoints().get("/stream/").map(String::as_str),
        Some("stream")
    );

    let statuses = service.health_status();
    assert_eq!(statuses.get("router"), Some(&HealthStatus::Unknown));
    assert_eq!(statuses.get("stream"), Some(&HealthStatus::Unknown));

    let checked = service.check_health().await;
    assert_eq!(checked.get("router"), Some(&HealthStatus::Healthy));
    assert_eq!(checked.get("stream"), Some(&HealthStatus::Healthy));
}

#[tokio::test]
async fn failed_start_does_not_block_other_modules() {
    init_logging();
    let broken = Arc::new(TestModule {
        fail_start: true,
        ..TestModule::named("broken")
    });
    let healthy = Arc::new(TestModule::named("healthy"));

    let mut service = Service::new(Default::default());
    service.register_module(broken.clone());
    service.register_module(healthy.clone());

    let err = service.start().await.expect_err("start should report failure");
    match &err {
        ServiceError::Start(failures) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].module, "broken");
            assert!(matches!(failures[0].reason, FailureReason::Failed(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(healthy.started.load(Ordering::SeqCst));
}

#[tokio::test]
async fn duplicate_endpoint_prefix_is_rejected() {
    init_logging();
    let mut service = Service::new(Default::default());
    service.register_module(Arc::new(TestModule::named("first").with_prefix("/api/")));
    service.register_module(Arc::new(TestModule::named("second").with_prefix("/api/")));

    let err = service.start().await.expect_err("duplicate prefix should fail");
    let failures = err.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].module, "second");
    assert!(matches!(
        &failures[0].reason,
        FailureReason::DuplicateEndpoint { prefix, registered_by }
            if prefix == "/api/" && registered_by == "first"
    ));
    assert_eq!(
        service.endpoints().get("/api/").map(String::as_str),
        Some("first")
    );
}

#[tokio::test]
async fn stop_bounds_each_module_by_grace_period() {
    init_logging();
    let config = config("{ service: { stop_grace_period_ms: 100 } }");

    let slow = Arc::new(TestModule {
        stop_delay: Duration::from_secs(5),
        ..TestModule::named("slow")
    });
    let failing = Arc::new(TestModule {
        fail_stop: true,
        ..TestModule::named("failing")
    });
    let quick = Arc::new(TestModule::named("quick"));

    let mut service = Service::new(config.service);
    service.register_module(slow.clone());
    service.register_module(failing.clone());
    service.register_module(quick.clone());
    service.start().await.expect("start should succeed");

    let started_at = tokio::time::Instant::now();
    let err = service.stop().await.expect_err("stop should report failures");
    assert!(started_at.elapsed() < Duration::from_secs(2));

    let ServiceError::Stop(failures) = err else {
        panic!("expected stop failures");
    };
    assert_eq!(failures.len(), 2);
    assert!(failures.iter().any(|failure| failure.module == "slow"
        && matches!(failure.reason, FailureReason::TimedOut(grace) if grace == Duration::from_millis(100))));
    assert!(failures
        .iter()
        .any(|failure| failure.module == "failing"
            && matches!(failure.reason, FailureReason::Failed(_))));

    assert!(quick.stopped.load(Ordering::SeqCst));
    assert!(!slow.stopped.load(Ordering::SeqCst));
}

#[tokio::test]
async fn health_turns_unhealthy_after_threshold_failures() {
    init_logging();
    let config = config("{ service: { health_check_threshold: 2 } }");
    let module = Arc::new(TestModule::named("flaky"));

    let mut service = Service::new(config.service);
    service.register_module(module.clone());
    service.start().await.expect("start should succeed");

    module.unhealthy.store(true, Ordering::SeqCst);
    let first = service.check_health().await;
    assert_eq!(first.get("flaky"), Some(&HealthStatus::Unknown));

    let second = service.check_health().await;
    assert_eq!(second.get("flaky"), Some(&HealthStatus::Unhealthy));
    assert_eq!(
        service.health_status().get("flaky"),
        Some(&HealthStatus::Unhealthy)
    );

    module.unhealthy.store(false, Ordering::SeqCst);
    let recovered = service.check_health().await;
    assert_eq!(recovered.get("flaky"), Some(&HealthStatus::Healthy));
}

#[tokio::test]
async fn periodic_monitor_records_health() {
    init_logging();
    let config = config("{ service: { health_check_frequency_ms: 10 } }");
    let module = Arc::new(TestModule::named("monitored"));

    let mut service = Service::new(config.service);
    service.register_module(module.clone());
    service.start().await.expect("start should succeed");

    let mut status = None;
    for _ in 0..100 {
        status = service.health_status().get("monitored").copied();
        if status == Some(HealthStatus::Healthy) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(status, Some(HealthStatus::Healthy));

    service.stop().await.expect("stop should succeed");
}

#[tokio::test]
async fn stopping_service_ends_subscriber_streams() {
    init_logging();
    let config = config(
        r#"{
            service: { stop_grace_period_ms: 500 },
            router: { route_defaults: { channel_size: 4 } },
        }"#,
    );
    let router = Arc::new(SubscriptionRouter::new("router", config.router));

    let mut service = Service::new(config.service);
    service.register_module(router.clone());
    service.start().await.expect("start should succeed");

    let mut subscription = router
        .subscribe(router.route_config("/chat", RouteParams::new()))
        .expect("subscribe should succeed");
    router
        .handle_message(message(1, "/chat"))
        .expect("dispatch should succeed");

    service.stop().await.expect("stop should succeed");

    assert!(!router.is_running());
    assert!(subscription.route.is_invalid());
    assert_eq!(drain_ids(&mut subscription.messages).await, vec![1]);
}

#[tokio::test]
async fn restart_does_not_duplicate_registrations() {
    init_logging();
    let config = config("{ service: { health_check_threshold: 2 } }");
    let module = Arc::new(TestModule::named("flaky").with_prefix("/flaky"));
    module.unhealthy.store(true, Ordering::SeqCst);

    let mut service = Service::new(config.service);
    service.register_module(module.clone());

    service.start().await.expect("first start should succeed");
    service.stop().await.expect("stop should succeed");
    service.start().await.expect("restart should succeed");

    assert_eq!(service.endpoints().len(), 1);
    assert_eq!(
        service.endpoints().get("/flaky").map(String::as_str),
        Some("flaky")
    );

    // One round is one failure, regardless of how often the service started.
    let first = service.check_health().await;
    assert_eq!(first.get("flaky"), Some(&HealthStatus::Unknown));
    let second = service.check_health().await;
    assert_eq!(second.get("flaky"), Some(&HealthStatus::Unhealthy));
}

#[tokio::test]
async fn restarted_service_routes_messages_again() {
    init_logging();
    let router = Arc::new(SubscriptionRouter::new("router", Default::default()));
    let mut service = Service::new(Default::default());
    service.register_module(router.clone());

    service.start().await.expect("start should succeed");
    service.stop().await.expect("stop should succeed");
    assert!(router
        .subscribe(router.route_config("/chat", RouteParams::new()))
        .is_err());

    service.start().await.expect("restart should succeed");
    let mut subscription = router
        .subscribe(router.route_config("/chat", RouteParams::new()))
        .expect("subscribe should succeed after restart");
    router
        .handle_message(message(9, "/chat"))
        .expect("dispatch should succeed");

    service.stop().await.expect("stop should succeed");
    assert_eq!(drain_ids(&mut subscription.messages).await, vec![9]);
}
