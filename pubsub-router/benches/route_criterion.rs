use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use pubsub_router::service::Startable;
use pubsub_router::{
    Message, QueueCapacity, Route, RouteConfig, RouteParams, Router, RouterConfig,
    SubscriptionRouter,
};
use std::sync::Arc;
use tokio::runtime::Builder;

const PATH: &str = "/bench";
const CHANNEL_SIZE: usize = 1_024;
const BATCH: u64 = 512;
const FANOUT_ROUTES: usize = 64;

fn bench_message(id: u64) -> Arc<Message> {
    Arc::new(Message::new(id, PATH, vec![0; 64]).with_filter("user_id", "u1"))
}

fn route_criterion(c: &mut Criterion) {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("benchmark runtime should build");

    let mut deliver_group = c.benchmark_group("route_deliver");
    deliver_group.bench_function("direct_channel", |b| {
        b.iter_batched(
            || {
                let config = RouteConfig::new(PATH, CHANNEL_SIZE)
                    .with_params(RouteParams::from_iter([("user_id", "u1")]));
                Route::with_runtime(config, runtime.handle().clone())
                    .expect("route should build")
            },
            |(route, mut messages)| {
                for id in 0..BATCH {
                    route.deliver(bench_message(id)).expect("deliver should succeed");
                }
                while let Ok(message) = messages.try_recv() {
                    black_box(message);
                }
            },
            BatchSize::SmallInput,
        );
    });
    deliver_group.bench_function("filtered_out", |b| {
        let config = RouteConfig::new(PATH, CHANNEL_SIZE)
            .with_params(RouteParams::from_iter([("user_id", "someone-else")]));
        let (route, _messages) =
            Route::with_runtime(config, runtime.handle().clone()).expect("route should build");
        b.iter(|| {
            black_box(route.deliver(bench_message(0)).is_ok());
        });
    });
    deliver_group.bench_function("overflow_queue", |b| {
        b.iter_batched(
            || {
                let config =
                    RouteConfig::new(PATH, 1).with_queue_size(QueueCapacity::Unbounded);
                Route::with_runtime(config, runtime.handle().clone())
                    .expect("route should build")
            },
            |(route, messages)| {
                for id in 0..BATCH {
                    route.deliver(bench_message(id)).expect("deliver should succeed");
                }
                black_box(route.queue_size());
                let _ = route.close();
                drop(messages);
            },
            BatchSize::SmallInput,
        );
    });
    deliver_group.finish();

    let router = SubscriptionRouter::new("bench", RouterConfig::default());
    let mut subscriptions = runtime.block_on(async {
        router.start().await.expect("router should start");
        (0..FANOUT_ROUTES)
            .map(|index| {
                let params = RouteParams::from_iter([("subscriber", index.to_string())]);
                router
                    .subscribe(router.route_config(PATH, params))
                    .expect("subscribe should succeed")
            })
            .collect::<Vec<_>>()
    });

    let mut router_group = c.benchmark_group("router_dispatch");
    router_group.bench_function("fanout_64_routes", |b| {
        b.iter(|| {
            let offered = router
                .handle_message(Arc::new(Message::new(0, PATH, Vec::new())))
                .expect("dispatch should succeed");
            for subscription in &mut subscriptions {
                while let Ok(message) = subscription.messages.try_recv() {
                    black_box(message);
                }
            }
            black_box(offered);
        });
    });
    router_group.finish();
}

criterion_group!(benches, route_criterion);
criterion_main!(benches);
