use criterion::{criterion_group, criterion_main, Criterion};
use futures::executor::block_on;
use futures::future::BoxFuture;
use http::Method;
use serde_json::json;
use specrouter::spec::Response;
use specrouter::{Context, DispatchState, HandlerError, HandlerResult, Router};
use std::hint::black_box;

fn ok<'a>(_ctx: &'a Context, _state: &'a mut DispatchState) -> BoxFuture<'a, HandlerResult> {
    Box::pin(async { Ok(Some(json!({ "ok": true }))) })
}

fn fail<'a>(_ctx: &'a Context, _state: &'a mut DispatchState) -> BoxFuture<'a, HandlerResult> {
    Box::pin(async { Err(HandlerError::new("RequestErrorTimeout", "slow")) })
}

fn zoo_router() -> Router {
    let mut router = Router::new();
    let routes = [
        (Method::GET, "/zoo/animals"),
        (Method::POST, "/zoo/animals"),
        (Method::GET, "/zoo/animals/:id"),
        (Method::PUT, "/zoo/animals/:id"),
        (Method::DELETE, "/zoo/animals/:id"),
        (Method::GET, "/zoo/animals/:id/toys/:toy_id"),
        (
            Method::GET,
            "/zoo/:category/animals/:id/habitats/:habitat_id/sections/:section_id",
        ),
        (
            Method::POST,
            "/inventory/:warehouse_id/feeds/:feed_id/items/:item_id/batches/:batch_id",
        ),
        (Method::GET, "/complex/:a/:b/:c/:d/:e/:f/:g/:h/:i"),
        (Method::HEAD, "/zoo/health"),
    ];
    for (method, path) in routes {
        router.route(method, path, ok).expect("register route");
    }
    router
        .get("/zoo/failing", fail)
        .expect("register route")
        .on_error([
            Response::new().status(404).name("NotFound"),
            Response::new()
                .status(503)
                .name("Unavailable")
                .catch("DatabaseError")
                .catch("RequestError"),
        ]);
    router
}

fn bench_find_service(c: &mut Criterion) {
    let router = zoo_router();
    c.bench_function("find_service", |b| {
        let test_paths = [
            (Method::GET, "/zoo/animals/123"),
            (Method::GET, "/zoo/animals/123/toys/456"),
            (Method::GET, "/zoo/cats/animals/123/habitats/88/sections/5"),
            (Method::POST, "/inventory/1/feeds/2/items/3/batches/4"),
            (Method::GET, "/complex/1/2/3/4/5/6/7/8/9"),
            (Method::GET, "/zoo/animals?limit=10&offset=20"),
        ];
        b.iter(|| {
            for (method, path) in test_paths.iter() {
                let res = router.find_service(method, path);
                black_box(&res);
            }
        })
    });
}

fn bench_mounted_find_service(c: &mut Criterion) {
    let mut outer = Router::new();
    outer.mount("/api/v1", zoo_router());
    c.bench_function("find_service_mounted", |b| {
        b.iter(|| {
            let res = outer.find_service(&Method::GET, "/api/v1/zoo/animals/123/toys/456");
            black_box(&res);
        })
    });
}

fn bench_dispatch(c: &mut Criterion) {
    let router = zoo_router();
    c.bench_function("dispatch_success", |b| {
        b.iter(|| {
            let matched = router
                .find_service(&Method::GET, "/zoo/animals/123")
                .expect("route");
            let mut state = DispatchState::new();
            let body = block_on(matched.service.call(&matched.context(), &mut state));
            black_box((body, state));
        })
    });
    c.bench_function("dispatch_caught_failure", |b| {
        b.iter(|| {
            let matched = router
                .find_service(&Method::GET, "/zoo/failing")
                .expect("route");
            let mut state = DispatchState::new();
            let body = block_on(matched.service.call(&matched.context(), &mut state));
            black_box((body, state));
        })
    });
}

criterion_group!(
    benches,
    bench_find_service,
    bench_mounted_find_service,
    bench_dispatch
);
criterion_main!(benches);
