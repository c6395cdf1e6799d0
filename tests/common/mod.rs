#![allow(dead_code)]

pub mod temp_files {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

    /// Write `content` to a uniquely named file in the temp dir
    pub fn create_temp_file(content: &str, ext: &str) -> PathBuf {
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::SeqCst);
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();

        let path = std::env::temp_dir().join(format!(
            "specrouter_test_{}_{}_{}.{}",
            std::process::id(),
            counter,
            nanos,
            ext
        ));

        std::fs::write(&path, content).unwrap();
        path
    }
}

pub mod handlers {
    use futures::future::BoxFuture;
    use http::Method;
    use serde_json::{json, Value};
    use specrouter::{Context, DispatchState, HandlerResult, Router};

    /// Returns `"ok"`
    pub fn ok<'a>(_ctx: &'a Context, _state: &'a mut DispatchState) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async { Ok(Some(json!("ok"))) })
    }

    /// Returns the path params and query it was called with
    pub fn echo<'a>(ctx: &'a Context, _state: &'a mut DispatchState) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let params: serde_json::Map<String, Value> = ctx
                .params
                .iter()
                .map(|(k, v)| (k.to_string(), Value::String(v.clone())))
                .collect();
            Ok(Some(json!({ "params": params, "query": ctx.query })))
        })
    }

    /// Resolve and invoke in one step, the way a transport would
    pub async fn dispatch(
        router: &Router,
        method: Method,
        path: &str,
    ) -> Option<(Option<Value>, DispatchState)> {
        let matched = router.find_service(&method, path)?;
        let ctx = matched.context();
        let mut state = DispatchState::new();
        let body = matched.service.call(&ctx, &mut state).await;
        Some((body, state))
    }
}
