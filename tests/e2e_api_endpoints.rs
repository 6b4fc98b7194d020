// End-to-end tests for the HTTP surface


#[cfg(test)]
mod tests {
    use crate::test_utils::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;
    use yield_aprs::{aggregate::AGGREGATE_KEY, api::router, store::KvStore};

    const RAW_AGGREGATE: &str = r#"{"0xaaa":5.0,"0xbbb":3.25}"#;

    #[tokio::test]
    async fn test_unknown_path_serves_cached_aggregate() {
        let moola = StaticSource::new("moola", &[("0xaaa", 1.0)]);
        let ctx = TestContext::new(dyn_sources(&[&moola]));
        ctx.store.put(AGGREGATE_KEY, RAW_AGGREGATE.to_string()).await.unwrap();

        let response = ctx.get("/unknownpath").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "s-maxage=600");
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(body_string(response).await, RAW_AGGREGATE);
        assert_eq!(moola.calls(), 0);
    }

    #[tokio::test]
    async fn test_root_and_nested_paths_serve_cached_aggregate() {
        let moola = StaticSource::new("moola", &[("0xaaa", 1.0)]);
        let ctx = TestContext::new(dyn_sources(&[&moola]));
        ctx.store.put(AGGREGATE_KEY, RAW_AGGREGATE.to_string()).await.unwrap();

        for uri in ["/", "/moola/extra"] {
            let response = ctx.get(uri).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_string(response).await, RAW_AGGREGATE);
        }
        assert_eq!(moola.calls(), 0);
    }

    #[tokio::test]
    async fn test_undecodable_path_serves_cached_aggregate() {
        let moola = StaticSource::new("moola", &[("0xaaa", 1.0)]);
        let ctx = TestContext::new(dyn_sources(&[&moola]));
        ctx.store.put(AGGREGATE_KEY, RAW_AGGREGATE.to_string()).await.unwrap();

        let response = ctx.get("/%FF").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(response.headers()[header::CACHE_CONTROL], "s-maxage=600");
        assert_eq!(body_string(response).await, RAW_AGGREGATE);
        assert_eq!(moola.calls(), 0);
    }

    #[tokio::test]
    async fn test_source_names_match_the_raw_path_only() {
        let moola = StaticSource::new("moola", &[("0xaaa", 1.0)]);
        let ctx = TestContext::new(dyn_sources(&[&moola]));
        ctx.store.put(AGGREGATE_KEY, RAW_AGGREGATE.to_string()).await.unwrap();

        for uri in ["/mo%6Fla", "/moola/", "/MOOLA"] {
            let response = ctx.get(uri).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_string(response).await, RAW_AGGREGATE);
        }
        assert_eq!(moola.calls(), 0);

        let response = ctx.get("/moola?fresh=1").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(moola.calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_aggregate_serves_empty_object() {
        let ctx = TestContext::new(Vec::new());

        let response = ctx.get("/").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "{}");
        assert_eq!(ctx.store.writes(), 0);
    }

    #[tokio::test]
    async fn test_source_path_returns_fresh_snapshot_and_stores_it() {
        let moola = StaticSource::new("moola", &[("0xaaa", 4.5), ("0xccc", 1.5)]);
        let stcelo = StaticSource::new("stcelo", &[("0xddd", 4.75)]);
        let ctx = TestContext::new(dyn_sources(&[&moola, &stcelo]));
        ctx.store.put(AGGREGATE_KEY, RAW_AGGREGATE.to_string()).await.unwrap();

        let response = ctx.get("/moola").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert!(response.headers().get(header::CACHE_CONTROL).is_none());
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body, json!({ "0xaaa": 4.5, "0xccc": 1.5 }));
        assert_eq!(moola.calls(), 1);
        assert_eq!(stcelo.calls(), 0);

        let stored = ctx.wait_for_writes(2).await;
        assert_eq!(stored, aprs(&[("0xaaa", 4.5), ("0xbbb", 3.25), ("0xccc", 1.5)]));
    }

    #[tokio::test]
    async fn test_empty_snapshot_is_not_found() {
        let empty = StaticSource::new("moola", &[]);
        let ctx = TestContext::new(dyn_sources(&[&empty]));

        let response = ctx.get("/moola").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(empty.calls(), 1);
        assert_eq!(ctx.store.writes(), 0);
    }

    #[tokio::test]
    async fn test_failing_source_is_bad_gateway() {
        let broken = StaticSource::failing("stcelo");
        let ctx = TestContext::new(dyn_sources(&[&broken]));

        let response = ctx.get("/stcelo").await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["code"], 502);
        assert!(body["message"].as_str().unwrap().contains("stcelo"));
        assert_eq!(ctx.store.writes(), 0);
    }

    #[tokio::test]
    async fn test_source_path_accepts_any_method() {
        let stcelo = StaticSource::new("stcelo", &[("0xddd", 4.75)]);
        let ctx = TestContext::new(dyn_sources(&[&stcelo]));

        let request = Request::builder().method(Method::POST).uri("/stcelo").body(Body::empty()).unwrap();
        let response = router(ctx.state.clone()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(stcelo.calls(), 1);
    }
}
