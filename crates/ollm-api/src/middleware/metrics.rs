//! HTTP 요청 metrics middleware.

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

use crate::metrics::{record_http_duration, record_http_request, record_http_response};

/// 라우트에 매칭되지 않은 요청의 path 라벨.
const UNMATCHED_PATH: &str = "unmatched";

/// HTTP 메트릭 수집.
///
/// path 라벨은 매칭된 라우트 템플릿을 사용하므로 스캐너가 임의 경로를
/// 요청해도 라벨 수가 늘어나지 않습니다. `/metrics` 스크레이프는 기록하지 않습니다.
pub async fn metrics_layer(request: Request, next: Next) -> Response {
    let path = match request.extensions().get::<MatchedPath>() {
        Some(matched) if matched.as_str() == "/metrics" => return next.run(request).await,
        Some(matched) => matched.as_str().to_owned(),
        None => UNMATCHED_PATH.to_owned(),
    };
    let method = request.method().to_string();
    let start = Instant::now();

    record_http_request(&method, &path);
    let response = next.run(request).await;
    record_http_response(&method, &path, response.status().as_u16());
    record_http_duration(&method, &path, start.elapsed().as_secs_f64());

    response
}
