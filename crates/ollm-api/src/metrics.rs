//! Prometheus 메트릭 설정 및 유틸리티.
//!
//! HTTP 요청 메트릭과 인증 이벤트 메트릭을 수집하고 `/metrics` 엔드포인트로 노출합니다.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

/// Prometheus 메트릭 레코더를 설정하고 핸들을 반환합니다.
///
/// 레코더가 이미 설치되어 있으면 에러를 반환합니다.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
        )?
        .install_recorder()
}

// ============================================================================
// HTTP 메트릭 헬퍼 함수
// ============================================================================

/// HTTP 요청 카운터 증가.
pub fn record_http_request(method: &str, path: &str) {
    counter!("http_requests_total", "method" => method.to_string(), "path" => path.to_string())
        .increment(1);
}

/// HTTP 응답 카운터 증가.
pub fn record_http_response(method: &str, path: &str, status: u16) {
    counter!(
        "http_responses_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// HTTP 요청 지속 시간 기록.
pub fn record_http_duration(method: &str, path: &str, duration_secs: f64) {
    histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_secs);
}

// ============================================================================
// 인증 메트릭 헬퍼 함수
// ============================================================================

/// 인증 작업 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    SignUp,
    Login,
    Refresh,
}

impl AuthEvent {
    fn metric_name(&self) -> &'static str {
        match self {
            AuthEvent::SignUp => "auth_signup_total",
            AuthEvent::Login => "auth_login_total",
            AuthEvent::Refresh => "auth_refresh_total",
        }
    }
}

/// 인증 작업 결과 카운터 증가.
///
/// `result`는 `success`, `invalid_credentials`, `conflict` 같은 짧은 라벨입니다.
pub fn record_auth_event(event: AuthEvent, result: &'static str) {
    counter!(event.metric_name(), "result" => result).increment(1);
}

/// 접근 거부 카운터 증가.
pub fn record_access_denied(reason: &'static str) {
    counter!("auth_denied_total", "reason" => reason).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_event_metric_names() {
        assert_eq!(AuthEvent::Login.metric_name(), "auth_login_total");
        assert_eq!(AuthEvent::SignUp.metric_name(), "auth_signup_total");
        assert_eq!(AuthEvent::Refresh.metric_name(), "auth_refresh_total");
    }
}
