//! 라이선스 검증 REST 클라이언트
//!
//! Gumroad `licenses/verify` API를 호출합니다.
//! 응답: `{ success, message?, purchase: { refunded } }`

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::LicenseError;

pub const DEFAULT_LICENSE_ENDPOINT: &str = "https://api.gumroad.com/v2/licenses/verify";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// 검증 서비스 응답 요약
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseCheck {
    pub success: bool,
    pub refunded: bool,
    pub message: Option<String>,
}

#[async_trait]
pub trait LicenseVerifier: Send + Sync {
    /// 키 1개를 외부 서비스에 조회. 전송/파싱 실패는 `Transport`
    async fn verify(&self, key: &str) -> Result<LicenseCheck, LicenseError>;
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    purchase: Option<Purchase>,
}

#[derive(Debug, Deserialize)]
struct Purchase {
    #[serde(default)]
    refunded: bool,
}

impl From<VerifyResponse> for LicenseCheck {
    fn from(resp: VerifyResponse) -> Self {
        LicenseCheck {
            success: resp.success,
            refunded: resp.purchase.map(|p| p.refunded).unwrap_or(false),
            message: resp.message,
        }
    }
}

/// Gumroad 라이선스 검증 클라이언트
pub struct GumroadVerifier {
    http: reqwest::Client,
    endpoint: String,
    product_id: String,
}

impl GumroadVerifier {
    /// 응답이 없는 서버 때문에 시작이 멈추지 않도록 연결/요청 시간을 제한합니다.
    pub fn new(endpoint: impl Into<String>, product_id: impl Into<String>) -> Result<Self, LicenseError> {
        Self::with_timeout(endpoint, product_id, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        endpoint: impl Into<String>,
        product_id: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self, LicenseError> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT.min(request_timeout))
            .timeout(request_timeout)
            .build()
            .map_err(|e| LicenseError::Transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            product_id: product_id.into(),
        })
    }
}

#[async_trait]
impl LicenseVerifier for GumroadVerifier {
    async fn verify(&self, key: &str) -> Result<LicenseCheck, LicenseError> {
        tracing::debug!(endpoint = %self.endpoint, "verifying license key");

        let resp = self
            .http
            .post(&self.endpoint)
            .form(&[
                ("product_id", self.product_id.as_str()),
                ("license_key", key),
                ("increment_uses_count", "false"),
            ])
            .send()
            .await
            .map_err(|e| LicenseError::Transport(e.to_string()))?;

        // 잘못된 키는 404 + `{"success": false}` 로 오므로 상태 코드와 무관하게 본문을 파싱
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| LicenseError::Transport(e.to_string()))?;

        parse_verify_body(&body).map_err(|e| {
            tracing::warn!(status = %status, error = %e, "unexpected license server response");
            e
        })
    }
}

fn parse_verify_body(body: &str) -> Result<LicenseCheck, LicenseError> {
    serde_json::from_str::<VerifyResponse>(body)
        .map(LicenseCheck::from)
        .map_err(|e| LicenseError::Transport(format!("invalid response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        // 아무도 듣지 않는 포트로 연결 거부를 유도
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let verifier = GumroadVerifier::new(format!("http://{}/verify", addr), "product").unwrap();
        let err = verifier.verify("KEY").await.unwrap_err();
        assert!(matches!(err, LicenseError::Transport(_)));
        assert!(!err.is_rejection());
    }

    #[tokio::test]
    async fn test_stalled_server_times_out() {
        // 연결은 받지만 응답하지 않는 서버
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(3600)).await;
        });

        let verifier = GumroadVerifier::with_timeout(
            format!("http://{}/verify", addr),
            "product",
            Duration::from_millis(300),
        )
        .unwrap();
        let started = std::time::Instant::now();
        let err = verifier.verify("KEY").await.unwrap_err();
        assert!(matches!(err, LicenseError::Transport(_)));
        assert!(started.elapsed() < Duration::from_secs(10));
        server.abort();
    }

    #[test]
    fn test_parse_success_response() {
        let check = parse_verify_body(
            r#"{"success":true,"uses":3,"purchase":{"refunded":false,"email":"a@b.c"}}"#,
        )
        .unwrap();
        assert!(check.success);
        assert!(!check.refunded);
    }

    #[test]
    fn test_parse_refunded_response() {
        let check = parse_verify_body(r#"{"success":true,"purchase":{"refunded":true}}"#).unwrap();
        assert!(check.refunded);
    }

    #[test]
    fn test_parse_failure_response() {
        let check = parse_verify_body(
            r#"{"success":false,"message":"That license does not exist for the provided product."}"#,
        )
        .unwrap();
        assert!(!check.success);
        assert!(check.message.unwrap().contains("does not exist"));
    }

    #[test]
    fn test_parse_garbage_is_transport_error() {
        let err = parse_verify_body("<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, LicenseError::Transport(_)));
        assert!(!err.is_rejection());
    }
}
