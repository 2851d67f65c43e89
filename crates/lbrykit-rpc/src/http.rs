//! HTTP transport for the daemon's JSON-RPC interface.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{Result, RpcError};
use crate::gateway::{parse_envelope, Gateway, GatewayConfig};

/// Gateway that POSTs `{"method", "params"}` to the configured endpoint.
///
/// # Example
///
/// ```rust,no_run
/// use lbrykit_rpc::{GatewayConfig, GatewayExt, HttpGateway};
///
/// # async fn example() -> lbrykit_rpc::Result<()> {
/// let gateway = HttpGateway::new(GatewayConfig::default())?;
/// let status = gateway.status().await?;
/// println!("running: {}", status.is_running);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpGateway {
    config: GatewayConfig,
    client: Client,
}

impl HttpGateway {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RpcError::Config(e.to_string()))?;

        Ok(Self { config, client })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        debug!("rpc {} {}", method, params);

        let body = json!({"method": method, "params": params});
        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| RpcError::Unreachable(format!("{}: {}", self.config.endpoint, e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RpcError::Unreachable(format!("{}: {}", self.config.endpoint, e)))?;

        // The daemon reports application errors with a 200 and an "error"
        // key; other statuses still carry a JSON body when they come from it.
        let value: Value = serde_json::from_str(&text).map_err(|e| {
            RpcError::InvalidResponse(format!("{}: HTTP {}: {}", method, status.as_u16(), e))
        })?;

        parse_envelope(method, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::GatewayExt;
    use crate::messages::{ResolveEntry, ResolveParams, SupportAbandonParams};
    use lbrykit_core::{Amount, ClaimId};
    use wiremock::matchers::{body_json, body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CID: &str = "b7c7082fd52a5b932b6f08c83645ac808b6ba801";

    fn gateway(server: &MockServer) -> HttpGateway {
        HttpGateway::new(GatewayConfig {
            endpoint: server.uri(),
            timeout_secs: 1,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_call_returns_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({"method": "status", "params": {}})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"jsonrpc": "2.0", "result": {"is_running": true}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let status = gateway(&server).status().await.unwrap();
        assert!(status.is_running);
    }

    #[tokio::test]
    async fn test_daemon_error_is_structured() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"method": "support_abandon"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "error": {
                    "code": -32500,
                    "message": "No supports found.",
                    "data": {"name": "Exception"}
                }
            })))
            .mount(&server)
            .await;

        let id: ClaimId = CID.parse().unwrap();
        let err = gateway(&server)
            .support_abandon(&SupportAbandonParams::new(id, Amount::ZERO))
            .await
            .unwrap_err();

        let daemon = err.daemon_error().unwrap();
        assert_eq!(daemon.code, Some(-32500));
        assert_eq!(daemon.name.as_deref(), Some("Exception"));
        assert_eq!(daemon.message, "No supports found.");
    }

    #[tokio::test]
    async fn test_resolve_sends_urls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({
                "method": "resolve",
                "params": {"urls": ["lbry://@chan/video"]}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {"lbry://@chan/video": {"claim_id": CID, "name": "video"}}
            })))
            .mount(&server)
            .await;

        let result = gateway(&server)
            .resolve(&ResolveParams::one("lbry://@chan/video"))
            .await
            .unwrap();
        match &result["lbry://@chan/video"] {
            ResolveEntry::Claim(claim) => assert_eq!(claim.claim_id.to_hex(), CID),
            other => panic!("unexpected entry: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_json_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = gateway(&server).call("status", json!({})).await.unwrap_err();
        assert!(matches!(err, RpcError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_unexpected_result_shape_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "nope"})))
            .mount(&server)
            .await;

        let err = gateway(&server).status().await.unwrap_err();
        assert!(matches!(err, RpcError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_unreachable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"result": {}}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let err = gateway(&server).call("status", json!({})).await.unwrap_err();
        assert!(matches!(err, RpcError::Unreachable(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_unreachable() {
        let gateway = HttpGateway::new(GatewayConfig {
            endpoint: "http://127.0.0.1:1".into(),
            timeout_secs: 1,
        })
        .unwrap();

        let err = gateway.call("status", json!({})).await.unwrap_err();
        assert!(matches!(err, RpcError::Unreachable(_)));
    }
}
