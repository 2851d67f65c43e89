//! The gateway trait: one JSON-RPC call to the daemon.
//!
//! Everything above this layer talks to the daemon through [`Gateway`], so
//! it can run against the HTTP daemon or the in-memory one used in tests.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DaemonError, Result, RpcError};
use crate::messages::{
    methods, ClaimPage, ClaimSearchParams, DaemonStatus, FileListParams, FilePage, ResolveParams,
    ResolveResult, SupportAbandonParams, SupportCreateParams, SupportListParams, SupportPage,
    Transaction,
};

/// Default daemon endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5279";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for [`crate::HttpGateway`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// A JSON-RPC call primitive.
///
/// Implementations perform exactly one request per call and never retry.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Call `method` with a parameter object and return the `result` value.
    ///
    /// A daemon `"error"` payload comes back as [`RpcError::Daemon`].
    async fn call(&self, method: &str, params: Value) -> Result<Value>;
}

#[async_trait]
impl<G: Gateway + ?Sized> Gateway for Arc<G> {
    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        (**self).call(method, params).await
    }
}

/// Split a response body into its `result` or its `error`.
pub fn parse_envelope(method: &str, body: Value) -> Result<Value> {
    let Value::Object(mut map) = body else {
        return Err(RpcError::InvalidResponse(format!(
            "{}: response is not an object",
            method
        )));
    };

    if let Some(error) = map.remove("error") {
        if !error.is_null() {
            return Err(RpcError::Daemon(DaemonError::from_value(error)));
        }
    }

    map.remove("result").ok_or_else(|| {
        RpcError::InvalidResponse(format!("{}: response has no result", method))
    })
}

async fn invoke<G, P, R>(gateway: &G, method: &str, params: &P) -> Result<R>
where
    G: Gateway + ?Sized,
    P: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let params = match serde_json::to_value(params) {
        Ok(Value::Null) => Value::Object(Map::new()),
        Ok(value) => value,
        Err(e) => return Err(RpcError::InvalidRequest(format!("{}: {}", method, e))),
    };
    let result = gateway.call(method, params).await?;
    serde_json::from_value(result)
        .map_err(|e| RpcError::InvalidResponse(format!("{}: {}", method, e)))
}

/// Typed wrappers over [`Gateway::call`] for the methods this library uses.
pub trait GatewayExt: Gateway {
    fn status(&self) -> impl std::future::Future<Output = Result<DaemonStatus>> + Send;

    fn resolve(
        &self,
        params: &ResolveParams,
    ) -> impl std::future::Future<Output = Result<ResolveResult>> + Send;

    fn claim_search(
        &self,
        params: &ClaimSearchParams,
    ) -> impl std::future::Future<Output = Result<ClaimPage>> + Send;

    fn file_list(
        &self,
        params: &FileListParams,
    ) -> impl std::future::Future<Output = Result<FilePage>> + Send;

    fn support_list(
        &self,
        params: &SupportListParams,
    ) -> impl std::future::Future<Output = Result<SupportPage>> + Send;

    fn support_create(
        &self,
        params: &SupportCreateParams,
    ) -> impl std::future::Future<Output = Result<Transaction>> + Send;

    fn support_abandon(
        &self,
        params: &SupportAbandonParams,
    ) -> impl std::future::Future<Output = Result<Transaction>> + Send;
}

impl<G: Gateway + ?Sized> GatewayExt for G {
    async fn status(&self) -> Result<DaemonStatus> {
        invoke(self, methods::STATUS, &Map::new()).await
    }

    async fn resolve(&self, params: &ResolveParams) -> Result<ResolveResult> {
        invoke(self, methods::RESOLVE, params).await
    }

    async fn claim_search(&self, params: &ClaimSearchParams) -> Result<ClaimPage> {
        invoke(self, methods::CLAIM_SEARCH, params).await
    }

    async fn file_list(&self, params: &FileListParams) -> Result<FilePage> {
        invoke(self, methods::FILE_LIST, params).await
    }

    async fn support_list(&self, params: &SupportListParams) -> Result<SupportPage> {
        invoke(self, methods::SUPPORT_LIST, params).await
    }

    async fn support_create(&self, params: &SupportCreateParams) -> Result<Transaction> {
        invoke(self, methods::SUPPORT_CREATE, params).await
    }

    async fn support_abandon(&self, params: &SupportAbandonParams) -> Result<Transaction> {
        invoke(self, methods::SUPPORT_ABANDON, params).await
    }
}
