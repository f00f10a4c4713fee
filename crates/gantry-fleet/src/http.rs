//! HTTP orchestrator client.
//!
//! Talks to the orchestrator REST API:
//!
//! - `GET  /api/v1/clusters/{cluster}/services/{service}` — describe
//! - `POST /api/v1/clusters/{cluster}/services/{service}/scale` — set
//!   the desired count, body `{"target": N}`
//!
//! Every call runs under a bounded timeout so a stalled orchestrator
//! surfaces as [`FleetError::Timeout`] instead of hanging the webhook
//! response.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::{Request, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::fleet::{AgentFleet, FleetError, FleetResult, ServiceState};

/// Wire form of the describe response.
#[derive(Deserialize)]
struct ServiceWire {
    desired_count: u32,
    #[serde(default)]
    running_count: u32,
}

/// Scale request body.
#[derive(Serialize)]
struct ScaleRequest {
    target: u32,
}

/// Orchestrator client over plain HTTP.
#[derive(Clone)]
pub struct HttpFleet {
    client: Client<HttpConnector, Full<Bytes>>,
    base_url: String,
    region: Option<String>,
    timeout: Duration,
}

impl HttpFleet {
    /// Create a client for the orchestrator at `base_url`.
    ///
    /// `region`, when set, is forwarded as an `x-region` header so
    /// multi-region gateways can route the call.
    pub fn new(base_url: impl Into<String>, region: Option<String>, timeout: Duration) -> Self {
        let client = Client::builder(TokioExecutor::new()).build_http();
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            region,
            timeout,
        }
    }

    fn service_uri(&self, cluster: &str, service: &str) -> String {
        format!(
            "{}/api/v1/clusters/{cluster}/services/{service}",
            self.base_url
        )
    }

    fn request(&self, method: &str, uri: &str) -> http::request::Builder {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("accept", "application/json")
            .header("user-agent", "gantry-fleet/0.1");
        if let Some(region) = &self.region {
            builder = builder.header("x-region", region);
        }
        builder
    }

    async fn send(&self, req: Request<Full<Bytes>>) -> FleetResult<(StatusCode, Bytes)> {
        let uri = req.uri().to_string();

        // The timeout covers the whole exchange, response body included:
        // an orchestrator that sends headers and then stalls the body is
        // as stalled as one that never answers.
        let exchange = async {
            let resp = self
                .client
                .request(req)
                .await
                .map_err(|e| FleetError::Http(e.to_string()))?;
            let status = resp.status();
            let body = resp
                .into_body()
                .collect()
                .await
                .map_err(|e| FleetError::Http(e.to_string()))?
                .to_bytes();
            Ok::<_, FleetError>((status, body))
        };

        let (status, body) = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| FleetError::Timeout {
                uri: uri.clone(),
                after: self.timeout,
            })??;
        debug!(%uri, %status, "orchestrator call completed");
        Ok((status, body))
    }
}

#[async_trait]
impl AgentFleet for HttpFleet {
    async fn describe_service(&self, cluster: &str, service: &str) -> FleetResult<ServiceState> {
        let uri = self.service_uri(cluster, service);
        let req = self
            .request("GET", &uri)
            .body(Full::new(Bytes::new()))
            .map_err(|e| FleetError::Http(e.to_string()))?;

        let (status, body) = self.send(req).await?;
        if status == StatusCode::NOT_FOUND {
            return Err(FleetError::UnknownService {
                cluster: cluster.to_string(),
                service: service.to_string(),
            });
        }
        if !status.is_success() {
            return Err(FleetError::Status {
                uri,
                status: status.as_u16(),
            });
        }

        let wire: ServiceWire =
            serde_json::from_slice(&body).map_err(|e| FleetError::Decode(e.to_string()))?;
        Ok(ServiceState {
            cluster: cluster.to_string(),
            service: service.to_string(),
            desired_count: wire.desired_count,
            running_count: wire.running_count,
        })
    }

    async fn update_service(&self, cluster: &str, service: &str, desired: u32) -> FleetResult<()> {
        let uri = format!("{}/scale", self.service_uri(cluster, service));
        let body = serde_json::to_vec(&ScaleRequest { target: desired })
            .map_err(|e| FleetError::Decode(e.to_string()))?;
        let req = self
            .request("POST", &uri)
            .header("content-type", "application/json")
            .body(Full::new(Bytes::from(body)))
            .map_err(|e| FleetError::Http(e.to_string()))?;

        let (status, _) = self.send(req).await?;
        if status == StatusCode::NOT_FOUND {
            return Err(FleetError::UnknownService {
                cluster: cluster.to_string(),
                service: service.to_string(),
            });
        }
        if !status.is_success() {
            return Err(FleetError::Status {
                uri,
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
