use std::sync::Arc;

use serde::Deserialize;
use tokio::runtime::Runtime;

use super::{SubmitAdapter, SubmitError, SubmitFuture};
use crate::config::{PayloadEncoding, ResponseCheck, WebhookEndpoint};
use crate::form::FormValues;

/// Runtime that drives HTTP delivery. gpui runs its own executor, so reqwest gets a
/// small dedicated tokio runtime.
pub fn transport_runtime() -> Result<Arc<Runtime>, SubmitError> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("leadform-transport")
        .enable_all()
        .build()
        .map(Arc::new)
        .map_err(|error| SubmitError::Runtime(error.to_string()))
}

/// Posts form values to one configured webhook endpoint.
#[derive(Clone, Debug)]
pub struct WebhookSubmitter {
    client: reqwest::Client,
    runtime: Arc<Runtime>,
    endpoint: Arc<WebhookEndpoint>,
}

impl WebhookSubmitter {
    pub fn new(endpoint: WebhookEndpoint, runtime: Arc<Runtime>) -> Result<Self, SubmitError> {
        let client = reqwest::Client::builder()
            .user_agent(format!("leadform/{}", env!("CARGO_PKG_VERSION")))
            .timeout(endpoint.timeout())
            .build()?;
        Ok(Self {
            client,
            runtime,
            endpoint: Arc::new(endpoint),
        })
    }

    pub fn endpoint(&self) -> &WebhookEndpoint {
        &self.endpoint
    }
}

impl SubmitAdapter for WebhookSubmitter {
    fn submit(&self, values: FormValues) -> SubmitFuture {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        let task = self
            .runtime
            .spawn(async move { deliver(&client, &endpoint, &values).await });
        Box::pin(async move {
            task.await
                .map_err(|error| SubmitError::Runtime(error.to_string()))?
        })
    }
}

async fn deliver(
    client: &reqwest::Client,
    endpoint: &WebhookEndpoint,
    values: &FormValues,
) -> Result<(), SubmitError> {
    let pairs = endpoint.payload(values);
    let request = client.post(endpoint.url.as_str());
    let request = match endpoint.encoding {
        PayloadEncoding::Json => request.json(&json_body(pairs)),
        PayloadEncoding::FormUrlencoded => request.form(&pairs),
    };

    log::debug!("Posting form submission to {}", endpoint.url);
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        log::warn!("Webhook {} responded with {status}", endpoint.url);
        return Err(SubmitError::Status(status.as_u16()));
    }

    match endpoint.response {
        ResponseCheck::HttpStatus => Ok(()),
        ResponseCheck::JsonSuccessFlag => check_success_flag(&response.text().await?),
    }
}

fn json_body(pairs: Vec<(String, String)>) -> serde_json::Map<String, serde_json::Value> {
    pairs
        .into_iter()
        .map(|(key, value)| (key, serde_json::Value::String(value)))
        .collect()
}

#[derive(Deserialize)]
struct Acknowledgement {
    success: bool,
}

/// Interprets a `{"success": bool}` acknowledgement body.
pub fn check_success_flag(body: &str) -> Result<(), SubmitError> {
    let ack: Acknowledgement = serde_json::from_str(body)?;
    if ack.success {
        Ok(())
    } else {
        Err(SubmitError::Rejected)
    }
}
