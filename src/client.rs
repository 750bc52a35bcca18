use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;

use crate::config::ClientConfig;
use crate::dataset::Dataset;
use crate::error::ClientError;
use crate::record::Record;

/// Network calls the record table depends on.
///
/// Kept as a trait so the optimistic-update flow can run against a real
/// server or a scripted stand-in.
pub trait RecordTransport {
    /// Fetch the full record list (`GET /getData`)
    fn fetch_records(&self) -> impl Future<Output = Result<Vec<Record>, ClientError>> + Send;

    /// Append a submission (`POST /postData`) and return the stored record
    fn append_record(
        &self,
        submission: &Value,
    ) -> impl Future<Output = Result<Record, ClientError>> + Send;
}

/// HTTP client for the record server and the third-party dataset
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl HttpClient {
    pub fn new(config: ClientConfig) -> Self {
        HttpClient {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Liveness check against `GET /`
    ///
    /// # Returns
    /// * `Result<String, ClientError>` - The greeting text or the failure
    pub async fn hello(&self) -> Result<String, ClientError> {
        let response = self.http.get(self.endpoint("/")).send().await?;
        let response = check_status(response)?;
        Ok(response.text().await?)
    }

    /// Fetch and leniently parse the third-party dataset
    ///
    /// Items with missing parts are kept with blank cells; only transport
    /// failures, error statuses and non-JSON bodies are reported.
    pub async fn fetch_dataset(&self) -> Result<Dataset, ClientError> {
        let response = self.http.get(&self.config.dataset_url).send().await?;
        let body = check_status(response)?.bytes().await?;
        Ok(Dataset::from_slice(&body)?)
    }
}

impl RecordTransport for HttpClient {
    async fn fetch_records(&self) -> Result<Vec<Record>, ClientError> {
        let response = self.http.get(self.endpoint("/getData")).send().await?;
        read_json(response).await
    }

    async fn append_record(&self, submission: &Value) -> Result<Record, ClientError> {
        let response = self
            .http
            .post(self.endpoint("/postData"))
            .json(submission)
            .send()
            .await?;
        read_json(response).await
    }
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ClientError::Status {
            url: response.url().to_string(),
            status: status.as_u16(),
        })
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let body = check_status(response)?.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}
