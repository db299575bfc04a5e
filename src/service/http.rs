//! HTTP implementation of the record service over reqwest.

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{EmployeeService, ListParams, ServiceResult};
use crate::config::Config;
use crate::errors::{ErrorResponse, ServiceError};
use crate::models::{DeleteConfirmation, Employee, EmployeeDraft, EmployeeId, ListPayload};

/// Path prefix of every employee-management endpoint.
pub const API_PREFIX: &str = "/api/v1/employee-management";

/// Record service talking to a remote employee-management API.
#[derive(Debug, Clone)]
pub struct HttpEmployeeService {
    client: Client,
    base_url: Url,
}

impl HttpEmployeeService {
    /// Build a service for `base_url` (scheme and host, optionally a path).
    pub fn new(client: Client, base_url: &str) -> ServiceResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            ServiceError::request_failed(None, format!("Invalid base URL {:?}: {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ServiceError::request_failed(
                None,
                format!("Invalid base URL {:?}", base_url.as_str()),
            ));
        }
        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &Config) -> ServiceResult<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Self::new(client, &config.api_base_url)
    }

    /// Absolute URL of an endpoint below the API prefix.
    ///
    /// Segments are percent-encoded, so string ids cannot escape their path slot.
    pub fn endpoint(&self, segments: &[&str]) -> ServiceResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ServiceError::request_failed(None, "Invalid base URL"))?;
            path.pop_if_empty()
                .extend(API_PREFIX.split('/').filter(|s| !s.is_empty()))
                .extend(segments);
        }
        Ok(url)
    }

    /// Turn a non-2xx response into `RequestFailed`, preferring the server's
    /// error message over the raw body.
    async fn check(response: Response) -> ServiceResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorResponse>(&text) {
            Ok(body) => body.error.message,
            Err(_) if !text.trim().is_empty() => text.trim().to_string(),
            Err(_) => status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
        };

        tracing::debug!("Request failed with {}: {}", status, message);
        Err(ServiceError::request_failed(Some(status.as_u16()), message))
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> ServiceResult<T> {
        let status = response.status().as_u16();
        let response = Self::check(response).await?;
        response.json().await.map_err(|e| {
            ServiceError::request_failed(Some(status), format!("Invalid response: {}", e))
        })
    }
}

#[async_trait]
impl EmployeeService for HttpEmployeeService {
    async fn list(&self, params: &ListParams) -> ServiceResult<Vec<Employee>> {
        let url = self.endpoint(&["get-all-employees"])?;
        tracing::debug!("GET {} {:?}", url, params);

        let response = self.client.get(url).query(params).send().await?;
        let status = response.status().as_u16();
        let body: Value = Self::read_json(response).await?;

        let payload = ListPayload::from_value(body).map_err(|e| {
            ServiceError::request_failed(Some(status), format!("Invalid response: {}", e))
        })?;
        if payload == ListPayload::Unrecognized {
            tracing::warn!("Unrecognized list payload; treating as empty");
        }
        Ok(payload.into_records())
    }

    async fn get_by_id(&self, id: &EmployeeId) -> ServiceResult<Employee> {
        let url = self.endpoint(&["get-employee", id.to_string().as_str()])?;
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        Self::read_json(response).await
    }

    async fn create(&self, draft: &EmployeeDraft) -> ServiceResult<Employee> {
        let url = self.endpoint(&["create"])?;
        tracing::debug!("POST {}", url);

        let response = self.client.post(url).json(draft).send().await?;
        Self::read_json(response).await
    }

    async fn update(&self, id: &EmployeeId, draft: &EmployeeDraft) -> ServiceResult<Employee> {
        let url = self.endpoint(&["update-employee", id.to_string().as_str()])?;
        tracing::debug!("PUT {}", url);

        let response = self.client.put(url).json(draft).send().await?;
        Self::read_json(response).await
    }

    async fn remove(&self, id: &EmployeeId) -> ServiceResult<DeleteConfirmation> {
        let url = self.endpoint(&["delete-employee", id.to_string().as_str()])?;
        tracing::debug!("DELETE {}", url);

        let response = Self::check(self.client.delete(url).send().await?).await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        // Some backends answer with an empty body or a non-object
        let confirmation = serde_json::from_str::<DeleteConfirmation>(&text).unwrap_or_default();

        if !confirmation.success {
            return Err(ServiceError::request_failed(
                Some(status),
                format!("Delete of employee {} was not confirmed", id),
            ));
        }
        Ok(confirmation)
    }
}
