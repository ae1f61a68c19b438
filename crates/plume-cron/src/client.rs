//! REST adapter for the external cron-scheduling service.
//!
//! Jobs live at `projects/{project}/locations/{location}/jobs/{name}` with a
//! cron schedule, a timezone, and an HTTP POST target. The client is built
//! once per process and injected by reference wherever triggers are managed.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{CallbackPayload, CronError};

/// Configuration for the scheduling service.
///
/// Absent configuration is a supported state: every operation degrades to a
/// logged no-op so post CRUD keeps working without the service wired up.
#[derive(Debug, Clone)]
pub struct CronConfig {
    /// API base, e.g. `https://cloudscheduler.googleapis.com/v1`.
    pub base_url: String,
    pub project: String,
    pub location: String,
    /// Endpoint the trigger calls back into when it fires.
    pub callback_url: String,
    /// Bearer token for the scheduling API.
    pub auth_token: String,
}

/// Wire representation of a scheduler job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobResource {
    name: String,
    schedule: String,
    time_zone: String,
    http_target: HttpTarget,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HttpTarget {
    uri: String,
    http_method: String,
    /// Base64-encoded JSON body.
    body: String,
}

/// Outcome of registering a one-shot trigger.
///
/// `Unavailable` means the service is not configured or not reachable;
/// callers may proceed and accept that no real trigger exists. `Rejected`
/// means the service refused the job and the caller must leave its state
/// untouched.
#[derive(Debug)]
pub enum UpsertOutcome {
    /// Service unconfigured or unreachable; no trigger was registered.
    Unavailable,
    /// Trigger created or updated under the requested name.
    Applied,
    /// Service rejected the job.
    Rejected(CronError),
}

/// Outcome of deleting a trigger. Deleting a job that does not exist counts
/// as `Deleted`.
#[derive(Debug)]
pub enum DeleteOutcome {
    Unavailable,
    Deleted,
    Rejected(CronError),
}

/// Client for the cron-scheduling service.
pub struct CronJobsClient {
    http: Client,
    config: Option<CronConfig>,
}

impl CronJobsClient {
    /// Create a new client. `None` yields a permanently unavailable client.
    pub fn new(config: Option<CronConfig>) -> Self {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        Self { http, config }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    /// Create or update the one-shot trigger `job_name`. Idempotent: the job
    /// is looked up first and patched in place when it already exists.
    #[tracing::instrument(skip(self, payload))]
    pub async fn upsert(
        &self,
        job_name: &str,
        cron: &str,
        time_zone: &str,
        payload: &CallbackPayload,
    ) -> UpsertOutcome {
        let Some(config) = &self.config else {
            debug!("scheduling service not configured, skipping trigger registration");
            return UpsertOutcome::Unavailable;
        };

        let body = match serde_json::to_vec(payload) {
            Ok(body) => body,
            Err(e) => return UpsertOutcome::Rejected(CronError::Json(e)),
        };
        let job = JobResource {
            name: resource_name(config, job_name),
            schedule: cron.to_string(),
            time_zone: time_zone.to_string(),
            http_target: HttpTarget {
                uri: config.callback_url.clone(),
                http_method: "POST".to_string(),
                body: BASE64.encode(body),
            },
        };

        let exists = match self.job_exists(config, job_name).await {
            Ok(exists) => exists,
            Err(e) if e.is_unavailable() => {
                warn!(error = %e, "scheduling service unreachable, degrading to no-op");
                return UpsertOutcome::Unavailable;
            }
            Err(e) => return UpsertOutcome::Rejected(e),
        };

        let result = if exists {
            self.patch_job(config, job_name, &job).await
        } else {
            self.create_job(config, &job).await
        };

        match result {
            Ok(()) => {
                info!(cron, time_zone, updated = exists, "registered one-shot trigger");
                UpsertOutcome::Applied
            }
            Err(e) if e.is_unavailable() => {
                warn!(error = %e, "scheduling service unreachable, degrading to no-op");
                UpsertOutcome::Unavailable
            }
            Err(e) => {
                warn!(error = %e, "scheduling service rejected trigger");
                UpsertOutcome::Rejected(e)
            }
        }
    }

    /// Delete the trigger `job_name`. Deleting a non-existent job succeeds.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, job_name: &str) -> DeleteOutcome {
        let Some(config) = &self.config else {
            debug!("scheduling service not configured, skipping trigger deletion");
            return DeleteOutcome::Unavailable;
        };

        let url = job_url(config, job_name);
        let response = match self
            .http
            .delete(&url)
            .bearer_auth(&config.auth_token)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "scheduling service unreachable, degrading to no-op");
                return DeleteOutcome::Unavailable;
            }
        };

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            info!(already_gone = (status == StatusCode::NOT_FOUND), "deleted trigger");
            return DeleteOutcome::Deleted;
        }

        let err = api_error(status, response).await;
        if err.is_unavailable() {
            warn!(error = %err, "scheduling service unreachable, degrading to no-op");
            DeleteOutcome::Unavailable
        } else {
            warn!(error = %err, "scheduling service rejected deletion");
            DeleteOutcome::Rejected(err)
        }
    }

    async fn job_exists(&self, config: &CronConfig, job_name: &str) -> Result<bool, CronError> {
        let url = job_url(config, job_name);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&config.auth_token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if status.is_success() {
            return Ok(true);
        }
        Err(api_error(status, response).await)
    }

    async fn create_job(&self, config: &CronConfig, job: &JobResource) -> Result<(), CronError> {
        let url = format!(
            "{}/projects/{}/locations/{}/jobs",
            config.base_url, config.project, config.location
        );
        let response = self
            .http
            .post(&url)
            .bearer_auth(&config.auth_token)
            .json(job)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(api_error(status, response).await)
    }

    async fn patch_job(
        &self,
        config: &CronConfig,
        job_name: &str,
        job: &JobResource,
    ) -> Result<(), CronError> {
        let url = job_url(config, job_name);
        let response = self
            .http
            .patch(&url)
            .bearer_auth(&config.auth_token)
            .json(job)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(api_error(status, response).await)
    }
}

fn resource_name(config: &CronConfig, job_name: &str) -> String {
    format!(
        "projects/{}/locations/{}/jobs/{}",
        config.project, config.location, job_name
    )
}

fn job_url(config: &CronConfig, job_name: &str) -> String {
    format!("{}/{}", config.base_url, resource_name(config, job_name))
}

async fn api_error(status: StatusCode, response: reqwest::Response) -> CronError {
    let body = response
        .text()
        .await
        .unwrap_or_else(|e| format!("failed to read error body: {}", e));
    CronError::Api {
        status: status.as_u16(),
        body,
    }
}
