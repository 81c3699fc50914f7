mod models;

use std::fs;
use std::time::Duration;

use reqwest::{Certificate, Client, Identity, StatusCode};

pub use models::{ComposeRequest, ComposeStatus, ImageRequest, Koji};
use models::{ComposeCreated, ComposeStatusBody};

use crate::config::{Config, TlsMaterial};
use crate::repositories;

/// Every compose we request is a qcow2 disk image for x86_64; the service
/// rejects anything the distribution cannot build.
const ARCHITECTURE: &str = "x86_64";
const IMAGE_TYPE: &str = "qcow2";

/// Assemble the request body for `distro`. Fails on a distribution the
/// catalog does not know about.
pub fn build_request(distro: &str, cfg: &Config) -> Result<ComposeRequest, ComposeError> {
    let repositories = repositories::for_distro(distro)?.to_vec();

    Ok(ComposeRequest {
        name: cfg.name.clone(),
        version: cfg.version.clone(),
        release: cfg.release.clone(),
        distribution: distro.to_string(),
        koji: Koji {
            server: cfg.koji_hub.to_string(),
            task_id: cfg.koji_task_id,
        },
        image_requests: vec![ImageRequest {
            architecture: ARCHITECTURE.to_string(),
            image_type: IMAGE_TYPE.to_string(),
            repositories,
        }],
    })
}

/// Client for the compose API. One HTTPS request in flight at a time; the
/// underlying connection is reused sequentially.
pub struct ComposeClient {
    http: Client,
    api_url: String,
    poll_interval: Duration,
    max_poll_attempts: u32,
}

impl ComposeClient {
    /// Build the HTTP client. When TLS material is configured the client
    /// presents the certificate/key pair and trusts only the given CA;
    /// unreadable PEM files fail here, before any request goes out.
    pub fn new(cfg: &Config) -> Result<Self, ComposeError> {
        let mut builder = Client::builder();
        if let Some(tls) = &cfg.tls {
            builder = builder
                .use_rustls_tls()
                .identity(client_identity(tls)?)
                .add_root_certificate(service_ca(tls)?);
        }

        Ok(ComposeClient {
            http: builder.build()?,
            api_url: cfg.api_url.as_str().trim_end_matches('/').to_string(),
            poll_interval: cfg.poll_interval,
            max_poll_attempts: cfg.max_poll_attempts,
        })
    }

    /// `POST /compose`. The service answers 201 with the compose id; any
    /// other status ends the program. Echoes the raw response body so the
    /// operator sees exactly what the service said.
    pub async fn submit(&self, request: &ComposeRequest) -> Result<String, ComposeError> {
        let res = self
            .http
            .post(format!("{}/compose", self.api_url))
            .json(request)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        if status != StatusCode::CREATED {
            return Err(ComposeError::Submission { status, body });
        }

        println!("{body}");
        let created: ComposeCreated = serde_json::from_str(&body)?;
        Ok(created.id)
    }

    /// Poll `GET /compose/{id}` on a fixed interval until the job reaches a
    /// terminal state. `pending` and `running` are the only states that
    /// warrant another attempt; an unrecognized status stops the loop
    /// immediately. The loop is bounded by `max_poll_attempts`.
    pub async fn wait(&self, compose_id: &str) -> Result<(), ComposeError> {
        let url = format!("{}/compose/{compose_id}", self.api_url);
        let mut attempts: u32 = 0;

        loop {
            let res = self.http.get(&url).send().await?;
            let status = res.status();
            let body = res.text().await?;
            if status != StatusCode::OK {
                return Err(ComposeError::PollRequest { status, body });
            }

            let parsed: ComposeStatusBody = serde_json::from_str(&body)?;
            println!("{}", parsed.status);

            match ComposeStatus::parse(&parsed.status) {
                ComposeStatus::Success => {
                    println!("{body}");
                    return Ok(());
                }
                ComposeStatus::Failure => {
                    return Err(ComposeError::ReportedFailure { body });
                }
                ComposeStatus::Unrecognized(value) => {
                    return Err(ComposeError::UnexpectedStatus { status: value, body });
                }
                ComposeStatus::Pending | ComposeStatus::Running => {}
            }

            attempts += 1;
            if attempts >= self.max_poll_attempts {
                return Err(ComposeError::AttemptsExhausted { attempts });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

/// Client certificate and key, concatenated into the single PEM bundle the
/// rustls backend expects.
fn client_identity(tls: &TlsMaterial) -> Result<Identity, ComposeError> {
    let mut pem = fs::read(&tls.client_cert)?;
    pem.extend(fs::read(&tls.client_key)?);
    Ok(Identity::from_pem(&pem)?)
}

fn service_ca(tls: &TlsMaterial) -> Result<Certificate, ComposeError> {
    Ok(Certificate::from_pem(&fs::read(&tls.ca_cert)?)?)
}

/// ---- Errors ----
#[derive(thiserror::Error, Debug)]
pub enum ComposeError {
    #[error(transparent)]
    Catalog(#[from] repositories::CatalogError),
    #[error("failed to create compose: HTTP {status}\n{body}")]
    Submission { status: StatusCode, body: String },
    #[error("failed to get compose status: HTTP {status}\n{body}")]
    PollRequest { status: StatusCode, body: String },
    #[error("compose failed\n{body}")]
    ReportedFailure { body: String },
    #[error("unexpected compose status: {status}\n{body}")]
    UnexpectedStatus { status: String, body: String },
    #[error("compose still not finished after {attempts} polls")]
    AttemptsExhausted { attempts: u32 },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed response body: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read TLS material: {0}")]
    Io(#[from] std::io::Error),
}
