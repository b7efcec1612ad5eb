// Hand-crafted async HTTP client for the event portal.
//
// Base paths: architecture/ (design + runtime), missionControl/ (brokers)
// Auth: Bearer token

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::types;
use crate::Error;

// ── Error response shape from the portal ─────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<i64>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the event portal API.
///
/// Resolves design-time names to ids, fetches deployment previews, and
/// (in configPush mode) executes deployments portal-side.
pub struct PortalClient {
    http: reqwest::Client,
    base_url: Url,
}

impl PortalClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a bearer token and transport config.
    ///
    /// Injects `Authorization: Bearer …` as a default header on every
    /// request.
    pub fn from_token(
        base_url: &str,
        token: &secrecy::SecretString,
        transport: &crate::TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| Error::InvalidCredentials(format!("token header value: {e}")))?;
        auth_value.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth_value);

        let http = transport.build_client_with_headers(headers)?;
        let base_url = Self::normalize_base_url(base_url)?;

        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Parse the base URL and guarantee a trailing slash so relative
    /// joins keep the full path.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        if url.cannot_be_a_base() {
            return Err(Error::UrlNotBase { url: raw.into() });
        }
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    fn url(&self, path: &str) -> Result<Url, Error> {
        self.base_url.join(path).map_err(Error::from)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(params).send().await?;
        Self::handle_response(resp).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.get_with_params(path, &[]).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        Self::handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview = &body[..body.len().min(200)];
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();

        if status == reqwest::StatusCode::UNPROCESSABLE_ENTITY {
            if let Ok(body) = serde_json::from_str::<serde_json::Value>(&raw) {
                return Error::Unprocessable {
                    fields: crate::error::correlate_unprocessable(None, &body),
                };
            }
        }

        if let Ok(err) = serde_json::from_str::<ErrorResponse>(&raw) {
            Error::Portal {
                status: status.as_u16(),
                message: err.message.unwrap_or_else(|| status.to_string()),
                code: err.code,
            }
        } else {
            Error::Portal {
                status: status.as_u16(),
                message: if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                },
                code: None,
            }
        }
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Design: domains, applications, versions ──────────────────────

    pub async fn list_application_domains(
        &self,
        name: Option<&str>,
    ) -> Result<Vec<types::ApplicationDomain>, Error> {
        let params: Vec<(&str, &str)> = name.map(|n| ("name", n)).into_iter().collect();
        let env: types::Envelope<Vec<types::ApplicationDomain>> = self
            .get_with_params("architecture/applicationDomains", &params)
            .await?;
        Ok(env.data)
    }

    pub async fn list_applications(
        &self,
        application_domain_id: &str,
    ) -> Result<Vec<types::Application>, Error> {
        let env: types::Envelope<Vec<types::Application>> = self
            .get_with_params(
                "architecture/applications",
                &[("applicationDomainId", application_domain_id)],
            )
            .await?;
        Ok(env.data)
    }

    pub async fn list_application_versions(
        &self,
        application_id: &str,
    ) -> Result<Vec<types::ApplicationVersion>, Error> {
        let env: types::Envelope<Vec<types::ApplicationVersion>> = self
            .get_with_params(
                "architecture/applicationVersions",
                &[("applicationIds", application_id)],
            )
            .await?;
        Ok(env.data)
    }

    // ── Runtime: environments, meshes, messaging services ────────────

    pub async fn list_environments(&self) -> Result<Vec<types::Environment>, Error> {
        let env: types::Envelope<Vec<types::Environment>> =
            self.get("architecture/environments").await?;
        Ok(env.data)
    }

    pub async fn list_event_meshes(
        &self,
        environment_id: &str,
    ) -> Result<Vec<types::EventMesh>, Error> {
        let env: types::Envelope<Vec<types::EventMesh>> = self
            .get_with_params(
                "architecture/eventMeshes",
                &[("environmentId", environment_id)],
            )
            .await?;
        Ok(env.data)
    }

    pub async fn list_messaging_services(
        &self,
        event_mesh_id: &str,
    ) -> Result<Vec<types::MessagingService>, Error> {
        let env: types::Envelope<Vec<types::MessagingService>> = self
            .get_with_params(
                "architecture/messagingServices",
                &[("eventMeshId", event_mesh_id)],
            )
            .await?;
        Ok(env.data)
    }

    // ── Runtime management: previews and deployments ─────────────────

    /// Fetch the desired-state preview for one (version, action, broker)
    /// triple. The raw payload is returned so callers can both parse and
    /// archive it.
    pub async fn preview_deployment(
        &self,
        application_version_id: &str,
        action: &str,
        event_broker_id: &str,
    ) -> Result<serde_json::Value, Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Body<'a> {
            application_version_id: &'a str,
            action: &'a str,
            event_broker_id: &'a str,
        }

        self.post(
            "architecture/runtimeManagement/applicationDeploymentPreviews",
            &Body {
                application_version_id,
                action,
                event_broker_id,
            },
        )
        .await
    }

    /// Execute a deployment portal-side (configPush mode).
    pub async fn create_deployment(
        &self,
        application_version_id: &str,
        action: &str,
        event_broker_id: &str,
    ) -> Result<serde_json::Value, Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Body<'a> {
            application_version_id: &'a str,
            action: &'a str,
            event_broker_id: &'a str,
        }

        self.post(
            "architecture/runtimeManagement/applicationDeployments",
            &Body {
                application_version_id,
                action,
                event_broker_id,
            },
        )
        .await
    }
}
