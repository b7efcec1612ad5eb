// Hand-crafted async HTTP client for one broker's management API.
//
// Scope: a single message VPN on a single broker. All paths are built
// with `Url::path_segments_mut` so object and child keys are
// percent-escaped when used as path segments (topics contain `/`).

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::types;
use crate::Error;

// ── Error envelope shape from the management API ─────────────────────

#[derive(serde::Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    meta: Option<ErrorMeta>,
}

#[derive(serde::Deserialize)]
struct ErrorMeta {
    #[serde(default)]
    error: Option<ErrorBody>,
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for one broker's management API, scoped to one VPN.
pub struct SempClient {
    http: reqwest::Client,
    base_url: Url,
    msg_vpn: String,
    username: String,
    password: SecretString,
}

impl SempClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from broker connection details and transport config.
    pub fn new(
        base_url: &str,
        msg_vpn: &str,
        username: &str,
        password: SecretString,
        transport: &crate::TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, msg_vpn, username, password, http)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(
        base_url: &str,
        msg_vpn: &str,
        username: &str,
        password: SecretString,
        http: reqwest::Client,
    ) -> Result<Self, Error> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::UrlNotBase {
                url: base_url.to_string(),
            });
        }
        Ok(Self {
            http,
            base_url,
            msg_vpn: msg_vpn.to_owned(),
            username: username.to_owned(),
            password,
        })
    }

    /// The VPN scope this client operates in.
    pub fn msg_vpn(&self) -> &str {
        &self.msg_vpn
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append `msgVpns/{vpn}` plus the given segments to the base URL.
    /// Each segment is pushed individually and percent-escaped.
    fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        {
            let mut parts = url.path_segments_mut().map_err(|()| Error::UrlNotBase {
                url: self.base_url.to_string(),
            })?;
            parts.pop_if_empty();
            parts.push("msgVpns");
            parts.push(&self.msg_vpn);
            parts.extend(segments);
        }
        Ok(url)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .basic_auth(&self.username, Some(self.password.expose_secret()))
    }

    /// Existence probe: GET an object by key. Absence is a success
    /// outcome (`Ok(None)`); only transport/auth failures are errors.
    async fn get_optional<T: DeserializeOwned>(
        &self,
        segments: &[&str],
    ) -> Result<Option<T>, Error> {
        let url = self.url(segments)?;
        debug!("GET {url}");

        let resp = self.request(Method::GET, url).send().await?;
        let status = resp.status();
        if status.is_success() {
            let env: types::Envelope<T> = Self::decode(resp).await?;
            return Ok(Some(env.data));
        }

        let err = Self::parse_error(status, resp, None).await;
        if err.is_not_found() {
            Ok(None)
        } else {
            Err(err)
        }
    }

    /// Fetch a full (child) collection.
    async fn list<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<Vec<T>, Error> {
        let url = self.url(segments)?;
        debug!("GET {url}");

        let resp = self.request(Method::GET, url).send().await?;
        let status = resp.status();
        if status.is_success() {
            let env: types::Envelope<Vec<T>> = Self::decode(resp).await?;
            Ok(env.data)
        } else {
            Err(Self::parse_error(status, resp, None).await)
        }
    }

    async fn post<B: Serialize + Sync>(&self, segments: &[&str], body: &B) -> Result<(), Error> {
        self.send_with_body(Method::POST, segments, body).await
    }

    async fn put<B: Serialize + Sync>(&self, segments: &[&str], body: &B) -> Result<(), Error> {
        self.send_with_body(Method::PUT, segments, body).await
    }

    /// Serialize the body up front so a 422 response can be correlated
    /// against the request fields that produced it.
    async fn send_with_body<B: Serialize + Sync>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<(), Error> {
        let body_value = serde_json::to_value(body).map_err(|e| Error::Deserialization {
            message: format!("failed to serialize request body: {e}"),
            body: String::new(),
        })?;

        let url = self.url(segments)?;
        debug!("{method} {url}");

        let resp = self
            .request(method, url)
            .json(&body_value)
            .send()
            .await?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::parse_error(status, resp, Some(&body_value)).await)
        }
    }

    async fn delete(&self, segments: &[&str]) -> Result<(), Error> {
        let url = self.url(segments)?;
        debug!("DELETE {url}");

        let resp = self.request(Method::DELETE, url).send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::parse_error(status, resp, None).await)
        }
    }

    // ── Response handling ────────────────────────────────────────────

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            let preview = &body[..body.len().min(200)];
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }

    async fn parse_error(
        status: reqwest::StatusCode,
        resp: reqwest::Response,
        request_body: Option<&serde_json::Value>,
    ) -> Error {
        let raw = resp.text().await.unwrap_or_default();

        if status == reqwest::StatusCode::UNPROCESSABLE_ENTITY {
            if let Ok(body) = serde_json::from_str::<serde_json::Value>(&raw) {
                return Error::Unprocessable {
                    fields: crate::error::correlate_unprocessable(request_body, &body),
                };
            }
        }

        if let Ok(env) = serde_json::from_str::<ErrorEnvelope>(&raw) {
            if let Some(err) = env.meta.and_then(|m| m.error) {
                return Error::Semp {
                    status: status.as_u16(),
                    code: err.code,
                    sub_status: err.status,
                    description: err.description.unwrap_or_else(|| status.to_string()),
                };
            }
        }

        Error::Semp {
            status: status.as_u16(),
            code: None,
            sub_status: None,
            description: if raw.is_empty() {
                status.to_string()
            } else {
                raw
            },
        }
    }

    /// Clone a record and pin its VPN field to this client's scope.
    fn scoped<T: Clone>(&self, record: &T, set_vpn: impl FnOnce(&mut T, String)) -> T {
        let mut out = record.clone();
        set_vpn(&mut out, self.msg_vpn.clone());
        out
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── ACL profiles ─────────────────────────────────────────────────

    pub async fn probe_acl_profile(
        &self,
        name: &str,
    ) -> Result<Option<types::MsgVpnAclProfile>, Error> {
        self.get_optional(&["aclProfiles", name]).await
    }

    pub async fn create_acl_profile(
        &self,
        profile: &types::MsgVpnAclProfile,
    ) -> Result<(), Error> {
        let body = self.scoped(profile, |p, vpn| p.msg_vpn_name = Some(vpn));
        self.post(&["aclProfiles"], &body).await
    }

    pub async fn replace_acl_profile(
        &self,
        profile: &types::MsgVpnAclProfile,
    ) -> Result<(), Error> {
        let body = self.scoped(profile, |p, vpn| p.msg_vpn_name = Some(vpn));
        self.put(&["aclProfiles", &profile.acl_profile_name], &body)
            .await
    }

    pub async fn delete_acl_profile(&self, name: &str) -> Result<(), Error> {
        self.delete(&["aclProfiles", name]).await
    }

    // ── ACL child collections ────────────────────────────────────────

    pub async fn list_client_connect_exceptions(
        &self,
        profile: &str,
    ) -> Result<Vec<types::MsgVpnAclProfileClientConnectException>, Error> {
        self.list(&["aclProfiles", profile, "clientConnectExceptions"])
            .await
    }

    pub async fn create_client_connect_exception(
        &self,
        profile: &str,
        address: &str,
    ) -> Result<(), Error> {
        let body = types::MsgVpnAclProfileClientConnectException {
            acl_profile_name: Some(profile.to_owned()),
            msg_vpn_name: Some(self.msg_vpn.clone()),
            client_connect_exception_address: address.to_owned(),
        };
        self.post(&["aclProfiles", profile, "clientConnectExceptions"], &body)
            .await
    }

    pub async fn delete_client_connect_exception(
        &self,
        profile: &str,
        address: &str,
    ) -> Result<(), Error> {
        self.delete(&[
            "aclProfiles",
            profile,
            "clientConnectExceptions",
            address,
        ])
        .await
    }

    pub async fn list_publish_topic_exceptions(
        &self,
        profile: &str,
    ) -> Result<Vec<types::MsgVpnAclProfilePublishTopicException>, Error> {
        self.list(&["aclProfiles", profile, "publishTopicExceptions"])
            .await
    }

    pub async fn create_publish_topic_exception(
        &self,
        profile: &str,
        exception: &types::MsgVpnAclProfilePublishTopicException,
    ) -> Result<(), Error> {
        let mut body = exception.clone();
        body.acl_profile_name = Some(profile.to_owned());
        body.msg_vpn_name = Some(self.msg_vpn.clone());
        self.post(&["aclProfiles", profile, "publishTopicExceptions"], &body)
            .await
    }

    /// Delete by the composite key the broker uses:
    /// `{syntax},{topic}` as a single escaped path segment.
    pub async fn delete_publish_topic_exception(
        &self,
        profile: &str,
        syntax: &str,
        topic: &str,
    ) -> Result<(), Error> {
        let key = format!("{syntax},{topic}");
        self.delete(&["aclProfiles", profile, "publishTopicExceptions", &key])
            .await
    }

    pub async fn list_subscribe_topic_exceptions(
        &self,
        profile: &str,
    ) -> Result<Vec<types::MsgVpnAclProfileSubscribeTopicException>, Error> {
        self.list(&["aclProfiles", profile, "subscribeTopicExceptions"])
            .await
    }

    pub async fn create_subscribe_topic_exception(
        &self,
        profile: &str,
        exception: &types::MsgVpnAclProfileSubscribeTopicException,
    ) -> Result<(), Error> {
        let mut body = exception.clone();
        body.acl_profile_name = Some(profile.to_owned());
        body.msg_vpn_name = Some(self.msg_vpn.clone());
        self.post(&["aclProfiles", profile, "subscribeTopicExceptions"], &body)
            .await
    }

    pub async fn delete_subscribe_topic_exception(
        &self,
        profile: &str,
        syntax: &str,
        topic: &str,
    ) -> Result<(), Error> {
        let key = format!("{syntax},{topic}");
        self.delete(&["aclProfiles", profile, "subscribeTopicExceptions", &key])
            .await
    }

    // ── Client usernames ─────────────────────────────────────────────

    pub async fn probe_client_username(
        &self,
        name: &str,
    ) -> Result<Option<types::MsgVpnClientUsername>, Error> {
        self.get_optional(&["clientUsernames", name]).await
    }

    pub async fn create_client_username(
        &self,
        username: &types::MsgVpnClientUsername,
    ) -> Result<(), Error> {
        let body = self.scoped(username, |u, vpn| u.msg_vpn_name = Some(vpn));
        self.post(&["clientUsernames"], &body).await
    }

    pub async fn replace_client_username(
        &self,
        username: &types::MsgVpnClientUsername,
    ) -> Result<(), Error> {
        let body = self.scoped(username, |u, vpn| u.msg_vpn_name = Some(vpn));
        self.put(&["clientUsernames", &username.client_username], &body)
            .await
    }

    pub async fn delete_client_username(&self, name: &str) -> Result<(), Error> {
        self.delete(&["clientUsernames", name]).await
    }

    // ── Client certificate usernames ─────────────────────────────────

    pub async fn probe_client_certificate_username(
        &self,
        name: &str,
    ) -> Result<Option<types::MsgVpnClientCertificateUsername>, Error> {
        self.get_optional(&["clientCertificateUsernames", name]).await
    }

    pub async fn create_client_certificate_username(
        &self,
        username: &types::MsgVpnClientCertificateUsername,
    ) -> Result<(), Error> {
        let body = self.scoped(username, |u, vpn| u.msg_vpn_name = Some(vpn));
        self.post(&["clientCertificateUsernames"], &body).await
    }

    pub async fn replace_client_certificate_username(
        &self,
        username: &types::MsgVpnClientCertificateUsername,
    ) -> Result<(), Error> {
        let body = self.scoped(username, |u, vpn| u.msg_vpn_name = Some(vpn));
        self.put(
            &["clientCertificateUsernames", &username.certificate_username],
            &body,
        )
        .await
    }

    pub async fn delete_client_certificate_username(&self, name: &str) -> Result<(), Error> {
        self.delete(&["clientCertificateUsernames", name]).await
    }

    // ── Authorization groups ─────────────────────────────────────────

    pub async fn probe_authorization_group(
        &self,
        name: &str,
    ) -> Result<Option<types::MsgVpnAuthorizationGroup>, Error> {
        self.get_optional(&["authorizationGroups", name]).await
    }

    pub async fn create_authorization_group(
        &self,
        group: &types::MsgVpnAuthorizationGroup,
    ) -> Result<(), Error> {
        let body = self.scoped(group, |g, vpn| g.msg_vpn_name = Some(vpn));
        self.post(&["authorizationGroups"], &body).await
    }

    pub async fn replace_authorization_group(
        &self,
        group: &types::MsgVpnAuthorizationGroup,
    ) -> Result<(), Error> {
        let body = self.scoped(group, |g, vpn| g.msg_vpn_name = Some(vpn));
        self.put(
            &["authorizationGroups", &group.authorization_group_name],
            &body,
        )
        .await
    }

    pub async fn delete_authorization_group(&self, name: &str) -> Result<(), Error> {
        self.delete(&["authorizationGroups", name]).await
    }

    // ── Queues ───────────────────────────────────────────────────────

    pub async fn probe_queue(&self, name: &str) -> Result<Option<types::MsgVpnQueue>, Error> {
        self.get_optional(&["queues", name]).await
    }

    pub async fn create_queue(&self, queue: &types::MsgVpnQueue) -> Result<(), Error> {
        let body = self.scoped(queue, |q, vpn| q.msg_vpn_name = Some(vpn));
        self.post(&["queues"], &body).await
    }

    pub async fn replace_queue(&self, queue: &types::MsgVpnQueue) -> Result<(), Error> {
        let body = self.scoped(queue, |q, vpn| q.msg_vpn_name = Some(vpn));
        self.put(&["queues", &queue.queue_name], &body).await
    }

    pub async fn delete_queue(&self, name: &str) -> Result<(), Error> {
        self.delete(&["queues", name]).await
    }

    // ── Queue subscriptions ──────────────────────────────────────────

    pub async fn list_queue_subscriptions(
        &self,
        queue: &str,
    ) -> Result<Vec<types::MsgVpnQueueSubscription>, Error> {
        self.list(&["queues", queue, "subscriptions"]).await
    }

    pub async fn create_queue_subscription(
        &self,
        queue: &str,
        topic: &str,
    ) -> Result<(), Error> {
        let body = types::MsgVpnQueueSubscription {
            msg_vpn_name: Some(self.msg_vpn.clone()),
            queue_name: Some(queue.to_owned()),
            subscription_topic: topic.to_owned(),
        };
        self.post(&["queues", queue, "subscriptions"], &body).await
    }

    pub async fn delete_queue_subscription(&self, queue: &str, topic: &str) -> Result<(), Error> {
        self.delete(&["queues", queue, "subscriptions", topic]).await
    }

    // ── REST delivery points ─────────────────────────────────────────

    pub async fn probe_rest_delivery_point(
        &self,
        name: &str,
    ) -> Result<Option<types::MsgVpnRestDeliveryPoint>, Error> {
        self.get_optional(&["restDeliveryPoints", name]).await
    }

    pub async fn create_rest_delivery_point(
        &self,
        rdp: &types::MsgVpnRestDeliveryPoint,
    ) -> Result<(), Error> {
        let body = self.scoped(rdp, |r, vpn| r.msg_vpn_name = Some(vpn));
        self.post(&["restDeliveryPoints"], &body).await
    }

    pub async fn replace_rest_delivery_point(
        &self,
        rdp: &types::MsgVpnRestDeliveryPoint,
    ) -> Result<(), Error> {
        let body = self.scoped(rdp, |r, vpn| r.msg_vpn_name = Some(vpn));
        self.put(
            &["restDeliveryPoints", &rdp.rest_delivery_point_name],
            &body,
        )
        .await
    }

    pub async fn delete_rest_delivery_point(&self, name: &str) -> Result<(), Error> {
        self.delete(&["restDeliveryPoints", name]).await
    }

    // ── Queue bindings ───────────────────────────────────────────────

    pub async fn probe_queue_binding(
        &self,
        rdp: &str,
        name: &str,
    ) -> Result<Option<types::MsgVpnRestDeliveryPointQueueBinding>, Error> {
        self.get_optional(&["restDeliveryPoints", rdp, "queueBindings", name])
            .await
    }

    pub async fn create_queue_binding(
        &self,
        rdp: &str,
        binding: &types::MsgVpnRestDeliveryPointQueueBinding,
    ) -> Result<(), Error> {
        let mut body = self.scoped(binding, |b, vpn| b.msg_vpn_name = Some(vpn));
        body.rest_delivery_point_name = Some(rdp.to_owned());
        self.post(&["restDeliveryPoints", rdp, "queueBindings"], &body)
            .await
    }

    pub async fn replace_queue_binding(
        &self,
        rdp: &str,
        binding: &types::MsgVpnRestDeliveryPointQueueBinding,
    ) -> Result<(), Error> {
        let mut body = self.scoped(binding, |b, vpn| b.msg_vpn_name = Some(vpn));
        body.rest_delivery_point_name = Some(rdp.to_owned());
        self.put(
            &[
                "restDeliveryPoints",
                rdp,
                "queueBindings",
                &binding.queue_binding_name,
            ],
            &body,
        )
        .await
    }

    pub async fn delete_queue_binding(&self, rdp: &str, name: &str) -> Result<(), Error> {
        self.delete(&["restDeliveryPoints", rdp, "queueBindings", name])
            .await
    }

    // ── Queue binding request headers ────────────────────────────────

    pub async fn list_request_headers(
        &self,
        rdp: &str,
        binding: &str,
    ) -> Result<Vec<types::MsgVpnRestDeliveryPointQueueBindingRequestHeader>, Error> {
        self.list(&[
            "restDeliveryPoints",
            rdp,
            "queueBindings",
            binding,
            "requestHeaders",
        ])
        .await
    }

    pub async fn create_request_header(
        &self,
        rdp: &str,
        binding: &str,
        header: &types::MsgVpnRestDeliveryPointQueueBindingRequestHeader,
    ) -> Result<(), Error> {
        self.post(
            &[
                "restDeliveryPoints",
                rdp,
                "queueBindings",
                binding,
                "requestHeaders",
            ],
            header,
        )
        .await
    }

    pub async fn delete_request_header(
        &self,
        rdp: &str,
        binding: &str,
        header_name: &str,
    ) -> Result<(), Error> {
        self.delete(&[
            "restDeliveryPoints",
            rdp,
            "queueBindings",
            binding,
            "requestHeaders",
            header_name,
        ])
        .await
    }

    pub async fn list_protected_request_headers(
        &self,
        rdp: &str,
        binding: &str,
    ) -> Result<Vec<types::MsgVpnRestDeliveryPointQueueBindingProtectedRequestHeader>, Error> {
        self.list(&[
            "restDeliveryPoints",
            rdp,
            "queueBindings",
            binding,
            "protectedRequestHeaders",
        ])
        .await
    }

    pub async fn create_protected_request_header(
        &self,
        rdp: &str,
        binding: &str,
        header: &types::MsgVpnRestDeliveryPointQueueBindingProtectedRequestHeader,
    ) -> Result<(), Error> {
        self.post(
            &[
                "restDeliveryPoints",
                rdp,
                "queueBindings",
                binding,
                "protectedRequestHeaders",
            ],
            header,
        )
        .await
    }

    pub async fn delete_protected_request_header(
        &self,
        rdp: &str,
        binding: &str,
        header_name: &str,
    ) -> Result<(), Error> {
        self.delete(&[
            "restDeliveryPoints",
            rdp,
            "queueBindings",
            binding,
            "protectedRequestHeaders",
            header_name,
        ])
        .await
    }
}
