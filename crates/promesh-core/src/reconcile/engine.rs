// The reconciliation engine: probe-then-act per object, set
// reconciliation per child collection.
//
// Protocol per object:
//   1. probe by natural key (absence is a success outcome)
//   2. create if absent, full-replace if present; a create that races
//      an existing object is success, not failure
//   3. per child collection: fetch live keys, create desired−live,
//      delete live−desired
//
// Parent deletes cascade child collections on the broker, so undeploy
// removes parents only.

use std::collections::BTreeSet;

use tracing::debug;

use promesh_api::SempClient;
use promesh_api::semp::types::{
    MsgVpnAclProfilePublishTopicException, MsgVpnAclProfileSubscribeTopicException,
    MsgVpnRestDeliveryPointQueueBindingProtectedRequestHeader,
    MsgVpnRestDeliveryPointQueueBindingRequestHeader,
};

use super::observer::{ObjectOutcome, ReconcileObserver};
use crate::error::CoreError;
use crate::model::objects::{AclProfileSpec, BrokerObjectSpec, ObjectKind, QueueBindingSpec, QueueSpec};

const TOPIC_SYNTAX_SMF: &str = "smf";

/// Desired−live / live−desired key split for one child collection.
/// BTreeSet ordering keeps the call sequence deterministic.
fn child_diff<'a>(desired: &'a [String], live: &'a [String]) -> (Vec<&'a str>, Vec<&'a str>) {
    let desired: BTreeSet<&str> = desired.iter().map(String::as_str).collect();
    let live: BTreeSet<&str> = live.iter().map(String::as_str).collect();

    let to_create = desired.difference(&live).copied().collect();
    let to_delete = live.difference(&desired).copied().collect();
    (to_create, to_delete)
}

/// Reconciles one named broker's objects against desired specs.
pub struct ObjectReconciler<'a> {
    broker: String,
    semp: &'a SempClient,
    observer: &'a dyn ReconcileObserver,
}

impl<'a> ObjectReconciler<'a> {
    pub fn new(
        broker: impl Into<String>,
        semp: &'a SempClient,
        observer: &'a dyn ReconcileObserver,
    ) -> Self {
        Self {
            broker: broker.into(),
            semp,
            observer,
        }
    }

    // ── Entry points ─────────────────────────────────────────────────

    /// Converge the broker's state for one object (and its children)
    /// to the spec. Reports the outcome through the observer and
    /// returns it; `Err` means either a per-object failure
    /// (`ObjectFailed`) or a broker-level one (`BrokerTransport`).
    pub async fn apply(&self, spec: &BrokerObjectSpec) -> Result<ObjectOutcome, CoreError> {
        let kind = spec.kind();
        let key = spec.key().to_owned();

        let result = match spec {
            BrokerObjectSpec::AclProfile(s) => self.apply_acl_profile(s).await,
            BrokerObjectSpec::ClientUsername(u) => self.apply_client_username(u).await,
            BrokerObjectSpec::ClientCertificateUsername(u) => {
                self.apply_client_certificate_username(u).await
            }
            BrokerObjectSpec::AuthorizationGroup(g) => self.apply_authorization_group(g).await,
            BrokerObjectSpec::Queue(q) => self.apply_queue(q).await,
            BrokerObjectSpec::RestDeliveryPoint(r) => self.apply_rest_delivery_point(r).await,
            BrokerObjectSpec::QueueBinding(b) => self.apply_queue_binding(b).await,
        };

        self.conclude(kind, &key, result)
    }

    /// Remove one object. Deleting the parent is sufficient; the broker
    /// cascades child collections. Absence is a recovered outcome.
    pub async fn remove(&self, spec: &BrokerObjectSpec) -> Result<ObjectOutcome, CoreError> {
        let kind = spec.kind();
        let key = spec.key().to_owned();

        let result = match spec {
            BrokerObjectSpec::AclProfile(_) => self.semp.delete_acl_profile(&key).await,
            BrokerObjectSpec::ClientUsername(_) => self.semp.delete_client_username(&key).await,
            BrokerObjectSpec::ClientCertificateUsername(_) => {
                self.semp.delete_client_certificate_username(&key).await
            }
            BrokerObjectSpec::AuthorizationGroup(_) => {
                self.semp.delete_authorization_group(&key).await
            }
            BrokerObjectSpec::Queue(_) => self.semp.delete_queue(&key).await,
            BrokerObjectSpec::RestDeliveryPoint(_) => {
                self.semp.delete_rest_delivery_point(&key).await
            }
            BrokerObjectSpec::QueueBinding(b) => {
                self.semp
                    .delete_queue_binding(&b.rest_delivery_point_name, &key)
                    .await
            }
        };

        let result = match result {
            Ok(()) => Ok(ObjectOutcome::Removed),
            Err(e) if e.is_not_found() => Ok(ObjectOutcome::AlreadyAbsent),
            Err(e) => Err(e),
        };

        self.conclude(kind, &key, result)
    }

    // ── Outcome plumbing ─────────────────────────────────────────────

    fn conclude(
        &self,
        kind: ObjectKind,
        key: &str,
        result: Result<ObjectOutcome, promesh_api::Error>,
    ) -> Result<ObjectOutcome, CoreError> {
        match result {
            Ok(outcome) => {
                self.observer.on_object_reconciled(kind, key, &outcome);
                Ok(outcome)
            }
            Err(source) => {
                let err = self.classify(kind, key, source);
                self.observer
                    .on_object_reconciled(kind, key, &ObjectOutcome::Failed(err.to_string()));
                Err(err)
            }
        }
    }

    fn classify(&self, kind: ObjectKind, key: &str, source: promesh_api::Error) -> CoreError {
        if source.is_transport() {
            CoreError::BrokerTransport {
                broker: self.broker.clone(),
                source,
            }
        } else {
            CoreError::ObjectFailed {
                kind,
                key: key.to_owned(),
                source,
            }
        }
    }

    /// Create-or-replace tail shared by every kind: a create that loses
    /// the probe/act race is success.
    fn created_or_raced(
        result: Result<(), promesh_api::Error>,
    ) -> Result<ObjectOutcome, promesh_api::Error> {
        match result {
            Ok(()) => Ok(ObjectOutcome::Created),
            Err(e) if e.is_already_exists() => Ok(ObjectOutcome::AlreadyExists),
            Err(e) => Err(e),
        }
    }

    /// Tolerate redundant child operations the same way.
    fn tolerate_conflict(result: Result<(), promesh_api::Error>) -> Result<(), promesh_api::Error> {
        match result {
            Ok(()) => Ok(()),
            Err(e) if e.is_already_exists() || e.is_not_found() => {
                debug!("child entry already converged");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    // ── ACL profiles ─────────────────────────────────────────────────

    async fn apply_acl_profile(
        &self,
        spec: &AclProfileSpec,
    ) -> Result<ObjectOutcome, promesh_api::Error> {
        let name = &spec.acl_profile.acl_profile_name;

        let outcome = if self.semp.probe_acl_profile(name).await?.is_some() {
            self.semp.replace_acl_profile(&spec.acl_profile).await?;
            ObjectOutcome::Updated
        } else {
            Self::created_or_raced(self.semp.create_acl_profile(&spec.acl_profile).await)?
        };

        self.reconcile_connect_exceptions(name, &spec.client_connect_exceptions)
            .await?;
        self.reconcile_publish_exceptions(name, &spec.publish_topic_exceptions)
            .await?;
        self.reconcile_subscribe_exceptions(name, &spec.subscribe_topic_exceptions)
            .await?;

        Ok(outcome)
    }

    async fn reconcile_connect_exceptions(
        &self,
        profile: &str,
        desired: &[String],
    ) -> Result<(), promesh_api::Error> {
        let live: Vec<String> = self
            .semp
            .list_client_connect_exceptions(profile)
            .await?
            .into_iter()
            .map(|e| e.client_connect_exception_address)
            .collect();

        let (to_create, to_delete) = child_diff(desired, &live);
        for address in to_create {
            Self::tolerate_conflict(
                self.semp
                    .create_client_connect_exception(profile, address)
                    .await,
            )?;
        }
        for address in to_delete {
            Self::tolerate_conflict(
                self.semp
                    .delete_client_connect_exception(profile, address)
                    .await,
            )?;
        }
        Ok(())
    }

    async fn reconcile_publish_exceptions(
        &self,
        profile: &str,
        desired: &[String],
    ) -> Result<(), promesh_api::Error> {
        let live = self.semp.list_publish_topic_exceptions(profile).await?;
        let live_keys: Vec<String> = live
            .iter()
            .map(|e| e.publish_topic_exception.clone())
            .collect();

        let (to_create, to_delete) = child_diff(desired, &live_keys);
        for topic in to_create {
            let exception = MsgVpnAclProfilePublishTopicException {
                acl_profile_name: None,
                msg_vpn_name: None,
                publish_topic_exception: topic.to_owned(),
                publish_topic_exception_syntax: TOPIC_SYNTAX_SMF.into(),
            };
            Self::tolerate_conflict(
                self.semp
                    .create_publish_topic_exception(profile, &exception)
                    .await,
            )?;
        }
        for topic in to_delete {
            // Delete with the syntax the live entry carries.
            let syntax = live
                .iter()
                .find(|e| e.publish_topic_exception == topic)
                .map_or(TOPIC_SYNTAX_SMF, |e| {
                    e.publish_topic_exception_syntax.as_str()
                });
            Self::tolerate_conflict(
                self.semp
                    .delete_publish_topic_exception(profile, syntax, topic)
                    .await,
            )?;
        }
        Ok(())
    }

    async fn reconcile_subscribe_exceptions(
        &self,
        profile: &str,
        desired: &[String],
    ) -> Result<(), promesh_api::Error> {
        let live = self.semp.list_subscribe_topic_exceptions(profile).await?;
        let live_keys: Vec<String> = live
            .iter()
            .map(|e| e.subscribe_topic_exception.clone())
            .collect();

        let (to_create, to_delete) = child_diff(desired, &live_keys);
        for topic in to_create {
            let exception = MsgVpnAclProfileSubscribeTopicException {
                acl_profile_name: None,
                msg_vpn_name: None,
                subscribe_topic_exception: topic.to_owned(),
                subscribe_topic_exception_syntax: TOPIC_SYNTAX_SMF.into(),
            };
            Self::tolerate_conflict(
                self.semp
                    .create_subscribe_topic_exception(profile, &exception)
                    .await,
            )?;
        }
        for topic in to_delete {
            let syntax = live
                .iter()
                .find(|e| e.subscribe_topic_exception == topic)
                .map_or(TOPIC_SYNTAX_SMF, |e| {
                    e.subscribe_topic_exception_syntax.as_str()
                });
            Self::tolerate_conflict(
                self.semp
                    .delete_subscribe_topic_exception(profile, syntax, topic)
                    .await,
            )?;
        }
        Ok(())
    }

    // ── Client identities ────────────────────────────────────────────

    async fn apply_client_username(
        &self,
        username: &promesh_api::semp::types::MsgVpnClientUsername,
    ) -> Result<ObjectOutcome, promesh_api::Error> {
        if self
            .semp
            .probe_client_username(&username.client_username)
            .await?
            .is_some()
        {
            self.semp.replace_client_username(username).await?;
            Ok(ObjectOutcome::Updated)
        } else {
            Self::created_or_raced(self.semp.create_client_username(username).await)
        }
    }

    async fn apply_client_certificate_username(
        &self,
        username: &promesh_api::semp::types::MsgVpnClientCertificateUsername,
    ) -> Result<ObjectOutcome, promesh_api::Error> {
        if self
            .semp
            .probe_client_certificate_username(&username.certificate_username)
            .await?
            .is_some()
        {
            self.semp
                .replace_client_certificate_username(username)
                .await?;
            Ok(ObjectOutcome::Updated)
        } else {
            Self::created_or_raced(
                self.semp
                    .create_client_certificate_username(username)
                    .await,
            )
        }
    }

    async fn apply_authorization_group(
        &self,
        group: &promesh_api::semp::types::MsgVpnAuthorizationGroup,
    ) -> Result<ObjectOutcome, promesh_api::Error> {
        if self
            .semp
            .probe_authorization_group(&group.authorization_group_name)
            .await?
            .is_some()
        {
            self.semp.replace_authorization_group(group).await?;
            Ok(ObjectOutcome::Updated)
        } else {
            Self::created_or_raced(self.semp.create_authorization_group(group).await)
        }
    }

    // ── Queues ───────────────────────────────────────────────────────

    async fn apply_queue(&self, spec: &QueueSpec) -> Result<ObjectOutcome, promesh_api::Error> {
        let name = &spec.queue_configuration.queue_name;

        let outcome = if self.semp.probe_queue(name).await?.is_some() {
            self.semp.replace_queue(&spec.queue_configuration).await?;
            ObjectOutcome::Updated
        } else {
            Self::created_or_raced(self.semp.create_queue(&spec.queue_configuration).await)?
        };

        let live: Vec<String> = self
            .semp
            .list_queue_subscriptions(name)
            .await?
            .into_iter()
            .map(|s| s.subscription_topic)
            .collect();

        let (to_create, to_delete) = child_diff(&spec.subscriptions, &live);
        for topic in to_create {
            Self::tolerate_conflict(self.semp.create_queue_subscription(name, topic).await)?;
        }
        for topic in to_delete {
            Self::tolerate_conflict(self.semp.delete_queue_subscription(name, topic).await)?;
        }

        Ok(outcome)
    }

    // ── REST delivery points ─────────────────────────────────────────

    async fn apply_rest_delivery_point(
        &self,
        rdp: &promesh_api::semp::types::MsgVpnRestDeliveryPoint,
    ) -> Result<ObjectOutcome, promesh_api::Error> {
        if self
            .semp
            .probe_rest_delivery_point(&rdp.rest_delivery_point_name)
            .await?
            .is_some()
        {
            self.semp.replace_rest_delivery_point(rdp).await?;
            Ok(ObjectOutcome::Updated)
        } else {
            Self::created_or_raced(self.semp.create_rest_delivery_point(rdp).await)
        }
    }

    // ── Queue bindings ───────────────────────────────────────────────

    async fn apply_queue_binding(
        &self,
        spec: &QueueBindingSpec,
    ) -> Result<ObjectOutcome, promesh_api::Error> {
        let rdp = &spec.rest_delivery_point_name;
        let name = &spec.queue_binding.queue_binding_name;

        let outcome = if self.semp.probe_queue_binding(rdp, name).await?.is_some() {
            self.semp
                .replace_queue_binding(rdp, &spec.queue_binding)
                .await?;
            ObjectOutcome::Updated
        } else {
            Self::created_or_raced(
                self.semp.create_queue_binding(rdp, &spec.queue_binding).await,
            )?
        };

        self.reconcile_request_headers(rdp, name, &spec.request_headers)
            .await?;
        self.reconcile_protected_request_headers(rdp, name, &spec.protected_request_headers)
            .await?;

        Ok(outcome)
    }

    async fn reconcile_request_headers(
        &self,
        rdp: &str,
        binding: &str,
        desired: &[MsgVpnRestDeliveryPointQueueBindingRequestHeader],
    ) -> Result<(), promesh_api::Error> {
        let desired_keys: Vec<String> = desired.iter().map(|h| h.header_name.clone()).collect();
        let live_keys: Vec<String> = self
            .semp
            .list_request_headers(rdp, binding)
            .await?
            .into_iter()
            .map(|h| h.header_name)
            .collect();

        let (to_create, to_delete) = child_diff(&desired_keys, &live_keys);
        for name in to_create {
            if let Some(header) = desired.iter().find(|h| h.header_name == name) {
                Self::tolerate_conflict(
                    self.semp.create_request_header(rdp, binding, header).await,
                )?;
            }
        }
        for name in to_delete {
            Self::tolerate_conflict(self.semp.delete_request_header(rdp, binding, name).await)?;
        }
        Ok(())
    }

    async fn reconcile_protected_request_headers(
        &self,
        rdp: &str,
        binding: &str,
        desired: &[MsgVpnRestDeliveryPointQueueBindingProtectedRequestHeader],
    ) -> Result<(), promesh_api::Error> {
        let desired_keys: Vec<String> = desired.iter().map(|h| h.header_name.clone()).collect();
        let live_keys: Vec<String> = self
            .semp
            .list_protected_request_headers(rdp, binding)
            .await?
            .into_iter()
            .map(|h| h.header_name)
            .collect();

        let (to_create, to_delete) = child_diff(&desired_keys, &live_keys);
        for name in to_create {
            if let Some(header) = desired.iter().find(|h| h.header_name == name) {
                Self::tolerate_conflict(
                    self.semp
                        .create_protected_request_header(rdp, binding, header)
                        .await,
                )?;
            }
        }
        for name in to_delete {
            Self::tolerate_conflict(
                self.semp
                    .delete_protected_request_header(rdp, binding, name)
                    .await,
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::child_diff;

    fn owned(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn diff_disjoint_sets() {
        let desired = owned(&["a", "b"]);
        let live = owned(&["c", "d"]);
        let (create, delete) = child_diff(&desired, &live);
        assert_eq!(create, vec!["a", "b"]);
        assert_eq!(delete, vec!["c", "d"]);
    }

    #[test]
    fn diff_live_subset_of_desired() {
        let desired = owned(&["a", "b", "c"]);
        let live = owned(&["b"]);
        let (create, delete) = child_diff(&desired, &live);
        assert_eq!(create, vec!["a", "c"]);
        assert!(delete.is_empty());
    }

    #[test]
    fn diff_desired_subset_of_live() {
        let desired = owned(&["b"]);
        let live = owned(&["a", "b", "c"]);
        let (create, delete) = child_diff(&desired, &live);
        assert!(create.is_empty());
        assert_eq!(delete, vec!["a", "c"]);
    }

    #[test]
    fn diff_equal_sets_is_a_no_op() {
        let desired = owned(&["x", "y"]);
        let live = owned(&["y", "x"]);
        let (create, delete) = child_diff(&desired, &live);
        assert!(create.is_empty());
        assert!(delete.is_empty());
    }
}
