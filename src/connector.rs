//! Caller-facing connector
//!
//! [`CrmConnector`] ties configuration, transport selection and pagination
//! together and exposes the operations the presentation layer uses:
//!
//! - `call`: one remote call, normalized into an [`ApiResponse`]
//! - `fetch_all`: every page of a collection method
//! - `fetch_tasks`: the task list of one responsible user
//! - `fetch_list_elements`: list elements gathered across list-type ids
//! - `check`: connectivity check

use crate::config::ClientConfig;
use crate::envelope::ApiResponse;
use crate::error::{Error, ErrorKind, Result};
use crate::http::{HttpTransport, TransportClient};
use crate::pagination::{AccumulatedCollection, PaginationEngine};
use crate::record::{CanonicalField, RecordNormalizer};
use crate::transport::{TransportPreference, TransportSelector};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Remote method listing tasks
pub const TASK_LIST_METHOD: &str = "tasks.task.list";

/// Remote method listing list elements
pub const LIST_ELEMENTS_METHOD: &str = "lists.element.get";

/// Remote method used for connectivity checks
pub const PROFILE_METHOD: &str = "profile";

/// List-type identifiers tried when none are given
pub const DEFAULT_LIST_TYPE_IDS: &[&str] = &["lists", "lists_socnet", "bitrix_processes"];

// ============================================================================
// Check Result
// ============================================================================

/// Result of a connection check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    /// Whether the check succeeded
    pub success: bool,

    /// Error message if failed
    pub message: Option<String>,
}

impl CheckResult {
    /// Create a successful check result
    pub fn success() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    /// Create a failed check result
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

// ============================================================================
// Connector
// ============================================================================

/// Data-access entry point for task and list collections
pub struct CrmConnector<C = HttpTransport> {
    config: ClientConfig,
    selector: Option<TransportSelector<C>>,
    preference: Arc<TransportPreference>,
}

impl CrmConnector<HttpTransport> {
    /// Build a connector over HTTP from configuration.
    ///
    /// Fails when no webhook is configured, unless demo mode is on.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        if config.demo_mode && config.webhook.is_none() {
            let preference = Arc::new(TransportPreference::new(config.supports_proxy()));
            return Ok(Self {
                config,
                selector: None,
                preference,
            });
        }
        let transport = HttpTransport::with_config(config.transport_config()?)?;
        Ok(Self::with_client(config, transport))
    }
}

impl<C: TransportClient> CrmConnector<C> {
    /// Build a connector over any transport client
    pub fn with_client(config: ClientConfig, client: C) -> Self {
        let preference = Arc::new(TransportPreference::new(config.supports_proxy()));
        Self {
            config,
            selector: Some(TransportSelector::new(client)),
            preference,
        }
    }

    /// Share a transport preference with other connectors in the session
    #[must_use]
    pub fn with_preference(mut self, preference: Arc<TransportPreference>) -> Self {
        self.preference = preference;
        self
    }

    /// Configuration in use
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Transport preference state
    pub fn preference(&self) -> &Arc<TransportPreference> {
        &self.preference
    }

    fn selector(&self) -> Result<&TransportSelector<C>> {
        self.selector
            .as_ref()
            .ok_or_else(|| Error::missing_field("webhook"))
    }

    /// Perform a single call and normalize the response
    pub async fn call(&self, method: &str, params: &Value) -> Result<ApiResponse> {
        let method = method.trim();
        if method.is_empty() {
            return Err(Error::config("remote method is required"));
        }
        let body = self.selector()?.call(method, params, &self.preference).await?;
        Ok(ApiResponse::from_body(body))
    }

    /// Fetch every page of a collection method
    pub async fn fetch_all(&self, method: &str, base_params: &Value) -> Result<AccumulatedCollection> {
        self.fetch_all_with(method, base_params, RecordNormalizer::new())
            .await
    }

    async fn fetch_all_with(
        &self,
        method: &str,
        base_params: &Value,
        normalizer: RecordNormalizer,
    ) -> Result<AccumulatedCollection> {
        let selector = self.selector()?;
        PaginationEngine::new(selector, &self.preference, self.config.pagination.clone())
            .with_normalizer(normalizer)
            .fetch_all(method, base_params)
            .await
    }

    /// Parameters for the task list of `user_id`
    pub fn task_params(user_id: &str) -> Value {
        let select: Vec<&str> = CanonicalField::TASK_FIELDS.iter().map(|f| f.key()).collect();
        json!({
            "filter": { "RESPONSIBLE_ID": user_id },
            "select": select,
            "order": { "DEADLINE": "ASC" },
            "start": 0
        })
    }

    /// Fetch all tasks assigned to a remote user id
    pub async fn fetch_tasks(&self, user_id: &str) -> Result<AccumulatedCollection> {
        if self.config.demo_mode {
            let normalizer = RecordNormalizer::new();
            debug!("Demo mode: serving {} configured tasks", self.config.demo_tasks.len());
            return Ok(AccumulatedCollection::from_records(
                normalizer.normalize_all(&self.config.demo_tasks),
            ));
        }

        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(Error::config(
                "remote user id is not set; check user_mapping or pass it explicitly",
            ));
        }

        self.fetch_all(TASK_LIST_METHOD, &Self::task_params(user_id))
            .await
    }

    /// Fetch tasks for an external identity via `user_mapping`
    pub async fn fetch_tasks_for(&self, external_id: &str) -> Result<AccumulatedCollection> {
        let user_id = self
            .config
            .resolve_user_id(external_id)
            .map(str::to_string)
            .unwrap_or_default();
        self.fetch_tasks(&user_id).await
    }

    /// Fetch list elements of `iblock_id`, trying each list-type id.
    ///
    /// List types the remote rejects are skipped. Results are merged in
    /// list-type order and deduplicated on identifier.
    pub async fn fetch_list_elements(
        &self,
        iblock_id: &str,
        type_ids: &[&str],
    ) -> Result<AccumulatedCollection> {
        if iblock_id.trim().is_empty() {
            return Err(Error::config("list id is required"));
        }
        let type_ids = if type_ids.is_empty() {
            DEFAULT_LIST_TYPE_IDS
        } else {
            type_ids
        };

        let lookups = type_ids.iter().map(|type_id| {
            let params = json!({
                "IBLOCK_TYPE_ID": type_id,
                "IBLOCK_ID": iblock_id.trim(),
            });
            async move {
                let outcome = self
                    .fetch_all_with(LIST_ELEMENTS_METHOD, &params, RecordNormalizer::list_elements())
                    .await;
                (*type_id, outcome)
            }
        });

        let mut merged = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut last_rejection = None;
        let mut matched = 0usize;

        for (type_id, outcome) in join_all(lookups).await {
            match outcome {
                Ok(collection) => {
                    matched += 1;
                    debug!("List type {} returned {} elements", type_id, collection.len());
                    for record in collection.records {
                        let fresh = match record.id() {
                            Some(id) => seen.insert(id.to_string()),
                            None => true,
                        };
                        if fresh {
                            merged.push(record);
                        }
                    }
                }
                Err(e) if e.kind() == ErrorKind::RemoteRejection => {
                    debug!("List type {} rejected: {}", type_id, e);
                    last_rejection = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        if matched == 0 {
            if let Some(e) = last_rejection {
                return Err(e);
            }
        }

        info!("List {} merged {} elements", iblock_id, merged.len());
        Ok(AccumulatedCollection::from_records(merged))
    }

    /// Check connectivity with a lightweight call
    pub async fn check(&self) -> CheckResult {
        match self.call(PROFILE_METHOD, &json!({})).await {
            Ok(_) => CheckResult::success(),
            Err(e) => CheckResult::failure(e.to_string()),
        }
    }
}

impl<C> std::fmt::Debug for CrmConnector<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrmConnector")
            .field("webhook_configured", &self.config.webhook.is_some())
            .field("demo_mode", &self.config.demo_mode)
            .field("preference", &self.preference)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Transport, TransportError};
    use crate::test_support::{network, ScriptedClient};
    use pretty_assertions::assert_eq;

    fn config() -> ClientConfig {
        ClientConfig::from_yaml_str(
            "webhook: https://crm.example.com/rest/13/key\nproxy:\n  url: https://app.example.com/server/bitrix\nuser_mapping:\n  \"42\": \"13\"\n",
        )
        .unwrap()
    }

    #[test]
    fn test_task_params() {
        let params = CrmConnector::<ScriptedClient>::task_params("13");
        assert_eq!(
            params,
            json!({
                "filter": {"RESPONSIBLE_ID": "13"},
                "select": ["ID", "TITLE", "DESCRIPTION", "STATUS", "DEADLINE", "CREATED_DATE", "CLOSED_DATE", "PRIORITY"],
                "order": {"DEADLINE": "ASC"},
                "start": 0
            })
        );
    }

    #[test]
    fn test_from_config_requires_webhook() {
        let err = CrmConnector::from_config(ClientConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_call_normalizes_response() {
        let client = ScriptedClient::new().direct(Ok(json!({"result": {"ID": 1}, "total": "3"})));
        let connector = CrmConnector::with_client(config(), client);

        let response = connector.call("profile", &json!({})).await.unwrap();
        assert_eq!(response.result, json!({"ID": 1}));
        assert_eq!(response.total, Some(3));
    }

    #[tokio::test]
    async fn test_call_requires_method() {
        let connector = CrmConnector::with_client(config(), ScriptedClient::new());
        let err = connector.call("  ", &json!({})).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_fetch_tasks_requires_user_before_network() {
        let connector = CrmConnector::with_client(config(), ScriptedClient::new());
        let err = connector.fetch_tasks(" ").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let err = connector.fetch_tasks_for("unknown").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_fetch_tasks_for_mapped_identity() {
        let client = ScriptedClient::new().direct(Ok(json!({
            "result": {"tasks": [{"id": 5, "title": "Launch campaign", "status": 2}]},
            "total": 1
        })));
        let connector = CrmConnector::with_client(config(), client);

        let collection = connector.fetch_tasks_for("42").await.unwrap();

        assert_eq!(collection.total, 1);
        assert_eq!(collection.records[0].id(), Some("5"));
    }

    #[tokio::test]
    async fn test_demo_mode_skips_network() {
        let mut config = ClientConfig::default();
        config.demo_mode = true;
        config.demo_tasks = vec![json!({"ID": 101, "STATUS": 3}), json!({"ID": "102"})];

        let connector = CrmConnector::from_config(config).unwrap();
        let collection = connector.fetch_tasks("").await.unwrap();

        assert_eq!(collection.total, 2);
        assert_eq!(
            collection.records[0].get(CanonicalField::Status),
            Some(&json!("3"))
        );

        let err = connector.call("profile", &json!({})).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_shared_preference_demotes_all_connectors() {
        let preference = Arc::new(TransportPreference::new(true));
        let first = CrmConnector::with_client(
            config(),
            ScriptedClient::new()
                .direct(Err(network(Transport::Direct)))
                .proxy(Ok(json!({"result": []}))),
        )
        .with_preference(Arc::clone(&preference));
        let second = CrmConnector::with_client(
            config(),
            ScriptedClient::new().proxy(Ok(json!({"result": []}))),
        )
        .with_preference(Arc::clone(&preference));

        first.call("profile", &json!({})).await.unwrap();
        assert!(preference.prefer_proxy());
        second.call("profile", &json!({})).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_types_merge_and_dedupe() {
        // join_all polls lookups in order and the fake resolves immediately,
        // so each list type consumes the next scripted page.
        let client = ScriptedClient::new()
            .direct(Ok(json!({"result": [{"ID": "1"}, {"ID": "2"}]})))
            .direct(Err(TransportError::rejected(
                Transport::Direct,
                400,
                "wrong list type",
            )))
            .direct(Ok(json!({"result": [{"ID": "2"}, {"ID": "3"}, {"NAME": "no id"}]})));
        let connector = CrmConnector::with_client(config(), client);

        let collection = connector.fetch_list_elements("42", &[]).await.unwrap();
        let ids: Vec<Option<&str>> = collection.records.iter().map(|r| r.id()).collect();

        assert_eq!(ids, vec![Some("1"), Some("2"), Some("3"), None]);
        assert_eq!(collection.total, 4);
        assert_eq!(collection.records[3].get_str(CanonicalField::Name), Some("no id"));
    }

    #[tokio::test]
    async fn test_list_elements_keep_name_and_properties() {
        let client = ScriptedClient::new().direct(Ok(json!({
            "result": [{
                "ID": "7",
                "NAME": "Spring campaign",
                "IBLOCK_ID": "42",
                "PROPERTY_101": {"1": "active"},
                "property_102": "2024-06-01"
            }]
        })));
        let connector = CrmConnector::with_client(config(), client);

        let collection = connector
            .fetch_list_elements("42", &["lists"])
            .await
            .unwrap();

        assert_eq!(
            collection.records[0].to_json(),
            json!({
                "ID": "7",
                "NAME": "Spring campaign",
                "PROPERTIES": {
                    "PROPERTY_101": {"1": "active"},
                    "PROPERTY_102": "2024-06-01"
                }
            })
        );
    }

    #[tokio::test]
    async fn test_tasks_do_not_pick_up_list_fields() {
        let client = ScriptedClient::new().direct(Ok(json!({
            "result": {"tasks": [{"id": "5", "name": "ignored", "PROPERTY_1": "x"}]}
        })));
        let connector = CrmConnector::with_client(config(), client);

        let collection = connector.fetch_tasks("13").await.unwrap();
        assert_eq!(collection.records[0].to_json(), json!({"ID": "5"}));
    }

    #[tokio::test]
    async fn test_list_types_all_rejected() {
        let client = ScriptedClient::new()
            .direct(Err(TransportError::rejected(Transport::Direct, 400, "a")))
            .direct(Err(TransportError::rejected(Transport::Direct, 400, "b")));
        let connector = CrmConnector::with_client(config(), client);

        let err = connector
            .fetch_list_elements("42", &["lists", "lists_socnet"])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteRejection);
    }

    #[tokio::test]
    async fn test_check_reports_failure() {
        let client = ScriptedClient::new()
            .direct(Err(TransportError::rejected(Transport::Direct, 401, "HTTP 401")));
        let connector = CrmConnector::with_client(config(), client);

        let result = connector.check().await;
        assert!(!result.success);
        assert!(result.message.unwrap().contains("401"));
    }
}
