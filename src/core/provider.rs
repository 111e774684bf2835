use crate::app::data_sources::{ProjectDataSource, UserGroupDataSource};
use crate::app::resources::UserGroupResource;
use crate::config::{provider_schema, HarborConfig};
use crate::core::client::HarborClient;
use crate::core::protocol::{Diagnostic, SchemaKind};
use crate::core::{ConfigProvider, DataSource, HarborApi, Resource};
use crate::domain::schema::{is_zero_value, ResourceData, Schema};
use crate::utils::error::{ProviderError, Result};
use crate::utils::validation::Validate;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderSchema {
    pub provider: Schema,
    pub data_sources: BTreeMap<String, Schema>,
    pub resources: BTreeMap<String, Schema>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanAction {
    Create,
    Update,
    Replace,
    NoOp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanResult {
    pub action: PlanAction,
    pub planned_state: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub requires_replace: Vec<String>,
}

/// Registry of handlers plus the configured Harbor client.
pub struct Provider {
    data_sources: BTreeMap<String, Box<dyn DataSource>>,
    resources: BTreeMap<String, Box<dyn Resource>>,
    base_config: HarborConfig,
    client: Option<Arc<dyn HarborApi>>,
}

impl Provider {
    /// `base_config` comes from env and the config file; `configure` layers the host's block on top.
    pub fn new(base_config: HarborConfig) -> Self {
        let mut data_sources: BTreeMap<String, Box<dyn DataSource>> = BTreeMap::new();
        data_sources.insert("harbor_project".to_string(), Box::new(ProjectDataSource));
        data_sources.insert("harbor_usergroup".to_string(), Box::new(UserGroupDataSource));

        let mut resources: BTreeMap<String, Box<dyn Resource>> = BTreeMap::new();
        resources.insert("harbor_usergroup".to_string(), Box::new(UserGroupResource));

        Self {
            data_sources,
            resources,
            base_config,
            client: None,
        }
    }

    /// Provider that is already configured with `client`.
    pub fn with_client(client: Arc<dyn HarborApi>) -> Self {
        let mut provider = Self::new(HarborConfig::default());
        provider.client = Some(client);
        provider
    }

    pub fn schema(&self) -> ProviderSchema {
        ProviderSchema {
            provider: provider_schema(),
            data_sources: self
                .data_sources
                .iter()
                .map(|(name, ds)| (name.clone(), ds.schema()))
                .collect(),
            resources: self
                .resources
                .iter()
                .map(|(name, r)| (name.clone(), r.schema()))
                .collect(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    pub fn configure(&mut self, config: &Value) -> Result<Vec<Diagnostic>> {
        let merged = self.base_config.clone().merge(HarborConfig::from_value(config)?);
        merged.validate()?;

        let client = HarborClient::new(&merged)?;
        tracing::info!("Configured Harbor client for {}", client.base_url());

        let mut warnings = Vec::new();
        if merged.insecure() {
            warnings.push(Diagnostic::warning("TLS certificate verification is disabled"));
        }
        if merged.username().is_none() {
            warnings.push(Diagnostic::warning(
                "No username configured, requests are sent anonymously",
            ));
        }

        self.client = Some(Arc::new(client));
        Ok(warnings)
    }

    fn client(&self) -> Result<&dyn HarborApi> {
        self.client.as_deref().ok_or(ProviderError::NotConfiguredError)
    }

    fn data_source(&self, type_name: &str) -> Result<&dyn DataSource> {
        self.data_sources
            .get(type_name)
            .map(|ds| ds.as_ref())
            .ok_or_else(|| ProviderError::UnknownTypeError {
                kind: "data source".to_string(),
                type_name: type_name.to_string(),
            })
    }

    fn resource(&self, type_name: &str) -> Result<&dyn Resource> {
        self.resources
            .get(type_name)
            .map(|r| r.as_ref())
            .ok_or_else(|| ProviderError::UnknownTypeError {
                kind: "resource".to_string(),
                type_name: type_name.to_string(),
            })
    }

    /// Resource config checked against the schema and the handler's own rules.
    fn resource_data(&self, resource: &dyn Resource, config: &Value) -> Result<ResourceData> {
        let data = ResourceData::from_config(&resource.schema(), config)?;
        resource.validate(&data)?;
        Ok(data)
    }

    pub fn validate(&self, kind: SchemaKind, type_name: &str, config: &Value) -> Result<()> {
        match kind {
            SchemaKind::DataSource => {
                ResourceData::from_config(&self.data_source(type_name)?.schema(), config)?;
            }
            SchemaKind::Resource => {
                let resource = self.resource(type_name)?;
                self.resource_data(resource, config)?;
            }
        }
        Ok(())
    }

    pub async fn read_data_source(&self, type_name: &str, config: &Value) -> Result<Value> {
        let data_source = self.data_source(type_name)?;
        let schema = data_source.schema();
        let mut data = ResourceData::from_config(&schema, config)?;

        tracing::debug!("Reading data source {}", type_name);
        data_source.read(self.client()?, &mut data).await?;
        Ok(data.into_state(&schema))
    }

    /// Diff `config` against `prior_state` without touching Harbor.
    pub fn plan(
        &self,
        type_name: &str,
        prior_state: Option<&Value>,
        config: &Value,
    ) -> Result<PlanResult> {
        let resource = self.resource(type_name)?;
        let schema = resource.schema();
        let proposed = self.resource_data(resource, config)?;

        let Some(prior_state) = prior_state.filter(|s| !s.is_null()) else {
            return Ok(PlanResult {
                action: PlanAction::Create,
                planned_state: proposed.into_state(&schema),
                requires_replace: Vec::new(),
            });
        };

        let prior = ResourceData::from_state(prior_state)?;
        let mut planned = ResourceData::new();
        let mut changed = Vec::new();
        let mut requires_replace = Vec::new();

        for (name, attribute) in &schema.attributes {
            let prior_value = prior.get(name).cloned().unwrap_or(Value::Null);

            if attribute.is_computed_only() {
                planned.set(name, prior_value);
                continue;
            }

            let proposed_value = proposed.get(name).cloned().unwrap_or(Value::Null);
            if attribute.computed && proposed_value.is_null() {
                planned.set(name, prior_value);
                continue;
            }

            let both_unset = is_zero_value(&proposed_value) && is_zero_value(&prior_value);
            if !both_unset && proposed_value != prior_value {
                changed.push(name.clone());
                if attribute.force_new {
                    requires_replace.push(name.clone());
                }
            }
            planned.set(name, proposed_value);
        }

        let action = match (changed.is_empty(), requires_replace.is_empty()) {
            (true, _) => PlanAction::NoOp,
            (false, true) => PlanAction::Update,
            (false, false) => PlanAction::Replace,
        };

        if action != PlanAction::Replace {
            if let Some(id) = prior.id() {
                planned.set_id(id);
            }
        }

        tracing::debug!("Planned {:?} for {} (changed: {:?})", action, type_name, changed);
        Ok(PlanResult {
            action,
            planned_state: planned.into_state(&schema),
            requires_replace,
        })
    }

    pub async fn create(&self, type_name: &str, config: &Value) -> Result<Value> {
        let resource = self.resource(type_name)?;
        let mut data = self.resource_data(resource, config)?;

        resource.create(self.client()?, &mut data).await?;
        if data.id().is_none() {
            return Err(ProviderError::NotFoundError {
                kind: type_name.to_string(),
            });
        }
        Ok(data.into_state(&resource.schema()))
    }

    /// `None` means the object no longer exists remotely.
    pub async fn read(&self, type_name: &str, state: &Value) -> Result<Option<Value>> {
        let resource = self.resource(type_name)?;
        let mut data = ResourceData::from_state(state)?;

        resource.read(self.client()?, &mut data).await?;
        if data.id().is_none() {
            return Ok(None);
        }
        Ok(Some(data.into_state(&resource.schema())))
    }

    pub async fn update(&self, type_name: &str, prior_state: &Value, config: &Value) -> Result<Value> {
        let resource = self.resource(type_name)?;
        let prior = ResourceData::from_state(prior_state)?;
        let mut data = self.resource_data(resource, config)?;
        let id = prior.id().ok_or_else(|| ProviderError::InvalidInputError {
            message: "prior state has no ID".to_string(),
        })?;
        data.set_id(id);

        resource.update(self.client()?, &mut data).await?;
        if data.id().is_none() {
            return Err(ProviderError::NotFoundError {
                kind: type_name.to_string(),
            });
        }
        Ok(data.into_state(&resource.schema()))
    }

    pub async fn delete(&self, type_name: &str, state: &Value) -> Result<()> {
        let resource = self.resource(type_name)?;
        let data = ResourceData::from_state(state)?;
        resource.delete(self.client()?, &data).await
    }

    pub async fn import(&self, type_name: &str, id: &str) -> Result<Value> {
        let resource = self.resource(type_name)?;
        let mut data = ResourceData::new();
        data.set_id(id);

        resource.read(self.client()?, &mut data).await?;
        if data.id().is_none() {
            return Err(ProviderError::NotFoundError {
                kind: type_name.to_string(),
            });
        }
        Ok(data.into_state(&resource.schema()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::MockHarbor;
    use crate::domain::model::UserGroup;
    use serde_json::json;

    fn provider() -> Provider {
        let client = MockHarbor::new().with_groups(vec![UserGroup {
            id: 3,
            group_name: "devs".to_string(),
            group_type: 2,
            ..Default::default()
        }]);
        Provider::with_client(Arc::new(client))
    }

    fn prior() -> Value {
        json!({"id": "3", "group_name": "devs", "group_type": 2, "ldap_group_dn": ""})
    }

    #[test]
    fn test_plan_create_without_prior() {
        let plan = provider()
            .plan("harbor_usergroup", None, &json!({"group_name": "devs", "group_type": 2}))
            .unwrap();
        assert_eq!(plan.action, PlanAction::Create);
        assert_eq!(plan.planned_state["id"], Value::Null);
    }

    #[test]
    fn test_plan_no_op_ignores_unset_optional() {
        let plan = provider()
            .plan(
                "harbor_usergroup",
                Some(&prior()),
                &json!({"group_name": "devs", "group_type": 2}),
            )
            .unwrap();
        assert_eq!(plan.action, PlanAction::NoOp);
        assert_eq!(plan.planned_state["id"], json!("3"));
    }

    #[test]
    fn test_plan_update_and_replace() {
        let provider = provider();

        let rename = provider
            .plan(
                "harbor_usergroup",
                Some(&prior()),
                &json!({"group_name": "developers", "group_type": 2}),
            )
            .unwrap();
        assert_eq!(rename.action, PlanAction::Update);
        assert!(rename.requires_replace.is_empty());

        let retype = provider
            .plan(
                "harbor_usergroup",
                Some(&prior()),
                &json!({"group_name": "devs", "group_type": 3}),
            )
            .unwrap();
        assert_eq!(retype.action, PlanAction::Replace);
        assert_eq!(retype.requires_replace, vec!["group_type".to_string()]);
        assert_eq!(retype.planned_state["id"], Value::Null);
    }

    #[test]
    fn test_plan_rejects_invalid_group_type() {
        let err = provider()
            .plan("harbor_usergroup", None, &json!({"group_name": "devs", "group_type": 0}))
            .unwrap_err();
        assert!(matches!(err, ProviderError::SchemaError { .. }));
    }

    #[tokio::test]
    async fn test_unknown_type_and_unconfigured() {
        let err = provider()
            .read_data_source("harbor_robot", &json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "unknown data source type: harbor_robot");

        let unconfigured = Provider::new(HarborConfig::default());
        let err = unconfigured
            .read_data_source("harbor_project", &json!({"name": "library"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotConfiguredError));
    }

    #[tokio::test]
    async fn test_resource_lifecycle() {
        let provider = provider();

        let created = provider
            .create("harbor_usergroup", &json!({"group_name": "qa", "group_type": 2}))
            .await
            .unwrap();
        assert_eq!(created["id"], json!("4"));

        let updated = provider
            .update(
                "harbor_usergroup",
                &created,
                &json!({"group_name": "quality", "group_type": 2}),
            )
            .await
            .unwrap();
        assert_eq!(updated["group_name"], json!("quality"));

        provider.delete("harbor_usergroup", &updated).await.unwrap();
        let gone = provider.read("harbor_usergroup", &updated).await.unwrap();
        assert_eq!(gone, None);
    }

    #[tokio::test]
    async fn test_import_by_id() {
        let provider = provider();

        let imported = provider.import("harbor_usergroup", "3").await.unwrap();
        assert_eq!(imported["group_name"], json!("devs"));

        let err = provider.import("harbor_usergroup", "abc").await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidInputError { .. }));

        let missing = provider.import("harbor_usergroup", "99").await.unwrap_err();
        assert_eq!(missing.to_string(), "harbor_usergroup not found");
    }

    #[test]
    fn test_configure_rejects_missing_url() {
        let mut provider = Provider::new(HarborConfig::default());
        let err = provider.configure(&json!({"username": "admin"})).unwrap_err();
        assert_eq!(err.to_string(), "Missing configuration: harbor.url");
        assert!(!provider.is_configured());
    }

    #[test]
    fn test_configure_warns_on_insecure() {
        let mut provider = Provider::new(HarborConfig {
            url: Some("https://harbor.example.com".to_string()),
            username: Some("admin".to_string()),
            ..Default::default()
        });

        let warnings = provider.configure(&json!({"insecure": true})).unwrap();
        assert!(provider.is_configured());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].summary.contains("TLS"));
    }

    #[test]
    fn test_schema_lists_types() {
        let schema = provider().schema();
        assert!(schema.data_sources.contains_key("harbor_project"));
        assert!(schema.data_sources.contains_key("harbor_usergroup"));
        assert!(schema.resources.contains_key("harbor_usergroup"));
        assert!(schema.provider.attribute("password").unwrap().sensitive);
    }
}
