use crate::core::{HarborApi, Resource};
use crate::domain::model::{UserGroup, GROUP_TYPE_HTTP, GROUP_TYPE_LDAP, GROUP_TYPE_OIDC};
use crate::domain::schema::{Attribute, AttributeType, ResourceData, Schema};
use crate::utils::error::Result;
use crate::utils::validation::validate_one_of;
use async_trait::async_trait;

/// `harbor_usergroup` resource.
pub struct UserGroupResource;

impl UserGroupResource {
    fn group_from_data(data: &ResourceData) -> UserGroup {
        UserGroup {
            id: 0,
            group_name: data.get_str("group_name").to_string(),
            group_type: data.get_int("group_type"),
            ldap_group_dn: data.get_str("ldap_group_dn").to_string(),
        }
    }
}

#[async_trait]
impl Resource for UserGroupResource {
    fn schema(&self) -> Schema {
        Schema::new()
            .with_attribute("group_name", Attribute::required(AttributeType::String))
            .with_attribute(
                "group_type",
                Attribute::required(AttributeType::Int)
                    .force_new()
                    .with_description("1 = LDAP, 2 = HTTP, 3 = OIDC"),
            )
            .with_attribute(
                "ldap_group_dn",
                Attribute::optional(AttributeType::String).force_new(),
            )
    }

    fn validate(&self, data: &ResourceData) -> Result<()> {
        validate_one_of(
            "group_type",
            data.get_int("group_type"),
            &[GROUP_TYPE_LDAP, GROUP_TYPE_HTTP, GROUP_TYPE_OIDC],
        )
    }

    async fn create(&self, client: &dyn HarborApi, data: &mut ResourceData) -> Result<()> {
        let group = Self::group_from_data(data);
        let id = client.create_user_group(&group).await?;
        tracing::info!("Created user group {} ({})", group.group_name, id);

        data.set_id(id.to_string());
        self.read(client, data).await
    }

    async fn read(&self, client: &dyn HarborApi, data: &mut ResourceData) -> Result<()> {
        let id = data.numeric_id()?;

        let group = match client.get_user_group(id).await {
            Ok(group) => group,
            Err(e) if e.is_not_found() => {
                tracing::warn!("User group {} no longer exists, removing from state", id);
                data.clear_id();
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        data.set("group_name", group.group_name);
        data.set("group_type", group.group_type);
        data.set("ldap_group_dn", group.ldap_group_dn);
        Ok(())
    }

    async fn update(&self, client: &dyn HarborApi, data: &mut ResourceData) -> Result<()> {
        let id = data.numeric_id()?;
        let group = Self::group_from_data(data);
        client.update_user_group(id, &group).await?;
        tracing::info!("Updated user group {}", id);

        self.read(client, data).await
    }

    async fn delete(&self, client: &dyn HarborApi, data: &ResourceData) -> Result<()> {
        let id = data.numeric_id()?;

        match client.delete_user_group(id).await {
            Err(e) if e.is_not_found() => {
                tracing::debug!("User group {} already deleted", id);
                Ok(())
            }
            other => other,
        }
    }
}
