use crate::core::{DataSource, HarborApi};
use crate::domain::model::UserGroup;
use crate::domain::schema::{Attribute, AttributeType, ResourceData, Schema};
use crate::utils::error::{ProviderError, Result};
use crate::utils::validation::validate_exactly_one;
use async_trait::async_trait;

const PAGE_SIZE: u32 = 100;
const MAX_PAGES: u32 = 100;

/// Walks `/usergroups` page by page until a group name matches (ignoring case).
/// Older Harbor versions ignore paging and return every group at once, so a
/// page of any size other than `PAGE_SIZE` ends the walk.
pub async fn find_user_group_by_name(
    client: &dyn HarborApi,
    name: &str,
) -> Result<Option<UserGroup>> {
    let wanted = name.to_lowercase();

    for page in 1..=MAX_PAGES {
        let groups = client.list_user_groups(Some(name), page, PAGE_SIZE).await?;
        let count = groups.len();

        if let Some(group) = groups
            .into_iter()
            .find(|g| g.group_name.to_lowercase() == wanted)
        {
            return Ok(Some(group));
        }

        if count != PAGE_SIZE as usize {
            return Ok(None);
        }
    }

    tracing::warn!(
        "Stopped searching for user group {:?} after {} pages",
        name,
        MAX_PAGES
    );
    Ok(None)
}

/// `harbor_usergroup` data source: look up a user group by ID or by name.
pub struct UserGroupDataSource;

#[async_trait]
impl DataSource for UserGroupDataSource {
    fn schema(&self) -> Schema {
        Schema::new()
            .with_attribute(
                "group_id",
                Attribute::optional(AttributeType::Int).conflicts_with(&["group_name"]),
            )
            .with_attribute(
                "group_name",
                Attribute::optional(AttributeType::String).conflicts_with(&["group_id"]),
            )
            .with_attribute("group_type", Attribute::computed(AttributeType::Int))
            .with_attribute("ldap_group_dn", Attribute::computed(AttributeType::String))
    }

    async fn read(&self, client: &dyn HarborApi, data: &mut ResourceData) -> Result<()> {
        let group_id = data.get_int_ok("group_id");
        let group_name = data.get_str_ok("group_name").map(str::to_string);

        let set = usize::from(group_id.is_some()) + usize::from(group_name.is_some());
        validate_exactly_one(&["group_id", "group_name"], set)?;

        let group = match (group_name, group_id) {
            (Some(name), _) => find_user_group_by_name(client, &name).await?,
            (None, Some(id)) => Some(client.get_user_group(id).await?),
            (None, None) => None,
        };

        let group = group.ok_or_else(|| ProviderError::NotFoundError {
            kind: "User group".to_string(),
        })?;

        data.set_id(group.id.to_string());
        data.set("group_id", group.id);
        data.set("group_name", group.group_name);
        data.set("group_type", group.group_type);
        data.set("ldap_group_dn", group.ldap_group_dn);

        Ok(())
    }
}
