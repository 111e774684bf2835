use crate::core::{DataSource, HarborApi};
use crate::domain::model::Project;
use crate::domain::schema::{Attribute, AttributeType, ResourceData, Schema};
use crate::utils::error::{ProviderError, Result};
use crate::utils::validation::validate_exactly_one;
use async_trait::async_trait;

const PAGE_SIZE: u32 = 100;
const MAX_PAGES: u32 = 100;

/// `harbor_project`: look up a project by ID or by name.
pub struct ProjectDataSource;

impl ProjectDataSource {
    /// Harbor's `name` filter is a substring match, so walk the pages until
    /// one entry matches exactly (ignoring case).
    async fn find_by_name(client: &dyn HarborApi, name: &str) -> Result<Option<Project>> {
        let wanted = name.to_lowercase();

        for page in 1..=MAX_PAGES {
            let projects = client.list_projects(Some(name), page, PAGE_SIZE).await?;
            let count = projects.len();

            if let Some(project) = projects
                .into_iter()
                .find(|p| p.name.to_lowercase() == wanted)
            {
                return Ok(Some(project));
            }

            if count < PAGE_SIZE as usize {
                return Ok(None);
            }
        }

        tracing::warn!(
            "Stopped searching for project {:?} after {} pages",
            name,
            MAX_PAGES
        );
        Ok(None)
    }
}

#[async_trait]
impl DataSource for ProjectDataSource {
    fn schema(&self) -> Schema {
        Schema::new()
            .with_attribute(
                "project_id",
                Attribute::optional(AttributeType::Int).conflicts_with(&["name"]),
            )
            .with_attribute(
                "name",
                Attribute::optional(AttributeType::String).conflicts_with(&["project_id"]),
            )
            // computed
            .with_attribute("owner_id", Attribute::computed(AttributeType::Int))
            .with_attribute("owner_name", Attribute::computed(AttributeType::String))
            .with_attribute("creation_time", Attribute::computed(AttributeType::String))
            .with_attribute("update_time", Attribute::computed(AttributeType::String))
            .with_attribute("deleted", Attribute::computed(AttributeType::Bool))
            .with_attribute("repo_count", Attribute::computed(AttributeType::Int))
            .with_attribute("chart_count", Attribute::computed(AttributeType::Int))
    }

    async fn read(&self, client: &dyn HarborApi, data: &mut ResourceData) -> Result<()> {
        let project_id = data.get_int_ok("project_id");
        let project_name = data.get_str_ok("name").map(str::to_string);

        let set = usize::from(project_id.is_some()) + usize::from(project_name.is_some());
        validate_exactly_one(&["project_id", "name"], set)?;

        let project = match (project_name, project_id) {
            (Some(name), _) => Self::find_by_name(client, &name).await?,
            (None, Some(id)) => Some(client.get_project(id).await?),
            (None, None) => None,
        };

        let project = project.ok_or_else(|| ProviderError::NotFoundError {
            kind: "Project".to_string(),
        })?;

        tracing::debug!("Resolved project {} ({})", project.name, project.project_id);

        data.set_id(project.project_id.to_string());
        data.set("project_id", project.project_id);
        data.set("name", project.name);
        data.set("owner_id", project.owner_id);
        data.set("owner_name", project.owner_name);
        data.set("creation_time", project.creation_time);
        data.set("update_time", project.update_time);
        data.set("deleted", project.deleted);
        data.set("repo_count", project.repo_count);
        data.set("chart_count", project.chart_count);

        Ok(())
    }
}
