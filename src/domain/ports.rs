use crate::domain::model::{Project, UserGroup};
use crate::domain::schema::{ResourceData, Schema};
use crate::utils::error::Result;
use async_trait::async_trait;

/// The subset of the Harbor REST API the handlers depend on.
#[async_trait]
pub trait HarborApi: Send + Sync {
    async fn list_projects(&self, name: Option<&str>, page: u32, page_size: u32)
        -> Result<Vec<Project>>;
    async fn get_project(&self, project_id: i64) -> Result<Project>;

    async fn list_user_groups(
        &self,
        name: Option<&str>,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<UserGroup>>;
    async fn get_user_group(&self, group_id: i64) -> Result<UserGroup>;
    /// Returns the ID Harbor assigned to the new group.
    async fn create_user_group(&self, group: &UserGroup) -> Result<i64>;
    async fn update_user_group(&self, group_id: i64, group: &UserGroup) -> Result<()>;
    async fn delete_user_group(&self, group_id: i64) -> Result<()>;
}

pub trait ConfigProvider: Send + Sync {
    fn url(&self) -> &str;
    fn basepath(&self) -> &str;
    fn username(&self) -> Option<&str>;
    fn password(&self) -> Option<&str>;
    fn insecure(&self) -> bool;
    fn timeout_seconds(&self) -> u64;
}

#[async_trait]
pub trait DataSource: Send + Sync {
    fn schema(&self) -> Schema;
    async fn read(&self, client: &dyn HarborApi, data: &mut ResourceData) -> Result<()>;
}

/// Resource handlers. A `read` that clears the ID means the object is gone remotely.
#[async_trait]
pub trait Resource: Send + Sync {
    fn schema(&self) -> Schema;
    /// Checks beyond what the schema can express.
    fn validate(&self, _data: &ResourceData) -> Result<()> {
        Ok(())
    }
    async fn create(&self, client: &dyn HarborApi, data: &mut ResourceData) -> Result<()>;
    async fn read(&self, client: &dyn HarborApi, data: &mut ResourceData) -> Result<()>;
    async fn update(&self, client: &dyn HarborApi, data: &mut ResourceData) -> Result<()>;
    async fn delete(&self, client: &dyn HarborApi, data: &ResourceData) -> Result<()>;
}
