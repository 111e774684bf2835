use crate::core::HarborApi;
use crate::domain::model::{Project, UserGroup};
use crate::utils::error::{ProviderError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// In-memory Harbor used by handler unit tests.
#[derive(Default)]
pub struct MockHarbor {
    projects: Vec<Project>,
    groups: Mutex<Vec<UserGroup>>,
    next_group_id: Mutex<i64>,
    project_pages: AtomicU32,
    group_pages: AtomicU32,
    ignore_paging: bool,
}

fn not_found(path: String) -> ProviderError {
    ProviderError::ApiError {
        method: "GET".to_string(),
        path,
        status: 404,
        body: "not found".to_string(),
    }
}

impl MockHarbor {
    pub fn new() -> Self {
        Self {
            next_group_id: Mutex::new(1),
            ..Default::default()
        }
    }

    pub fn with_projects(mut self, projects: Vec<Project>) -> Self {
        self.projects = projects;
        self
    }

    pub fn with_groups(self, groups: Vec<UserGroup>) -> Self {
        let max_id = groups.iter().map(|g| g.id).max().unwrap_or(0);
        *self.groups.lock().unwrap() = groups;
        *self.next_group_id.lock().unwrap() = max_id + 1;
        self
    }

    /// Answer every group listing with the full list, like Harbor v1.
    pub fn ignoring_paging(mut self) -> Self {
        self.ignore_paging = true;
        self
    }

    pub fn group_pages_requested(&self) -> u32 {
        self.group_pages.load(Ordering::SeqCst)
    }

    pub fn project_pages_requested(&self) -> u32 {
        self.project_pages.load(Ordering::SeqCst)
    }

    pub fn groups(&self) -> Vec<UserGroup> {
        self.groups.lock().unwrap().clone()
    }
}

#[async_trait]
impl HarborApi for MockHarbor {
    async fn list_projects(
        &self,
        name: Option<&str>,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Project>> {
        self.project_pages.fetch_add(1, Ordering::SeqCst);
        let filter = name.map(str::to_lowercase).unwrap_or_default();
        let skip = ((page.max(1) - 1) * page_size) as usize;

        Ok(self
            .projects
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&filter))
            .skip(skip)
            .take(page_size as usize)
            .cloned()
            .collect())
    }

    async fn get_project(&self, project_id: i64) -> Result<Project> {
        self.projects
            .iter()
            .find(|p| p.project_id == project_id)
            .cloned()
            .ok_or_else(|| not_found(format!("/projects/{}", project_id)))
    }

    async fn list_user_groups(
        &self,
        name: Option<&str>,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<UserGroup>> {
        self.group_pages.fetch_add(1, Ordering::SeqCst);
        if self.ignore_paging {
            return Ok(self.groups());
        }

        let filter = name.map(str::to_lowercase).unwrap_or_default();
        let skip = ((page.max(1) - 1) * page_size) as usize;

        Ok(self
            .groups()
            .into_iter()
            .filter(|g| g.group_name.to_lowercase().contains(&filter))
            .skip(skip)
            .take(page_size as usize)
            .collect())
    }

    async fn get_user_group(&self, group_id: i64) -> Result<UserGroup> {
        self.groups()
            .into_iter()
            .find(|g| g.id == group_id)
            .ok_or_else(|| not_found(format!("/usergroups/{}", group_id)))
    }

    async fn create_user_group(&self, group: &UserGroup) -> Result<i64> {
        let mut next_id = self.next_group_id.lock().unwrap();
        let id = *next_id;
        *next_id += 1;

        self.groups.lock().unwrap().push(UserGroup {
            id,
            ..group.clone()
        });
        Ok(id)
    }

    async fn update_user_group(&self, group_id: i64, group: &UserGroup) -> Result<()> {
        let mut groups = self.groups.lock().unwrap();
        let existing = groups
            .iter_mut()
            .find(|g| g.id == group_id)
            .ok_or_else(|| not_found(format!("/usergroups/{}", group_id)))?;
        *existing = UserGroup {
            id: group_id,
            ..group.clone()
        };
        Ok(())
    }

    async fn delete_user_group(&self, group_id: i64) -> Result<()> {
        let mut groups = self.groups.lock().unwrap();
        let before = groups.len();
        groups.retain(|g| g.id != group_id);
        if groups.len() == before {
            return Err(not_found(format!("/usergroups/{}", group_id)));
        }
        Ok(())
    }
}
