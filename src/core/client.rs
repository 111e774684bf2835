use crate::app::data_sources::usergroup::find_user_group_by_name;
use crate::core::{ConfigProvider, HarborApi};
use crate::domain::model::{Project, UserGroup};
use crate::utils::error::{ProviderError, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, LOCATION};
use reqwest::{Client, Method, RequestBuilder, Response};
use std::time::Duration;

pub struct HarborClient {
    client: Client,
    base_url: String,
    username: Option<String>,
    password: Option<String>,
}

impl HarborClient {
    pub fn new<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds()))
            .danger_accept_invalid_certs(config.insecure())
            .build()?;

        let base_url = format!(
            "{}{}",
            config.url().trim_end_matches('/'),
            config.basepath().trim_end_matches('/')
        );

        if config.insecure() {
            tracing::warn!("TLS certificate verification disabled for {}", base_url);
        }

        Ok(Self {
            client,
            base_url,
            username: config.username().map(str::to_string),
            password: config.password().map(str::to_string),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("Making API request: {} {}", method, url);

        let builder = self
            .client
            .request(method, url)
            .header(ACCEPT, "application/json");

        match &self.username {
            Some(username) => builder.basic_auth(username, self.password.as_ref()),
            None => builder,
        }
    }

    /// 非 2xx 回應轉成 ApiError，保留原始 body
    async fn send(&self, method: Method, path: &str, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        tracing::debug!("API response status: {} for {} {}", status, method, path);

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ProviderError::ApiError {
            method: method.to_string(),
            path: path.to_string(),
            status: status.as_u16(),
            body: body.trim().to_string(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let builder = self.request(Method::GET, path).query(query);
        let response = self.send(Method::GET, path, builder).await?;
        Ok(response.json().await?)
    }
}

/// `/api/usergroups/12` -> 12
fn id_from_location(location: &str) -> Option<i64> {
    location
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse().ok())
}

#[async_trait]
impl HarborApi for HarborClient {
    async fn list_projects(
        &self,
        name: Option<&str>,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Project>> {
        let mut query = vec![("page", page.to_string()), ("page_size", page_size.to_string())];
        if let Some(name) = name {
            query.push(("name", name.to_string()));
        }

        // Harbor 在沒有結果時可能回傳 null
        let projects: Option<Vec<Project>> = self.get_json("/projects", &query).await?;
        Ok(projects.unwrap_or_default())
    }

    async fn get_project(&self, project_id: i64) -> Result<Project> {
        self.get_json(&format!("/projects/{}", project_id), &[]).await
    }

    async fn list_user_groups(
        &self,
        name: Option<&str>,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<UserGroup>> {
        let mut query = vec![("page", page.to_string()), ("page_size", page_size.to_string())];
        if let Some(name) = name {
            query.push(("group_name", name.to_string()));
        }

        let groups: Option<Vec<UserGroup>> = self.get_json("/usergroups", &query).await?;
        Ok(groups.unwrap_or_default())
    }

    async fn get_user_group(&self, group_id: i64) -> Result<UserGroup> {
        self.get_json(&format!("/usergroups/{}", group_id), &[]).await
    }

    async fn create_user_group(&self, group: &UserGroup) -> Result<i64> {
        let path = "/usergroups";
        let builder = self.request(Method::POST, path).json(group);
        let response = self.send(Method::POST, path, builder).await?;

        let location_id = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .and_then(id_from_location);

        if let Some(id) = location_id {
            return Ok(id);
        }

        tracing::debug!(
            "No usable Location header after creating {}, looking it up by name",
            group.group_name
        );
        find_user_group_by_name(self, &group.group_name)
            .await?
            .map(|g| g.id)
            .ok_or_else(|| ProviderError::NotFoundError {
                kind: "User group".to_string(),
            })
    }

    async fn update_user_group(&self, group_id: i64, group: &UserGroup) -> Result<()> {
        let path = format!("/usergroups/{}", group_id);
        let builder = self.request(Method::PUT, &path).json(group);
        self.send(Method::PUT, &path, builder).await?;
        Ok(())
    }

    async fn delete_user_group(&self, group_id: i64) -> Result<()> {
        let path = format!("/usergroups/{}", group_id);
        let builder = self.request(Method::DELETE, &path);
        self.send(Method::DELETE, &path, builder).await?;
        Ok(())
    }
}
