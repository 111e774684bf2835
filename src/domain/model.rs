use serde::{Deserialize, Serialize};

/// Harbor project as returned by `GET /projects`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub project_id: i64,
    pub owner_id: i64,
    pub name: String,
    pub owner_name: String,
    pub creation_time: String,
    pub update_time: String,
    pub deleted: bool,
    pub repo_count: i64,
    pub chart_count: i64,
}

/// Harbor user group (`/usergroups`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserGroup {
    #[serde(skip_serializing_if = "is_zero")]
    pub id: i64,
    pub group_name: String,
    pub group_type: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ldap_group_dn: String,
}

fn is_zero(v: &i64) -> bool {
    *v == 0
}

pub const GROUP_TYPE_LDAP: i64 = 1;
pub const GROUP_TYPE_HTTP: i64 = 2;
pub const GROUP_TYPE_OIDC: i64 = 3;
