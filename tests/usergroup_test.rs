use harbor_provider::{HarborConfig, Provider};
use httpmock::prelude::*;
use serde_json::json;

const GROUP_NAME: &str = "acc-test-group";

fn configured_provider(server: &MockServer) -> Provider {
    let mut provider = Provider::new(HarborConfig {
        url: Some(server.base_url()),
        username: Some("admin".to_string()),
        password: Some("Harbor12345".to_string()),
        ..Default::default()
    });
    provider.configure(&serde_json::Value::Null).unwrap();
    provider
}

/// Create a user group, then look it up through the data source by name.
#[tokio::test]
async fn test_usergroup_data_source_after_create() -> anyhow::Result<()> {
    let server = MockServer::start();
    let create_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/usergroups")
            .json_body(json!({"group_name": GROUP_NAME, "group_type": 2}));
        then.status(201).header("Location", "/api/usergroups/7");
    });
    let get_mock = server.mock(|when, then| {
        when.method(GET).path("/api/usergroups/7");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({"id": 7, "group_name": GROUP_NAME, "group_type": 2, "ldap_group_dn": ""}));
    });
    let list_mock = server.mock(|when, then| {
        when.method(GET).path("/api/usergroups");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!([
                {"id": 3, "group_name": "admins", "group_type": 2},
                {"id": 7, "group_name": GROUP_NAME, "group_type": 2}
            ]));
    });

    let provider = configured_provider(&server);

    let resource_state = provider
        .create(
            "harbor_usergroup",
            &json!({"group_name": GROUP_NAME, "group_type": 2}),
        )
        .await?;
    assert_eq!(resource_state["id"], json!("7"));

    let data_state = provider
        .read_data_source("harbor_usergroup", &json!({"group_name": resource_state["group_name"]}))
        .await?;

    create_mock.assert();
    get_mock.assert();
    list_mock.assert();

    assert!(!data_state["id"].as_str().unwrap_or_default().is_empty());
    assert_eq!(data_state["group_name"], json!(GROUP_NAME));
    assert_eq!(data_state["group_type"], json!(2));
    Ok(())
}

#[tokio::test]
async fn test_usergroup_update_and_delete() {
    let server = MockServer::start();
    let update_mock = server.mock(|when, then| {
        when.method(PUT)
            .path("/api/usergroups/7")
            .json_body(json!({"group_name": "renamed", "group_type": 2}));
        then.status(200);
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/usergroups/7");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({"id": 7, "group_name": "renamed", "group_type": 2}));
    });
    let delete_mock = server.mock(|when, then| {
        when.method(DELETE).path("/api/usergroups/7");
        then.status(200);
    });

    let provider = configured_provider(&server);
    let prior = json!({"id": "7", "group_name": GROUP_NAME, "group_type": 2, "ldap_group_dn": ""});

    let updated = provider
        .update(
            "harbor_usergroup",
            &prior,
            &json!({"group_name": "renamed", "group_type": 2}),
        )
        .await
        .unwrap();
    assert_eq!(updated["group_name"], json!("renamed"));
    assert_eq!(updated["id"], json!("7"));

    provider.delete("harbor_usergroup", &updated).await.unwrap();

    update_mock.assert();
    delete_mock.assert();
}

#[tokio::test]
async fn test_usergroup_removed_outside_the_tool() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/usergroups/12");
        then.status(404).body("group not found");
    });
    let delete_mock = server.mock(|when, then| {
        when.method(DELETE).path("/api/usergroups/12");
        then.status(404).body("group not found");
    });

    let provider = configured_provider(&server);
    let state = json!({"id": "12", "group_name": "ghost", "group_type": 2});

    let refreshed = provider.read("harbor_usergroup", &state).await.unwrap();
    assert_eq!(refreshed, None);

    provider.delete("harbor_usergroup", &state).await.unwrap();
    delete_mock.assert();
}

#[tokio::test]
async fn test_usergroup_server_error_propagates() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/usergroups");
        then.status(409).body("group already exists");
    });

    let provider = configured_provider(&server);
    let err = provider
        .create("harbor_usergroup", &json!({"group_name": "dup", "group_type": 2}))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "[POST /usergroups][409] group already exists");
}

#[tokio::test]
async fn test_usergroup_lookup_on_second_page() {
    let server = MockServer::start();
    let first_page: Vec<serde_json::Value> = (1..=100)
        .map(|i| json!({"id": i, "group_name": format!("target-{}", i), "group_type": 2}))
        .collect();
    let page_one = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v2.0/usergroups")
            .query_param("group_name", "target")
            .query_param("page", "1")
            .query_param("page_size", "100");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!(first_page));
    });
    let page_two = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v2.0/usergroups")
            .query_param("group_name", "target")
            .query_param("page", "2");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!([{"id": 321, "group_name": "target", "group_type": 1}]));
    });

    let mut provider = Provider::new(HarborConfig {
        url: Some(server.base_url()),
        basepath: Some("/api/v2.0".to_string()),
        ..Default::default()
    });
    provider.configure(&serde_json::Value::Null).unwrap();

    let state = provider
        .read_data_source("harbor_usergroup", &json!({"group_name": "target"}))
        .await
        .unwrap();

    page_one.assert();
    page_two.assert();
    assert_eq!(state["id"], json!("321"));
    assert_eq!(state["group_type"], json!(1));
}
