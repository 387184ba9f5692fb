//! Canned Download Station responses and request inspection helpers.

#![allow(dead_code)]

use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const AUTH_PATH: &str = "/webapi/entry.cgi";
pub const TASK_PATH: &str = "/webapi/DownloadStation/task.cgi";

pub fn ok(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": data }))
}

pub fn remote_error(code: i64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "success": false, "error": { "code": code } }))
}

pub fn login_ok(sid: &str) -> ResponseTemplate {
    ok(json!({ "sid": sid, "did": "DID", "is_portal_port": false }))
}

pub fn tasks_data() -> Value {
    json!({
        "offset": 0,
        "total": 2,
        "tasks": [
            {
                "id": "dbid_10",
                "title": "debian.iso",
                "type": "bt",
                "status": "downloading",
                "size": 700,
                "username": "admin",
                "additional": { "transfer": {
                    "downloaded_pieces": 3,
                    "size_downloaded": 350,
                    "size_uploaded": 20,
                    "speed_download": 100,
                    "speed_upload": 5
                }}
            },
            {
                "id": "dbid_9",
                "title": "paper.pdf",
                "type": "http",
                "status": "finished",
                "size": 12,
                "username": "admin",
                "additional": { "transfer": {
                    "size_downloaded": 12,
                    "size_uploaded": 0,
                    "speed_download": 0,
                    "speed_upload": 0
                }}
            }
        ]
    })
}

/// Mounts a login endpoint that always answers `response`.
pub async fn mount_login(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(AUTH_PATH))
        .and(query_param("method", "login"))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Mounts a task endpoint for `task_method` answering `response` when the
/// request carries `sid`.
pub async fn mount_task_call(
    server: &MockServer,
    task_method: &str,
    sid: &str,
    response: ResponseTemplate,
) {
    Mock::given(method("GET"))
        .and(path(TASK_PATH))
        .and(query_param("method", task_method))
        .and(query_param("_sid", sid))
        .respond_with(response)
        .mount(server)
        .await;
}

/// The `method` query parameter of every request the server saw, in order.
pub async fn received_methods(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| {
            request
                .url
                .query_pairs()
                .find(|(k, _)| k == "method")
                .map(|(_, v)| v.into_owned())
                .unwrap_or_default()
        })
        .collect()
}
