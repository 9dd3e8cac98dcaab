use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::{Json, Multipart, Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use serde_json::{Value, json};

use campuscard_api::admin::{self, AdminLogin, LogQuery};
use campuscard_api::parent;
use campuscard_api::teacher::{self, AttendanceExport};
use campuscard_api::{Console, PhoneLogin};
use campuscard_auth::{GateState, GuardOutcome};
use campuscard_core::{GatewayError, StorageScope, TokenSlot};
use campuscard_gateway::{GatewayClient, GatewayConfig, MemoryNavigator, Navigator, TracingNotifier};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, stub_api()).await.unwrap();
        });

        Self { base_url, handle }
    }

    /// Base URL as the portals configure it, with the `/api` mount.
    fn api_base(&self) -> String {
        format!("{}/api", self.base_url)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

fn ok(data: Value) -> Json<Value> {
    Json(json!({ "code": 0, "message": "success", "data": data }))
}

async fn admin_login(Json(body): Json<Value>) -> Json<Value> {
    if body["phone"] == "13900000000" && body["code"] == "5678" {
        ok(json!({ "token": "par-1", "expireIn": 3600 }))
    } else if body["username"] == "root" && body["password"] == "s3cret" {
        ok(json!({ "token": "adm-1", "expireIn": 7200 }))
    } else {
        Json(json!({ "code": 1001, "message": "bad credentials" }))
    }
}

async fn admin_me(headers: HeaderMap) -> Response {
    match bearer(&headers) {
        Some("adm-1") => Json(json!({
            "code": 200,
            "data": {
                "id": 1,
                "username": "root",
                "roles": ["CLERK"],
                "permissions": ["card:*", "face:view"],
                "menus": ["/dashboard", "/card/list"]
            }
        }))
        .into_response(),
        _ => (StatusCode::UNAUTHORIZED, Json(json!({ "message": "token expired" }))).into_response(),
    }
}

async fn op_logs(Query(q): Query<HashMap<String, String>>) -> Json<Value> {
    let keywords = q.get("keywords").cloned().unwrap_or_default();
    Json(json!({
        "records": [{ "id": 11, "occurredAt": "2024-05-01T08:00:00", "uri": keywords, "resultCode": 0 }],
        "total": 31
    }))
}

async fn teacher_classes(headers: HeaderMap) -> Json<Value> {
    match bearer(&headers) {
        Some("tch-1") => ok(json!([{ "classId": 3, "className": "Grade 2 Class 1" }])),
        _ => Json(json!({ "code": 401, "message": "teacher session expired" })),
    }
}

async fn export(Query(q): Query<HashMap<String, String>>) -> String {
    format!(
        "class,{},{}\n",
        q.get("classId").cloned().unwrap_or_default(),
        q.get("startDate").cloned().unwrap_or_default()
    )
}

async fn upload(mut multipart: Multipart) -> Json<Value> {
    while let Some(field) = multipart.next_field().await.unwrap() {
        if field.name() == Some("file") {
            let name = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await.unwrap();
            return ok(json!({ "url": format!("/files/{}/{}", bytes.len(), name), "name": name }));
        }
    }
    Json(json!({ "code": 400, "message": "file missing" }))
}

fn stub_api() -> Router {
    let api = Router::new()
        .route("/v1/auth/login", post(admin_login))
        .route("/v1/auth/me", get(admin_me))
        .route("/v1/auth/logout", post(|| async { Json(json!({ "code": 0 })) }))
        .route(
            "/v1/users/:id/password",
            put(|Path(id): Path<i64>| async move {
                if id == 404 {
                    Json(json!({ "code": 404, "msg": "user not found" }))
                } else {
                    Json(json!({ "code": 0, "data": null }))
                }
            }),
        )
        .route(
            "/v1/auth/forgot/reset",
            post(|Json(body): Json<Value>| async move {
                ok(json!({ "success": body["code"] == "123456" }))
            }),
        )
        .route("/v1/logs/op", get(op_logs))
        .route(
            "/v1/t/auth/login",
            post(|| async { ok(json!({ "token": "tch-1", "expireIn": 3600 })) }),
        )
        .route("/v1/t/auth/logout", post(|| async { ok(json!("ok")) }))
        .route(
            "/v1/auth/profile",
            get(|headers: HeaderMap| async move {
                match bearer(&headers) {
                    Some("par-1") => ok(json!({ "parentId": 5, "name": "Li Mei" })),
                    _ => Json(json!({ "code": 401, "message": "parent session expired" })),
                }
            }),
        )
        .route("/v1/t/class/list", get(teacher_classes))
        .route("/v1/t/attendance/export", get(export))
        .route("/v1/leave/upload", post(upload));

    Router::new().nest("/api", api)
}

fn admin_client(server: &TestServer) -> GatewayClient {
    let config = GatewayConfig::admin(&server.api_base()).unwrap();
    let session = Arc::new(config.in_memory_session());
    GatewayClient::new(config, session).unwrap()
}

fn wechat_client(server: &TestServer) -> GatewayClient {
    let config = GatewayConfig::wechat(&server.api_base()).unwrap();
    let session = Arc::new(config.in_memory_session());
    GatewayClient::new(config, session).unwrap()
}

fn root_login() -> AdminLogin {
    AdminLogin {
        username: "root".into(),
        password: "s3cret".into(),
    }
}

async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}

#[tokio::test]
async fn admin_login_scope_follows_remember_flag() {
    let server = TestServer::spawn().await;
    let client = admin_client(&server);

    let grant = admin::auth::login_and_store(&client, &root_login(), false).await.unwrap();
    assert_eq!(grant.token, "adm-1");
    assert_eq!(grant.expire_in, 7200);
    assert_eq!(client.session().token_for("/api/v1/auth/me").as_deref(), Some("adm-1"));

    admin::auth::login_and_store(&client, &root_login(), true).await.unwrap();
    client.session().remove_token(&TokenSlot {
        key: admin::ADMIN_TOKEN_KEY.into(),
        scope: StorageScope::Persistent,
    });
    // The session-scoped token from the first login was dropped.
    assert!(!client.session().has_token());
}

#[tokio::test]
async fn admin_login_failure_keeps_session_untouched() {
    let server = TestServer::spawn().await;
    let client = admin_client(&server);

    let bad = AdminLogin {
        username: "root".into(),
        password: "nope".into(),
    };
    let err = admin::auth::login_and_store(&client, &bad, true).await.unwrap_err();

    assert_eq!(err, GatewayError::business(Some(1001), "bad credentials"));
    assert!(!client.session().has_token());
}

#[tokio::test]
async fn me_returns_full_identity_and_logout_clears_tokens() {
    let server = TestServer::spawn().await;
    let client = admin_client(&server);
    admin::auth::login_and_store(&client, &root_login(), true).await.unwrap();

    let me = admin::auth::me(&client).await.unwrap();
    assert_eq!(me.username, "root");
    assert_eq!(me.menus, vec!["/dashboard", "/card/list"]);

    admin::auth::logout(&client).await.unwrap();
    assert!(!client.session().has_token());
}

#[tokio::test]
async fn password_endpoints() {
    let server = TestServer::spawn().await;
    let client = admin_client(&server);

    admin::auth::reset_password_by_id(&client, 7, "n3w").await.unwrap();

    let err = admin::auth::reset_password_by_id(&client, 404, "n3w").await.unwrap_err();
    assert_eq!(err.code(), Some(404));
    assert_eq!(err.message(), "user not found");

    assert!(admin::auth::reset_password_with_code(&client, "root", "123456", "n3w").await.unwrap());
    assert!(!admin::auth::reset_password_with_code(&client, "root", "000000", "n3w").await.unwrap());
}

#[tokio::test]
async fn log_listings_decode_bare_pages() {
    let server = TestServer::spawn().await;
    let client = admin_client(&server);

    let page = admin::logs::op_logs(&client, &LogQuery::page(1, 20).keywords("/api/v1/cards"))
        .await
        .unwrap();

    assert_eq!(page.total, 31);
    assert_eq!(page.records.len(), 1);
    assert_eq!(page.records[0].uri.as_deref(), Some("/api/v1/cards"));
    assert_eq!(page.records[0].result_code, Some(0));
}

#[tokio::test]
async fn parent_login_stores_token_in_parent_slot() {
    let server = TestServer::spawn().await;
    let client = wechat_client(&server);

    let login = PhoneLogin {
        phone: "13900000000".into(),
        code: "5678".into(),
    };
    let grant = parent::auth::login_and_store(&client, &login).await.unwrap();
    assert_eq!(grant.token, "par-1");
    assert_eq!(client.session().token_for("/api/v1/auth/profile").as_deref(), Some("par-1"));
    assert_eq!(client.session().token_for("/api/v1/t/class/list"), None);

    let profile = parent::auth::profile(&client).await.unwrap();
    assert_eq!(profile.parent_id, 5);
    assert!(profile.bound_children.is_empty());
}

#[tokio::test]
async fn teacher_token_rides_teacher_paths_only() {
    let server = TestServer::spawn().await;
    let client = wechat_client(&server);

    let login = PhoneLogin {
        phone: "13800000000".into(),
        code: "1234".into(),
    };
    let grant = teacher::auth::login(&client, &login).await.unwrap();
    grant.store(client.session(), &TokenSlot::persistent(teacher::TEACHER_TOKEN_KEY));

    let classes = teacher::classes::classes(&client).await.unwrap();
    assert_eq!(classes[0].class_name, "Grade 2 Class 1");

    teacher::auth::logout(&client).await.unwrap();
    let err = teacher::classes::classes(&client).await.unwrap_err();
    assert!(err.is_auth_expired());
}

#[tokio::test]
async fn attendance_export_and_leave_upload() {
    let server = TestServer::spawn().await;
    let client = wechat_client(&server);

    let csv = teacher::classes::export_class_attendance(
        &client,
        &AttendanceExport {
            class_id: 3,
            start_date: Some("2024-05-01".into()),
            end_date: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(csv, b"class,3,2024-05-01\n");

    let uploaded = teacher::classes::upload_leave_attachment(&client, "note.jpg", vec![0xFF; 12])
        .await
        .unwrap();
    assert_eq!(uploaded.name, "note.jpg");
    assert_eq!(uploaded.url, "/files/12/note.jpg");
}

fn console(server: &TestServer, start: &str) -> (Console, Arc<MemoryNavigator>) {
    let config = GatewayConfig::admin(&server.api_base()).unwrap();
    let session = Arc::new(config.in_memory_session());
    let navigator = Arc::new(MemoryNavigator::new(start));
    let console = Console::new(config, session, navigator.clone(), Arc::new(TracingNotifier)).unwrap();
    (console, navigator)
}

#[tokio::test]
async fn bootstrap_loads_permissions_and_guards_routes() {
    let server = TestServer::spawn().await;
    let (console, _) = console(&server, "/card/list");
    admin::auth::login_and_store(console.gateway(), &root_login(), true)
        .await
        .unwrap();

    let snapshot = console.bootstrap("/card/list").await.unwrap();

    assert_eq!(console.gate().state(), GateState::Loaded);
    assert_eq!(snapshot.user.map(|u| u.username), Some("root".to_string()));
    assert!(console.gate().has_perm(Some("card:recharge")));
    assert!(!console.gate().has_perm(Some("face:dispatch")));
    assert_eq!(console.check_route("/card/list", true), GuardOutcome::Proceed);
    assert!(matches!(
        console.check_route("/logs/op", true),
        GuardOutcome::Redirect { ref to, .. } if to == "/dashboard"
    ));
}

#[tokio::test]
async fn bootstrap_skips_loading_on_login_route() {
    let server = TestServer::spawn().await;
    let (console, _) = console(&server, "/login");

    assert!(console.bootstrap("/login").await.is_none());
    assert_eq!(console.gate().state(), GateState::Unloaded);
    assert_eq!(console.check_route("/login", true), GuardOutcome::Proceed);
}

#[tokio::test]
async fn expired_token_during_bootstrap_fails_open_and_redirects() {
    let server = TestServer::spawn().await;
    let (console, navigator) = console(&server, "/card/list");
    console
        .session()
        .store_token(&TokenSlot::persistent(admin::ADMIN_TOKEN_KEY), "stale");

    let snapshot = console.bootstrap("/card/list").await.unwrap();

    assert!(snapshot.is_empty());
    assert!(console.gate().has_perm(Some("anything:at-all")));
    assert!(!console.session().has_token());
    assert!(console.session().take_expiry_flag());
    assert!(eventually(|| navigator.current_path() == "/login").await);
    assert_eq!(
        console.check_route("/card/list", true),
        GuardOutcome::Redirect {
            to: "/login".into(),
            notice: None
        }
    );
}
