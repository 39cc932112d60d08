use std::collections::HashMap;

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response as AxumResponse},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use shared::{
    domain::{CompanyId, TaskType},
    protocol::{Company, CompanyAdd, Position},
};
use tokio::{net::TcpListener, sync::Mutex};

use super::*;
use crate::reference::EmployeeFormOptions;

const TOTAL_COMPANIES: i64 = 11;

#[derive(Clone, Default)]
struct ServerState {
    list_queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
    auth_headers: Arc<Mutex<Vec<Option<String>>>>,
    searches: Arc<Mutex<Vec<(String, HashMap<String, String>)>>>,
    updates: Arc<Mutex<Vec<(i64, Value)>>>,
    deleted: Arc<Mutex<Vec<i64>>>,
}

fn company_json(id: i64) -> Value {
    json!({
        "id": id,
        "name": format!("Company {id}"),
        "industry": "Software",
        "address": "Main St 1",
        "email": format!("info{id}@example.com"),
        "createdAt": "2024-03-07T09:05:41.123456",
    })
}

fn page_json(content: Value, total: i64, page: u32, size: u32) -> Value {
    json!({
        "content": content,
        "totalElements": total,
        "pageable": { "pageNumber": page, "pageSize": size },
        "last": false,
    })
}

fn parse_page(params: &HashMap<String, String>) -> (u32, u32) {
    let page = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(0);
    let size = params.get("size").and_then(|s| s.parse().ok()).unwrap_or(10);
    (page, size)
}

fn error_body(status: StatusCode, message: Option<String>, errors: Value) -> AxumResponse {
    (
        status,
        Json(json!({
            "status": status.canonical_reason(),
            "message": message,
            "timestamp": "2024-03-07T09:05:41",
            "errors": errors,
        })),
    )
        .into_response()
}

async fn list_companies(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let auth = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.auth_headers.lock().await.push(auth);
    state.list_queries.lock().await.push(params.clone());

    let (page, size) = parse_page(&params);
    if page == 7 {
        return Json(page_json(company_json(1), TOTAL_COMPANIES, page, size));
    }
    let start = page as i64 * size as i64 + 1;
    let end = (start + size as i64 - 1).min(TOTAL_COMPANIES);
    let content: Vec<Value> = (start..=end).map(company_json).collect();
    Json(page_json(Value::Array(content), TOTAL_COMPANIES, page, size))
}

async fn search_companies(
    State(state): State<ServerState>,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let query = body["query"].as_str().unwrap_or_default().to_string();
    state.searches.lock().await.push((query, params.clone()));
    let (page, size) = parse_page(&params);
    Json(page_json(json!([company_json(3)]), 1, page, size))
}

async fn create_company(Json(body): Json<Value>) -> AxumResponse {
    if body["name"].as_str().unwrap_or_default().is_empty() {
        return error_body(
            StatusCode::BAD_REQUEST,
            None,
            json!([{ "field": "name", "message": "must not be blank" }]),
        );
    }
    let mut created = body;
    created["id"] = json!(42);
    created["createdAt"] = json!("2024-03-07T09:05:41");
    (StatusCode::CREATED, Json(created)).into_response()
}

async fn get_company(Path(id): Path<i64>) -> AxumResponse {
    if id > TOTAL_COMPANIES {
        return error_body(
            StatusCode::NOT_FOUND,
            Some(format!("Company with id {id} not found")),
            json!([]),
        );
    }
    Json(company_json(id)).into_response()
}

async fn update_company(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> StatusCode {
    state.updates.lock().await.push((id, body));
    StatusCode::OK
}

async fn delete_company(State(state): State<ServerState>, Path(id): Path<i64>) -> AxumResponse {
    if id > TOTAL_COMPANIES {
        return error_body(
            StatusCode::NOT_FOUND,
            Some(format!("Company with id {id} not found")),
            json!([]),
        );
    }
    state.deleted.lock().await.push(id);
    StatusCode::NO_CONTENT.into_response()
}

async fn login(Json(body): Json<Value>) -> AxumResponse {
    if body["password"] == "secret" {
        return Json(json!({ "token": "tok-123" })).into_response();
    }
    error_body(
        StatusCode::UNAUTHORIZED,
        Some("Bad credentials".into()),
        json!([]),
    )
}

/// Reference collections. Sizes 30 and 50 simulate a failing upstream.
async fn reference_list(
    Path(resource): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> AxumResponse {
    let (page, size) = parse_page(&params);
    match size {
        50 => return (StatusCode::BAD_GATEWAY, "upstream unavailable").into_response(),
        30 => return StatusCode::SERVICE_UNAVAILABLE.into_response(),
        _ => {}
    }
    let content = match resource.as_str() {
        "department" => json!([
            { "id": 1, "departmentName": "Engineering", "description": "Builds things" },
            { "id": 2, "departmentName": "Sales" },
        ]),
        "position" => json!([{ "id": 5, "positionName": "Developer", "yearsOfExperience": 3 }]),
        "project" => json!([{ "id": 7, "name": "Apollo", "status": "IN_PROGRESS" }]),
        _ => json!([{
            "id": 9,
            "taskStatus": "ACTIVE",
            "taskPriority": "HIGH",
            "taskType": "BUG",
            "taskDescription": "crash on save",
            "taskNumber": "12",
        }]),
    };
    let total = content.as_array().map(|a| a.len()).unwrap_or(0) as i64;
    Json(page_json(content, total, page, size)).into_response()
}

async fn spawn_api_server() -> Result<(String, ServerState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = ServerState::default();

    let app = Router::new()
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/company", get(list_companies).post(create_company))
        .route("/api/v1/company/search", post(search_companies))
        .route(
            "/api/v1/company/:id",
            get(get_company).put(update_company).delete(delete_company),
        )
        .route("/api/v1/:resource", get(reference_list))
        .with_state(state.clone());

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok((format!("http://{addr}"), state))
}

async fn client() -> (HttpApi, ServerState) {
    let (url, state) = spawn_api_server().await.expect("spawn server");
    let api = HttpApi::new(&url, Duration::from_secs(5)).expect("client");
    (api, state)
}

async fn company_page(
    api: &HttpApi,
    page: u32,
    size: u32,
) -> Result<PageResult<Company>, ApiError> {
    ResourceApi::<Company>::fetch_page(api, PageRequest::new(page, size)).await
}

#[tokio::test]
async fn fetch_page_sends_page_and_size_and_decodes_envelope() {
    let (api, state) = client().await;

    let page = company_page(&api, 1, 10).await.expect("page");

    assert_eq!(page.total_records, 11);
    assert_eq!(page.page_number, 1);
    assert_eq!(page.page_size, 10);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, Some(CompanyId(11)));
    assert_eq!(
        page.items[0].created_at.as_ref().map(|t| t.display()),
        Some("09:05 | 07.03.2024".to_string())
    );

    let queries = state.list_queries.lock().await;
    assert_eq!(queries[0].get("page").map(String::as_str), Some("1"));
    assert_eq!(queries[0].get("size").map(String::as_str), Some("10"));
}

#[tokio::test]
async fn non_array_content_is_rejected() {
    let (api, _state) = client().await;

    let err = company_page(&api, 7, 10).await.expect_err("must fail");

    assert!(matches!(err, ApiError::UnexpectedShape(ref msg) if msg == "Data isn't array"));
}

#[tokio::test]
async fn base_url_with_trailing_slash_resolves_same_endpoint() {
    let (url, _state) = spawn_api_server().await.expect("spawn server");
    let api = HttpApi::new(&format!("{url}/"), Duration::from_secs(5)).expect("client");

    let page = company_page(&api, 0, 10).await.expect("page");
    assert_eq!(page.items.len(), 10);
}

#[tokio::test]
async fn login_token_is_sent_as_bearer_on_later_calls() {
    let (api, state) = client().await;
    company_page(&api, 0, 10).await.expect("anonymous page");

    let token = api.login("admin@teamsphere.test", "secret").await.expect("login");
    assert_eq!(token, "tok-123");
    assert_eq!(api.token().await.as_deref(), Some("tok-123"));
    company_page(&api, 0, 10).await.expect("authorized page");

    let headers = state.auth_headers.lock().await;
    assert_eq!(headers[0], None);
    assert_eq!(headers[1].as_deref(), Some("Bearer tok-123"));
}

#[tokio::test]
async fn rejected_login_surfaces_server_message() {
    let (api, _state) = client().await;

    let err = api
        .login("admin@teamsphere.test", "wrong")
        .await
        .expect_err("must fail");

    assert_eq!(err.status(), Some(401));
    assert_eq!(err.to_string(), "server returned 401: Bad credentials");
    assert_eq!(api.token().await, None);
}

#[tokio::test]
async fn search_posts_query_with_paging() {
    let (api, state) = client().await;

    let page = ResourceApi::<Company>::search(&api, "Company 3", PageRequest::new(0, 30))
        .await
        .expect("search");

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "Company 3");
    let searches = state.searches.lock().await;
    assert_eq!(searches[0].0, "Company 3");
    assert_eq!(searches[0].1.get("size").map(String::as_str), Some("30"));
}

#[tokio::test]
async fn get_returns_record_or_not_found() {
    let (api, _state) = client().await;

    let found = ResourceApi::<Company>::get(&api, CompanyId(4)).await.expect("get");
    assert_eq!(found.name, "Company 4");

    let err = ResourceApi::<Company>::get(&api, CompanyId(99))
        .await
        .expect_err("must fail");
    assert_eq!(err.status(), Some(404));
    assert!(err.to_string().contains("Company with id 99 not found"));
}

#[tokio::test]
async fn create_returns_server_assigned_record() {
    let (api, _state) = client().await;
    let payload = CompanyAdd {
        name: "Acme".into(),
        industry: "Anvils".into(),
        address: "Desert Rd 1".into(),
        email: "sales@acme.test".into(),
    };

    let created = ResourceApi::<Company>::create(&api, &payload).await.expect("create");

    assert_eq!(created.id, Some(CompanyId(42)));
    assert_eq!(created.name, "Acme");
    assert!(created.created_at.is_some());
}

#[tokio::test]
async fn validation_errors_are_joined_when_message_is_absent() {
    let (api, _state) = client().await;

    let err = ResourceApi::<Company>::create(&api, &CompanyAdd::default())
        .await
        .expect_err("must fail");

    assert_eq!(err.status(), Some(400));
    assert_eq!(err.to_string(), "server returned 400: name: must not be blank");
}

#[tokio::test]
async fn update_puts_to_record_path_and_accepts_empty_body() {
    let (api, state) = client().await;
    let mut edited = Company {
        id: Some(CompanyId(3)),
        name: "Renamed".into(),
        industry: "Software".into(),
        address: "Main St 1".into(),
        email: "info3@example.com".into(),
        created_at: None,
        updated_at: None,
    };

    ResourceApi::<Company>::update(&api, &edited).await.expect("update");

    let updates = state.updates.lock().await.clone();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].0, 3);
    assert_eq!(updates[0].1["name"], "Renamed");

    edited.id = None;
    let err = ResourceApi::<Company>::update(&api, &edited)
        .await
        .expect_err("must fail");
    assert!(matches!(err, ApiError::MissingId));
    assert_eq!(state.updates.lock().await.len(), 1);
}

#[tokio::test]
async fn remove_deletes_by_id_and_reports_missing_records() {
    let (api, state) = client().await;

    ResourceApi::<Company>::remove(&api, CompanyId(5)).await.expect("delete");
    assert_eq!(*state.deleted.lock().await, vec![5]);

    let err = ResourceApi::<Company>::remove(&api, CompanyId(50))
        .await
        .expect_err("must fail");
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn plain_text_or_empty_error_bodies_still_produce_a_message() {
    let (api, _state) = client().await;

    let err = ResourceApi::<Position>::fetch_page(&api, PageRequest::new(0, 50))
        .await
        .expect_err("must fail");
    assert_eq!(err.to_string(), "server returned 502: upstream unavailable");

    let err = ResourceApi::<Position>::fetch_page(&api, PageRequest::new(0, 30))
        .await
        .expect_err("must fail");
    assert_eq!(err.to_string(), "server returned 503: Service Unavailable");
}

#[tokio::test]
async fn employee_form_options_load_every_reference_list() {
    let (api, _state) = client().await;

    let options = EmployeeFormOptions::load(&api, &api, &api, &api)
        .await
        .expect("options");

    assert_eq!(
        options.department_labels(),
        vec![
            ("1".to_string(), "Engineering".to_string()),
            ("2".to_string(), "Sales".to_string()),
        ]
    );
    assert_eq!(
        options.position_labels(),
        vec![("5".to_string(), "Developer".to_string())]
    );
    assert_eq!(
        options.project_labels(),
        vec![("7".to_string(), "Apollo".to_string())]
    );
    assert_eq!(options.tasks[0].task_type, TaskType::Bug);
    assert_eq!(
        options.task_labels(),
        vec![("9".to_string(), "FIX-12".to_string())]
    );
}

#[test]
fn constructor_rejects_unparseable_base_url() {
    assert!(matches!(
        HttpApi::new("not a url", Duration::from_secs(1)),
        Err(ApiError::Url(_))
    ));
    assert!(matches!(
        HttpApi::new("mailto:admin@teamsphere.test", Duration::from_secs(1)),
        Err(ApiError::Url(_))
    ));
}
