/*
 *
 *  *
 *  *      Copyright (c) 2018-2025, SnackCloud All rights reserved.
 *  *
 *  *   Redistribution and use in source and binary forms, with or without
 *  *   modification, are permitted provided that the following conditions are met:
 *  *
 *  *   Redistributions of source code must retain the above copyright notice,
 *  *   this list of conditions and the following disclaimer.
 *  *   Redistributions in binary form must reproduce the above copyright
 *  *   notice, this list of conditions and the following disclaimer in the
 *  *   documentation and/or other materials provided with the distribution.
 *  *   Neither the name of the www.snackcloud.cn developer nor the names of its
 *  *   contributors may be used to endorse or promote products derived from
 *  *   this software without specific prior written permission.
 *  *   Author: SnackCloud
 *  *
 *
 */
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::extract::{Path, Query, Request};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Router};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower::ServiceExt;

use crown::context::{ListenerRegistry, RequestContextHolder, RequestContextListener};
use crown::enums::deserialize_ienum_opt;
use crown::exception::HandlerExceptionResolver;
use crown::interceptor::{GlobalInterceptor, RequestStart};
use crown::json::{JsonFormats, MessageConverter};
use crown::prelude::*;
use crown::validator::constraints;

#[derive(Serialize)]
struct Order {
    id: i64,
    count: i32,
    created: NaiveDateTime,
    day: NaiveDate,
    alarm: NaiveTime,
}

#[derive(Debug, Deserialize)]
struct Item {
    name: String,
}

impl Validate for Item {
    fn validate(&self, errors: &mut ValidationErrors) {
        constraints::not_blank(errors, "name", &self.name);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Normal,
    Vip,
}

impl IEnum for Level {
    fn value(&self) -> EnumValue {
        match self {
            Level::Normal => EnumValue::Int(0),
            Level::Vip => EnumValue::Int(1),
        }
    }

    fn variants() -> &'static [Self] {
        &[Level::Normal, Level::Vip]
    }
}

#[derive(Debug, Deserialize)]
struct LevelQuery {
    #[serde(default, deserialize_with = "deserialize_ienum_opt")]
    level: Option<Level>,
}

async fn order() -> Json<Order> {
    let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap_or_default();
    let alarm = NaiveTime::from_hms_opt(3, 4, 5).unwrap_or_default();
    Json(Order { id: 9007199254740993, count: 5, created: day.and_time(alarm), day, alarm })
}

async fn missing(Path(id): Path<i64>) -> Result<Json<Order>> {
    Err(CrownError::NotFound(format!("user {}", id)))
}

async fn items(Valid(items): Valid<Vec<Item>>) -> Json<usize> {
    Json(items.len())
}

#[derive(Debug, Deserialize)]
struct CountQuery {
    n: i32,
}

async fn count(Query(query): Query<CountQuery>) -> String {
    query.n.to_string()
}

async fn long_max() -> Json<i64> {
    Json(i64::MAX)
}

async fn explode() -> &'static str {
    panic!("handler exploded")
}

async fn stamped(start: Option<Extension<RequestStart>>) -> &'static str {
    if start.is_some() { "stamped" } else { "plain" }
}

async fn current_path() -> String {
    RequestContextHolder::current()
        .map(|a| a.uri().path().to_string())
        .unwrap_or_default()
}

async fn level(Query(query): Query<LevelQuery>) -> String {
    format!("{:?}", query.level)
}

async fn level_path(Extension(formatters): Extension<Arc<FormatterRegistry>>, Path(raw): Path<String>) -> Result<String> {
    let level: Option<Level> = formatters.convert_enum(&raw)?;
    Ok(format!("{:?}", level))
}

fn routes() -> Router {
    Router::new()
        .route("/order", get(order))
        .route("/users/:id", get(missing))
        .route("/items", post(items))
        .route("/stamp", get(stamped))
        .route("/error", get(stamped))
        .route("/v2/api-docs", get(stamped))
        .route("/swagger-resources/other", get(stamped))
        .route("/swagger-resources/configuration/ui", get(stamped))
        .route("/any/other/path", get(stamped))
        .route("/count", get(count))
        .route("/long", get(long_max))
        .route("/explode", get(explode))
        .route("/context", get(current_path))
        .route("/level", get(level))
        .route("/level/:raw", get(level_path))
}

fn app() -> Router {
    WebMvc::bootstrap(WebMvcConfig::default()).unwrap().apply(routes())
}

async fn send(app: Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, String) {
    let mut builder = http::Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    let request = builder.body(Body::from(body.unwrap_or_default().to_string())).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn json_uses_crown_formats() {
    let (status, body) = send(app(), Method::GET, "/order", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        r#"{"id":"9007199254740993","count":5,"created":"2024-01-02 03:04:05","day":"2024-01-02","alarm":"03:04:05"}"#
    );
}

#[tokio::test]
async fn configured_formats_are_applied() {
    let formats = JsonFormats { date_time_format: "%d.%m.%Y %H:%M".to_string(), longs_as_strings: false, ..Default::default() };
    let app = WebMvc::bootstrap(WebMvcConfig::default().set_json(formats)).unwrap().apply(routes());
    let (_, body) = send(app, Method::GET, "/order", None).await;
    assert!(body.contains(r#""id":9007199254740993"#));
    assert!(body.contains(r#""created":"02.01.2024 03:04""#));
}

#[tokio::test]
async fn not_found_becomes_crown_error_body() {
    let (status, body) = send(app(), Method::GET, "/users/7", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["status"], 404);
    assert_eq!(body["error"], "NOT_FOUND");
    assert_eq!(body["msg"], "user 7");
    assert_eq!(body["time"].as_str().map(str::len), Some(19));
}

#[tokio::test]
async fn validation_reports_element_path() {
    let payload = r#"[{"name":"a"},{"name":"b"},{"name":" "}]"#;
    let (status, body) = send(app(), Method::POST, "/items", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["error"], "BAD_REQUEST");
    assert!(body["msg"].as_str().unwrap().contains("[2].name"));

    let (status, body) = send(app(), Method::POST, "/items", Some(r#"[{"name":"a"}]"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "1");
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let (status, body) = send(app(), Method::POST, "/items", Some("[{")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("\"status\":400"));
}

#[tokio::test]
async fn global_interceptor_skips_excluded_paths() {
    assert_eq!(send(app(), Method::GET, "/stamp", None).await.1, "stamped");
    assert_eq!(send(app(), Method::GET, "/error", None).await.1, "plain");
    assert_eq!(send(app(), Method::GET, "/v2/api-docs", None).await.1, "plain");
    assert_eq!(send(app(), Method::GET, "/swagger-resources/configuration/ui", None).await.1, "plain");
    assert_eq!(send(app(), Method::GET, "/any/other/path", None).await.1, "stamped");
    // exact pattern, nested paths still intercepted
    assert_eq!(send(app(), Method::GET, "/swagger-resources/other", None).await.1, "stamped");
}

#[tokio::test]
async fn long_max_is_a_json_string() {
    let (status, body) = send(app(), Method::GET, "/long", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#""9223372036854775807""#);
}

#[tokio::test]
async fn rejections_get_crown_error_body() {
    let (status, body) = send(app(), Method::GET, "/count?n=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["error"], "BAD_REQUEST");
    assert!(body["msg"].as_str().unwrap().starts_with("Failed to deserialize query string"));
    assert_eq!(send(app(), Method::GET, "/count?n=4", None).await.1, "4");

    let (status, body) = send(app(), Method::GET, "/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["status"], 404);
    assert_eq!(body["msg"], "Resource not found");

    let (status, body) = send(app(), Method::DELETE, "/order", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["error"], "METHOD_NOT_ALLOWED");
}

#[tokio::test]
async fn panic_becomes_internal_error() {
    let (status, body) = send(app(), Method::GET, "/explode", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["status"], 500);
    assert_eq!(body["error"], "INTERNAL_SERVER_ERROR");
    assert_eq!(body["msg"], "Internal server error");

    // the server keeps answering
    assert_eq!(send(app(), Method::GET, "/count?n=1", None).await.1, "1");
}

#[tokio::test]
async fn request_context_is_bound() {
    let (status, body) = send(app(), Method::GET, "/context", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "/context");
}

#[tokio::test]
async fn enums_convert_from_text() {
    assert_eq!(send(app(), Method::GET, "/level?level=1", None).await.1, "Some(Vip)");
    assert_eq!(send(app(), Method::GET, "/level?level=", None).await.1, "None");
    assert_eq!(send(app(), Method::GET, "/level/0", None).await.1, "Some(Normal)");
    let (status, body) = send(app(), Method::GET, "/level/9", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("is not a valid value"));
}

struct Veto;

#[async_trait::async_trait]
impl HandlerInterceptor for Veto {
    async fn pre_handle(&self, request: &mut Request) -> Result<bool> {
        Ok(request.headers().contains_key("x-token"))
    }

    fn rejected(&self, _info: &RequestInfo) -> Response {
        (StatusCode::UNAUTHORIZED, "token required").into_response()
    }

    fn name(&self) -> &'static str {
        "Veto"
    }
}

#[derive(Default)]
struct Counting {
    calls: AtomicUsize,
}

impl Counting {
    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl WebMvcConfigurer for Counting {
    fn add_formatters(&self, _registry: &mut FormatterRegistry) {
        self.hit();
    }

    fn customize_server(&self, _factory: &mut crown::server::ServerFactory) {
        self.hit();
    }

    fn register_listeners(&self, registry: &mut ListenerRegistry) {
        self.hit();
        assert!(!registry.register_if_absent(|| RequestContextListener));
    }

    fn configure_message_converters(&self, converters: Vec<MessageConverter>) -> Vec<MessageConverter> {
        self.hit();
        converters
    }

    fn configure_handler_exception_resolvers(&self, _resolvers: &mut Vec<Arc<dyn HandlerExceptionResolver>>) {
        self.hit();
    }

    fn add_interceptors(&self, registry: &mut InterceptorRegistry) {
        self.hit();
        registry.add_interceptor(Arc::new(Veto)).add_path_patterns(&["/order"]);
    }
}

#[tokio::test]
async fn extra_configurer_runs_each_hook_once() {
    let counting = Counting::default();
    let mvc = WebMvc::bootstrap_with(WebMvcConfig::default(), &[&counting]).unwrap();
    assert_eq!(counting.calls.load(Ordering::SeqCst), 6);
    assert_eq!(mvc.listeners().len(), 1);
    assert_eq!(mvc.interceptors().len(), 2);
    assert_eq!(mvc.interceptors().interceptors()[0].interceptor().name(), GlobalInterceptor::NAME);

    let app = mvc.apply(routes());
    let (status, body) = send(app.clone(), Method::GET, "/order", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["error"], "UNAUTHORIZED");
    assert_eq!(body["msg"], "token required");
    assert_eq!(send(app, Method::GET, "/stamp", None).await.1, "stamped");
}
