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

//!
//! Exception resolution. Handler and interceptor failures travel inside the
//! response as [`UnresolvedError`]; the resolving middleware asks each
//! resolver in turn and the first response wins. Error statuses without a
//! JSON body and handler panics are resolved the same way.
//!
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::Local;
use futures::FutureExt;
use http::header::CONTENT_TYPE;
use http::{HeaderValue, Method, Uri};
use serde::Serialize;

use crate::errors::{CrownError, ErrorCode, UnresolvedError};
use crate::json::DEFAULT_DATE_TIME_FORMAT;

pub trait HandlerExceptionResolver: Send + Sync {
    /// Response for `error`, `None` to let the next resolver try
    fn resolve(&self, method: &Method, uri: &Uri, error: &CrownError) -> Option<Response>;

    fn name(&self) -> &'static str;
}

/// Body written for every resolved error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub error: &'static str,
    pub msg: String,
    pub time: String,
}

impl ErrorBody {
    pub fn new(code: ErrorCode, msg: String) -> Self {
        Self {
            status: code.status().as_u16(),
            error: code.error(),
            msg,
            time: Local::now().format(DEFAULT_DATE_TIME_FORMAT).to_string(),
        }
    }
}

/// Renders any [`CrownError`] as the crown JSON error body
#[derive(Debug, Clone, Copy, Default)]
pub struct CrownHandlerExceptionResolver;

impl CrownHandlerExceptionResolver {
    fn message(error: &CrownError) -> String {
        match error {
            // internals stay in the log
            CrownError::Config(_) | CrownError::Io(_) | CrownError::Internal(_) => ErrorCode::InternalServerError.msg().to_string(),
            CrownError::Status(code, _) if code.status().is_server_error() => code.msg().to_string(),
            other => other.to_string(),
        }
    }
}

impl HandlerExceptionResolver for CrownHandlerExceptionResolver {
    fn resolve(&self, method: &Method, uri: &Uri, error: &CrownError) -> Option<Response> {
        let code = error.code();
        if code.status().is_server_error() {
            tracing::error!("{} {} failed: {}", method, uri.path(), error);
        } else {
            tracing::debug!("{} {} rejected: {}", method, uri.path(), error);
        }
        let body = ErrorBody::new(code, Self::message(error));
        let bytes = match serde_json::to_vec(&body) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::error!("failed to write error body: {}", err);
                return None;
            }
        };
        Some((
            code.status(),
            [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
            bytes,
        ).into_response())
    }

    fn name(&self) -> &'static str {
        "CrownHandlerExceptionResolver"
    }
}

#[derive(Clone, Default)]
pub struct ExceptionResolverChain {
    resolvers: Vec<Arc<dyn HandlerExceptionResolver>>,
}

impl ExceptionResolverChain {
    pub fn new(resolvers: Vec<Arc<dyn HandlerExceptionResolver>>) -> Self {
        Self { resolvers }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.resolvers.iter().map(|r| r.name()).collect()
    }

    pub fn resolve(&self, method: &Method, uri: &Uri, error: &CrownError) -> Option<Response> {
        self.resolvers.iter().find_map(|r| r.resolve(method, uri, error))
    }
}

/// Largest body read back from a bare error response
const BARE_ERROR_BODY_LIMIT: usize = 64 * 1024;

/// Error status whose body is not JSON, as written by routing and extractor rejections
fn is_bare_error(response: &Response) -> bool {
    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return false;
    }
    !response.headers().get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json") || v.contains("+json"))
        .unwrap_or(false)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "handler panicked".to_string()
    }
}

pub async fn resolve_exceptions(State(chain): State<Arc<ExceptionResolverChain>>, request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let response = match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(response) => response,
        Err(panic) => {
            let reason = panic_message(panic.as_ref());
            tracing::error!("{} {} panicked: {}", method, uri.path(), reason);
            CrownError::Internal(reason).into_response()
        }
    };

    let unresolved = response.extensions().get::<UnresolvedError>().map(|e| e.0.clone());
    let response = match unresolved {
        Some(error) => return chain.resolve(&method, &uri, &error).unwrap_or(response),
        None if is_bare_error(&response) => response,
        None => return response,
    };

    let code = ErrorCode::from_status(response.status());
    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, BARE_ERROR_BODY_LIMIT).await.unwrap_or_default();
    let text = String::from_utf8_lossy(&bytes).trim().to_string();
    let msg = if text.is_empty() { code.msg().to_string() } else { text };
    match chain.resolve(&method, &uri, &CrownError::Status(code, msg)) {
        Some(resolved) => resolved,
        None => Response::from_parts(parts, Body::from(bytes)),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_crown_resolver_body() {
        let chain = ExceptionResolverChain::new(vec![Arc::new(CrownHandlerExceptionResolver)]);
        let uri: Uri = "/users/7".parse().unwrap();
        let response = chain.resolve(&Method::GET, &uri, &CrownError::NotFound("user 7".to_string())).unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_internal_message_hidden() {
        assert_eq!(
            CrownHandlerExceptionResolver::message(&CrownError::Internal("db password wrong".to_string())),
            "Internal server error"
        );
        assert_eq!(CrownHandlerExceptionResolver::message(&CrownError::Forbidden("no".to_string())), "no");
    }

    #[test]
    fn test_bare_error_detection() {
        assert!(is_bare_error(&StatusCode::NOT_FOUND.into_response()));
        assert!(is_bare_error(&(StatusCode::BAD_REQUEST, "bad").into_response()));
        assert!(!is_bare_error(&StatusCode::OK.into_response()));
        let json = (StatusCode::CONFLICT, [(CONTENT_TYPE, "application/problem+json")], "{}").into_response();
        assert!(!is_bare_error(&json));
        assert_eq!(
            CrownHandlerExceptionResolver::message(&CrownError::Status(ErrorCode::InternalServerError, "stack".to_string())),
            "Internal server error"
        );
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned boom"));
        assert_eq!(panic_message(payload.as_ref()), "owned boom");
        let payload: Box<dyn Any + Send> = Box::new(7);
        assert_eq!(panic_message(payload.as_ref()), "handler panicked");
    }

    #[test]
    fn test_empty_chain() {
        let chain = ExceptionResolverChain::default();
        assert!(chain.resolve(&Method::GET, &"/".parse().unwrap(), &CrownError::Forbidden("no".to_string())).is_none());
    }
}
