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
//! Common Errors.
//!
use std::fmt;
use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use http::StatusCode;

use crate::validator::ValidationErrors;

/// Error codes rendered by the exception resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    UnsupportedMediaType,
    InternalServerError,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ErrorCode::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ErrorCode::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine readable name, the `error` field of the response body
    pub fn error(&self) -> &'static str {
        match self {
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            ErrorCode::UnsupportedMediaType => "UNSUPPORTED_MEDIA_TYPE",
            ErrorCode::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn msg(&self) -> &'static str {
        match self {
            ErrorCode::BadRequest => "Bad request",
            ErrorCode::Unauthorized => "Unauthorized",
            ErrorCode::Forbidden => "Forbidden",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::MethodNotAllowed => "Method not allowed",
            ErrorCode::UnsupportedMediaType => "Unsupported media type",
            ErrorCode::InternalServerError => "Internal server error",
        }
    }

    /// Closest code for a status produced outside of crown handlers
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => ErrorCode::Unauthorized,
            StatusCode::FORBIDDEN => ErrorCode::Forbidden,
            StatusCode::NOT_FOUND => ErrorCode::NotFound,
            StatusCode::METHOD_NOT_ALLOWED => ErrorCode::MethodNotAllowed,
            StatusCode::UNSUPPORTED_MEDIA_TYPE => ErrorCode::UnsupportedMediaType,
            s if s.is_client_error() => ErrorCode::BadRequest,
            _ => ErrorCode::InternalServerError,
        }
    }
}

#[derive(Debug)]
pub enum CrownError {
    /// Bean validation failures, keyed by field path
    Validation(ValidationErrors),
    /// Request text that no converter accepts
    Conversion(String),
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Config(String),
    Io(std::io::Error),
    Json(serde_json::Error),
    Internal(String),
    /// Error status produced outside of crown handlers (routing, extractor rejections)
    Status(ErrorCode, String),
}

impl CrownError {
    pub fn code(&self) -> ErrorCode {
        match *self {
            CrownError::Validation(_)
            | CrownError::Conversion(_)
            | CrownError::BadRequest(_)
            | CrownError::Json(_) => ErrorCode::BadRequest,
            CrownError::Unauthorized(_) => ErrorCode::Unauthorized,
            CrownError::Forbidden(_) => ErrorCode::Forbidden,
            CrownError::NotFound(_) => ErrorCode::NotFound,
            CrownError::Config(_) | CrownError::Io(_) | CrownError::Internal(_) => ErrorCode::InternalServerError,
            CrownError::Status(code, _) => code,
        }
    }
}

impl fmt::Display for CrownError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            CrownError::Validation(ref err) => err.fmt(f),
            CrownError::Conversion(ref err) => write!(f, "Conversion failed: {}", err),
            CrownError::BadRequest(ref err) => err.fmt(f),
            CrownError::Unauthorized(ref err) => err.fmt(f),
            CrownError::Forbidden(ref err) => err.fmt(f),
            CrownError::NotFound(ref err) => err.fmt(f),
            CrownError::Config(ref err) => write!(f, "Config error: {}", err),
            CrownError::Io(ref err) => err.fmt(f),
            CrownError::Json(ref err) => err.fmt(f),
            CrownError::Internal(ref err) => err.fmt(f),
            CrownError::Status(_, ref msg) => msg.fmt(f),
        }
    }
}

impl std::error::Error for CrownError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            CrownError::Io(ref err) => Some(err),
            CrownError::Json(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CrownError {
    fn from(err: std::io::Error) -> Self {
        CrownError::Io(err)
    }
}

impl From<serde_json::Error> for CrownError {
    fn from(err: serde_json::Error) -> Self {
        CrownError::Json(err)
    }
}

impl From<serde_yaml::Error> for CrownError {
    fn from(err: serde_yaml::Error) -> Self {
        CrownError::Config(err.to_string())
    }
}

impl From<ValidationErrors> for CrownError {
    fn from(err: ValidationErrors) -> Self {
        CrownError::Validation(err)
    }
}

/// Handler failure waiting for the exception resolvers
#[derive(Debug, Clone)]
pub struct UnresolvedError(pub Arc<CrownError>);

/// The response carries the error itself; the resolver layer renders the body.
impl IntoResponse for CrownError {
    fn into_response(self) -> Response {
        let mut response = self.code().status().into_response();
        response.extensions_mut().insert(UnresolvedError(Arc::new(self)));
        response
    }
}

pub type Result<T> = std::result::Result<T, CrownError>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(CrownError::NotFound("user".to_string()).code().status(), StatusCode::NOT_FOUND);
        assert_eq!(CrownError::Conversion("x".to_string()).code(), ErrorCode::BadRequest);
        assert_eq!(CrownError::Internal("x".to_string()).code().error(), "INTERNAL_SERVER_ERROR");
        assert_eq!(ErrorCode::from_status(StatusCode::IM_A_TEAPOT), ErrorCode::BadRequest);
        assert_eq!(ErrorCode::from_status(StatusCode::BAD_GATEWAY), ErrorCode::InternalServerError);
        let status = CrownError::Status(ErrorCode::MethodNotAllowed, "Method not allowed".to_string());
        assert_eq!(status.code().status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(status.to_string(), "Method not allowed");
    }

    #[test]
    fn test_into_response_keeps_error() {
        let response = CrownError::Forbidden("no".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let err = response.extensions().get::<UnresolvedError>().unwrap();
        assert!(matches!(*err.0, CrownError::Forbidden(_)));
    }
}
