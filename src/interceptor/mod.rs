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
mod chain;
mod global;
pub mod matcher;

pub use chain::*;
pub use global::*;

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use http::{Method, StatusCode, Uri};

use crate::errors::Result;
use crate::interceptor::matcher::PathMatcher;

/// What the interceptors know about the request once the handler is gone
#[derive(Debug, Clone)]
pub struct RequestInfo {
    pub method: Method,
    pub uri: Uri,
    pub started: Instant,
}

impl RequestInfo {
    pub fn of(request: &Request) -> Self {
        Self {
            method: request.method().clone(),
            uri: request.uri().clone(),
            started: Instant::now(),
        }
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

#[async_trait::async_trait]
pub trait HandlerInterceptor: Send + Sync {
    /// Called before the handler. `Ok(false)` stops the request with [`HandlerInterceptor::rejected`].
    async fn pre_handle(&self, _request: &mut Request) -> Result<bool> {
        Ok(true)
    }

    /// Called after a successful handler, in reverse order
    async fn post_handle(&self, _info: &RequestInfo, _response: &mut Response) {}

    /// Called for every interceptor whose `pre_handle` passed, in reverse order
    async fn after_completion(&self, _info: &RequestInfo, _response: &mut Response) {}

    /// Response sent when `pre_handle` vetoes the request
    fn rejected(&self, _info: &RequestInfo) -> Response {
        StatusCode::FORBIDDEN.into_response()
    }

    /// Interceptor name
    fn name(&self) -> &'static str;

    /// Execution order (the smaller the value, the first execution)
    fn order(&self) -> i32 { 0 }
}

/// Interceptor bound to its path patterns
#[derive(Clone)]
pub struct MappedInterceptor {
    interceptor: Arc<dyn HandlerInterceptor>,
    matcher: PathMatcher,
    order: i32,
}

impl MappedInterceptor {
    pub fn interceptor(&self) -> &Arc<dyn HandlerInterceptor> {
        &self.interceptor
    }

    pub fn matcher(&self) -> &PathMatcher {
        &self.matcher
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    pub fn matches(&self, path: &str) -> bool {
        self.matcher.matches(path)
    }
}

pub struct InterceptorRegistration {
    interceptor: Arc<dyn HandlerInterceptor>,
    includes: Vec<String>,
    excludes: Vec<String>,
    order: i32,
}

impl InterceptorRegistration {
    pub fn add_path_patterns<S: AsRef<str>>(&mut self, patterns: &[S]) -> &mut Self {
        self.includes.extend(patterns.iter().map(|p| p.as_ref().to_string()));
        self
    }

    pub fn exclude_path_patterns<S: AsRef<str>>(&mut self, patterns: &[S]) -> &mut Self {
        self.excludes.extend(patterns.iter().map(|p| p.as_ref().to_string()));
        self
    }

    pub fn order(&mut self, order: i32) -> &mut Self {
        self.order = order;
        self
    }
}

#[derive(Default)]
pub struct InterceptorRegistry {
    registrations: Vec<InterceptorRegistration>,
}

impl InterceptorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_interceptor(&mut self, interceptor: Arc<dyn HandlerInterceptor>) -> &mut InterceptorRegistration {
        let order = interceptor.order();
        let index = self.registrations.len();
        self.registrations.push(InterceptorRegistration {
            interceptor,
            includes: vec![],
            excludes: vec![],
            order,
        });
        &mut self.registrations[index]
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Freeze into a chain sorted by order; equal orders keep registration order
    pub fn build(self) -> InterceptorChain {
        let mut interceptors: Vec<MappedInterceptor> = self.registrations.into_iter()
            .map(|r| MappedInterceptor {
                interceptor: r.interceptor,
                matcher: PathMatcher::new(r.includes, r.excludes),
                order: r.order,
            })
            .collect();
        interceptors.sort_by(|a, b| a.order.cmp(&b.order));
        InterceptorChain::new(interceptors)
    }
}
