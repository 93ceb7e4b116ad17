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
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::errors::UnresolvedError;
use crate::interceptor::{MappedInterceptor, RequestInfo};

/// Interceptor chain manager
#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<MappedInterceptor>,
}

impl InterceptorChain {
    pub fn new(interceptors: Vec<MappedInterceptor>) -> Self {
        Self { interceptors }
    }

    pub fn interceptors(&self) -> &[MappedInterceptor] {
        &self.interceptors
    }

    /// Interceptors mapped to `path`, in execution order
    pub fn matching<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a MappedInterceptor> + 'a {
        self.interceptors.iter().filter(move |m| m.matches(path))
    }

    /// Get the number of interceptors
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    /// Check if it is empty
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    async fn trigger_after_completion(applied: &[&MappedInterceptor], info: &RequestInfo, response: &mut Response) {
        for mapped in applied.iter().rev() {
            mapped.interceptor().after_completion(info, response).await;
        }
    }
}

/// Runs the interceptors mapped to the request path around the handler
pub async fn intercept(State(chain): State<Arc<InterceptorChain>>, mut request: Request, next: Next) -> Response {
    let info = RequestInfo::of(&request);
    let matched: Vec<&MappedInterceptor> = chain.matching(info.path()).collect();
    if matched.is_empty() {
        return next.run(request).await;
    }

    let mut applied = 0;
    for mapped in matched.iter() {
        let interceptor = mapped.interceptor();
        let mut response = match interceptor.pre_handle(&mut request).await {
            Ok(true) => {
                applied += 1;
                continue;
            }
            Ok(false) => {
                tracing::debug!("interceptor '{}' rejected {} {}", interceptor.name(), info.method, info.path());
                interceptor.rejected(&info)
            }
            Err(err) => {
                tracing::warn!("interceptor '{}' failed on {} {}: {}", interceptor.name(), info.method, info.path(), err);
                err.into_response()
            }
        };
        InterceptorChain::trigger_after_completion(&matched[..applied], &info, &mut response).await;
        return response;
    }

    let mut response = next.run(request).await;
    if response.extensions().get::<UnresolvedError>().is_none() {
        for mapped in matched.iter().rev() {
            mapped.interceptor().post_handle(&info, &mut response).await;
        }
    }
    InterceptorChain::trigger_after_completion(&matched, &info, &mut response).await;
    response
}
