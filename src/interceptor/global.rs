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
use axum::extract::Request;
use axum::response::Response;
use chrono::{Local, NaiveDateTime};

use crate::errors::Result;
use crate::interceptor::{HandlerInterceptor, RequestInfo};

/// Wall clock time the request entered the interceptor chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestStart(pub NaiveDateTime);

/// Interceptor on every non-excluded path. Stamps [`RequestStart`] into the
/// request extensions and traces entry and exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalInterceptor;

impl GlobalInterceptor {
    pub const NAME: &'static str = "GlobalInterceptor";
}

#[async_trait::async_trait]
impl HandlerInterceptor for GlobalInterceptor {
    async fn pre_handle(&self, request: &mut Request) -> Result<bool> {
        request.extensions_mut().insert(RequestStart(Local::now().naive_local()));
        tracing::debug!("--> {} {}", request.method(), request.uri().path());
        Ok(true)
    }

    async fn after_completion(&self, info: &RequestInfo, response: &mut Response) {
        tracing::debug!(
            "<-- {} {} {} in {}ms",
            info.method,
            info.path(),
            response.status().as_u16(),
            info.elapsed().as_millis()
        );
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}
