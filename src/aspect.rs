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
use std::time::{Duration, Instant};

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::context::RequestContextHolder;

/// Access log for every request; slow ones are reported at `warn`
#[derive(Debug, Clone)]
pub struct LogRecordAspect {
    slow_threshold: Duration,
}

impl LogRecordAspect {
    pub fn new(slow_threshold: Duration) -> Self {
        Self { slow_threshold }
    }

    pub fn slow_threshold(&self) -> Duration {
        self.slow_threshold
    }

    pub fn is_slow(&self, elapsed: Duration) -> bool {
        !self.slow_threshold.is_zero() && elapsed >= self.slow_threshold
    }

    fn record(&self, method: &str, path: &str, query: &str, status: u16, elapsed: Duration, request_id: Option<String>) {
        let request_id = request_id.unwrap_or_default();
        let millis = elapsed.as_millis();
        if self.is_slow(elapsed) {
            tracing::warn!(target: "crown::log_record", %request_id, "slow request {} {}?{} -> {} in {}ms", method, path, query, status, millis);
        } else {
            tracing::info!(target: "crown::log_record", %request_id, "{} {}?{} -> {} in {}ms", method, path, query, status, millis);
        }
    }
}

impl Default for LogRecordAspect {
    fn default() -> Self {
        Self::new(Duration::from_secs(3))
    }
}

pub async fn log_record(State(aspect): State<Arc<LogRecordAspect>>, request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let query = request.uri().query().unwrap_or_default().to_string();
    let request_id = RequestContextHolder::current().map(|a| a.id().to_string());
    let response = next.run(request).await;
    aspect.record(&method, &path, &query, response.status().as_u16(), started.elapsed(), request_id);
    response
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_slow_threshold() {
        let aspect = LogRecordAspect::new(Duration::from_millis(100));
        assert!(!aspect.is_slow(Duration::from_millis(99)));
        assert!(aspect.is_slow(Duration::from_millis(100)));
        assert!(!LogRecordAspect::new(Duration::ZERO).is_slow(Duration::from_secs(60)));
    }
}
