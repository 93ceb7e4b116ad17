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
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{CrownError, Result};
use crate::json::JsonFormats;
use crate::server::ServerTuning;

/// Paths the global interceptor never sees
pub const EXCLUDE_PATH_PATTERNS: [&str; 5] = [
    "/error",
    "/swagger-resources",
    "/swagger-resources/configuration/security",
    "/swagger-resources/configuration/ui",
    "/v2/api-docs",
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterceptorPaths {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl Default for InterceptorPaths {
    fn default() -> Self {
        Self {
            include: vec!["/**".to_string()],
            exclude: EXCLUDE_PATH_PATTERNS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebMvcConfig {
    bind: SocketAddr,
    interceptor: InterceptorPaths,
    json: JsonFormats,
    tuning: ServerTuning,
    /// Defaults to whether the `fast-server` feature is compiled in
    enable_fast_server_tuning: bool,
    slow_request_threshold_ms: u64,
    /// Report only the first validation failure
    validation_fail_fast: bool,
}

impl Default for WebMvcConfig {
    fn default() -> Self {
        WebMvcConfig {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            interceptor: InterceptorPaths::default(),
            json: JsonFormats::default(),
            tuning: ServerTuning::default(),
            enable_fast_server_tuning: cfg!(feature = "fast-server"),
            slow_request_threshold_ms: 3000,
            validation_fail_fast: false,
        }
    }
}

impl WebMvcConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a YAML file; absent keys keep their defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| CrownError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: WebMvcConfig = serde_yaml::from_str(text)?;
        config.json.validate()?;
        Ok(config)
    }

    pub fn bind(&self) -> SocketAddr {
        self.bind
    }

    pub fn interceptor(&self) -> &InterceptorPaths {
        &self.interceptor
    }

    pub fn json(&self) -> &JsonFormats {
        &self.json
    }

    pub fn tuning(&self) -> &ServerTuning {
        &self.tuning
    }

    pub fn enable_fast_server_tuning(&self) -> bool {
        self.enable_fast_server_tuning
    }

    pub fn slow_request_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_request_threshold_ms)
    }

    pub fn validation_fail_fast(&self) -> bool {
        self.validation_fail_fast
    }

    pub fn set_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    pub fn set_interceptor(mut self, interceptor: InterceptorPaths) -> Self {
        self.interceptor = interceptor;
        self
    }

    pub fn set_json(mut self, json: JsonFormats) -> Self {
        self.json = json;
        self
    }

    pub fn set_tuning(mut self, tuning: ServerTuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn set_enable_fast_server_tuning(mut self, enable: bool) -> Self {
        self.enable_fast_server_tuning = enable;
        self
    }

    pub fn set_slow_request_threshold(mut self, threshold: Duration) -> Self {
        self.slow_request_threshold_ms = threshold.as_millis() as u64;
        self
    }

    pub fn set_validation_fail_fast(mut self, fail_fast: bool) -> Self {
        self.validation_fail_fast = fail_fast;
        self
    }
}
