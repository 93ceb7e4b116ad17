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
//! Embedded server runtime. Customizers adjust the tokio runtime builder
//! before the server starts; with none registered the runtime defaults apply.
//!
use std::sync::Arc;
#[cfg(feature = "fast-server")]
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::runtime::{Builder, Runtime};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerTuning {
    /// Async I/O worker threads, the number of cores when unset
    pub worker_threads: Option<usize>,
    pub max_blocking_threads: Option<usize>,
    pub thread_stack_size: Option<usize>,
    pub thread_name: String,
    /// Idle time before a blocking thread exits
    pub keep_alive_secs: Option<u64>,
}

impl Default for ServerTuning {
    fn default() -> Self {
        Self {
            worker_threads: None,
            max_blocking_threads: None,
            thread_stack_size: None,
            thread_name: "crown-worker".to_string(),
            keep_alive_secs: Some(60),
        }
    }
}

pub trait ServerCustomizer: Send + Sync {
    fn customize(&self, builder: &mut Builder);

    fn name(&self) -> &'static str;
}

/// Applies [`ServerTuning`] to the runtime
#[cfg(feature = "fast-server")]
#[derive(Debug, Clone, Default)]
pub struct FastServerCustomizer {
    tuning: ServerTuning,
}

#[cfg(feature = "fast-server")]
impl FastServerCustomizer {
    pub fn new(tuning: ServerTuning) -> Self {
        Self { tuning }
    }

    pub fn tuning(&self) -> &ServerTuning {
        &self.tuning
    }
}

#[cfg(feature = "fast-server")]
impl ServerCustomizer for FastServerCustomizer {
    fn customize(&self, builder: &mut Builder) {
        let tuning = &self.tuning;
        if let Some(threads) = tuning.worker_threads.filter(|t| *t > 0) {
            builder.worker_threads(threads);
        }
        if let Some(threads) = tuning.max_blocking_threads.filter(|t| *t > 0) {
            builder.max_blocking_threads(threads);
        }
        if let Some(size) = tuning.thread_stack_size.filter(|s| *s > 0) {
            builder.thread_stack_size(size);
        }
        if !tuning.thread_name.is_empty() {
            builder.thread_name(tuning.thread_name.clone());
        }
        if let Some(secs) = tuning.keep_alive_secs {
            builder.thread_keep_alive(Duration::from_secs(secs));
        }
        tracing::debug!("runtime tuned: {:?}", tuning);
    }

    fn name(&self) -> &'static str {
        "FastServerCustomizer"
    }
}

#[derive(Clone, Default)]
pub struct ServerFactory {
    customizers: Vec<Arc<dyn ServerCustomizer>>,
}

impl ServerFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_customizer(&mut self, customizer: Arc<dyn ServerCustomizer>) -> &mut Self {
        self.customizers.push(customizer);
        self
    }

    pub fn customizer_names(&self) -> Vec<&'static str> {
        self.customizers.iter().map(|c| c.name()).collect()
    }

    pub fn is_customized(&self) -> bool {
        !self.customizers.is_empty()
    }

    /// Multi-threaded runtime with every customizer applied in registration order
    pub fn build_runtime(&self) -> std::io::Result<Runtime> {
        let mut builder = Builder::new_multi_thread();
        builder.enable_all();
        for customizer in self.customizers.iter() {
            customizer.customize(&mut builder);
        }
        builder.build()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[cfg(feature = "fast-server")]
    #[test]
    fn test_build_tuned_runtime() {
        let mut factory = ServerFactory::new();
        let tuning = ServerTuning { worker_threads: Some(2), thread_stack_size: Some(4 * 1024 * 1024), ..Default::default() };
        factory.add_customizer(Arc::new(FastServerCustomizer::new(tuning)));
        assert_eq!(factory.customizer_names(), vec!["FastServerCustomizer"]);
        let runtime = factory.build_runtime().unwrap();
        assert_eq!(runtime.block_on(async { 1 + 1 }), 2);
    }

    #[test]
    fn test_default_runtime() {
        let factory = ServerFactory::new();
        assert!(!factory.is_customized());
        assert!(factory.build_runtime().is_ok());
    }
}
