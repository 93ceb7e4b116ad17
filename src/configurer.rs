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
//! Registration hooks and the bootstrap that turns them into a request
//! pipeline.
//!
use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::{Extension, Router};

use crate::aspect::{log_record, LogRecordAspect};
use crate::config::WebMvcConfig;
use crate::context::{request_context, ListenerRegistry, RequestContextListener};
use crate::enums::{FormatterRegistry, IEnumConverterFactory};
use crate::errors::Result;
use crate::exception::{resolve_exceptions, CrownHandlerExceptionResolver, ExceptionResolverChain, HandlerExceptionResolver};
use crate::interceptor::{intercept, GlobalInterceptor, InterceptorChain, InterceptorRegistry};
use crate::json::{customize, default_converters, write_messages, MessageConverter, MessageWriter};
#[cfg(feature = "fast-server")]
use crate::server::FastServerCustomizer;
use crate::server::ServerFactory;
use crate::validator::{RequestValidator, Validator, ValidatorAdapter, ValidatorCollection};

/// Hooks run once each at bootstrap. Every hook has a no-op default.
pub trait WebMvcConfigurer {
    /// Process-wide access log aspect, the first configurer that returns one wins
    fn log_record_aspect(&self) -> Option<Arc<LogRecordAspect>> {
        None
    }

    /// Request validator, the first configurer that returns one wins
    fn validator(&self) -> Option<Arc<dyn Validator>> {
        None
    }

    fn add_formatters(&self, _registry: &mut FormatterRegistry) {}

    fn customize_server(&self, _factory: &mut ServerFactory) {}

    fn register_listeners(&self, _registry: &mut ListenerRegistry) {}

    fn configure_message_converters(&self, converters: Vec<MessageConverter>) -> Vec<MessageConverter> {
        converters
    }

    fn configure_handler_exception_resolvers(&self, _resolvers: &mut Vec<Arc<dyn HandlerExceptionResolver>>) {}

    fn add_interceptors(&self, _registry: &mut InterceptorRegistry) {}
}

/// The crown registrations
#[derive(Debug, Clone, Default)]
pub struct WebMvcAutoConfiguration {
    config: WebMvcConfig,
}

impl WebMvcAutoConfiguration {
    pub fn new(config: WebMvcConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WebMvcConfig {
        &self.config
    }
}

impl WebMvcConfigurer for WebMvcAutoConfiguration {
    fn log_record_aspect(&self) -> Option<Arc<LogRecordAspect>> {
        Some(Arc::new(LogRecordAspect::new(self.config.slow_request_threshold())))
    }

    fn validator(&self) -> Option<Arc<dyn Validator>> {
        let collection = ValidatorCollection::new().with_fail_fast(self.config.validation_fail_fast());
        Some(Arc::new(ValidatorAdapter::new(collection)))
    }

    fn add_formatters(&self, registry: &mut FormatterRegistry) {
        registry.add_converter_factory(IEnumConverterFactory);
    }

    #[cfg(feature = "fast-server")]
    fn customize_server(&self, factory: &mut ServerFactory) {
        if self.config.enable_fast_server_tuning() {
            factory.add_customizer(Arc::new(FastServerCustomizer::new(self.config.tuning().clone())));
        }
    }

    #[cfg(not(feature = "fast-server"))]
    fn customize_server(&self, _factory: &mut ServerFactory) {
        if self.config.enable_fast_server_tuning() {
            tracing::warn!("server tuning requested, but the fast-server feature is not compiled in");
        }
    }

    fn register_listeners(&self, registry: &mut ListenerRegistry) {
        registry.register_if_absent(|| RequestContextListener);
    }

    fn configure_message_converters(&self, converters: Vec<MessageConverter>) -> Vec<MessageConverter> {
        customize(&converters, self.config.json())
    }

    fn configure_handler_exception_resolvers(&self, resolvers: &mut Vec<Arc<dyn HandlerExceptionResolver>>) {
        resolvers.push(Arc::new(CrownHandlerExceptionResolver));
    }

    fn add_interceptors(&self, registry: &mut InterceptorRegistry) {
        let paths = self.config.interceptor();
        registry.add_interceptor(Arc::new(GlobalInterceptor))
            .add_path_patterns(paths.include.as_slice())
            .exclude_path_patterns(paths.exclude.as_slice());
    }
}

/// Resolved pipeline, immutable once bootstrapped
#[derive(Clone)]
pub struct WebMvc {
    config: WebMvcConfig,
    log_record_aspect: Option<Arc<LogRecordAspect>>,
    validator: Option<RequestValidator>,
    formatters: Arc<FormatterRegistry>,
    server_factory: ServerFactory,
    listeners: Arc<ListenerRegistry>,
    converters: Arc<Vec<MessageConverter>>,
    message_writer: Arc<MessageWriter>,
    resolvers: Arc<ExceptionResolverChain>,
    interceptors: Arc<InterceptorChain>,
}

impl WebMvc {
    /// Pipeline of the crown auto configuration alone
    pub fn bootstrap(config: WebMvcConfig) -> Result<Self> {
        Self::bootstrap_with(config, &[])
    }

    /// Auto configuration first, then `configurers` in order
    pub fn bootstrap_with(config: WebMvcConfig, configurers: &[&dyn WebMvcConfigurer]) -> Result<Self> {
        config.json().validate()?;
        let auto = WebMvcAutoConfiguration::new(config.clone());
        let mut all: Vec<&dyn WebMvcConfigurer> = Vec::with_capacity(configurers.len() + 1);
        all.push(&auto);
        all.extend_from_slice(configurers);

        let mut log_record_aspect = None;
        let mut validator = None;
        let mut formatters = FormatterRegistry::new();
        let mut server_factory = ServerFactory::new();
        let mut listeners = ListenerRegistry::new();
        let mut converters = default_converters();
        let mut resolvers: Vec<Arc<dyn HandlerExceptionResolver>> = Vec::new();
        let mut interceptors = InterceptorRegistry::new();
        for configurer in all.iter() {
            if let Some(aspect) = configurer.log_record_aspect() {
                log_record_aspect.get_or_insert(aspect);
            }
            if let Some(v) = configurer.validator() {
                validator.get_or_insert(RequestValidator(v));
            }
            configurer.add_formatters(&mut formatters);
            configurer.customize_server(&mut server_factory);
            configurer.register_listeners(&mut listeners);
            converters = configurer.configure_message_converters(converters);
            configurer.configure_handler_exception_resolvers(&mut resolvers);
            configurer.add_interceptors(&mut interceptors);
        }

        let message_writer = MessageWriter::from_converters(&converters);
        tracing::debug!(
            "web mvc ready: formatters {:?}, listeners {:?}, server customizers {:?}, {} interceptor(s)",
            formatters.names(),
            listeners.names(),
            server_factory.customizer_names(),
            interceptors.len()
        );
        Ok(Self {
            config,
            log_record_aspect,
            validator,
            formatters: Arc::new(formatters),
            server_factory,
            listeners: Arc::new(listeners),
            converters: Arc::new(converters),
            message_writer: Arc::new(message_writer),
            resolvers: Arc::new(ExceptionResolverChain::new(resolvers)),
            interceptors: Arc::new(interceptors.build()),
        })
    }

    pub fn config(&self) -> &WebMvcConfig {
        &self.config
    }

    pub fn log_record_aspect(&self) -> Option<&Arc<LogRecordAspect>> {
        self.log_record_aspect.as_ref()
    }

    pub fn validator(&self) -> Option<&RequestValidator> {
        self.validator.as_ref()
    }

    pub fn formatters(&self) -> &FormatterRegistry {
        &self.formatters
    }

    pub fn server_factory(&self) -> &ServerFactory {
        &self.server_factory
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn converters(&self) -> &[MessageConverter] {
        &self.converters
    }

    pub fn message_writer(&self) -> &MessageWriter {
        &self.message_writer
    }

    pub fn resolvers(&self) -> &ExceptionResolverChain {
        &self.resolvers
    }

    pub fn interceptors(&self) -> &InterceptorChain {
        &self.interceptors
    }

    /// Layer the pipeline onto `router`. Outermost first: request context,
    /// access log, exception resolution, message writing, interceptors.
    pub fn apply<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let mut router = router.layer(Extension(self.formatters.clone()));
        if let Some(validator) = self.validator.clone() {
            router = router.layer(Extension(validator));
        }
        router = router
            .layer(from_fn_with_state(self.interceptors.clone(), intercept))
            .layer(from_fn_with_state(self.message_writer.clone(), write_messages))
            .layer(from_fn_with_state(self.resolvers.clone(), resolve_exceptions));
        if let Some(aspect) = self.log_record_aspect.clone() {
            router = router.layer(from_fn_with_state(aspect, log_record));
        }
        if !self.listeners.is_empty() {
            router = router.layer(from_fn_with_state(self.listeners.clone(), request_context));
        }
        router
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::server::ServerTuning;

    #[test]
    fn test_bootstrap_defaults() {
        let mvc = WebMvc::bootstrap(WebMvcConfig::default()).unwrap();
        assert!(mvc.log_record_aspect().is_some());
        assert!(mvc.validator().is_some());
        assert_eq!(mvc.formatters().names(), vec!["IEnumConverterFactory"]);
        assert_eq!(mvc.listeners().names(), vec!["RequestContextListener"]);
        assert_eq!(mvc.resolvers().names(), vec!["CrownHandlerExceptionResolver"]);
        assert_eq!(mvc.interceptors().len(), 1);
        assert_eq!(mvc.server_factory().is_customized(), cfg!(feature = "fast-server"));
        assert_eq!(mvc.converters().len(), 3);
    }

    #[test]
    fn test_fast_server_tuning_flag() {
        let config = WebMvcConfig::default().set_enable_fast_server_tuning(true).set_tuning(ServerTuning::default());
        let names = WebMvc::bootstrap(config).unwrap().server_factory().customizer_names();
        if cfg!(feature = "fast-server") {
            assert_eq!(names, vec!["FastServerCustomizer"]);
        } else {
            assert!(names.is_empty());
        }
        let config = WebMvcConfig::default().set_enable_fast_server_tuning(false);
        assert!(!WebMvc::bootstrap(config).unwrap().server_factory().is_customized());
    }
}
