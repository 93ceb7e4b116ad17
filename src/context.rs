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
//! Request scoped attributes bound to the task that serves the request.
//!
use std::any::TypeId;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use chrono::{Local, NaiveDateTime};
use dashmap::DashMap;
use getset::{CopyGetters, Getters};
use http::{HeaderMap, Method, Uri};
use serde_json::Value;
use uuid::Uuid;

tokio::task_local! {
    static REQUEST_ATTRIBUTES: Arc<RequestAttributes>;
}

#[derive(Debug, Getters, CopyGetters)]
pub struct RequestAttributes {
    #[getset(get_copy = "pub")]
    id: Uuid,
    #[getset(get = "pub")]
    method: Method,
    #[getset(get = "pub")]
    uri: Uri,
    #[getset(get = "pub")]
    headers: HeaderMap,
    #[getset(get_copy = "pub")]
    started_at: NaiveDateTime,
    #[getset(get_copy = "pub")]
    started: Instant,
    attributes: DashMap<String, Value>,
}

impl RequestAttributes {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap) -> Self {
        Self {
            id: Uuid::new_v4(),
            method,
            uri,
            headers,
            started_at: Local::now().naive_local(),
            started: Instant::now(),
            attributes: DashMap::new(),
        }
    }

    pub fn set_attribute(&self, name: &str, value: Value) -> Option<Value> {
        self.attributes.insert(name.to_string(), value)
    }

    pub fn get_attribute(&self, name: &str) -> Option<Value> {
        self.attributes.get(name).map(|v| v.value().clone())
    }

    pub fn remove_attribute(&self, name: &str) -> Option<Value> {
        self.attributes.remove(name).map(|(_, v)| v)
    }

    pub fn attribute_names(&self) -> Vec<String> {
        self.attributes.iter().map(|e| e.key().clone()).collect()
    }
}

/// Access to the attributes of the request the current task serves
pub struct RequestContextHolder;

impl RequestContextHolder {
    /// `None` outside of a request task
    pub fn current() -> Option<Arc<RequestAttributes>> {
        REQUEST_ATTRIBUTES.try_with(Arc::clone).ok()
    }
}

pub trait RequestListener: Send + Sync + 'static {
    fn request_initialized(&self, _attributes: &RequestAttributes) {}

    fn request_destroyed(&self, _attributes: &RequestAttributes) {}

    fn name(&self) -> &'static str;
}

/// Exposes the request through [`RequestContextHolder`]
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestContextListener;

impl RequestListener for RequestContextListener {
    fn request_initialized(&self, attributes: &RequestAttributes) {
        tracing::trace!("request {} bound: {} {}", attributes.id(), attributes.method(), attributes.uri());
    }

    fn request_destroyed(&self, attributes: &RequestAttributes) {
        tracing::trace!("request {} released", attributes.id());
    }

    fn name(&self) -> &'static str {
        "RequestContextListener"
    }
}

/// At most one listener per type
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    types: HashSet<TypeId>,
    listeners: Vec<Arc<dyn RequestListener>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the listener built by `f` unless one of type `L` is already
    /// there. Returns whether it was registered.
    pub fn register_if_absent<L, F>(&mut self, f: F) -> bool
    where
        L: RequestListener,
        F: FnOnce() -> L,
    {
        if !self.types.insert(TypeId::of::<L>()) {
            return false;
        }
        self.listeners.push(Arc::new(f()));
        true
    }

    pub fn contains<L: RequestListener>(&self) -> bool {
        self.types.contains(&TypeId::of::<L>())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.listeners.iter().map(|l| l.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

/// Binds [`RequestAttributes`] to the task and notifies the listeners
pub async fn request_context(State(registry): State<Arc<ListenerRegistry>>, mut request: Request, next: Next) -> Response {
    let attributes = Arc::new(RequestAttributes::new(
        request.method().clone(),
        request.uri().clone(),
        request.headers().clone(),
    ));
    request.extensions_mut().insert(attributes.clone());
    for listener in registry.listeners.iter() {
        listener.request_initialized(&attributes);
    }
    let response = REQUEST_ATTRIBUTES.scope(attributes.clone(), next.run(request)).await;
    for listener in registry.listeners.iter().rev() {
        listener.request_destroyed(&attributes);
    }
    response
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_register_if_absent() {
        let mut registry = ListenerRegistry::new();
        assert!(registry.register_if_absent(|| RequestContextListener));
        assert!(!registry.register_if_absent(|| RequestContextListener));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains::<RequestContextListener>());
        assert_eq!(registry.names(), vec!["RequestContextListener"]);
    }

    #[test]
    fn test_attributes() {
        let attributes = RequestAttributes::new(Method::GET, Uri::from_static("/users"), HeaderMap::new());
        assert!(attributes.set_attribute("tenant", Value::from("crown")).is_none());
        assert_eq!(attributes.get_attribute("tenant"), Some(Value::from("crown")));
        assert_eq!(attributes.attribute_names(), vec!["tenant".to_string()]);
        assert!(attributes.remove_attribute("tenant").is_some());
        assert!(attributes.get_attribute("tenant").is_none());
    }

    #[tokio::test]
    async fn test_holder_scope() {
        assert!(RequestContextHolder::current().is_none());
        let attributes = Arc::new(RequestAttributes::new(Method::POST, Uri::from_static("/orders"), HeaderMap::new()));
        let path = REQUEST_ATTRIBUTES
            .scope(attributes, async { RequestContextHolder::current().map(|a| a.uri().path().to_string()) })
            .await;
        assert_eq!(path.as_deref(), Some("/orders"));
    }
}
