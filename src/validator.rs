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
//! Bean validation: the [`Validate`] trait for request bodies, the
//! [`ValidatorCollection`] that walks collections element by element and
//! the [`ValidatorAdapter`] bridging it into the request pipeline.
//!
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRequest, Request};
use indexmap::IndexMap;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::CrownError;

/// Field path to messages, in the order the failures were found
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    errors: IndexMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) -> &mut Self {
        self.errors.entry(field.to_string()).or_default().push(message.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    pub fn errors(&self) -> &IndexMap<String, Vec<String>> {
        &self.errors
    }

    pub fn field(&self, path: &str) -> Option<&Vec<String>> {
        self.errors.get(path)
    }

    /// Run `f` against a fresh error set and merge its failures under `prefix`
    pub fn nested<F>(&mut self, prefix: &str, f: F)
    where
        F: FnOnce(&mut ValidationErrors),
    {
        let mut inner = ValidationErrors::new();
        f(&mut inner);
        for (path, messages) in inner.errors {
            let full = if path.is_empty() {
                prefix.to_string()
            } else if path.starts_with('[') {
                format!("{}{}", prefix, path)
            } else {
                format!("{}.{}", prefix, path)
            };
            self.errors.entry(full).or_default().extend(messages);
        }
    }

    /// Keep the first failure only
    pub fn truncate_to_first(&mut self) {
        self.errors.truncate(1);
        if let Some((_, messages)) = self.errors.first_mut() {
            messages.truncate(1);
        }
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (path, messages) in self.errors.iter() {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                first = false;
                write!(f, "{}: {}", path, message)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Constraints of a request value; failures go to `errors` with paths relative to `self`.
pub trait Validate {
    fn validate(&self, errors: &mut ValidationErrors);
}

impl<T: Validate> Validate for [T] {
    fn validate(&self, errors: &mut ValidationErrors) {
        for (i, item) in self.iter().enumerate() {
            errors.nested(&format!("[{}]", i), |e| item.validate(e));
        }
    }
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self, errors: &mut ValidationErrors) {
        self.as_slice().validate(errors)
    }
}

impl<T: Validate> Validate for Option<T> {
    fn validate(&self, errors: &mut ValidationErrors) {
        if let Some(value) = self {
            value.validate(errors);
        }
    }
}

/// Validation entry of the pipeline
pub trait Validator: Send + Sync {
    fn validate_object(&self, target: &dyn Validate) -> Result<(), ValidationErrors>;
}

/// Validates single values and every element of a collection
#[derive(Debug, Clone, Default)]
pub struct ValidatorCollection {
    fail_fast: bool,
}

impl ValidatorCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report only the first failure
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }
}

impl Validator for ValidatorCollection {
    fn validate_object(&self, target: &dyn Validate) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        target.validate(&mut errors);
        if self.fail_fast {
            errors.truncate_to_first();
        }
        errors.into_result()
    }
}

/// Bridges a [`Validator`] into the request pipeline, failures become [`CrownError::Validation`]
#[derive(Debug, Clone, Default)]
pub struct ValidatorAdapter<V> {
    target: V,
}

impl<V: Validator> ValidatorAdapter<V> {
    pub fn new(target: V) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &V {
        &self.target
    }

    pub fn validate_value(&self, value: &dyn Validate) -> crate::errors::Result<()> {
        self.target.validate_object(value).map_err(CrownError::Validation)
    }
}

impl<V: Validator> Validator for ValidatorAdapter<V> {
    fn validate_object(&self, target: &dyn Validate) -> Result<(), ValidationErrors> {
        self.target.validate_object(target)
    }
}

/// Validator installed in the request extensions
#[derive(Clone)]
pub struct RequestValidator(pub Arc<dyn Validator>);

impl RequestValidator {
    pub fn check(&self, value: &dyn Validate) -> crate::errors::Result<()> {
        self.0.validate_object(value).map_err(CrownError::Validation)
    }
}

/// JSON body extractor that validates the value before the handler sees it.
///
/// Without a [`RequestValidator`] in the request extensions a plain
/// [`ValidatorCollection`] is used.
#[derive(Debug, Clone, Copy, Default)]
pub struct Valid<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for Valid<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = CrownError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let validator = req.extensions().get::<RequestValidator>().cloned();
        let axum::Json(value) = axum::Json::<T>::from_request(req, state)
            .await
            .map_err(|e| CrownError::BadRequest(e.body_text()))?;
        match validator {
            Some(validator) => validator.check(&value)?,
            None => ValidatorAdapter::new(ValidatorCollection::new()).validate_value(&value)?,
        }
        Ok(Valid(value))
    }
}

/// Common field constraints
pub mod constraints {
    use super::*;

    pub fn not_blank(errors: &mut ValidationErrors, field: &str, value: &str) {
        if value.trim().is_empty() {
            errors.add(field, "must not be blank");
        }
    }

    /// Character count within `min..=max`
    pub fn length(errors: &mut ValidationErrors, field: &str, value: &str, min: usize, max: usize) {
        let len = value.chars().count();
        if len < min || len > max {
            errors.add(field, format!("length must be between {} and {}", min, max));
        }
    }

    pub fn range<T: PartialOrd + fmt::Display>(errors: &mut ValidationErrors, field: &str, value: T, min: T, max: T) {
        if value < min || value > max {
            errors.add(field, format!("must be between {} and {}", min, max));
        }
    }

    pub fn pattern(errors: &mut ValidationErrors, field: &str, value: &str, regex: &Regex) {
        if !regex.is_match(value) {
            errors.add(field, format!("must match \"{}\"", regex.as_str()));
        }
    }
}
