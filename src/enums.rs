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
//! Enum parameter conversion. Request text (or a number) is matched against
//! the `value()` of every variant of an [`IEnum`].
//!
//! Two entry points share one converter. [`FormatterRegistry::convert_enum`]
//! serves path and form text and fails unless [`IEnumConverterFactory`] is
//! registered. The serde helpers ([`deserialize_ienum`], [`deserialize_ienum_opt`])
//! run inside `Deserialize` with no registry at hand, so they always use
//! [`IEnumConverterFactory`] directly, whatever the registry holds.
//!
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serializer};

use crate::errors::{CrownError, Result};

/// Stored value of an enum variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumValue {
    Int(i64),
    Str(&'static str),
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumValue::Int(v) => write!(f, "{}", v),
            EnumValue::Str(v) => f.write_str(v),
        }
    }
}

/// Enum with a stable external value
pub trait IEnum: Sized + Copy + Send + Sync + 'static {
    fn value(&self) -> EnumValue;

    fn variants() -> &'static [Self];
}

pub trait ConverterFactory: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;
}

/// Converts text into any [`IEnum`]
#[derive(Debug, Clone, Copy, Default)]
pub struct IEnumConverterFactory;

impl IEnumConverterFactory {
    pub fn get_converter<E: IEnum>(&self) -> IEnumConverter<E> {
        IEnumConverter { _target: PhantomData }
    }
}

impl ConverterFactory for IEnumConverterFactory {
    fn name(&self) -> &'static str {
        "IEnumConverterFactory"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone, Copy)]
pub struct IEnumConverter<E> {
    _target: PhantomData<E>,
}

impl<E: IEnum> IEnumConverter<E> {
    /// Blank text is `None`; text matching no variant is a conversion error
    pub fn convert(&self, source: &str) -> Result<Option<E>> {
        let source = source.trim();
        if source.is_empty() {
            return Ok(None);
        }
        E::variants()
            .iter()
            .find(|v| v.value().to_string() == source)
            .copied()
            .map(Some)
            .ok_or_else(|| CrownError::Conversion(format!(
                "'{}' is not a valid value of {}", source, std::any::type_name::<E>()
            )))
    }
}

/// Registered converter factories
#[derive(Debug, Clone, Default)]
pub struct FormatterRegistry {
    factories: Vec<Arc<dyn ConverterFactory>>,
}

impl FormatterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_converter_factory<F: ConverterFactory + 'static>(&mut self, factory: F) -> &mut Self {
        tracing::debug!("register converter factory {}", factory.name());
        self.factories.push(Arc::new(factory));
        self
    }

    pub fn factory<F: ConverterFactory + 'static>(&self) -> Option<&F> {
        self.factories.iter().find_map(|f| f.as_any().downcast_ref::<F>())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.factories.iter().map(|f| f.name()).collect()
    }

    pub fn convert_enum<E: IEnum>(&self, source: &str) -> Result<Option<E>> {
        match self.factory::<IEnumConverterFactory>() {
            Some(factory) => factory.get_converter::<E>().convert(source),
            None => Err(CrownError::Conversion(format!(
                "no converter registered for {}", std::any::type_name::<E>()
            ))),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Int(i64),
    Str(String),
}

impl RawValue {
    fn into_text(self) -> String {
        match self {
            RawValue::Int(v) => v.to_string(),
            RawValue::Str(v) => v,
        }
    }
}

/// `deserialize_with` helper for a required [`IEnum`] field, accepts strings and integers.
/// Independent of the [`FormatterRegistry`].
pub fn deserialize_ienum<'de, D, E>(deserializer: D) -> std::result::Result<E, D::Error>
where
    D: Deserializer<'de>,
    E: IEnum,
{
    let text = RawValue::deserialize(deserializer)?.into_text();
    match IEnumConverterFactory.get_converter::<E>().convert(&text) {
        Ok(Some(v)) => Ok(v),
        Ok(None) => Err(serde::de::Error::custom("enum value must not be blank")),
        Err(e) => Err(serde::de::Error::custom(e)),
    }
}

/// `deserialize_with` helper for an optional [`IEnum`] field, blank text is `None`
pub fn deserialize_ienum_opt<'de, D, E>(deserializer: D) -> std::result::Result<Option<E>, D::Error>
where
    D: Deserializer<'de>,
    E: IEnum,
{
    match Option::<RawValue>::deserialize(deserializer)? {
        Some(raw) => IEnumConverterFactory.get_converter::<E>()
            .convert(&raw.into_text())
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// `serialize_with` helper writing the variant value
pub fn serialize_ienum<S, E>(value: &E, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
    E: IEnum,
{
    match value.value() {
        EnumValue::Int(v) => serializer.serialize_i64(v),
        EnumValue::Str(v) => serializer.serialize_str(v),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::Serialize;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Status {
        Normal,
        Locked,
    }

    impl IEnum for Status {
        fn value(&self) -> EnumValue {
            match self {
                Status::Normal => EnumValue::Int(0),
                Status::Locked => EnumValue::Int(1),
            }
        }

        fn variants() -> &'static [Self] {
            &[Status::Normal, Status::Locked]
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Gender {
        Male,
    }

    impl IEnum for Gender {
        fn value(&self) -> EnumValue {
            EnumValue::Str("M")
        }

        fn variants() -> &'static [Self] {
            &[Gender::Male]
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct Query {
        #[serde(deserialize_with = "deserialize_ienum", serialize_with = "serialize_ienum")]
        status: Status,
        #[serde(default, deserialize_with = "deserialize_ienum_opt")]
        #[serde(skip_serializing)]
        gender: Option<Gender>,
    }

    #[test]
    fn test_convert() {
        let converter = IEnumConverterFactory.get_converter::<Status>();
        assert_eq!(converter.convert("1").unwrap(), Some(Status::Locked));
        assert_eq!(converter.convert(" 0 ").unwrap(), Some(Status::Normal));
        assert_eq!(converter.convert("").unwrap(), None);
        assert_eq!(converter.convert("   ").unwrap(), None);
        assert!(matches!(converter.convert("7"), Err(CrownError::Conversion(_))));
        assert_eq!(IEnumConverterFactory.get_converter::<Gender>().convert("M").unwrap(), Some(Gender::Male));
    }

    #[test]
    fn test_registry() {
        let mut registry = FormatterRegistry::new();
        assert!(registry.convert_enum::<Status>("1").is_err());
        registry.add_converter_factory(IEnumConverterFactory);
        assert_eq!(registry.names(), vec!["IEnumConverterFactory"]);
        assert_eq!(registry.convert_enum::<Status>("1").unwrap(), Some(Status::Locked));
    }

    #[test]
    fn test_serde_helpers() {
        let q: Query = serde_json::from_str(r#"{"status":1,"gender":"M"}"#).unwrap();
        assert_eq!(q.status, Status::Locked);
        assert_eq!(q.gender, Some(Gender::Male));
        let q: Query = serde_json::from_str(r#"{"status":"0","gender":""}"#).unwrap();
        assert_eq!(q.status, Status::Normal);
        assert_eq!(q.gender, None);
        let q: Query = serde_json::from_str(r#"{"status":"0"}"#).unwrap();
        assert_eq!(q.gender, None);
        assert!(serde_json::from_str::<Query>(r#"{"status":9}"#).is_err());
        assert_eq!(serde_json::to_string(&Query { status: Status::Locked, gender: None }).unwrap(), r#"{"status":1}"#);
    }

    #[test]
    fn test_serde_helpers_ignore_registry() {
        let empty = FormatterRegistry::new();
        assert!(empty.convert_enum::<Status>("1").is_err());
        let q: Query = serde_json::from_str(r#"{"status":"1"}"#).unwrap();
        assert_eq!(q.status, Status::Locked);

        let mut registry = FormatterRegistry::new();
        registry.add_converter_factory(IEnumConverterFactory);
        assert_eq!(registry.convert_enum::<Status>("1").unwrap(), Some(q.status));
    }
}
