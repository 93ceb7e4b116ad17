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
//! JSON message conversion with the crown formats: `chrono` naive dates,
//! times and date-times as fixed pattern strings, 64-bit integers as
//! decimal strings.
//!
//! The formats are applied by [`CrownSerializer`], a serializer wrapper, so
//! any `Serialize` value is rendered without an intermediate tree.
//!
use std::fmt::{self, Display, Write};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use chrono::format::{Item, StrftimeItems};
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::HeaderValue;
use serde::ser::{SerializeMap, SerializeSeq, SerializeStruct, SerializeStructVariant, SerializeTuple, SerializeTupleStruct, SerializeTupleVariant, Serializer};
use serde::{Deserialize, Serialize};

use crate::errors::{CrownError, Result};

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M:%S";
pub const DEFAULT_DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonFormats {
    /// `chrono` strftime pattern for `NaiveDate`
    pub date_format: String,
    pub time_format: String,
    pub date_time_format: String,
    /// `i64` and `i128` as strings. Unsigned ints (`usize` counts included) stay numbers.
    pub longs_as_strings: bool,
}

impl Default for JsonFormats {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            date_time_format: DEFAULT_DATE_TIME_FORMAT.to_string(),
            longs_as_strings: true,
        }
    }
}

impl JsonFormats {
    /// Reject patterns `chrono` cannot format
    pub fn validate(&self) -> Result<()> {
        for pattern in [&self.date_format, &self.time_format, &self.date_time_format] {
            if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
                return Err(CrownError::Config(format!("invalid date/time pattern '{}'", pattern)));
            }
        }
        Ok(())
    }

    /// Re-format the ISO text `chrono` writes for its naive types. Anything else is `None`.
    pub fn reformat(&self, text: &str) -> Option<String> {
        if let Ok(v) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
            return Self::render(v.format(&self.date_time_format));
        }
        if let Ok(v) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
            return Self::render(v.format(&self.date_format));
        }
        if let Ok(v) = NaiveTime::parse_from_str(text, "%H:%M:%S%.f") {
            return Self::render(v.format(&self.time_format));
        }
        None
    }

    fn render(value: impl Display) -> Option<String> {
        let mut out = String::new();
        write!(out, "{}", value).ok().map(|_| out)
    }
}

/// Serializer wrapper applying [`JsonFormats`] to every nested value
pub struct CrownSerializer<'f, S> {
    inner: S,
    formats: &'f JsonFormats,
}

impl<'f, S> CrownSerializer<'f, S> {
    pub fn new(inner: S, formats: &'f JsonFormats) -> Self {
        Self { inner, formats }
    }
}

struct Formatted<'a, 'f, T: ?Sized> {
    value: &'a T,
    formats: &'f JsonFormats,
}

impl<T: ?Sized + Serialize> Serialize for Formatted<'_, '_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.value.serialize(CrownSerializer::new(serializer, self.formats))
    }
}

pub struct Compound<'f, C> {
    inner: C,
    formats: &'f JsonFormats,
}

impl<'f, S: Serializer> Serializer for CrownSerializer<'f, S> {
    type Ok = S::Ok;
    type Error = S::Error;
    type SerializeSeq = Compound<'f, S::SerializeSeq>;
    type SerializeTuple = Compound<'f, S::SerializeTuple>;
    type SerializeTupleStruct = Compound<'f, S::SerializeTupleStruct>;
    type SerializeTupleVariant = Compound<'f, S::SerializeTupleVariant>;
    type SerializeMap = Compound<'f, S::SerializeMap>;
    type SerializeStruct = Compound<'f, S::SerializeStruct>;
    type SerializeStructVariant = Compound<'f, S::SerializeStructVariant>;

    fn serialize_bool(self, v: bool) -> std::result::Result<S::Ok, S::Error> {
        self.inner.serialize_bool(v)
    }

    fn serialize_i8(self, v: i8) -> std::result::Result<S::Ok, S::Error> {
        self.inner.serialize_i8(v)
    }

    fn serialize_i16(self, v: i16) -> std::result::Result<S::Ok, S::Error> {
        self.inner.serialize_i16(v)
    }

    fn serialize_i32(self, v: i32) -> std::result::Result<S::Ok, S::Error> {
        self.inner.serialize_i32(v)
    }

    fn serialize_i64(self, v: i64) -> std::result::Result<S::Ok, S::Error> {
        if self.formats.longs_as_strings {
            return self.inner.collect_str(&v);
        }
        self.inner.serialize_i64(v)
    }

    fn serialize_i128(self, v: i128) -> std::result::Result<S::Ok, S::Error> {
        if self.formats.longs_as_strings {
            return self.inner.collect_str(&v);
        }
        self.inner.serialize_i128(v)
    }

    fn serialize_u8(self, v: u8) -> std::result::Result<S::Ok, S::Error> {
        self.inner.serialize_u8(v)
    }

    fn serialize_u16(self, v: u16) -> std::result::Result<S::Ok, S::Error> {
        self.inner.serialize_u16(v)
    }

    fn serialize_u32(self, v: u32) -> std::result::Result<S::Ok, S::Error> {
        self.inner.serialize_u32(v)
    }

    fn serialize_u64(self, v: u64) -> std::result::Result<S::Ok, S::Error> {
        self.inner.serialize_u64(v)
    }

    fn serialize_u128(self, v: u128) -> std::result::Result<S::Ok, S::Error> {
        self.inner.serialize_u128(v)
    }

    fn serialize_f32(self, v: f32) -> std::result::Result<S::Ok, S::Error> {
        self.inner.serialize_f32(v)
    }

    fn serialize_f64(self, v: f64) -> std::result::Result<S::Ok, S::Error> {
        self.inner.serialize_f64(v)
    }

    fn serialize_char(self, v: char) -> std::result::Result<S::Ok, S::Error> {
        self.inner.serialize_char(v)
    }

    fn serialize_str(self, v: &str) -> std::result::Result<S::Ok, S::Error> {
        self.inner.serialize_str(v)
    }

    fn serialize_bytes(self, v: &[u8]) -> std::result::Result<S::Ok, S::Error> {
        self.inner.serialize_bytes(v)
    }

    fn serialize_none(self) -> std::result::Result<S::Ok, S::Error> {
        self.inner.serialize_none()
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> std::result::Result<S::Ok, S::Error> {
        self.inner.serialize_some(&Formatted { value, formats: self.formats })
    }

    fn serialize_unit(self) -> std::result::Result<S::Ok, S::Error> {
        self.inner.serialize_unit()
    }

    fn serialize_unit_struct(self, name: &'static str) -> std::result::Result<S::Ok, S::Error> {
        self.inner.serialize_unit_struct(name)
    }

    fn serialize_unit_variant(self, name: &'static str, variant_index: u32, variant: &'static str) -> std::result::Result<S::Ok, S::Error> {
        self.inner.serialize_unit_variant(name, variant_index, variant)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(self, name: &'static str, value: &T) -> std::result::Result<S::Ok, S::Error> {
        self.inner.serialize_newtype_struct(name, &Formatted { value, formats: self.formats })
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(self, name: &'static str, variant_index: u32, variant: &'static str, value: &T) -> std::result::Result<S::Ok, S::Error> {
        self.inner.serialize_newtype_variant(name, variant_index, variant, &Formatted { value, formats: self.formats })
    }

    fn serialize_seq(self, len: Option<usize>) -> std::result::Result<Self::SerializeSeq, S::Error> {
        Ok(Compound { inner: self.inner.serialize_seq(len)?, formats: self.formats })
    }

    fn serialize_tuple(self, len: usize) -> std::result::Result<Self::SerializeTuple, S::Error> {
        Ok(Compound { inner: self.inner.serialize_tuple(len)?, formats: self.formats })
    }

    fn serialize_tuple_struct(self, name: &'static str, len: usize) -> std::result::Result<Self::SerializeTupleStruct, S::Error> {
        Ok(Compound { inner: self.inner.serialize_tuple_struct(name, len)?, formats: self.formats })
    }

    fn serialize_tuple_variant(self, name: &'static str, variant_index: u32, variant: &'static str, len: usize) -> std::result::Result<Self::SerializeTupleVariant, S::Error> {
        Ok(Compound { inner: self.inner.serialize_tuple_variant(name, variant_index, variant, len)?, formats: self.formats })
    }

    fn serialize_map(self, len: Option<usize>) -> std::result::Result<Self::SerializeMap, S::Error> {
        Ok(Compound { inner: self.inner.serialize_map(len)?, formats: self.formats })
    }

    fn serialize_struct(self, name: &'static str, len: usize) -> std::result::Result<Self::SerializeStruct, S::Error> {
        Ok(Compound { inner: self.inner.serialize_struct(name, len)?, formats: self.formats })
    }

    fn serialize_struct_variant(self, name: &'static str, variant_index: u32, variant: &'static str, len: usize) -> std::result::Result<Self::SerializeStructVariant, S::Error> {
        Ok(Compound { inner: self.inner.serialize_struct_variant(name, variant_index, variant, len)?, formats: self.formats })
    }

    // chrono writes its naive types through here
    fn collect_str<T: ?Sized + Display>(self, value: &T) -> std::result::Result<S::Ok, S::Error> {
        let text = value.to_string();
        match self.formats.reformat(&text) {
            Some(formatted) => self.inner.serialize_str(&formatted),
            None => self.inner.serialize_str(&text),
        }
    }

    fn is_human_readable(&self) -> bool {
        self.inner.is_human_readable()
    }
}

impl<C: SerializeSeq> SerializeSeq for Compound<'_, C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> std::result::Result<(), C::Error> {
        self.inner.serialize_element(&Formatted { value, formats: self.formats })
    }

    fn end(self) -> std::result::Result<C::Ok, C::Error> {
        self.inner.end()
    }
}

impl<C: SerializeTuple> SerializeTuple for Compound<'_, C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> std::result::Result<(), C::Error> {
        self.inner.serialize_element(&Formatted { value, formats: self.formats })
    }

    fn end(self) -> std::result::Result<C::Ok, C::Error> {
        self.inner.end()
    }
}

impl<C: SerializeTupleStruct> SerializeTupleStruct for Compound<'_, C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> std::result::Result<(), C::Error> {
        self.inner.serialize_field(&Formatted { value, formats: self.formats })
    }

    fn end(self) -> std::result::Result<C::Ok, C::Error> {
        self.inner.end()
    }
}

impl<C: SerializeTupleVariant> SerializeTupleVariant for Compound<'_, C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> std::result::Result<(), C::Error> {
        self.inner.serialize_field(&Formatted { value, formats: self.formats })
    }

    fn end(self) -> std::result::Result<C::Ok, C::Error> {
        self.inner.end()
    }
}

impl<C: SerializeMap> SerializeMap for Compound<'_, C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> std::result::Result<(), C::Error> {
        self.inner.serialize_key(&Formatted { value: key, formats: self.formats })
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> std::result::Result<(), C::Error> {
        self.inner.serialize_value(&Formatted { value, formats: self.formats })
    }

    fn end(self) -> std::result::Result<C::Ok, C::Error> {
        self.inner.end()
    }
}

impl<C: SerializeStruct> SerializeStruct for Compound<'_, C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> std::result::Result<(), C::Error> {
        self.inner.serialize_field(key, &Formatted { value, formats: self.formats })
    }

    fn skip_field(&mut self, key: &'static str) -> std::result::Result<(), C::Error> {
        self.inner.skip_field(key)
    }

    fn end(self) -> std::result::Result<C::Ok, C::Error> {
        self.inner.end()
    }
}

impl<C: SerializeStructVariant> SerializeStructVariant for Compound<'_, C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> std::result::Result<(), C::Error> {
        self.inner.serialize_field(key, &Formatted { value, formats: self.formats })
    }

    fn skip_field(&mut self, key: &'static str) -> std::result::Result<(), C::Error> {
        self.inner.skip_field(key)
    }

    fn end(self) -> std::result::Result<C::Ok, C::Error> {
        self.inner.end()
    }
}

/// JSON writer, `formats` unset means plain `serde_json` output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonMessageConverter {
    formats: Option<JsonFormats>,
}

impl JsonMessageConverter {
    /// Converter with the crown default formats
    pub fn crown() -> Self {
        Self { formats: Some(JsonFormats::default()) }
    }

    pub fn with_formats(mut self, formats: JsonFormats) -> Self {
        self.formats = Some(formats);
        self
    }

    pub fn formats(&self) -> Option<&JsonFormats> {
        self.formats.as_ref()
    }

    pub fn write<T: ?Sized + Serialize>(&self, value: &T) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(128);
        let mut serializer = serde_json::Serializer::new(&mut out);
        match self.formats {
            Some(ref formats) => value.serialize(CrownSerializer::new(&mut serializer, formats)),
            None => value.serialize(&mut serializer),
        }
        .map_err(|e| CrownError::Internal(format!("failed to write JSON: {}", e)))?;
        Ok(out)
    }

    pub fn write_string<T: ?Sized + Serialize>(&self, value: &T) -> Result<String> {
        let bytes = self.write(value)?;
        String::from_utf8(bytes).map_err(|e| CrownError::Internal(e.to_string()))
    }
}

/// HTTP message converters, in lookup order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageConverter {
    ByteArray,
    String,
    Json(JsonMessageConverter),
}

impl MessageConverter {
    pub fn media_type(&self) -> &'static str {
        match self {
            MessageConverter::ByteArray => "application/octet-stream",
            MessageConverter::String => "text/plain;charset=UTF-8",
            MessageConverter::Json(_) => "application/json",
        }
    }
}

pub fn default_converters() -> Vec<MessageConverter> {
    vec![
        MessageConverter::ByteArray,
        MessageConverter::String,
        MessageConverter::Json(JsonMessageConverter::default()),
    ]
}

/// New list where every JSON converter carries `formats`; others are kept as they are
pub fn customize(base: &[MessageConverter], formats: &JsonFormats) -> Vec<MessageConverter> {
    base.iter()
        .map(|converter| match converter {
            MessageConverter::Json(json) => MessageConverter::Json(json.clone().with_formats(formats.clone())),
            other => other.clone(),
        })
        .collect()
}

type Render = dyn Fn(&JsonMessageConverter) -> Result<Vec<u8>> + Send + Sync;

/// Pending JSON body, re-rendered by the message writer
#[derive(Clone)]
pub struct JsonBody(Arc<Render>);

/// JSON response body. Rendered with the crown formats, then with the
/// configured converter once the message writer runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<T> IntoResponse for Json<T>
where
    T: Serialize + Send + Sync + 'static,
{
    fn into_response(self) -> Response {
        let value = Arc::new(self.0);
        let render: Arc<Render> = Arc::new(move |converter: &JsonMessageConverter| converter.write(&*value));
        match render(&JsonMessageConverter::crown()) {
            Ok(bytes) => {
                let mut response = (
                    [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
                    bytes,
                ).into_response();
                response.extensions_mut().insert(JsonBody(render));
                response
            }
            Err(err) => err.into_response(),
        }
    }
}

/// Writes [`Json`] bodies with the configured converter
#[derive(Debug, Clone)]
pub struct MessageWriter {
    converter: JsonMessageConverter,
    rerender: bool,
}

impl MessageWriter {
    /// First JSON converter of the list, plain JSON when there is none
    pub fn from_converters(converters: &[MessageConverter]) -> Self {
        let converter = converters.iter()
            .find_map(|c| match c {
                MessageConverter::Json(json) => Some(json.clone()),
                _ => None,
            })
            .unwrap_or_default();
        let rerender = converter != JsonMessageConverter::crown();
        Self { converter, rerender }
    }

    pub fn converter(&self) -> &JsonMessageConverter {
        &self.converter
    }
}

pub async fn write_messages(State(writer): State<Arc<MessageWriter>>, request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let body = match response.extensions_mut().remove::<JsonBody>() {
        Some(body) => body,
        None => return response,
    };
    if !writer.rerender {
        return response;
    }
    match (body.0)(&writer.converter) {
        Ok(bytes) => {
            response.headers_mut().remove(CONTENT_LENGTH);
            *response.body_mut() = Body::from(bytes);
            response
        }
        Err(err) => err.into_response(),
    }
}

impl fmt::Debug for JsonBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JsonBody")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct Order {
        id: i64,
        count: i32,
        amount: f64,
        created: NaiveDateTime,
        day: NaiveDate,
        alarm: NaiveTime,
        tags: Vec<u64>,
        paid_at: Option<NaiveDateTime>,
        remark: String,
    }

    fn order() -> Order {
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let alarm = NaiveTime::from_hms_opt(3, 4, 5).unwrap();
        Order {
            id: 9007199254740993,
            count: 5,
            amount: 1.5,
            created: day.and_time(alarm),
            day,
            alarm,
            tags: vec![1, 2],
            paid_at: None,
            remark: "2024-01-02T03:04:05".to_string(),
        }
    }

    #[test]
    fn test_crown_formats() {
        let json = JsonMessageConverter::crown().write_string(&order()).unwrap();
        assert_eq!(
            json,
            r#"{"id":"9007199254740993","count":5,"amount":1.5,"created":"2024-01-02 03:04:05","day":"2024-01-02","alarm":"03:04:05","tags":[1,2],"paid_at":null,"remark":"2024-01-02T03:04:05"}"#
        );
    }

    #[test]
    fn test_long_max_is_a_string() {
        let converter = JsonMessageConverter::crown();
        assert_eq!(converter.write_string(&i64::MAX).unwrap(), r#""9223372036854775807""#);
        assert_eq!(converter.write_string(&Some(i64::MIN)).unwrap(), r#""-9223372036854775808""#);
        assert_eq!(converter.write_string(&3usize).unwrap(), "3");
        assert_eq!(converter.write_string(&u64::MAX).unwrap(), "18446744073709551615");
    }

    #[test]
    fn test_plain_converter() {
        let json = JsonMessageConverter::default().write_string(&order()).unwrap();
        assert!(json.starts_with(r#"{"id":9007199254740993,"count":5"#));
        assert!(json.contains(r#""created":"2024-01-02T03:04:05""#));
    }

    #[test]
    fn test_nested_and_map_keys() {
        let mut map = BTreeMap::new();
        map.insert(7i64, Some(NaiveTime::from_hms_milli_opt(1, 2, 3, 400).unwrap()));
        let json = JsonMessageConverter::crown().write_string(&map).unwrap();
        assert_eq!(json, r#"{"7":"01:02:03"}"#);
    }

    #[test]
    fn test_custom_formats() {
        let formats = JsonFormats { date_format: "%d/%m/%Y".to_string(), longs_as_strings: false, ..Default::default() };
        let json = JsonMessageConverter::default().with_formats(formats).write_string(&order()).unwrap();
        assert!(json.contains(r#""day":"02/01/2024""#));
        assert!(json.contains(r#""id":9007199254740993"#));
    }

    #[test]
    fn test_validate_formats() {
        assert!(JsonFormats::default().validate().is_ok());
        let bad = JsonFormats { date_format: "%Q".to_string(), ..Default::default() };
        assert!(matches!(bad.validate(), Err(CrownError::Config(_))));
    }

    #[test]
    fn test_customize_is_pure() {
        let base = default_converters();
        let customized = customize(&base, &JsonFormats::default());
        assert_eq!(base, default_converters());
        assert_eq!(customized.len(), 3);
        assert_eq!(customized[0], MessageConverter::ByteArray);
        assert_eq!(customized[1], MessageConverter::String);
        assert_eq!(customized[2], MessageConverter::Json(JsonMessageConverter::crown()));
        assert!(!MessageWriter::from_converters(&customized).rerender);
        assert!(MessageWriter::from_converters(&base).rerender);
    }
}
