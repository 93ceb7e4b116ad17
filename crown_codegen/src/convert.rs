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
//! Column type conversion: raw MySQL column types to target language types.
//!
//! [`MySqlTypeConvert`] is the stock substring chain. [`CrownTypeConvert`]
//! runs an ordered list of [`TypeRule`]s first (first match wins) and falls
//! back to the stock chain for anything the rules do not claim.
//!
use getset::Getters;
use serde::{Deserialize, Serialize, Serializer};
use serde::ser::SerializeStruct;

use crate::config::Language;

/// Target column type handed to the templates
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum DbColumnType {
    Java(JavaColumnType),
    Rust(RustColumnType),
}

impl DbColumnType {
    /// Type name as written in generated source
    pub fn type_name(&self) -> &'static str {
        match self {
            DbColumnType::Java(v) => v.type_name(),
            DbColumnType::Rust(v) => v.type_name(),
        }
    }

    /// Import path, `None` when the type needs no import
    pub fn package(&self) -> Option<&'static str> {
        match self {
            DbColumnType::Java(v) => v.package(),
            DbColumnType::Rust(v) => v.package(),
        }
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, DbColumnType::Java(JavaColumnType::Boolean) | DbColumnType::Rust(RustColumnType::Bool))
    }
}

impl Serialize for DbColumnType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("DbColumnType", 2)?;
        state.serialize_field("type", self.type_name())?;
        state.serialize_field("pkg", &self.package())?;
        state.end()
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum JavaColumnType {
    String,
    Long,
    Integer,
    Boolean,
    Float,
    Double,
    BigDecimal,
    ByteArray,
    Blob,
    Clob,
    LocalDate,
    LocalTime,
    LocalDateTime,
    Year,
    Object,
}

impl JavaColumnType {
    pub fn type_name(&self) -> &'static str {
        use JavaColumnType::*;
        match self {
            String => "String",
            Long => "Long",
            Integer => "Integer",
            Boolean => "Boolean",
            Float => "Float",
            Double => "Double",
            BigDecimal => "BigDecimal",
            ByteArray => "byte[]",
            Blob => "Blob",
            Clob => "Clob",
            LocalDate => "LocalDate",
            LocalTime => "LocalTime",
            LocalDateTime => "LocalDateTime",
            Year => "Year",
            Object => "Object",
        }
    }

    pub fn package(&self) -> Option<&'static str> {
        use JavaColumnType::*;
        match self {
            BigDecimal => Some("java.math.BigDecimal"),
            Blob => Some("java.sql.Blob"),
            Clob => Some("java.sql.Clob"),
            LocalDate => Some("java.time.LocalDate"),
            LocalTime => Some("java.time.LocalTime"),
            LocalDateTime => Some("java.time.LocalDateTime"),
            Year => Some("java.time.Year"),
            _ => None,
        }
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum RustColumnType {
    String,
    I8,
    I32,
    I64,
    F32,
    F64,
    Bool,
    Decimal,
    Bytes,
    Json,
    NaiveDate,
    NaiveTime,
    NaiveDateTime,
}

impl RustColumnType {
    pub fn type_name(&self) -> &'static str {
        use RustColumnType::*;
        match self {
            String => "String",
            I8 => "i8",
            I32 => "i32",
            I64 => "i64",
            F32 => "f32",
            F64 => "f64",
            Bool => "bool",
            Decimal => "BigDecimal",
            Bytes => "Vec<u8>",
            Json => "Value",
            NaiveDate => "NaiveDate",
            NaiveTime => "NaiveTime",
            NaiveDateTime => "NaiveDateTime",
        }
    }

    pub fn package(&self) -> Option<&'static str> {
        use RustColumnType::*;
        match self {
            Decimal => Some("bigdecimal::BigDecimal"),
            Json => Some("serde_json::Value"),
            NaiveDate => Some("chrono::NaiveDate"),
            NaiveTime => Some("chrono::NaiveTime"),
            NaiveDateTime => Some("chrono::NaiveDateTime"),
            _ => None,
        }
    }
}

/// Language independent result of a [`TypeRule`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SemanticType {
    Boolean,
    Date,
    Time,
    DateTime,
}

impl SemanticType {
    pub fn resolve(self, lang: &Language) -> DbColumnType {
        match lang {
            Language::Java => DbColumnType::Java(match self {
                SemanticType::Boolean => JavaColumnType::Boolean,
                SemanticType::Date => JavaColumnType::LocalDate,
                SemanticType::Time => JavaColumnType::LocalTime,
                SemanticType::DateTime => JavaColumnType::LocalDateTime,
            }),
            Language::Rust => DbColumnType::Rust(match self {
                SemanticType::Boolean => RustColumnType::Bool,
                SemanticType::Date => RustColumnType::NaiveDate,
                SemanticType::Time => RustColumnType::NaiveTime,
                SemanticType::DateTime => RustColumnType::NaiveDateTime,
            }),
        }
    }
}

/// `contains` is matched against the lower cased column type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[getset(get = "pub")]
pub struct TypeRule {
    contains: String,
    semantic: SemanticType,
}

impl TypeRule {
    pub fn new(contains: &str, semantic: SemanticType) -> Self {
        Self { contains: contains.to_lowercase(), semantic }
    }
}

/// Crown rule order. `datetime` sits behind `date` and `time`, so a
/// `datetime` column classifies as [`SemanticType::Date`]; reorder the list
/// in the datasource config to change that.
pub fn crown_type_rules() -> Vec<TypeRule> {
    vec![
        TypeRule::new("bit", SemanticType::Boolean),
        TypeRule::new("tinyint", SemanticType::Boolean),
        TypeRule::new("date", SemanticType::Date),
        TypeRule::new("time", SemanticType::Time),
        TypeRule::new("datetime", SemanticType::DateTime),
    ]
}

/// First rule whose substring occurs in `field_type`.
pub fn classify(field_type: &str, rules: &[TypeRule]) -> Option<SemanticType> {
    let t = field_type.to_lowercase();
    rules.iter()
        .find(|rule| t.contains(rule.contains.to_lowercase().as_str()))
        .map(|rule| rule.semantic)
}

/// Column type conversion hook
pub trait ITypeConvert {
    fn process_type_convert(&self, lang: &Language, field_type: &str) -> DbColumnType;
}

/// MYSQL column type conversion
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlTypeConvert;

impl MySqlTypeConvert {
    fn java(t: &str) -> JavaColumnType {
        use JavaColumnType::*;
        if t.contains("char") || t.contains("text") {
            String
        } else if t.contains("bigint") {
            Long
        } else if t.contains("tinyint(1)") {
            Boolean
        } else if t.contains("int") {
            Integer
        } else if t.contains("bit") {
            Boolean
        } else if t.contains("decimal") || t.contains("numeric") {
            BigDecimal
        } else if t.contains("clob") {
            Clob
        } else if t.contains("blob") {
            Blob
        } else if t.contains("binary") {
            ByteArray
        } else if t.contains("float") {
            Float
        } else if t.contains("double") {
            Double
        } else if t.contains("json") || t.contains("enum") {
            String
        } else if t.contains("datetime") || t.contains("timestamp") {
            LocalDateTime
        } else if t.contains("date") {
            LocalDate
        } else if t.contains("time") {
            LocalTime
        } else if t.contains("year") {
            Year
        } else {
            String
        }
    }

    fn rust(t: &str) -> RustColumnType {
        use RustColumnType::*;
        if t.contains("char") || t.contains("text") {
            String
        } else if t.contains("bigint") {
            I64
        } else if t.contains("tinyint(1)") || t.contains("bit") {
            Bool
        } else if t.contains("tinyint") {
            I8
        } else if t.contains("int") {
            I32
        } else if t.contains("decimal") || t.contains("numeric") {
            Decimal
        } else if t.contains("blob") || t.contains("binary") || t.contains("clob") {
            Bytes
        } else if t.contains("float") {
            F32
        } else if t.contains("double") {
            F64
        } else if t.contains("json") {
            Json
        } else if t.contains("datetime") || t.contains("timestamp") {
            NaiveDateTime
        } else if t.contains("date") {
            NaiveDate
        } else if t.contains("time") {
            NaiveTime
        } else {
            String
        }
    }
}

impl ITypeConvert for MySqlTypeConvert {
    fn process_type_convert(&self, lang: &Language, field_type: &str) -> DbColumnType {
        let t = field_type.to_lowercase();
        match lang {
            Language::Java => DbColumnType::Java(Self::java(&t)),
            Language::Rust => DbColumnType::Rust(Self::rust(&t)),
        }
    }
}

/// Ordered rules first, [`MySqlTypeConvert`] for the rest.
#[derive(Debug, Clone)]
pub struct CrownTypeConvert {
    rules: Vec<TypeRule>,
    fallback: MySqlTypeConvert,
}

impl CrownTypeConvert {
    pub fn new(rules: Vec<TypeRule>) -> Self {
        Self { rules, fallback: MySqlTypeConvert }
    }

    pub fn rules(&self) -> &[TypeRule] {
        &self.rules
    }
}

impl Default for CrownTypeConvert {
    fn default() -> Self {
        Self::new(crown_type_rules())
    }
}

impl ITypeConvert for CrownTypeConvert {
    fn process_type_convert(&self, lang: &Language, field_type: &str) -> DbColumnType {
        match classify(field_type, &self.rules) {
            Some(semantic) => semantic.resolve(lang),
            None => self.fallback.process_type_convert(lang, field_type),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn java(field_type: &str) -> DbColumnType {
        CrownTypeConvert::default().process_type_convert(&Language::Java, field_type)
    }

    #[test]
    fn test_boolean_rules() {
        assert_eq!(java("bit(1)"), DbColumnType::Java(JavaColumnType::Boolean));
        assert_eq!(java("BIT"), DbColumnType::Java(JavaColumnType::Boolean));
        assert_eq!(java("tinyint(4)"), DbColumnType::Java(JavaColumnType::Boolean));
        assert_eq!(java("TINYINT UNSIGNED"), DbColumnType::Java(JavaColumnType::Boolean));
    }

    #[test]
    fn test_datetime_is_shadowed_by_date() {
        assert_eq!(classify("datetime", &crown_type_rules()), Some(SemanticType::Date));
        assert_eq!(java("datetime"), DbColumnType::Java(JavaColumnType::LocalDate));
        assert_eq!(java("DATETIME(3)"), DbColumnType::Java(JavaColumnType::LocalDate));
    }

    #[test]
    fn test_time_rule() {
        assert_eq!(java("time"), DbColumnType::Java(JavaColumnType::LocalTime));
        assert_eq!(java("timestamp"), DbColumnType::Java(JavaColumnType::LocalTime));
        assert_eq!(java("date"), DbColumnType::Java(JavaColumnType::LocalDate));
    }

    #[test]
    fn test_unmatched_falls_back() {
        for t in ["varchar(64)", "bigint(20)", "int(11)", "decimal(10,2)", "json", "longblob"] {
            assert_eq!(classify(t, &crown_type_rules()), None);
            assert_eq!(java(t), MySqlTypeConvert.process_type_convert(&Language::Java, t));
        }
        assert_eq!(java("bigint(20)"), DbColumnType::Java(JavaColumnType::Long));
        assert_eq!(java("varchar(64)"), DbColumnType::Java(JavaColumnType::String));
    }

    #[test]
    fn test_reordered_rules_reach_datetime() {
        let convert = CrownTypeConvert::new(vec![
            TypeRule::new("datetime", SemanticType::DateTime),
            TypeRule::new("date", SemanticType::Date),
        ]);
        assert_eq!(convert.process_type_convert(&Language::Rust, "datetime"), DbColumnType::Rust(RustColumnType::NaiveDateTime));
        assert_eq!(convert.process_type_convert(&Language::Rust, "date"), DbColumnType::Rust(RustColumnType::NaiveDate));
    }

    #[test]
    fn test_serialize_for_templates() {
        let value = serde_json::to_value(DbColumnType::Java(JavaColumnType::LocalDate)).unwrap();
        assert_eq!(value, serde_json::json!({"type": "LocalDate", "pkg": "java.time.LocalDate"}));
        let value = serde_json::to_value(DbColumnType::Rust(RustColumnType::Bool)).unwrap();
        assert_eq!(value, serde_json::json!({"type": "bool", "pkg": null}));
    }
}
