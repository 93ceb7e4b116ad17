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
use std::collections::BTreeSet;
use getset::{Getters, MutGetters, Setters};
use serde::{Deserialize, Serialize};
use crate::config::{NamingStrategy, StrategyConfig};
use crate::convert::{DbColumnType, JavaColumnType};
use crate::util::{contains_upper_case, remove_is_prefix_if_boolean};

/// Schema introspection statements and result column names
pub trait IDbQuery {
    fn db_type(&self) -> DbType {
        DbType::Mysql
    }

    /// Table status query
    fn tables_sql(&self) -> String;

    /// Column query, `%s` is the table name
    fn table_fields_sql(&self) -> String;

    fn table_name(&self) -> String;

    fn table_comment(&self) -> String;

    fn field_name(&self) -> String;

    fn field_type(&self) -> String;

    fn field_comment(&self) -> String;

    fn field_key(&self) -> String;

    fn field_extra(&self) -> String;

    /// Whether a primary key is auto generated, only checked for mysql
    fn is_key_identity(&self, extra: &str) -> bool;
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default)]
pub struct MySqlQuery;

impl IDbQuery for MySqlQuery {
    fn tables_sql(&self) -> String {
        "show table status WHERE 1=1 ".to_string()
    }

    fn table_fields_sql(&self) -> String {
        "show full fields from `%s`".to_string()
    }

    fn table_name(&self) -> String {
        "Name".to_string()
    }

    fn table_comment(&self) -> String {
        "Comment".to_string()
    }

    fn field_name(&self) -> String {
        "Field".to_string()
    }

    fn field_type(&self) -> String {
        "Type".to_string()
    }

    fn field_comment(&self) -> String {
        "Comment".to_string()
    }

    fn field_key(&self) -> String {
        "Key".to_string()
    }

    fn field_extra(&self) -> String {
        "Extra".to_string()
    }

    fn is_key_identity(&self, extra: &str) -> bool {
        extra.eq("auto_increment")
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum DbType {
    #[default]
    Mysql,
    Mariadb,
}

/// One table as seen by the templates
#[derive(Clone, Serialize, PartialEq, Debug, Getters, Setters, MutGetters)]
#[getset(get_mut = "pub", get = "pub", set = "pub")]
#[serde(rename_all = "camelCase")]
pub struct TableInfo {
    /// Entity needs an explicit table name annotation
    convert: bool,
    name: String,
    comment: String,
    entity_name: String,
    mapper_name: String,
    xml_name: String,
    service_name: String,
    service_impl_name: String,
    controller_name: String,
    /// Entity name with a lower case first letter, used in controller mappings
    entity_path: String,
    fields: Vec<TableField>,
    /// Fields inherited from the super entity
    common_fields: Vec<TableField>,
    /// Comma separated column names of `fields` then `common_fields`
    field_names: String,
    import_packages: BTreeSet<String>,
}

impl TableInfo {
    pub fn new(name: &str, comment: &str) -> Self {
        Self {
            name: name.to_string(),
            comment: comment.to_string(),
            ..Default::default()
        }
    }

    pub fn set_entity_path_info(&mut self) {
        let mut chars = self.entity_name.chars();
        self.entity_path = match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect(),
            None => String::new(),
        };
    }

    pub fn add_import(&mut self, pkg: &str) {
        if !pkg.is_empty() {
            self.import_packages.insert(pkg.to_string());
        }
    }

    pub fn has_key(&self) -> bool {
        self.fields.iter().any(|f| f.key_flag)
    }

    pub fn set_field_names_info(&mut self) {
        self.field_names = self.fields.iter()
            .chain(self.common_fields.iter())
            .map(|f| f.column_name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
    }
}

impl Default for TableInfo {
    fn default() -> Self {
        Self {
            convert: false,
            name: "".to_string(),
            comment: "".to_string(),
            entity_name: "".to_string(),
            mapper_name: "".to_string(),
            xml_name: "".to_string(),
            service_name: "".to_string(),
            service_impl_name: "".to_string(),
            controller_name: "".to_string(),
            entity_path: "".to_string(),
            fields: vec![],
            common_fields: vec![],
            field_names: "".to_string(),
            import_packages: BTreeSet::new(),
        }
    }
}

#[derive(Clone, Serialize, PartialEq, Debug, Getters, Setters, MutGetters)]
#[getset(get_mut = "pub", get = "pub", set = "pub")]
#[serde(rename_all = "camelCase")]
pub struct TableField {
    /// Property needs an explicit column annotation
    convert: bool,
    key_flag: bool,
    /// Primary key is auto increment
    key_identity_flag: bool,
    name: String,
    #[serde(rename = "type")]
    field_type: String,
    capital_name: String,
    property_name: String,
    column_type: DbColumnType,
    comment: String,
    /// Fill name such as `INSERT_UPDATE`
    fill: Option<String>,
    key_words: bool,
    /// Column name, escaped when it is a keyword
    column_name: String,
}

impl TableField {
    pub fn new(name: &str, field_type: &str) -> Self {
        Self {
            name: name.to_string(),
            field_type: field_type.to_string(),
            column_name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn set_property_name_with_strategy(&mut self, strategy_config: &StrategyConfig, property_name: String) {
        self.property_name = property_name;
        self.set_converter(strategy_config);
    }

    pub fn set_converter(&mut self, strategy_config: &StrategyConfig) {
        if *strategy_config.entity_table_field_annotation_enable() || self.key_words {
            self.convert = true;
        }
        if strategy_config.is_capital_mode_naming(&self.name) {
            self.convert = false;
        } else if NamingStrategy::UnderlineToCamel == strategy_config.column_naming_strategy() {
            if contains_upper_case(&self.name) {
                self.convert = true;
            }
        } else if !self.name.eq(&self.property_name) {
            self.convert = true;
        }
    }

    /// Accessor stem: `userName` -> `UserName`, `isDeleted` (boolean) -> `Deleted`,
    /// `xPos` stays `xPos`
    pub fn inner_capital_name(&self) -> String {
        if self.property_name.chars().count() <= 1 {
            return self.property_name.to_uppercase();
        }
        let mut set_get_name = self.property_name.to_string();
        if self.column_type.is_boolean() {
            set_get_name = remove_is_prefix_if_boolean(&set_get_name);
        }
        let mut chars = set_get_name.chars();
        let first = match chars.next() {
            Some(c) => c,
            None => return set_get_name,
        };
        let second_upper = chars.clone().next().map(char::is_uppercase).unwrap_or(false);
        if first.is_lowercase() && second_upper {
            return set_get_name;
        }
        first.to_uppercase().chain(chars).collect()
    }

    pub fn set_capital_name_info(&mut self) {
        self.capital_name = self.inner_capital_name();
    }
}

impl Default for TableField {
    fn default() -> Self {
        Self {
            convert: false,
            key_flag: false,
            key_identity_flag: false,
            name: "".to_string(),
            field_type: "".to_string(),
            property_name: "".to_string(),
            capital_name: "".to_string(),
            column_type: DbColumnType::Java(JavaColumnType::String),
            comment: "".to_string(),
            fill: None,
            key_words: false,
            column_name: "".to_string(),
        }
    }
}

/// MySQL reserved words that need escaping as column names
pub struct MySqlKeyWordsHandler;

impl MySqlKeyWordsHandler {
    pub const KEY_WORDS: &'static [&'static str] = &[
        "ACCESSIBLE", "ADD", "ALL", "ALTER", "ANALYZE", "AND", "AS", "ASC",
        "BEFORE", "BETWEEN", "BIGINT", "BINARY", "BLOB", "BOTH", "BY",
        "CALL", "CASCADE", "CASE", "CHANGE", "CHAR", "CHARACTER", "CHECK", "COLLATE",
        "COLUMN", "CONDITION", "CONSTRAINT", "CONTINUE", "CONVERT", "CREATE", "CROSS",
        "CURRENT_DATE", "CURRENT_TIME", "CURRENT_TIMESTAMP", "CURRENT_USER", "CURSOR",
        "DATABASE", "DATABASES", "DAY_HOUR", "DEC", "DECIMAL", "DECLARE", "DEFAULT",
        "DELAYED", "DELETE", "DESC", "DESCRIBE", "DETERMINISTIC", "DISTINCT", "DIV",
        "DOUBLE", "DROP", "DUAL", "EACH", "ELSE", "ELSEIF", "ENCLOSED", "ESCAPED",
        "EXISTS", "EXIT", "EXPLAIN", "FALSE", "FETCH", "FLOAT", "FOR", "FORCE",
        "FOREIGN", "FROM", "FULLTEXT", "GENERATED", "GET", "GRANT", "GROUP", "GROUPS",
        "HAVING", "HIGH_PRIORITY", "IF", "IGNORE", "IN", "INDEX", "INFILE", "INNER",
        "INOUT", "INSERT", "INT", "INTEGER", "INTERVAL", "INTO", "IS", "ITERATE",
        "JOIN", "KEY", "KEYS", "KILL", "LEADING", "LEAVE", "LEFT", "LIKE", "LIMIT",
        "LINES", "LOAD", "LOCALTIME", "LOCALTIMESTAMP", "LOCK", "LONG", "LOOP",
        "MATCH", "MAXVALUE", "MOD", "MODIFIES", "NATURAL", "NOT", "NULL", "NUMERIC",
        "ON", "OPTIMIZE", "OPTION", "OR", "ORDER", "OUT", "OUTER", "OUTFILE", "OVER",
        "PARTITION", "PRECISION", "PRIMARY", "PROCEDURE", "PURGE", "RANGE", "RANK",
        "READ", "READS", "REAL", "REFERENCES", "REGEXP", "RELEASE", "RENAME", "REPEAT",
        "REPLACE", "REQUIRE", "RESTRICT", "RETURN", "REVOKE", "RIGHT", "RLIKE", "ROW",
        "ROWS", "SCHEMA", "SCHEMAS", "SELECT", "SEPARATOR", "SET", "SHOW", "SIGNAL",
        "SMALLINT", "SPATIAL", "SQL", "STARTING", "STATUS", "STORED", "TABLE",
        "TERMINATED", "THEN", "TINYINT", "TO", "TRAILING", "TRIGGER", "TRUE", "UNDO",
        "UNION", "UNIQUE", "UNLOCK", "UNSIGNED", "UPDATE", "USAGE", "USE", "USING",
        "VALUES", "VARCHAR", "VARYING", "VIRTUAL", "WHEN", "WHERE", "WHILE", "WINDOW",
        "WITH", "WRITE", "XOR", "YEAR_MONTH", "ZEROFILL",
    ];

    pub fn is_key_words(column_name: &str) -> bool {
        Self::KEY_WORDS.contains(&column_name.to_uppercase().as_str())
    }

    pub fn format_column(column_name: &str) -> String {
        format!("`{}`", column_name)
    }
}
