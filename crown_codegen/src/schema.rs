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
//! Schema sources. The generator only ever asks for the table list and the
//! columns of one table at a time.
//!
use mysql::{Conn, Opts, OptsBuilder, Row, prelude::Queryable};
use url::Url;

use crate::config::DataSourceConfig;
use crate::datasource::{IDbQuery, MySqlQuery};
use crate::error::{GeneratorError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableMeta {
    pub name: String,
    pub comment: String,
    pub is_view: bool,
}

impl TableMeta {
    pub fn new(name: &str, comment: &str) -> Self {
        Self { name: name.to_string(), comment: comment.to_string(), is_view: false }
    }

    pub fn view(name: &str) -> Self {
        Self { name: name.to_string(), comment: "VIEW".to_string(), is_view: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnMeta {
    pub name: String,
    /// Raw column type, e.g. `tinyint(1)`
    pub column_type: String,
    pub comment: String,
    /// `PRI` for primary key columns
    pub key: String,
    /// `auto_increment` for identity columns
    pub extra: String,
}

impl ColumnMeta {
    pub fn new(name: &str, column_type: &str) -> Self {
        Self { name: name.to_string(), column_type: column_type.to_string(), ..Default::default() }
    }

    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = comment.to_string();
        self
    }

    pub fn primary(mut self, identity: bool) -> Self {
        self.key = "PRI".to_string();
        if identity {
            self.extra = "auto_increment".to_string();
        }
        self
    }

    pub fn is_primary(&self) -> bool {
        self.key.eq_ignore_ascii_case("PRI")
    }
}

pub trait SchemaReader {
    fn tables(&mut self) -> Result<Vec<TableMeta>>;

    fn columns(&mut self, table: &str) -> Result<Vec<ColumnMeta>>;
}

/// Live MySQL schema, one blocking connection.
pub struct MySqlSchemaReader {
    conn: Conn,
    query: MySqlQuery,
}

impl MySqlSchemaReader {
    pub fn connect(datasource: &DataSourceConfig) -> Result<Self> {
        let url = normalize_url(datasource.url())?;
        let opts = Opts::from_url(&url)?;
        let mut builder = OptsBuilder::from_opts(opts);
        if !datasource.username().is_empty() {
            builder = builder.user(Some(datasource.username().to_string()));
        }
        if !datasource.password().is_empty() {
            builder = builder.pass(Some(datasource.password().to_string()));
        }
        tracing::debug!("connecting to {} with driver '{}'", url, datasource.driver_name());
        let conn = Conn::new(builder)?;
        Ok(Self { conn, query: datasource.db_query() })
    }

    fn string_column(row: &Row, name: &str) -> Result<String> {
        match row.get_opt::<Option<String>, _>(name) {
            Some(Ok(v)) => Ok(v.unwrap_or_default()),
            Some(Err(e)) => Err(GeneratorError::Database(format!("column '{}': {}", name, e))),
            None => Ok(String::new()),
        }
    }
}

impl SchemaReader for MySqlSchemaReader {
    fn tables(&mut self) -> Result<Vec<TableMeta>> {
        let rows: Vec<Row> = self.conn.query(self.query.tables_sql())?;
        let mut tables = Vec::with_capacity(rows.len());
        for row in rows.iter() {
            let name = Self::string_column(row, &self.query.table_name())?;
            let comment = Self::string_column(row, &self.query.table_comment())?;
            let is_view = comment.eq_ignore_ascii_case("view");
            tables.push(TableMeta { name, comment, is_view });
        }
        Ok(tables)
    }

    fn columns(&mut self, table: &str) -> Result<Vec<ColumnMeta>> {
        let sql = self.query.table_fields_sql().replace("%s", table);
        let rows: Vec<Row> = self.conn.query(sql)?;
        let mut columns = Vec::with_capacity(rows.len());
        for row in rows.iter() {
            columns.push(ColumnMeta {
                name: Self::string_column(row, &self.query.field_name())?,
                column_type: Self::string_column(row, &self.query.field_type())?,
                comment: Self::string_column(row, &self.query.field_comment())?,
                key: Self::string_column(row, &self.query.field_key())?,
                extra: Self::string_column(row, &self.query.field_extra())?,
            });
        }
        Ok(columns)
    }
}

/// `jdbc:mysql://host:3306/db?characterEncoding=utf8` -> `mysql://host:3306/db`
pub fn normalize_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(GeneratorError::Config("datasource url is empty".to_string()));
    }
    let stripped = trimmed.strip_prefix("jdbc:").unwrap_or(trimmed);
    let mut url = Url::parse(stripped)?;
    if url.scheme() != "mysql" {
        return Err(GeneratorError::Config(format!("unsupported datasource scheme '{}'", url.scheme())));
    }
    url.set_query(None);
    Ok(url.to_string())
}

/// Fixed schema held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySchemaReader {
    tables: Vec<(TableMeta, Vec<ColumnMeta>)>,
}

impl MemorySchemaReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: TableMeta, columns: Vec<ColumnMeta>) -> Self {
        self.tables.push((table, columns));
        self
    }
}

impl SchemaReader for MemorySchemaReader {
    fn tables(&mut self) -> Result<Vec<TableMeta>> {
        Ok(self.tables.iter().map(|(t, _)| t.clone()).collect())
    }

    fn columns(&mut self, table: &str) -> Result<Vec<ColumnMeta>> {
        self.tables.iter()
            .find(|(t, _)| t.name == table)
            .map(|(_, c)| c.clone())
            .ok_or_else(|| GeneratorError::Database(format!("Table '{}' doesn't exist", table)))
    }
}
