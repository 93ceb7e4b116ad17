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
//! Generator errors.
//!
use std::fmt;

#[derive(Debug)]
pub enum GeneratorError {
    /// Invalid or missing configuration value
    Config(String),
    /// Connection or schema introspection failure
    Database(String),
    /// Template loading or rendering failure
    Template(String),
    /// File system failure, with the path involved
    Io(String, std::io::Error),
    Yaml(String),
}

impl fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            GeneratorError::Config(ref err) => write!(f, "Config error: {}", err),
            GeneratorError::Database(ref err) => write!(f, "Database error: {}", err),
            GeneratorError::Template(ref err) => write!(f, "Template error: {}", err),
            GeneratorError::Io(ref path, ref err) => write!(f, "IO error on '{}': {}", path, err),
            GeneratorError::Yaml(ref err) => write!(f, "Yaml error: {}", err),
        }
    }
}

impl std::error::Error for GeneratorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            GeneratorError::Io(_, ref err) => Some(err),
            _ => None,
        }
    }
}

impl GeneratorError {
    pub fn io(path: impl AsRef<std::path::Path>, err: std::io::Error) -> Self {
        GeneratorError::Io(path.as_ref().display().to_string(), err)
    }
}

impl From<mysql::Error> for GeneratorError {
    fn from(err: mysql::Error) -> Self {
        GeneratorError::Database(err.to_string())
    }
}

impl From<mysql::UrlError> for GeneratorError {
    fn from(err: mysql::UrlError) -> Self {
        GeneratorError::Database(err.to_string())
    }
}

impl From<url::ParseError> for GeneratorError {
    fn from(err: url::ParseError) -> Self {
        GeneratorError::Config(format!("invalid datasource url: {}", err))
    }
}

impl From<tera::Error> for GeneratorError {
    fn from(err: tera::Error) -> Self {
        // tera keeps the useful part (template name, line) in the source chain
        let mut msg = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            msg.push_str(": ");
            msg.push_str(&cause.to_string());
            source = cause.source();
        }
        GeneratorError::Template(msg)
    }
}

impl From<serde_yaml::Error> for GeneratorError {
    fn from(err: serde_yaml::Error) -> Self {
        GeneratorError::Yaml(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GeneratorError>;
