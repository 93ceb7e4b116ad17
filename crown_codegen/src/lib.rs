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
//! Crown code generator: reads a MySQL schema and renders entity, mapper,
//! mapper XML, service, service implementation and controller sources.
//!
//! ```ignore
//! use crown_codegen::preset::crown_preset;
//!
//! let report = crown_preset().execute()?;
//! eprintln!("{:?}", report.cfg().get("abc"));
//! ```
//!
pub mod builder;
pub mod config;
pub mod constant;
pub mod convert;
pub mod datasource;
pub mod engine;
pub mod error;
pub mod injection;
pub mod preset;
pub mod schema;
pub mod util;

pub use config::AutoGenerator;
pub use error::{GeneratorError, Result};
