// Copyright (c) 2025 crown contributors
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! Crown. HTTP layer auto configuration for axum services.
//!
//! Put the desired version of the crate into the `dependencies` section of your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! crown = "0.1.0"
//! ```
//!
//! ## Feature.
//!
//! * ```fast-server``` - compiles in `FastServerCustomizer` and turns runtime tuning on by default
//!
//! ## Registrations.
//!
//! * log record aspect - access log, slow requests at `warn`
//! * validator - `Valid<T>` bodies, collections validated per element
//! * formatters - text and numbers into any `IEnum`
//! * server customizer - runtime tuning, only when enabled
//! * request context listener - `RequestContextHolder::current()`
//! * message converters - dates, times and 64-bit integers as strings
//! * exception resolver - `{"status","error","msg","time"}` bodies
//! * global interceptor - `/**` minus the swagger and error paths
//!
//! ## Example
//!
//! ```rust,no_run
//! use axum::{routing::get, Router};
//! use chrono::NaiveDate;
//! use crown::prelude::*;
//!
//! #[derive(serde::Serialize)]
//! struct User {
//!     id: i64,
//!     birthday: NaiveDate,
//! }
//!
//! async fn user() -> Result<Json<User>> {
//!     let birthday = NaiveDate::from_ymd_opt(1990, 1, 1).ok_or_else(|| CrownError::NotFound("user".to_string()))?;
//!     Ok(Json(User { id: 1, birthday }))
//! }
//!
//! fn main() -> anyhow::Result<()> {
//!     let mvc = WebMvc::bootstrap(WebMvcConfig::default())?;
//!     let app = mvc.apply(Router::new().route("/users/1", get(user)));
//!     let runtime = mvc.server_factory().build_runtime()?;
//!     runtime.block_on(async move {
//!         let listener = tokio::net::TcpListener::bind(mvc.config().bind()).await?;
//!         axum::serve(listener, app).await
//!     })?;
//!     Ok(())
//! }
//! ```

pub mod aspect;
pub mod config;
pub mod configurer;
pub mod context;
pub mod enums;
pub mod errors;
pub mod exception;
pub mod interceptor;
pub mod json;
pub mod server;
pub mod validator;

pub use config::WebMvcConfig;
pub use configurer::{WebMvc, WebMvcAutoConfiguration, WebMvcConfigurer};
pub use errors::{CrownError, Result};

pub mod prelude {
    pub use crate::config::WebMvcConfig;
    pub use crate::configurer::{WebMvc, WebMvcAutoConfiguration, WebMvcConfigurer};
    pub use crate::context::{RequestAttributes, RequestContextHolder};
    pub use crate::enums::{EnumValue, FormatterRegistry, IEnum};
    pub use crate::errors::{CrownError, ErrorCode, Result};
    pub use crate::interceptor::{HandlerInterceptor, InterceptorRegistry, RequestInfo};
    pub use crate::json::Json;
    pub use crate::validator::{Valid, Validate, ValidationErrors};
}
