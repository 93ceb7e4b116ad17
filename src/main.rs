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
use std::path::PathBuf;

use axum::extract::{Path, Query};
use axum::routing::{get, post};
use axum::{Extension, Router};
use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::Parser;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crown::context::RequestContextHolder;
use crown::enums::{deserialize_ienum_opt, serialize_ienum};
use crown::prelude::*;
use crown::validator::constraints;

#[derive(Parser, Debug)]
#[command(name = "crown", about = "Crown demo server")]
struct Cli {
    /// YAML configuration, defaults apply when absent
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UserStatus {
    Disabled,
    Enabled,
}

impl IEnum for UserStatus {
    fn value(&self) -> EnumValue {
        match self {
            UserStatus::Disabled => EnumValue::Int(0),
            UserStatus::Enabled => EnumValue::Int(1),
        }
    }

    fn variants() -> &'static [Self] {
        &[UserStatus::Disabled, UserStatus::Enabled]
    }
}

#[derive(Debug, Serialize)]
struct User {
    id: i64,
    name: String,
    #[serde(serialize_with = "serialize_ienum")]
    status: UserStatus,
    birthday: Option<NaiveDate>,
    created: NaiveDateTime,
}

static EMAIL: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());

#[derive(Debug, Deserialize)]
struct NewUser {
    name: String,
    email: String,
}

impl Validate for NewUser {
    fn validate(&self, errors: &mut ValidationErrors) {
        constraints::not_blank(errors, "name", &self.name);
        constraints::length(errors, "email", &self.email, 3, 64);
        if let Some(email) = &*EMAIL {
            constraints::pattern(errors, "email", &self.email, email);
        }
    }
}

#[derive(Debug, Deserialize)]
struct UserQuery {
    #[serde(default, deserialize_with = "deserialize_ienum_opt")]
    status: Option<UserStatus>,
}

async fn get_user(Path(id): Path<i64>) -> Result<Json<User>> {
    if id <= 0 {
        return Err(CrownError::NotFound(format!("user {}", id)));
    }
    Ok(Json(User {
        id,
        name: "Caratacus".to_string(),
        status: UserStatus::Enabled,
        birthday: NaiveDate::from_ymd_opt(1990, 1, 1),
        created: Local::now().naive_local(),
    }))
}

async fn list_users(Query(query): Query<UserQuery>) -> Json<Vec<i64>> {
    match query.status {
        Some(UserStatus::Disabled) => Json(vec![]),
        _ => Json(vec![1, 2]),
    }
}

async fn user_status(Extension(formatters): Extension<std::sync::Arc<FormatterRegistry>>, Path(raw): Path<String>) -> Result<String> {
    let status: Option<UserStatus> = formatters.convert_enum(&raw)?;
    Ok(format!("{:?}", status))
}

async fn create_users(Valid(users): Valid<Vec<NewUser>>) -> Json<usize> {
    Json(users.len())
}

async fn whoami() -> String {
    RequestContextHolder::current()
        .map(|attributes| attributes.id().to_string())
        .unwrap_or_default()
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();
    let config = match cli.config {
        Some(path) => WebMvcConfig::load(path)?,
        None => WebMvcConfig::default(),
    };
    let mvc = WebMvc::bootstrap(config)?;
    let app = mvc.apply(
        Router::new()
            .route("/users", get(list_users).post(create_users))
            .route("/users/:id", get(get_user))
            .route("/status/:raw", get(user_status))
            .route("/whoami", post(whoami).get(whoami)),
    );
    let bind = mvc.config().bind();
    let runtime = mvc.server_factory().build_runtime()?;
    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(bind).await?;
        tracing::info!("crown listening on {}", bind);
        axum::serve(listener, app).await
    })?;
    Ok(())
}
