//! Course API server: the HTTP surface the panel talks to.

use std::net::SocketAddr;

use axum::Json;
use axum::extract::Path;
use axum::routing::{delete, post, put};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;
use tracing::info;

use crate::client::{DEFAULT_ROUTE_SUFFIX, ResourcePaths};
use crate::config::{env_lookup, parse_or, string_or};
use crate::db::repository;
use crate::error::{AppError, ConfigError};
use crate::models::{Course, CourseFields, UpdateCourseRequest};
use crate::state::AppState;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://courses.db?mode=rwc";
pub const DEFAULT_PREFIX: &str = "/api/v1/courses";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub database_url: String,
    pub addr: SocketAddr,
    pub prefix: String,
    pub paths: ResourcePaths,
}

impl ServerConfig {
    pub fn new_from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let prefix = string_or(&lookup, "COURSE_API_PREFIX", DEFAULT_PREFIX);
        if !prefix.is_empty() && !prefix.starts_with('/') {
            return Err(ConfigError::invalid(
                "COURSE_API_PREFIX",
                "must be empty or start with '/'",
            ));
        }

        Ok(Self {
            database_url: string_or(&lookup, "DATABASE_URL", DEFAULT_DATABASE_URL),
            addr: parse_or(
                &lookup,
                "COURSE_API_ADDR",
                SocketAddr::from(([127, 0, 0, 1], 8001)),
            )?,
            prefix,
            paths: ResourcePaths::new(string_or(
                &lookup,
                "COURSE_ROUTE_SUFFIX",
                DEFAULT_ROUTE_SUFFIX,
            )),
        })
    }
}

#[derive(Debug, Serialize)]
struct ListBody {
    data: Vec<Course>,
}

pub fn router(state: AppState, prefix: &str, paths: &ResourcePaths) -> Router {
    let courses = Router::new()
        .route(&format!("/{}", paths.list()), get(list_courses))
        .route(&format!("/{}", paths.add()), post(create_course))
        .route(&format!("/{}/{{id}}", paths.update()), put(update_course))
        .route(&format!("/{}/{{id}}", paths.delete()), delete(delete_course));

    let prefix = prefix.trim_end_matches('/');
    let app = Router::new().route("/health", get(health));
    let app = if prefix.is_empty() {
        app.merge(courses)
    } else {
        app.nest(prefix, courses)
    };

    app.with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn list_courses(State(state): State<AppState>) -> Result<Json<ListBody>, AppError> {
    let data = repository::fetch_courses(&state.db).await?;
    Ok(Json(ListBody { data }))
}

async fn create_course(
    State(state): State<AppState>,
    Json(req): Json<CourseFields>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    check(&state, &req)?;
    let course = repository::insert_course(&state.db, req).await?;
    info!("created course {}", course.id);
    Ok((StatusCode::CREATED, Json(course)))
}

async fn update_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCourseRequest>,
) -> Result<Json<Course>, AppError> {
    let fields = CourseFields::from(req);
    check(&state, &fields)?;
    let course = repository::update_course(&state.db, &id, fields)
        .await?
        .ok_or(AppError::NotFound)?;
    info!("updated course {}", course.id);
    Ok(Json(course))
}

async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let ok = repository::delete_course(&state.db, &id).await?;
    if ok {
        info!("deleted course {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

fn check(state: &AppState, fields: &CourseFields) -> Result<(), AppError> {
    let result = state.schema.validate(fields);
    if result.is_empty() {
        Ok(())
    } else {
        Err(AppError::BadRequest(result.to_string()))
    }
}
