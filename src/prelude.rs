pub use std::sync::Arc;

pub use anyhow::{Context as _, Result};
pub use axum::extract::{Path, State};
pub use axum::http::{header, StatusCode};
pub use axum::response::{IntoResponse, Response};
pub use axum::routing::get;
pub use axum::Json;

pub use crate::db::editor::{Editor, EditorRepository, SqliteEditorRepository};
pub use crate::db::Db;
pub use crate::utils::config::Config;
pub use crate::utils::error::{AppError, AppResult};
pub use crate::utils::routing::AppRouter;
pub use crate::utils::types::SharedAppState;
