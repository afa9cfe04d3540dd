use axum::extract::DefaultBodyLimit;

use crate::prelude::*;

mod editors;

pub struct AppState {
    pub config: Config,
    pub editors: SqliteEditorRepository,
}

impl AppState {
    pub fn new(config: Config, db: Db) -> Self {
        Self { config, editors: SqliteEditorRepository::new(db) }
    }
}

pub async fn build(config: Config) -> Result<axum::Router<()>> {
    let db = crate::db::init(&config.db).await?;
    Ok(router(AppState::new(config, db)))
}

/// Assemble the full app router around an already initialized state.
pub fn router(state: AppState) -> axum::Router<()> {
    let state = Arc::new(state);

    // Register REST resources
    let r = AppRouter::new(&state);
    let r = editors::add_routes(r);
    let (r, state) = r.finish();

    // Register app-wide routes
    let r = r.fallback(|| async { AppError::NotFound });
    let r = r.method_not_allowed_fallback(|| async {
        AppError::Rejected { status: StatusCode::METHOD_NOT_ALLOWED, detail: "Request method not supported".into() }
    });

    // Register middleware
    let r = crate::utils::tracing::add_middleware(r);
    let r = r.layer(DefaultBodyLimit::max(1024 * 1024)); // 1MB limit
    r.with_state(state)
}
