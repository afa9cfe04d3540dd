use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::OriginalUri;
use axum_extra::extract::{Query, QueryRejection};

use crate::prelude::*;
use crate::utils::headers;
use crate::utils::pagination::{pagination_headers, PageParams, PageRequest};

/// Entity name reported in alert headers and problem bodies.
pub const ENTITY_NAME: &str = "bookApiEditor";

/// Add all `editors` routes to the router.
#[rustfmt::skip]
pub fn add_routes(router: AppRouter) -> AppRouter {
    router.api_routes(|r| {
        r.route("/editors", get(get_all_editors).post(create_editor).put(update_editor))
         .route("/editors/{id}", get(get_editor).delete(delete_editor))
    })
}

/// `POST /api/editors`: create a new editor.
///
/// Responds `201 Created` with the new editor, or `400 Bad Request` if it already has an id.
async fn create_editor(
    State(state): State<SharedAppState>,
    body: Result<Json<Editor>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(editor) = body?;
    tracing::debug!("REST request to save Editor : {editor:?}");

    let app = &state.config.app;
    if editor.id.is_some() {
        return Err(AppError::invalid_request(
            app,
            "A new editor cannot already have an ID",
            ENTITY_NAME,
            "idexists",
        ));
    }

    let result = state.editors.save(&editor).await?;
    let id = result.id.context("saved editor has no id")?;
    let alert = headers::entity_creation_alert(&app.name, app.enable_translation, ENTITY_NAME, &id.to_string())?;

    Ok((StatusCode::CREATED, [(header::LOCATION, format!("/api/editors/{id}"))], alert, Json(result)))
}

/// `PUT /api/editors`: replace an existing editor.
///
/// Responds `200 OK` with the stored editor, or `400 Bad Request` if it has no id.
async fn update_editor(
    State(state): State<SharedAppState>,
    body: Result<Json<Editor>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(editor) = body?;
    tracing::debug!("REST request to update Editor : {editor:?}");

    let app = &state.config.app;
    let Some(id) = editor.id else {
        return Err(AppError::invalid_request(app, "Invalid id", ENTITY_NAME, "idnull"));
    };

    let result = state.editors.save(&editor).await?;
    let alert = headers::entity_update_alert(&app.name, app.enable_translation, ENTITY_NAME, &id.to_string())?;

    Ok((alert, Json(result)))
}

/// `GET /api/editors`: get a page of editors.
///
/// Accepts `page`, `size`, and `sort` query parameters, and responds with the
/// page content plus `X-Total-Count` and `Link` headers.
async fn get_all_editors(
    State(state): State<SharedAppState>,
    OriginalUri(uri): OriginalUri,
    query: Result<Query<PageParams>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let Query(params) = query?;
    tracing::debug!("REST request to get a page of Editors");

    let request = PageRequest::from_params(&params, &state.config.pagination);
    if let Some(property) = request.unsupported_sort(Editor::SORTABLE) {
        return Err(AppError::BadRequest(format!("Cannot sort editors by {property:?}")));
    }

    let page = state.editors.find_all(&request).await?;
    let base = format!("{}{}", state.config.app.url.trim_end_matches('/'), uri.path());
    let headers = pagination_headers(&base, uri.query(), &page, &request)?;

    Ok((headers, Json(page.content)))
}

/// `GET /api/editors/{id}`: get one editor, or `404 Not Found`.
async fn get_editor(
    State(state): State<SharedAppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Editor>> {
    let Path(id) = path?;
    tracing::debug!("REST request to get Editor : {id}");

    let editor = state.editors.find_by_id(id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(editor))
}

/// `DELETE /api/editors/{id}`: delete an editor.
///
/// Always responds `204 No Content`, whether or not the editor existed.
async fn delete_editor(
    State(state): State<SharedAppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<impl IntoResponse> {
    let Path(id) = path?;
    tracing::debug!("REST request to delete Editor : {id}");

    state.editors.delete_by_id(id).await?;

    let app = &state.config.app;
    let alert = headers::entity_deletion_alert(&app.name, app.enable_translation, ENTITY_NAME, &id.to_string())?;
    Ok((StatusCode::NO_CONTENT, alert))
}
