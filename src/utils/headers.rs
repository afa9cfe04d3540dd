//! Entity notification headers, read by clients to show toast alerts.
//!
//! Successful mutations carry `X-{app}-alert` (a message, or a translation key
//! when translation is enabled) and `X-{app}-params` (the record's id).
//! Failures carry `X-{app}-error` and `X-{app}-params` (the entity name).

use axum::http::{HeaderMap, HeaderName, HeaderValue};

fn header_name(app: &str, suffix: &str) -> anyhow::Result<HeaderName> {
    Ok(HeaderName::try_from(format!("x-{app}-{suffix}"))?)
}

/// A generic alert with a message and a parameter.
pub fn alert(app: &str, message: &str, param: &str) -> anyhow::Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(header_name(app, "alert")?, HeaderValue::try_from(message)?);
    headers.insert(header_name(app, "params")?, HeaderValue::try_from(param)?);
    Ok(headers)
}

pub fn entity_creation_alert(app: &str, translate: bool, entity: &str, id: &str) -> anyhow::Result<HeaderMap> {
    let message = match translate {
        true => format!("{app}.{entity}.created"),
        false => format!("A new {entity} is created with identifier {id}"),
    };
    alert(app, &message, id)
}

pub fn entity_update_alert(app: &str, translate: bool, entity: &str, id: &str) -> anyhow::Result<HeaderMap> {
    let message = match translate {
        true => format!("{app}.{entity}.updated"),
        false => format!("A {entity} is updated with identifier {id}"),
    };
    alert(app, &message, id)
}

pub fn entity_deletion_alert(app: &str, translate: bool, entity: &str, id: &str) -> anyhow::Result<HeaderMap> {
    let message = match translate {
        true => format!("{app}.{entity}.deleted"),
        false => format!("A {entity} is deleted with identifier {id}"),
    };
    alert(app, &message, id)
}

pub fn failure_alert(
    app: &str,
    translate: bool,
    entity: &str,
    error_key: &str,
    message: &str,
) -> anyhow::Result<HeaderMap> {
    let error = match translate {
        true => format!("error.{error_key}"),
        false => message.to_string(),
    };
    let mut headers = HeaderMap::new();
    headers.insert(header_name(app, "error")?, HeaderValue::try_from(error)?);
    headers.insert(header_name(app, "params")?, HeaderValue::try_from(entity)?);
    Ok(headers)
}
