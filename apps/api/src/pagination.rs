//! Keyset pagination over `(updated_at DESC, id DESC)` (or published_at for
//! posts). Cursors are opaque to clients: url-safe base64 of `"{rfc3339}:{id}"`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 50;

#[derive(Debug, Clone, Deserialize)]
pub struct PaginationQuery {
    pub limit: Option<i64>,
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorPosition {
    pub updated_at: DateTime<Utc>,
    pub id: i64,
}

#[derive(Debug, Clone)]
pub struct PageRequest {
    pub limit: i64,
    pub cursor: Option<CursorPosition>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub next_cursor: Option<String>,
    pub has_more: bool,
    pub as_of: String,
}

/// Validates the raw query parameters and decodes the cursor, if any.
pub fn resolve_page_request(query: &PaginationQuery) -> Result<PageRequest, AppError> {
    if matches!(query.limit, Some(limit) if limit <= 0) {
        return Err(AppError::Validation(
            "Invalid query parameters".to_string(),
        ));
    }

    let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT).min(MAX_PAGE_LIMIT);

    let cursor = match query.cursor.as_deref().map(str::trim) {
        None => None,
        Some("") => {
            return Err(AppError::Validation(
                "Invalid query parameters".to_string(),
            ));
        }
        Some(raw_cursor) => Some(
            decode_cursor(raw_cursor)
                .ok_or_else(|| AppError::Validation("Invalid cursor parameter".to_string()))?,
        ),
    };

    Ok(PageRequest { limit, cursor })
}

pub fn encode_cursor(position: &CursorPosition) -> String {
    let raw = format!(
        "{}:{}",
        position.updated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        position.id
    );
    URL_SAFE_NO_PAD.encode(raw)
}

pub fn decode_cursor(cursor: &str) -> Option<CursorPosition> {
    let decoded_bytes = URL_SAFE_NO_PAD.decode(cursor).ok()?;
    let decoded = String::from_utf8(decoded_bytes).ok()?;

    let (updated_at_segment, id_segment) = decoded.rsplit_once(':')?;
    if updated_at_segment.is_empty() {
        return None;
    }

    let id = id_segment.parse::<i64>().ok()?;
    if id <= 0 {
        return None;
    }

    let updated_at = DateTime::parse_from_rfc3339(updated_at_segment)
        .ok()?
        .with_timezone(&Utc);

    Some(CursorPosition { updated_at, id })
}
