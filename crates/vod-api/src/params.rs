//! Shared list-endpoint query parameters and page responses.

use serde::{Deserialize, Serialize};
use vod_store::{Cursor, Page, DEFAULT_PAGE_SIZE};

use crate::error::{ApiError, ApiResult};

/// `?limit=&cursor=` accepted by every list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}

impl ListParams {
    /// Resolve to an effective limit and decoded cursor. The limit
    /// default applies only when the parameter is absent; an explicit
    /// out-of-range value is rejected downstream, before any query.
    pub fn resolve(&self) -> ApiResult<(u32, Option<Cursor>)> {
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        let cursor = match &self.cursor {
            Some(token) => Some(Cursor::decode(token).map_err(ApiError::from)?),
            None => None,
        };
        Ok((limit, cursor))
    }
}

/// Wire shape of one page: items plus an opaque token for the next.
#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    #[serde(rename = "nextCursor", skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl<T> From<Page<T>> for PageResponse<T> {
    fn from(page: Page<T>) -> Self {
        Self {
            items: page.items,
            next_cursor: page.next_cursor.map(|c| c.encode()),
        }
    }
}
