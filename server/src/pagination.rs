use axum::http::StatusCode;
use serde::Deserialize;

/// Largest page a list endpoint will return.
pub const MAX_LIMIT: i64 = 100;

/// `?offset=&limit=` query parameters shared by list endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub offset: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    MAX_LIMIT
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: MAX_LIMIT,
        }
    }
}

impl Pagination {
    /// Reject negative offsets and limits outside `0..=MAX_LIMIT`.
    pub fn validate(self) -> Result<Self, (StatusCode, String)> {
        if self.offset < 0 {
            return Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                "offset must be non-negative".to_string(),
            ));
        }
        if !(0..=MAX_LIMIT).contains(&self.limit) {
            return Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("limit must be between 0 and {}", MAX_LIMIT),
            ));
        }
        Ok(self)
    }
}
