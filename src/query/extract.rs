use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};

use super::{RangeParam, SortParam};
use crate::error::ApiError;

/// Extracts the optional `sort` and `range` descriptors of a list request.
/// Reads the already-normalized query string, so repeated-key and
/// bracketed-list forms arrive identically.
#[derive(Debug, Default)]
pub struct ListParams {
    pub sort: Option<SortParam>,
    pub range: Option<RangeParam>,
}

impl ListParams {
    pub fn from_query(query: &str) -> Result<Self, ApiError> {
        let mut sort_tokens: Vec<String> = Vec::new();
        let mut range_tokens: Vec<String> = Vec::new();

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "sort" => sort_tokens.push(value.into_owned()),
                "range" => range_tokens.push(value.into_owned()),
                _ => {}
            }
        }

        let sort = if sort_tokens.is_empty() {
            None
        } else {
            Some(SortParam::from_tokens(&sort_tokens).map_err(ApiError::invalid_query)?)
        };
        let range = if range_tokens.is_empty() {
            None
        } else {
            Some(RangeParam::from_tokens(&range_tokens).map_err(ApiError::invalid_query)?)
        };

        Ok(Self { sort, range })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ListParams
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_query(parts.uri.query().unwrap_or(""))
    }
}
