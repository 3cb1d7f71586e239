use axum::{
    Json,
    http::{HeaderMap, header},
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct Meta {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub total: Option<i64>,
}

impl Meta {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
            total: Some(total),
        }
    }

    pub fn empty() -> Self {
        Self {
            page: None,
            per_page: None,
            total: None,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, meta: Option<Meta>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta,
        }
    }
}

/// Outcome of a form submission: redirect-after-POST on success, or the
/// view re-rendered with its errors (HTTP 200).
#[derive(Debug)]
pub enum FormResponse<T> {
    Redirect(String),
    Rerender(ApiResponse<T>),
}

impl<T> FormResponse<T> {
    pub fn redirect(to: impl Into<String>) -> Self {
        FormResponse::Redirect(to.into())
    }

    pub fn rerender(message: impl Into<String>, view: T) -> Self {
        FormResponse::Rerender(ApiResponse {
            message: message.into(),
            data: Some(view),
            meta: Some(Meta::empty()),
        })
    }
}

impl<T: Serialize> IntoResponse for FormResponse<T> {
    fn into_response(self) -> Response {
        match self {
            FormResponse::Redirect(to) => Redirect::to(&to).into_response(),
            FormResponse::Rerender(body) => Json(body).into_response(),
        }
    }
}

/// Local path of the `Referer` header, or `fallback` when it is missing or
/// not a usable URL. Only the path and query are kept so a forged header
/// cannot send the client to another host.
pub fn referer_path(headers: &HeaderMap, fallback: &str) -> String {
    headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
        .and_then(local_path)
        .unwrap_or_else(|| fallback.to_string())
}

fn local_path(referer: &str) -> Option<String> {
    if referer.starts_with('/') && !referer.starts_with("//") {
        return Some(referer.to_string());
    }
    let (_, rest) = referer.split_once("://")?;
    match rest.find('/') {
        Some(idx) => Some(rest[idx..].to_string()),
        None => Some("/".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn with_referer(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::REFERER, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn referer_keeps_path_and_query_only() {
        let headers = with_referer("http://shop.example/wishlist?page=2");
        assert_eq!(referer_path(&headers, "/"), "/wishlist?page=2");
    }

    #[test]
    fn referer_host_only_maps_to_root() {
        let headers = with_referer("https://shop.example");
        assert_eq!(referer_path(&headers, "/x"), "/");
    }

    #[test]
    fn relative_referer_is_used_as_is() {
        let headers = with_referer("/category");
        assert_eq!(referer_path(&headers, "/"), "/category");
    }

    #[test]
    fn missing_or_protocol_relative_referer_falls_back() {
        assert_eq!(referer_path(&HeaderMap::new(), "/fallback"), "/fallback");
        let headers = with_referer("//evil.example/path");
        assert_eq!(referer_path(&headers, "/fallback"), "/fallback");
    }
}
