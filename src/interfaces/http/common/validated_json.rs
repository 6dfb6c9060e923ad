//! `ValidatedJson<T>`: `axum::Json<T>` followed by `validator::Validate`.
//!
//! Both a body that does not parse and a body that breaks a field rule are
//! rejected with `400` in the standard envelope, through [`ApiError`].

use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use super::ApiError;

/// Deserialized and validated request body.
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct NewReview {
///     #[validate(range(min = 1, max = 5))]
///     rating: i32,
/// }
///
/// async fn handler(ValidatedJson(body): ValidatedJson<NewReview>) { /* ... */ }
/// ```
pub struct ValidatedJson<T>(pub T);

/// `field: message` for every failed rule, sorted by field so the text is stable.
fn describe(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => format!("{}: {}", field, message),
                None => format!("{}: invalid value ({})", field, e.code),
            })
        })
        .collect();
    parts.sort();
    if parts.is_empty() {
        "Validation failed".to_string()
    } else {
        parts.join("; ")
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::bad_request(format!("Invalid JSON: {}", rejection.body_text())))?;
        value
            .validate()
            .map_err(|errors| ApiError::bad_request(describe(&errors)))?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use serde::Deserialize;
    use tower::Service;

    #[derive(Debug, Deserialize, Validate)]
    struct ReviewBody {
        #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
        rating: i32,
        #[validate(length(max = 10))]
        comment: Option<String>,
    }

    async fn handler(ValidatedJson(body): ValidatedJson<ReviewBody>) -> String {
        body.rating.to_string()
    }

    async fn post_json(body: &str) -> (StatusCode, serde_json::Value) {
        let mut svc = Router::new().route("/reviews", post(handler)).into_service();
        let req = Request::builder()
            .method("POST")
            .uri("/reviews")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let resp = svc.call(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn accepts_a_valid_body() {
        let (status, _) = post_json(r#"{"rating": 4, "comment": "fast"}"#).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let (status, json) = post_json("{rating").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert!(json["error"].as_str().unwrap().starts_with("Invalid JSON"));
    }

    #[tokio::test]
    async fn rule_failures_name_the_fields() {
        let (status, json) = post_json(r#"{"rating": 9, "comment": "far too long a comment"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error = json["error"].as_str().unwrap();
        assert!(error.starts_with("comment: invalid value (length)"), "{}", error);
        assert!(error.ends_with("rating: Rating must be between 1 and 5"), "{}", error);
    }
}
