//! Unhandled-fault reporting.
//!
//! Outside production the caller gets the full detail of a failed request
//! (error chain or panic message); in production a generic body is sent and
//! the detail only reaches the log. The switch is deployment configuration.

use std::any::Any;

use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use tower_http::catch_panic::{CatchPanicLayer, ResponseForPanic};

use crate::http::response::{ErrorDetail, GENERIC_ERROR};

/// Turns a handler panic into a 500.
#[derive(Debug, Clone, Copy)]
pub struct PanicReporter {
    verbose: bool,
}

impl PanicReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

fn panic_message(err: &(dyn Any + Send)) -> &str {
    if let Some(s) = err.downcast_ref::<String>() {
        s
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "non-string panic payload"
    }
}

impl ResponseForPanic for PanicReporter {
    type ResponseBody = Body;

    fn response_for_panic(&mut self, err: Box<dyn Any + Send + 'static>) -> Response<Body> {
        let message = panic_message(err.as_ref());
        tracing::error!(panic = %message, "Request handler panicked");

        let body = if self.verbose {
            format!("panic in request handler: {message}")
        } else {
            GENERIC_ERROR.to_string()
        };

        let mut response = Response::new(Body::from(body));
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        response
    }
}

pub fn panic_layer(verbose: bool) -> CatchPanicLayer<PanicReporter> {
    CatchPanicLayer::custom(PanicReporter::new(verbose))
}

/// Verbose reporter: replaces the generic body of a failed response with
/// the attached [`ErrorDetail`]. Status, headers and the remaining
/// extensions are left as the handler produced them. Only mounted outside
/// production.
pub async fn report_errors(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    if let Some(ErrorDetail(detail)) = response.extensions_mut().remove::<ErrorDetail>() {
        let headers = response.headers_mut();
        headers.remove(header::CONTENT_LENGTH);
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        *response.body_mut() = Body::from(detail);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::response::AppError;
    use axum::response::AppendHeaders;
    use axum::{middleware, routing::get, Router};
    use tower::ServiceExt;

    async fn boom() -> &'static str {
        panic!("simulated fault")
    }

    async fn fails() -> Result<&'static str, AppError> {
        Err(AppError::Render(std::fmt::Error))
    }

    async fn fails_with_headers() -> (AppendHeaders<[(&'static str, &'static str); 2]>, AppError) {
        (
            AppendHeaders([("x-upstream", "kept"), ("cache-control", "no-store")]),
            AppError::Render(std::fmt::Error),
        )
    }

    async fn body_of(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_panic_detail_when_verbose() {
        let app = Router::new().route("/boom", get(boom)).layer(panic_layer(true));
        let (status, body) = body_of(app, "/boom").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("simulated fault"));
    }

    #[tokio::test]
    async fn test_panic_generic_in_production() {
        let app = Router::new().route("/boom", get(boom)).layer(panic_layer(false));
        let (status, body) = body_of(app, "/boom").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, GENERIC_ERROR);
    }

    #[tokio::test]
    async fn test_error_detail_only_with_reporter() {
        let quiet = Router::new().route("/fails", get(fails));
        let (_, body) = body_of(quiet, "/fails").await;
        assert_eq!(body, GENERIC_ERROR);

        let verbose = Router::new()
            .route("/fails", get(fails))
            .layer(middleware::from_fn(report_errors));
        let (status, body) = body_of(verbose, "/fails").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("failed to render view"));
    }

    #[tokio::test]
    async fn test_error_detail_keeps_response_headers() {
        let app = Router::new()
            .route("/fails", get(fails_with_headers))
            .layer(middleware::from_fn(report_errors));

        let response = app
            .oneshot(Request::builder().uri("/fails").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()["x-upstream"], "kept");
        assert_eq!(response.headers()["cache-control"], "no-store");
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain; charset=utf-8");
        assert!(response.headers().get(header::CONTENT_LENGTH).is_none());

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.contains("failed to render view"));
    }
}
