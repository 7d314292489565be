//! HTTP handlers

pub mod callback;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use callback::CallbackState;

/// Router for the OAuth redirect listener; anything but /callback is a 404
pub fn create_router(state: CallbackState) -> Router {
    Router::new()
        .route("/callback", get(callback::receive))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tokio::sync::oneshot;
    use tower::ServiceExt;

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_callback_delivers_code() {
        let (tx, rx) = oneshot::channel();
        let app = create_router(CallbackState::new(tx));

        let response = app.oneshot(get_request("/callback?code=aPrx123")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&body).contains("Authorization successful"));
        assert_eq!(rx.await.unwrap(), "aPrx123");
    }

    #[tokio::test]
    async fn test_callback_without_code_is_bad_request() {
        let (tx, mut rx) = oneshot::channel::<String>();
        let app = create_router(CallbackState::new(tx));

        let response = app
            .oneshot(get_request("/callback?error=access_denied"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_other_paths_are_not_found() {
        let (tx, _rx) = oneshot::channel();
        let app = create_router(CallbackState::new(tx));

        let response = app.oneshot(get_request("/favicon.ico")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_second_callback_still_succeeds() {
        let (tx, rx) = oneshot::channel();
        let app = create_router(CallbackState::new(tx));

        let first = app.clone().oneshot(get_request("/callback?code=one")).await.unwrap();
        let second = app.oneshot(get_request("/callback?code=two")).await.unwrap();

        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(second.status(), StatusCode::OK);
        assert_eq!(rx.await.unwrap(), "one");
    }
}
