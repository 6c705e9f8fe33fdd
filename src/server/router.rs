//! Route table and middleware

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header::CONTENT_TYPE},
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    auth::{auth_check, login, logout},
    health,
    vocabulary::{
        create_vocabulary, delete_vocabulary, export_vocabulary, get_vocabulary,
        get_vocabulary_by_slug, import_vocabulary, list_vocabulary, update_vocabulary,
    },
};
use super::state::AppState;
use crate::config::AppConfig;
use crate::core::guard::API_KEY_HEADER;

/// Build every route of the API
///
/// - GET /health - Liveness
/// - POST /login, POST /logout, GET /auth - Session handling
/// - GET /vocabulary/?lang=&query= - List or search (API key)
/// - GET /vocabulary/{id}, GET /vocabulary/slug/{slug}?lang= - Lookups (API key)
/// - POST /vocabulary/, PUT/DELETE /vocabulary/{id} - Writes (token)
/// - POST /vocabulary/file - Bulk import (token)
/// - GET /vocabulary/download?lang= - Export (token, development only by default)
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/health", get(health))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/auth", get(auth_check))
        .route("/vocabulary/", get(list_vocabulary).post(create_vocabulary))
        .route("/vocabulary/file", post(import_vocabulary))
        .route("/vocabulary/download", get(export_vocabulary))
        .route("/vocabulary/slug/{slug}", get(get_vocabulary_by_slug))
        .route(
            "/vocabulary/{id}",
            get(get_vocabulary)
                .put(update_vocabulary)
                .delete(delete_vocabulary),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins()
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(API_KEY_HEADER)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::Params;
    use crate::core::auth::hash_password_with_salt;
    use crate::server::ServerBuilder;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    fn app() -> Router {
        let yaml = format!(
            "secret_key: dev-secret\nusername: admin\npassword_hash: \"{}\"\napi_key: key\n",
            hash_password_with_salt("pw", b"test-salt", Params::new(8, 1, 1, None).unwrap())
                .unwrap()
        );
        ServerBuilder::new(AppConfig::from_yaml_str(&yaml).unwrap())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_route() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cors_allows_development_origin() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/vocabulary/")
                    .header(header::ORIGIN, "http://localhost:5273")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some(&HeaderValue::from_static("http://localhost:5273"))
        );
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS),
            Some(&HeaderValue::from_static("true"))
        );
    }

    #[tokio::test]
    async fn test_cors_ignores_unknown_origin() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/vocabulary/")
                    .header(header::ORIGIN, "https://evil.example")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .is_none()
        );
    }
}
