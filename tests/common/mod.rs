//! Shared helpers for the HTTP integration tests

#![allow(dead_code)]

use argon2::Params;
use axum::http::{HeaderName, HeaderValue, header};
use axum_test::TestServer;
use serde_json::{Value, json};
use tomostudy::core::auth::hash_password_with_salt;
use tomostudy::core::guard::API_KEY_HEADER;
use tomostudy::prelude::*;

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "correct horse battery staple";
pub const API_KEY: &str = "test-api-key";

/// Minimal Argon2 cost so logins stay fast in tests
fn cheap_params() -> Params {
    Params::new(8, 1, 1, None).expect("valid argon2 params")
}

pub fn config() -> AppConfig {
    let yaml = format!(
        "secret_key: integration-secret\nusername: {USERNAME}\npassword_hash: \"{}\"\napi_key: {API_KEY}\n",
        hash_password_with_salt(PASSWORD, b"integration-salt", cheap_params())
            .expect("test hash")
    );
    AppConfig::from_yaml_str(&yaml).expect("test config parses")
}

pub fn server_with(config: AppConfig) -> TestServer {
    let app = ServerBuilder::new(config)
        .build()
        .expect("test config is valid");
    TestServer::try_new(app).expect("Failed to create test server")
}

pub fn server() -> TestServer {
    server_with(config())
}

pub fn api_key_header() -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static(API_KEY_HEADER),
        HeaderValue::from_static(API_KEY),
    )
}

/// Log in and return a `Cookie` header value carrying the session token
pub async fn login(server: &TestServer) -> HeaderValue {
    let response = server
        .post("/login")
        .form(&[("username", USERNAME), ("password", PASSWORD)])
        .await;
    response.assert_status_ok();
    session_cookie(&response)
}

/// `name=value` part of the response's `Set-Cookie` header
pub fn session_cookie(response: &axum_test::TestResponse) -> HeaderValue {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("Set-Cookie header present")
        .to_str()
        .expect("ASCII cookie");
    let pair = set_cookie.split(';').next().expect("cookie pair");
    HeaderValue::from_str(pair).expect("valid header value")
}

pub fn haus() -> Value {
    json!({
        "word": "Haus",
        "english_translation": "house",
        "definition": ["A building for living in"],
        "examples": ["Das Haus ist groß"],
        "language": "de",
        "word_type": "Noun",
        "article": "n",
        "levels": ["Beginner"]
    })
}

pub fn entry(word: &str, language: &str) -> Value {
    json!({
        "word": word,
        "english_translation": format!("{word} in English"),
        "language": language,
        "word_type": "Noun",
        "levels": ["Beginner"]
    })
}

/// Create an entry through the API and return its id
pub async fn create(server: &TestServer, cookie: &HeaderValue, body: &Value) -> i64 {
    let response = server
        .post("/vocabulary/")
        .add_header(header::COOKIE, cookie.clone())
        .json(body)
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()["vocab_id"]
        .as_i64()
        .expect("vocab_id is an integer")
}
