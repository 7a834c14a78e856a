//! End-to-end protocol flows over the full HTTP stack.
//!
//! Each test drives the axum application directly with `tower::oneshot`
//! against a store seeded with the demo dataset.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use base64::Engine;
use serde_json::Value;
use tower::ServiceExt;

use grantor_server::{ServerConfig, build_app, build_state};
use grantor_store_memory::fixtures;

fn app() -> Router {
    app_with(&ServerConfig::default())
}

fn app_with(config: &ServerConfig) -> Router {
    let (state, _store) = build_state(config);
    build_app(state)
}

fn basic(username: &str, password: &str) -> String {
    // Each half is form-urlencoded before joining (RFC 6749 section 2.3.1);
    // client identifiers are URIs and carry a colon of their own.
    let encode =
        |value: &str| url::form_urlencoded::byte_serialize(value.as_bytes()).collect::<String>();
    let encoded = base64::engine::general_purpose::STANDARD
        .encode(format!("{}:{}", encode(username), encode(password)));
    format!("Basic {encoded}")
}

fn encode_form(pairs: &[(&str, &str)]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

async fn authorize(app: &Router, owner: Option<(&str, &str)>, params: &[(&str, &str)]) -> (StatusCode, Option<String>) {
    let uri = format!("/oauth2/authorize?{}", encode_form(params));
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some((username, password)) = owner {
        builder = builder.header(header::AUTHORIZATION, basic(username, password));
    }
    let response = app
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .map(|value| value.to_str().unwrap().to_string());
    (status, location)
}

async fn post_token(
    app: &Router,
    client: Option<(&str, &str)>,
    params: &[(&str, &str)],
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/oauth2/token")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some((client_id, client_secret)) = client {
        builder = builder.header(header::AUTHORIZATION, basic(client_id, client_secret));
    }
    let response = app
        .clone()
        .oneshot(builder.body(Body::from(encode_form(params))).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get_resource(app: &Router, token: &str) -> (StatusCode, Option<Value>) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/oauth2/resource/username")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    if status != StatusCode::OK {
        return (status, None);
    }
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, Some(serde_json::from_slice(&bytes).unwrap()))
}

fn query_param(location: &str, name: &str) -> Option<String> {
    let url = url::Url::parse(location).unwrap();
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

fn fragment_param(location: &str, name: &str) -> Option<String> {
    let url = url::Url::parse(location).unwrap();
    let fragment = url.fragment()?;
    url::form_urlencoded::parse(fragment.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

#[tokio::test]
async fn authorization_code_flow_end_to_end() {
    let app = app();

    let (status, location) = authorize(
        &app,
        Some(("demousername1", "demopassword1")),
        &[
            ("response_type", "code"),
            ("client_id", "http://democlient1.com/"),
            ("redirect_uri", "http://democlient1.com/redirect_uri"),
            ("scope", "demoscope1"),
            ("state", "demostate1"),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::FOUND);
    let location = location.unwrap();
    assert!(location.starts_with("http://democlient1.com/redirect_uri?"));
    assert_eq!(query_param(&location, "state").as_deref(), Some("demostate1"));

    let code = query_param(&location, "code").unwrap();
    assert_eq!(code.len(), 32);

    let (status, body) = post_token(
        &app,
        Some(("http://democlient1.com/", "demosecret1")),
        &[
            ("grant_type", "authorization_code"),
            ("code", &code),
            ("redirect_uri", "http://democlient1.com/redirect_uri"),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["scope"], "demoscope1");
    assert_eq!(body["expires_in"], 3600);
    assert!(body["refresh_token"].is_string());

    let access_token = body["access_token"].as_str().unwrap();
    let (status, resource) = get_resource(&app, access_token).await;
    assert_eq!(status, StatusCode::OK);
    let resource = resource.unwrap();
    assert_eq!(resource["username"], "demousername1");
    assert_eq!(resource["client_id"], "http://democlient1.com/");
    assert_eq!(resource["scope"], "demoscope1");
}

#[tokio::test]
async fn authorization_code_is_single_use() {
    let app = app();
    let params = [
        ("grant_type", "authorization_code"),
        ("code", fixtures::CODE_LIVE),
        ("redirect_uri", "http://democlient2.com/redirect_uri"),
    ];

    let (status, _) = post_token(
        &app,
        Some(("http://democlient2.com/", "demosecret2")),
        &params,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post_token(
        &app,
        Some(("http://democlient2.com/", "demosecret2")),
        &params,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_grant");
}

#[tokio::test]
async fn expired_authorization_code_is_rejected() {
    let app = app();

    let (status, body) = post_token(
        &app,
        Some(("http://democlient1.com/", "demosecret1")),
        &[
            ("grant_type", "authorization_code"),
            ("code", fixtures::CODE_EXPIRED),
            ("redirect_uri", "http://democlient1.com/redirect_uri"),
        ],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_grant");
}

#[tokio::test]
async fn implicit_flow_delivers_token_in_fragment() {
    let app = app();

    let (status, location) = authorize(
        &app,
        Some(("demousername2", "demopassword2")),
        &[
            ("response_type", "token"),
            ("client_id", "http://democlient2.com/"),
            ("redirect_uri", "http://democlient2.com/redirect_uri"),
            ("scope", "demoscope1 demoscope2"),
            ("state", "demostate2"),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::FOUND);
    let location = location.unwrap();
    assert!(location.starts_with("http://democlient2.com/redirect_uri#"));
    assert!(query_param(&location, "access_token").is_none());

    let token = fragment_param(&location, "access_token").unwrap();
    assert_eq!(token.len(), 32);
    assert_eq!(
        fragment_param(&location, "token_type").as_deref(),
        Some("bearer")
    );
    assert_eq!(
        fragment_param(&location, "scope").as_deref(),
        Some("demoscope1 demoscope2")
    );
    assert_eq!(
        fragment_param(&location, "state").as_deref(),
        Some("demostate2")
    );

    let (status, resource) = get_resource(&app, &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resource.unwrap()["username"], "demousername2");
}

#[tokio::test]
async fn authorize_without_credentials_is_challenged() {
    let app = app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/oauth2/authorize?response_type=code&client_id=x")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let challenge = response.headers().get(header::WWW_AUTHENTICATE).unwrap();
    assert!(challenge.to_str().unwrap().starts_with("Basic"));
}

#[tokio::test]
async fn authorize_with_wrong_owner_password_is_denied() {
    let app = app();

    let (status, location) = authorize(
        &app,
        Some(("demousername1", "wrongpassword")),
        &[
            ("response_type", "code"),
            ("client_id", "http://democlient1.com/"),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(location.is_none());
}

#[tokio::test]
async fn unsupported_response_type_is_rejected_directly() {
    let app = app();

    let (status, location) = authorize(
        &app,
        Some(("demousername1", "demopassword1")),
        &[
            ("response_type", "device_code"),
            ("client_id", "http://democlient1.com/"),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(location.is_none());
}

#[tokio::test]
async fn unapproved_scope_redirects_with_error() {
    let app = app();

    // demousername1 only ever approved demoscope1 for democlient1.
    let (status, location) = authorize(
        &app,
        Some(("demousername1", "demopassword1")),
        &[
            ("response_type", "code"),
            ("client_id", "http://democlient1.com/"),
            ("scope", "demoscope1 demoscope2"),
            ("state", "demostate1"),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::FOUND);
    let location = location.unwrap();
    assert_eq!(
        query_param(&location, "error").as_deref(),
        Some("access_denied")
    );
    assert_eq!(query_param(&location, "state").as_deref(), Some("demostate1"));
    assert!(query_param(&location, "code").is_none());
}

#[tokio::test]
async fn unknown_scope_redirects_with_invalid_scope() {
    let app = app();

    let (status, location) = authorize(
        &app,
        Some(("demousername1", "demopassword1")),
        &[
            ("response_type", "code"),
            ("client_id", "http://democlient1.com/"),
            ("scope", "nosuchscope"),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(
        query_param(&location.unwrap(), "error").as_deref(),
        Some("invalid_scope")
    );
}

#[tokio::test]
async fn password_grant_with_body_client_credentials() {
    let app = app();

    let (status, body) = post_token(
        &app,
        None,
        &[
            ("grant_type", "password"),
            ("client_id", "http://democlient1.com/"),
            ("client_secret", "demosecret1"),
            ("username", "demousername1"),
            ("password", "demopassword1"),
            ("scope", "demoscope1"),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["scope"], "demoscope1");
    assert!(body["refresh_token"].is_string());
}

#[tokio::test]
async fn client_credentials_grant_issues_no_refresh_token() {
    let app = app();

    let (status, body) = post_token(
        &app,
        Some(("http://democlient1.com/", "demosecret1")),
        &[
            ("grant_type", "client_credentials"),
            ("scope", "demoscope1 demoscope2"),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["refresh_token"].is_null());
    assert_eq!(body["scope"], "demoscope1 demoscope2");
}

#[tokio::test]
async fn invalid_client_secret_gets_challenge() {
    let app = app();

    let (status, body) = post_token(
        &app,
        Some(("http://democlient1.com/", "wrongsecret")),
        &[("grant_type", "client_credentials")],
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_client");
}

#[tokio::test]
async fn unsupported_grant_type_is_rejected() {
    let app = app();

    let (status, body) = post_token(
        &app,
        Some(("http://democlient1.com/", "demosecret1")),
        &[("grant_type", "jwt-bearer")],
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "unsupported_grant_type");
}

#[tokio::test]
async fn refresh_token_rotation() {
    let app = app();

    let (status, body) = post_token(
        &app,
        Some(("http://democlient3.com/", "demosecret3")),
        &[
            ("grant_type", "refresh_token"),
            ("refresh_token", fixtures::REFRESH_TOKEN_LIVE),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let rotated = body["refresh_token"].as_str().unwrap().to_string();
    assert_ne!(rotated, fixtures::REFRESH_TOKEN_LIVE);

    // The presented token is gone.
    let (status, body) = post_token(
        &app,
        Some(("http://democlient3.com/", "demosecret3")),
        &[
            ("grant_type", "refresh_token"),
            ("refresh_token", fixtures::REFRESH_TOKEN_LIVE),
        ],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_grant");

    // The replacement is redeemable.
    let (status, _) = post_token(
        &app,
        Some(("http://democlient3.com/", "demosecret3")),
        &[("grant_type", "refresh_token"), ("refresh_token", &rotated)],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn refresh_token_without_rotation_survives_use() {
    let mut config = ServerConfig::default();
    config.oauth = config.oauth.without_refresh_token_rotation();
    let app = app_with(&config);

    for _ in 0..2 {
        let (status, body) = post_token(
            &app,
            Some(("http://democlient3.com/", "demosecret3")),
            &[
                ("grant_type", "refresh_token"),
                ("refresh_token", fixtures::REFRESH_TOKEN_LIVE),
            ],
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["refresh_token"], fixtures::REFRESH_TOKEN_LIVE);
    }
}

#[tokio::test]
async fn refresh_token_scope_narrowing() {
    let app = app();

    let (status, body) = post_token(
        &app,
        Some(("http://democlient3.com/", "demosecret3")),
        &[
            ("grant_type", "refresh_token"),
            ("refresh_token", fixtures::REFRESH_TOKEN_LIVE),
            ("scope", "demoscope1"),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["scope"], "demoscope1");
}

#[tokio::test]
async fn expired_refresh_token_is_rejected() {
    let app = app();

    let (status, body) = post_token(
        &app,
        Some(("http://democlient1.com/", "demosecret1")),
        &[
            ("grant_type", "refresh_token"),
            ("refresh_token", fixtures::REFRESH_TOKEN_EXPIRED),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_grant");
}

#[tokio::test]
async fn seeded_access_token_reaches_the_resource() {
    let app = app();

    let (status, resource) = get_resource(&app, fixtures::ACCESS_TOKEN_LIVE).await;
    assert_eq!(status, StatusCode::OK);
    let resource = resource.unwrap();
    assert_eq!(resource["username"], "demousername1");
    assert_eq!(resource["scope"], "demoscope1");
}

#[tokio::test]
async fn unknown_bearer_token_is_challenged() {
    let app = app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/oauth2/resource/username")
                .header(header::AUTHORIZATION, "Bearer nosuchtoken")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let challenge = response.headers().get(header::WWW_AUTHENTICATE).unwrap();
    let challenge = challenge.to_str().unwrap();
    assert!(challenge.starts_with("Bearer"));
    // RFC 6750 names unknown tokens invalid_token, not invalid_grant.
    assert!(challenge.contains("error=\"invalid_token\""));
}

#[tokio::test]
async fn client_without_registered_redirect_must_supply_one() {
    let app = app();

    // democlient4 registered no redirect URI.
    let (status, location) = authorize(
        &app,
        Some(("demousername1", "demopassword1")),
        &[
            ("response_type", "code"),
            ("client_id", "http://democlient4.com/"),
        ],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(location.is_none());

    let (status, location) = authorize(
        &app,
        Some(("demousername1", "demopassword1")),
        &[
            ("response_type", "code"),
            ("client_id", "http://democlient4.com/"),
            ("redirect_uri", "http://democlient4.com/redirect_uri"),
        ],
    )
    .await;
    assert_eq!(status, StatusCode::FOUND);
    assert!(
        location
            .unwrap()
            .starts_with("http://democlient4.com/redirect_uri?")
    );
}
