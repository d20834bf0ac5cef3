// 🌐 HTTP API - axum router over the directory service
//
// Reads are public; POST and DELETE need the bearer token.

pub mod auth;
pub mod error;
pub mod handlers;

use crate::config::Config;
use crate::directory::DirectoryService;
use axum::http::{HeaderName, HeaderValue, Method};
use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: DirectoryService,
    /// SHA-256 of the configured API token; `None` closes the write routes
    pub token_digest: Option<Vec<u8>>,
}

impl AppState {
    pub fn new(service: DirectoryService, config: &Config) -> Self {
        let token_digest = config
            .writes_enabled()
            .then(|| auth::token_digest(&config.api_token));
        AppState {
            service,
            token_digest,
        }
    }
}

/// Build the full application router.
pub fn router(service: DirectoryService, config: &Config) -> Router {
    let state = AppState::new(service, config);
    let require_token = middleware::from_fn_with_state(state.clone(), auth::require_bearer);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/v1/swift-codes",
            post(handlers::create_swift_code)
                .route_layer(require_token.clone())
                .fallback(handlers::route_not_found),
        )
        .route(
            "/v1/swift-codes/country/:iso2",
            get(handlers::get_country_codes).fallback(handlers::route_not_found),
        )
        .route(
            "/v1/swift-codes/:code",
            get(handlers::get_swift_code)
                .merge(delete(handlers::delete_swift_code).route_layer(require_token))
                .fallback(handlers::route_not_found),
        )
        .fallback(handlers::route_not_found)
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy from configuration. `*` in a list means "any"; entries that
/// are not valid header values are skipped.
pub fn cors_layer(config: &Config) -> CorsLayer {
    let wildcard = |list: &[String]| list.iter().any(|v| v == "*");

    let origins = if wildcard(&config.cors_allowed_origins) {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(config.cors_allowed_origins.iter().filter_map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| warn!(origin = %origin, "ignoring invalid CORS origin"))
                .ok()
        }))
    };

    let methods = if wildcard(&config.cors_allowed_methods) {
        AllowMethods::any()
    } else {
        let methods: Vec<Method> = config
            .cors_allowed_methods
            .iter()
            .filter_map(|m| Method::from_bytes(m.to_ascii_uppercase().as_bytes()).ok())
            .collect();
        AllowMethods::list(methods)
    };

    let headers = if wildcard(&config.cors_allowed_headers) {
        AllowHeaders::any()
    } else {
        let headers: Vec<HeaderName> = config
            .cors_allowed_headers
            .iter()
            .filter_map(|h| HeaderName::from_bytes(h.as_bytes()).ok())
            .collect();
        AllowHeaders::list(headers)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::BankRecord;
    use crate::store::MemoryStore;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    const TOKEN: &str = "s3cret";

    fn seeded_service() -> DirectoryService {
        let service = DirectoryService::new(Arc::new(MemoryStore::new()));
        service
            .bulk_create(vec![
                BankRecord::new("BCHICLRMXXX", "CL", "BANCO DE CHILE")
                    .with_address("AHUMADA 251")
                    .with_country_name("CHILE"),
                BankRecord::new("BCHICLRM001", "CL", "BANCO DE CHILE").with_country_name("CHILE"),
                BankRecord::new("BCHICLRM002", "CL", "BANCO DE CHILE").with_country_name("CHILE"),
                BankRecord::new("AAISALTRXXX", "AL", "UNITED BANK OF ALBANIA SH.A")
                    .with_country_name("ALBANIA"),
            ])
            .unwrap();
        service
    }

    fn app_with(service: DirectoryService, token: &str) -> Router {
        let config = Config::from_lookup(|name| match name {
            "API_TOKEN" => Some(token.to_string()),
            _ => None,
        });
        router(service, &config)
    }

    fn app() -> Router {
        app_with(seeded_service(), TOKEN)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn authed(method: &str, uri: &str, body: Body) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", TOKEN))
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(app(), get_req("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_headquarters_lists_branches() {
        let (status, body) = send(app(), get_req("/v1/swift-codes/BCHICLRMXXX")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["swiftCode"], "BCHICLRMXXX");
        assert_eq!(body["isHeadquarter"], true);
        assert_eq!(body["address"], "AHUMADA 251");
        assert_eq!(body["countryName"], "CHILE");

        let branches = body["branches"].as_array().unwrap();
        assert_eq!(branches.len(), 2);
        assert_eq!(branches[0]["swiftCode"], "BCHICLRM001");
        assert_eq!(branches[0]["isHeadquarter"], false);
    }

    #[tokio::test]
    async fn test_branch_has_no_branches_field() {
        let (status, body) = send(app(), get_req("/v1/swift-codes/bchiclrm001")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isHeadquarter"], false);
        assert!(body.get("branches").is_none());
    }

    #[tokio::test]
    async fn test_get_code_errors() {
        let (status, body) = send(app(), get_req("/v1/swift-codes/SHORT")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid Swift code format");

        let (status, body) = send(app(), get_req("/v1/swift-codes/ZZZZZZZZXXX")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Bank not found");
    }

    #[tokio::test]
    async fn test_country_listing() {
        let (status, body) = send(app(), get_req("/v1/swift-codes/country/cl")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["countryISO2"], "CL");
        assert_eq!(body["countryName"], "CHILE");
        assert_eq!(body["swiftCodes"].as_array().unwrap().len(), 3);

        // Unknown country: empty listing, not an error
        let (status, body) = send(app(), get_req("/v1/swift-codes/country/ZZ")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["countryName"], "");
        assert!(body["swiftCodes"].as_array().unwrap().is_empty());

        let (status, _) = send(app(), get_req("/v1/swift-codes/country/CHL")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_requires_token() {
        let body = r#"{"swiftCode":"BAERMCMCXXX","countryISO2":"MC","bankName":"Julius Baer","countryName":"MONACO","address":"12 BD DES MOULINS"}"#;

        let unauthenticated = Request::builder()
            .method("POST")
            .uri("/v1/swift-codes")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();
        let (status, reply) = send(app(), unauthenticated).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(reply["message"], "Unauthorized");

        let service = seeded_service();
        let (status, reply) = send(
            app_with(service.clone(), TOKEN),
            authed("POST", "/v1/swift-codes", Body::from(body)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(reply["message"], "Bank added successfully");

        let stored = service.get("BAERMCMCXXX").unwrap();
        assert_eq!(stored.name, "JULIUS BAER");
        assert_eq!(service.country_name("MC").unwrap(), "MONACO");
    }

    #[tokio::test]
    async fn test_create_rejects_bad_input() {
        let (status, reply) = send(app(), authed("POST", "/v1/swift-codes", Body::from("{not json"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(reply["message"], "Invalid request body");

        let body = r#"{"swiftCode":"BAERMCMCXXX","countryISO2":"MCO","bankName":"X","countryName":"MONACO"}"#;
        let (status, reply) = send(app(), authed("POST", "/v1/swift-codes", Body::from(body))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(reply["message"].as_str().unwrap().contains("countryISO2"));
    }

    #[tokio::test]
    async fn test_empty_token_closes_writes() {
        let request = Request::builder()
            .method("DELETE")
            .uri("/v1/swift-codes/BCHICLRM001")
            .header(header::AUTHORIZATION, "Bearer ")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(app_with(seeded_service(), ""), request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_delete_headquarters_cascades() {
        let service = seeded_service();
        let (status, reply) = send(
            app_with(service.clone(), TOKEN),
            authed("DELETE", "/v1/swift-codes/BCHICLRMXXX", Body::empty()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply["message"], "Successfully deleted");

        assert!(service.list_by_country("CL").unwrap().records.is_empty());
        assert!(service.get("AAISALTRXXX").is_ok());
    }

    #[tokio::test]
    async fn test_delete_branch_is_single() {
        let service = seeded_service();
        let (status, _) = send(
            app_with(service.clone(), TOKEN),
            authed("DELETE", "/v1/swift-codes/BCHICLRM001", Body::empty()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let listing = service.list_by_country("CL").unwrap();
        assert_eq!(listing.records.len(), 2);
        assert!(service.get("BCHICLRMXXX").is_ok());
    }

    #[tokio::test]
    async fn test_delete_malformed_headquarters_code() {
        let (status, _) = send(app(), authed("DELETE", "/v1/swift-codes/ABXXX", Body::empty())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_headquarters_code_with_padding_checks_prefix() {
        let service = seeded_service();
        // "ABXXX " percent-encoded: trailing space must not bypass the prefix check
        let (status, _) = send(
            app_with(service.clone(), TOKEN),
            authed("DELETE", "/v1/swift-codes/ABXXX%20", Body::empty()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // A padded well-formed headquarters code still cascades
        let (status, _) = send(
            app_with(service.clone(), TOKEN),
            authed("DELETE", "/v1/swift-codes/%20BCHICLRMXXX%20", Body::empty()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(service.list_by_country("CL").unwrap().records.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (status, body) = send(app(), get_req("/v2/nothing")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Route GET /v2/nothing not found");

        let request = Request::builder()
            .method("PUT")
            .uri("/v1/swift-codes/BCHICLRMXXX")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Route PUT /v1/swift-codes/BCHICLRMXXX not found");
    }

    #[test]
    fn test_cors_layer_builds_from_lists() {
        let config = Config::from_lookup(|name| match name {
            "CORS_ALLOWED_ORIGINS" => Some("https://bank.example, not a header\u{7f}".to_string()),
            "CORS_ALLOWED_HEADERS" => Some("*".to_string()),
            _ => None,
        });
        // Invalid entries are dropped rather than failing startup
        let _layer = cors_layer(&config);
    }
}
