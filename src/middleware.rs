//! Middleware constructors for the HTTP server.
//!
//! Applied in this order (outermost first):
//! 1. CORS, from `security.cors`
//! 2. request logger

use actix_cors::Cors;
use actix_web::http::{header::HeaderName, Method};
use actix_web::middleware;
use hrms_configs::CorsSettings;
use log::{debug, warn};

fn is_wildcard(values: &[String]) -> bool {
    values.iter().any(|v| v == "*")
}

/// Map [`CorsSettings`] onto an actix-cors policy.
///
/// An empty origin list or `"*"` allows any origin. Entries that do not
/// parse as a method or header name are skipped with a warning.
pub fn build_cors(settings: &CorsSettings) -> Cors {
    let mut cors = Cors::default();

    if settings.allowed_origins.is_empty() || is_wildcard(&settings.allowed_origins) {
        cors = cors.allow_any_origin();
        debug!("CORS: allowing any origin");
    } else {
        for origin in &settings.allowed_origins {
            cors = cors.allowed_origin(origin);
        }
        debug!("CORS: allowed origins {:?}", settings.allowed_origins);
    }

    let methods: Vec<Method> = settings
        .allowed_methods
        .iter()
        .filter_map(|m| match m.to_ascii_uppercase().parse() {
            Ok(method) => Some(method),
            Err(_) => {
                warn!("CORS: ignoring invalid method '{}'", m);
                None
            }
        })
        .collect();
    if !methods.is_empty() {
        cors = cors.allowed_methods(methods);
    }

    if is_wildcard(&settings.allowed_headers) {
        cors = cors.allow_any_header();
    } else {
        let headers = parse_headers(&settings.allowed_headers);
        if !headers.is_empty() {
            cors = cors.allowed_headers(headers);
        }
    }

    if !settings.expose_headers.is_empty() {
        cors = cors.expose_headers(parse_headers(&settings.expose_headers));
    }

    if settings.allow_credentials {
        cors = cors.supports_credentials();
    }

    cors.max_age(settings.max_age as usize)
}

fn parse_headers(names: &[String]) -> Vec<HeaderName> {
    names
        .iter()
        .filter_map(|h| match h.parse() {
            Ok(name) => Some(name),
            Err(_) => {
                warn!("CORS: ignoring invalid header '{}'", h);
                None
            }
        })
        .collect()
}

/// Access log: peer, request line, status, bytes, latency.
pub fn request_logger() -> middleware::Logger {
    middleware::Logger::new("%a \"%r\" %s %b %Dms")
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::header, test, web, App, HttpResponse};

    async fn ok() -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    #[actix_web::test]
    async fn test_default_cors_allows_any_origin() {
        let app = test::init_service(
            App::new()
                .wrap(build_cors(&CorsSettings::default()))
                .route("/db", web::get().to(ok)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/db")
            .insert_header((header::ORIGIN, "http://frontend.example"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        assert!(resp
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }

    #[actix_web::test]
    async fn test_restricted_origin_preflight() {
        let settings = CorsSettings {
            allowed_origins: vec!["http://allowed.example".to_string()],
            ..CorsSettings::default()
        };
        let app = test::init_service(
            App::new()
                .wrap(build_cors(&settings))
                .route("/db", web::get().to(ok)),
        )
        .await;

        let req = test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/db")
            .insert_header((header::ORIGIN, "http://allowed.example"))
            .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "GET"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("http://allowed.example")
        );
    }

    #[::core::prelude::v1::test]
    fn test_invalid_headers_are_skipped() {
        let headers = parse_headers(&["Content-Type".to_string(), "bad header".to_string()]);
        assert_eq!(headers.len(), 1);
    }
}
