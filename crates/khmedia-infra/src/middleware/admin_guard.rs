use crate::admin_guard::AdminAccessGuard;
use crate::error::ErrorResponse;
use crate::ip::extract_client_ip;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use khmedia_core::{AppError, ErrorMetadata};
use std::net::SocketAddr;
use std::sync::Arc;

/// Admin access middleware
///
/// Requests under the admin prefix must come from an allowed IP that is not
/// blocked. Refused requests get `403` with an `AccessDenied` body. A `401`
/// from the inner service counts as a failed attempt for the client IP.
/// Everything outside the prefix passes through untouched.
pub async fn admin_guard_middleware(
    State(guard): State<Arc<AdminAccessGuard>>,
    request: Request,
    next: Next,
) -> Response {
    if !guard.protects(request.uri().path()) {
        return next.run(request).await;
    }

    let socket_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let ip = extract_client_ip(
        request.headers(),
        socket_addr.as_ref(),
        guard.trusted_proxy_count(),
    );

    if let Err(reason) = guard.check(&ip).await {
        tracing::warn!(
            ip = %ip,
            path = %request.uri().path(),
            reason = reason.message(),
            "Admin access denied"
        );
        let err = AppError::AccessDenied(reason.message().to_string());
        let status =
            StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::FORBIDDEN);
        let body = ErrorResponse::new(err.client_message()).with_type(err.error_type());
        return (status, Json(body)).into_response();
    }

    let response = next.run(request).await;
    if response.status() == StatusCode::UNAUTHORIZED {
        guard.record_failed_attempt(&ip).await;
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware::from_fn_with_state, routing::get, Router};
    use axum_test::TestServer;
    use khmedia_core::AdminGuardConfig;

    fn server(debug: bool) -> TestServer {
        let guard = Arc::new(AdminAccessGuard::new(&AdminGuardConfig {
            admin_url: "secure-admin/".to_string(),
            admin_api_token: Some("token".to_string()),
            deployment_ip: Some("203.0.113.7".to_string()),
            max_attempts: 3,
            block_duration_secs: 900,
            attempt_window_secs: 900,
            trusted_proxy_count: 1,
            debug,
        }));

        let app = Router::new()
            .route("/public", get(|| async { "ok" }))
            .route("/secure-admin/ok", get(|| async { "admin" }))
            .route(
                "/secure-admin/login",
                get(|| async { StatusCode::UNAUTHORIZED }),
            )
            .layer(from_fn_with_state(guard, admin_guard_middleware));

        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn test_public_paths_bypass_guard() {
        let server = server(false);
        let response = server
            .get("/public")
            .add_header("x-forwarded-for", "9.9.9.9")
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_ip_is_forbidden() {
        let server = server(false);
        let response = server
            .get("/secure-admin/ok")
            .add_header("x-forwarded-for", "9.9.9.9")
            .await;
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Access denied: IP not allowed");
        assert_eq!(body["error_type"], "AccessDenied");

        let response = server
            .get("/secure-admin/ok")
            .add_header("x-forwarded-for", "203.0.113.7")
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_forged_forwarded_chain_is_forbidden() {
        let server = server(false);

        // Client-supplied loopback entry ahead of the address the proxy appended
        let response = server
            .get("/secure-admin/ok")
            .add_header("x-forwarded-for", "127.0.0.1, 9.9.9.9")
            .await;
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

        let response = server
            .get("/secure-admin/ok")
            .add_header("x-forwarded-for", "9.9.9.9")
            .add_header("x-real-ip", "127.0.0.1")
            .await;
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_forged_entries_share_one_counter() {
        let server = server(true);
        for forged in ["127.0.0.1", "::1", "10.0.0.1"] {
            server
                .get("/secure-admin/login")
                .add_header("x-forwarded-for", format!("{}, 198.51.100.20", forged))
                .await;
        }

        let response = server
            .get("/secure-admin/ok")
            .add_header("x-forwarded-for", "127.0.0.2, 198.51.100.20")
            .await;
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_unauthorized_responses_lead_to_block() {
        let server = server(true);
        for _ in 0..3 {
            let response = server
                .get("/secure-admin/login")
                .add_header("x-forwarded-for", "198.51.100.9")
                .await;
            assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        }

        let response = server
            .get("/secure-admin/ok")
            .add_header("x-forwarded-for", "198.51.100.9")
            .await;
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Access denied: Too many attempts");

        let other = server
            .get("/secure-admin/ok")
            .add_header("x-forwarded-for", "198.51.100.10")
            .await;
        assert_eq!(other.status_code(), StatusCode::OK);
    }
}
