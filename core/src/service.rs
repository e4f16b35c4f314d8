//! One call per backend endpoint: build, execute, parse.
//!
//! # Design
//! `ApiService` pairs the stateless `RaseedClient` with a `Transport`. Each
//! method performs exactly one round-trip with no retry and no caching.
//! Calls that act on a user's data take the `Session` explicitly. Failures
//! are logged at debug level and returned unchanged so callers can branch on
//! the `ApiError` variant.

use crate::client::RaseedClient;
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::session::Session;
use crate::transport::{Transport, UreqTransport};
use crate::types::{AuthOutcome, Credentials, PassType, Record, SignUpRequest};

/// The auth calls the sign-in and sign-up screens depend on.
pub trait AuthApi {
    fn sign_in(&self, credentials: &Credentials) -> Result<AuthOutcome, ApiError>;
    fn sign_up(&self, request: &SignUpRequest) -> Result<AuthOutcome, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ApiService<T = UreqTransport> {
    client: RaseedClient,
    transport: T,
}

impl ApiService<UreqTransport> {
    pub fn from_config(config: ApiConfig) -> Self {
        Self::new(RaseedClient::new(config), UreqTransport::new())
    }
}

impl<T: Transport> ApiService<T> {
    pub fn new(client: RaseedClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &RaseedClient {
        &self.client
    }

    fn round_trip<R>(
        &self,
        operation: &'static str,
        request: Result<HttpRequest, ApiError>,
        parse: impl FnOnce(&RaseedClient, HttpResponse) -> Result<R, ApiError>,
    ) -> Result<R, ApiError> {
        let result = request
            .and_then(|request| self.transport.execute(&request))
            .and_then(|response| parse(&self.client, response));
        if let Err(e) = &result {
            tracing::debug!(operation, error = %e, status = ?e.status(), "backend call failed");
        }
        result
    }

    /// Liveness check. Any failure, including a timeout, reads as unhealthy.
    pub fn health_check(&self) -> bool {
        match self.transport.execute(&self.client.build_health()) {
            Ok(response) => {
                let healthy = self.client.parse_health(&response);
                if !healthy {
                    tracing::debug!(status = response.status, "health check returned non-200");
                }
                healthy
            }
            Err(e) => {
                tracing::debug!(error = %e, "health check failed");
                false
            }
        }
    }

    #[tracing::instrument(skip(self, session), fields(user = session.user_id()))]
    pub fn warranty_products(&self, session: &Session) -> Result<Vec<Record>, ApiError> {
        self.round_trip(
            "warranty_products",
            Ok(self.client.build_warranty_products(session.user_id())),
            RaseedClient::parse_warranty_products,
        )
    }

    #[tracing::instrument(skip(self, session), fields(user = session.user_id()))]
    pub fn upcoming_reminders(&self, session: &Session, days_ahead: u32) -> Result<Vec<Record>, ApiError> {
        self.round_trip(
            "upcoming_reminders",
            Ok(self.client.build_upcoming_reminders(session.user_id(), days_ahead)),
            RaseedClient::parse_upcoming_reminders,
        )
    }

    #[tracing::instrument(skip(self, session), fields(user = session.user_id()))]
    pub fn create_reminder(&self, session: &Session, product_name: &str) -> Result<Record, ApiError> {
        self.round_trip(
            "create_reminder",
            self.client.build_create_reminder(session.user_id(), product_name),
            RaseedClient::parse_create_reminder,
        )
    }

    #[tracing::instrument(skip(self, session), fields(user = session.user_id()))]
    pub fn create_all_reminders(&self, session: &Session) -> Result<Record, ApiError> {
        self.round_trip(
            "create_all_reminders",
            self.client.build_create_all_reminders(session.user_id()),
            RaseedClient::parse_create_all_reminders,
        )
    }

    #[tracing::instrument(skip(self, session), fields(user = session.user_id()))]
    pub fn eligible_wallet_items(&self, session: &Session) -> Result<Vec<Record>, ApiError> {
        self.round_trip(
            "eligible_wallet_items",
            Ok(self.client.build_eligible_wallet_items(session.user_id())),
            RaseedClient::parse_eligible_wallet_items,
        )
    }

    #[tracing::instrument(skip(self, session), fields(user = session.user_id()))]
    pub fn user_passes(&self, session: &Session) -> Result<Vec<Record>, ApiError> {
        self.round_trip(
            "user_passes",
            Ok(self.client.build_user_passes(session.user_id())),
            RaseedClient::parse_user_passes,
        )
    }

    #[tracing::instrument(skip(self, session), fields(user = session.user_id()))]
    pub fn generate_pass(&self, session: &Session, item_id: &str, pass_type: PassType) -> Result<Record, ApiError> {
        self.round_trip(
            "generate_pass",
            self.client.build_generate_pass(session.user_id(), item_id, pass_type),
            RaseedClient::parse_generate_pass,
        )
    }

    #[tracing::instrument(skip(self))]
    pub fn pass_status(&self, pass_id: &str) -> Result<Record, ApiError> {
        self.round_trip(
            "pass_status",
            Ok(self.client.build_pass_status(pass_id)),
            RaseedClient::parse_pass_status,
        )
    }

    #[tracing::instrument(skip(self))]
    pub fn revoke_pass(&self, pass_id: &str) -> Result<Record, ApiError> {
        self.round_trip(
            "revoke_pass",
            Ok(self.client.build_revoke_pass(pass_id)),
            RaseedClient::parse_revoke_pass,
        )
    }

    #[tracing::instrument(skip(self, session), fields(user = session.user_id()))]
    pub fn receipts(&self, session: &Session, limit: u32, offset: u32) -> Result<Vec<Record>, ApiError> {
        self.round_trip(
            "receipts",
            Ok(self.client.build_receipts(session.user_id(), limit, offset)),
            RaseedClient::parse_receipts,
        )
    }

    #[tracing::instrument(skip(self))]
    pub fn receipt(&self, receipt_id: &str) -> Result<Record, ApiError> {
        self.round_trip(
            "receipt",
            Ok(self.client.build_receipt(receipt_id)),
            RaseedClient::parse_receipt,
        )
    }

    #[tracing::instrument(skip(self, session), fields(user = session.user_id()))]
    pub fn analytics(
        &self,
        session: &Session,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Record, ApiError> {
        self.round_trip(
            "analytics",
            Ok(self.client.build_analytics(session.user_id(), start_date, end_date)),
            RaseedClient::parse_analytics,
        )
    }

    #[tracing::instrument(skip(self, session, message), fields(user = session.user_id()))]
    pub fn chat(&self, session: &Session, message: &str) -> Result<Record, ApiError> {
        self.round_trip(
            "chat",
            self.client.build_chat(session.user_id(), message),
            RaseedClient::parse_chat,
        )
    }

    #[tracing::instrument(skip(self, session), fields(user = session.user_id()))]
    pub fn dashboard(&self, session: &Session) -> Result<Record, ApiError> {
        self.round_trip(
            "dashboard",
            Ok(self.client.build_dashboard(session.user_id())),
            RaseedClient::parse_dashboard,
        )
    }

    #[tracing::instrument(skip(self, session), fields(user = session.user_id()))]
    pub fn graphs(&self, session: &Session, page: u32, limit: u32) -> Result<Vec<Record>, ApiError> {
        self.round_trip(
            "graphs",
            Ok(self.client.build_graphs(session.user_id(), page, limit)),
            RaseedClient::parse_graphs,
        )
    }

    #[tracing::instrument(skip(self))]
    pub fn graph_details(&self, graph_id: &str) -> Result<Record, ApiError> {
        self.round_trip(
            "graph_details",
            Ok(self.client.build_graph_details(graph_id)),
            RaseedClient::parse_graph_details,
        )
    }
}

impl<T: Transport> AuthApi for ApiService<T> {
    #[tracing::instrument(skip(self, credentials), fields(email = %credentials.email))]
    fn sign_in(&self, credentials: &Credentials) -> Result<AuthOutcome, ApiError> {
        self.round_trip("sign_in", self.client.build_sign_in(credentials), RaseedClient::parse_sign_in)
    }

    #[tracing::instrument(skip(self, request), fields(email = %request.email))]
    fn sign_up(&self, request: &SignUpRequest) -> Result<AuthOutcome, ApiError> {
        self.round_trip("sign_up", self.client.build_sign_up(request), RaseedClient::parse_sign_up)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::time::Duration;

    use super::*;
    use crate::http::HttpMethod;

    /// Replays canned responses and records every request it was given.
    struct Scripted {
        responses: RefCell<Vec<Result<HttpResponse, ApiError>>>,
        seen: RefCell<Vec<HttpRequest>>,
    }

    impl Scripted {
        fn new(responses: Vec<Result<HttpResponse, ApiError>>) -> Self {
            Self {
                responses: RefCell::new(responses),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl Transport for Scripted {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
            self.seen.borrow_mut().push(request.clone());
            self.responses.borrow_mut().remove(0)
        }
    }

    fn service(responses: Vec<Result<HttpResponse, ApiError>>) -> ApiService<Scripted> {
        ApiService::new(RaseedClient::with_base_url("http://backend.test"), Scripted::new(responses))
    }

    fn session() -> Session {
        Session::for_user("priya@example.com")
    }

    #[test]
    fn health_check_true_on_200() {
        assert!(service(vec![Ok(HttpResponse::new(200, "{\"status\":\"healthy\"}"))]).health_check());
    }

    #[test]
    fn health_check_swallows_transport_failures() {
        let svc = service(vec![Err(ApiError::Timeout(Duration::from_secs(30)))]);
        assert!(!svc.health_check());
        let svc = service(vec![Err(ApiError::Transport("connection refused".to_string()))]);
        assert!(!svc.health_check());
    }

    #[test]
    fn health_check_false_on_server_error() {
        assert!(!service(vec![Ok(HttpResponse::new(503, ""))]).health_check());
    }

    #[test]
    fn warranty_products_issues_exactly_one_request() {
        let svc = service(vec![Ok(HttpResponse::new(
            200,
            r#"{"warranty_products":[{"name":"TV","expiry":"2026-01-01"}]}"#,
        ))]);
        let products = svc.warranty_products(&session()).unwrap();
        assert_eq!(products.len(), 1);

        let seen = svc.transport.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method, HttpMethod::Get);
        assert!(seen[0].url.ends_with("/warranty-products/priya%40example.com"));
    }

    #[test]
    fn status_failure_is_not_retried() {
        let svc = service(vec![Ok(HttpResponse::new(500, "boom"))]);
        let err = svc.upcoming_reminders(&session(), 30).unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(svc.transport.seen.borrow().len(), 1);
    }

    #[test]
    fn transport_error_passes_through() {
        let svc = service(vec![Err(ApiError::Transport("dns".to_string()))]);
        let err = svc.dashboard(&session()).unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[test]
    fn revoke_pass_sends_delete() {
        let svc = service(vec![Ok(HttpResponse::new(200, r#"{"success":true,"pass_id":"p1"}"#))]);
        let revoked = svc.revoke_pass("p1").unwrap();
        assert_eq!(revoked["pass_id"], "p1");

        let seen = svc.transport.seen.borrow();
        assert_eq!(seen[0].method, HttpMethod::Delete);
        assert!(seen[0].url.ends_with("/wallet/pass/p1"));
    }

    #[test]
    fn receipts_page_uses_session_user() {
        let svc = service(vec![Ok(HttpResponse::new(200, "[]"))]);
        assert!(svc.receipts(&session(), 50, 0).unwrap().is_empty());
        assert!(svc.transport.seen.borrow()[0]
            .url
            .ends_with("/receipts?user_id=priya%40example.com&limit=50&offset=0"));
    }

    #[test]
    fn sign_in_goes_through_auth_api() {
        let svc = service(vec![Ok(HttpResponse::new(200, r#"{"success":true,"user_id":"priya@example.com"}"#))]);
        let creds = Credentials {
            email: "priya@example.com".to_string(),
            password: "secret1".to_string(),
        };
        let outcome = svc.sign_in(&creds).unwrap();
        assert_eq!(outcome.user_id.as_deref(), Some("priya@example.com"));
        assert!(svc.transport.seen.borrow()[0].url.ends_with("/auth/signin"));
    }
}
