//! Stateless HTTP request builder and response parser for the receipt backend.
//!
//! # Design
//! `RaseedClient` holds only an `ApiConfig` and carries no mutable state
//! between calls. Each endpoint is split into a `build_*` method that produces
//! an `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The caller executes the actual HTTP round-trip (see `transport`), keeping
//! this module deterministic and free of I/O.
//!
//! Success is exactly status 200. Most list-bearing responses nest the list
//! under a named field; a missing field is an empty list, not an error. The
//! receipt listing is the exception and returns a bare JSON array.

use serde::Serialize;
use serde_json::Value;

use crate::config::{endpoints, ApiConfig};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    AuthOutcome, ChatRequest, CreateAllRemindersRequest, CreateReminderRequest, Credentials,
    GeneratePassRequest, PassType, Record, SignUpRequest,
};

/// Look-ahead window used by the backend when none is given.
pub const DEFAULT_DAYS_AHEAD: u32 = 30;

/// Page size for the receipt listing; the backend caps it at 100.
pub const DEFAULT_RECEIPT_LIMIT: u32 = 50;

pub const DEFAULT_GRAPH_LIMIT: u32 = 10;

/// Synchronous, stateless client for the receipt backend.
#[derive(Debug, Clone)]
pub struct RaseedClient {
    config: ApiConfig,
}

impl RaseedClient {
    pub fn new(config: ApiConfig) -> Self {
        Self { config }
    }

    /// Client for `base_url` with default timeouts.
    pub fn with_base_url(base_url: &str) -> Self {
        Self::new(ApiConfig::default().with_base_url(base_url))
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    /// `{base}{path}/{segment}` with `segment` percent-encoded.
    fn url_with_segment(&self, path: &str, segment: &str) -> String {
        format!("{}{path}/{}", self.config.base_url, urlencoding::encode(segment))
    }

    fn get(&self, url: String) -> HttpRequest {
        HttpRequest::json(HttpMethod::Get, url, None, self.config.request_timeout)
    }

    fn delete(&self, url: String) -> HttpRequest {
        HttpRequest::json(HttpMethod::Delete, url, None, self.config.request_timeout)
    }

    fn post<T: Serialize>(&self, url: String, payload: &T, long_running: bool) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(payload).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let timeout = if long_running {
            self.config.upload_timeout
        } else {
            self.config.request_timeout
        };
        Ok(HttpRequest::json(HttpMethod::Post, url, Some(body), timeout))
    }

    // -- health --------------------------------------------------------------

    pub fn build_health(&self) -> HttpRequest {
        self.get(self.url(endpoints::HEALTH))
    }

    /// Healthy only on 200; the body is not inspected.
    pub fn parse_health(&self, response: &HttpResponse) -> bool {
        response.status == 200
    }

    // -- auth ----------------------------------------------------------------

    pub fn build_sign_in(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        self.post(self.url(endpoints::SIGN_IN), credentials, false)
    }

    pub fn parse_sign_in(&self, response: HttpResponse) -> Result<AuthOutcome, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn build_sign_up(&self, request: &SignUpRequest) -> Result<HttpRequest, ApiError> {
        self.post(self.url(endpoints::SIGN_UP), request, false)
    }

    pub fn parse_sign_up(&self, response: HttpResponse) -> Result<AuthOutcome, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    // -- warranty reminders --------------------------------------------------

    pub fn build_warranty_products(&self, user_id: &str) -> HttpRequest {
        self.get(self.url_with_segment(endpoints::WARRANTY_PRODUCTS, user_id))
    }

    pub fn parse_warranty_products(&self, response: HttpResponse) -> Result<Vec<Record>, ApiError> {
        parse_list(&response, "warranty_products")
    }

    pub fn build_upcoming_reminders(&self, user_id: &str, days_ahead: u32) -> HttpRequest {
        let url = format!(
            "{}?user_id={}&days_ahead={days_ahead}",
            self.url(endpoints::UPCOMING_REMINDERS),
            urlencoding::encode(user_id)
        );
        self.get(url)
    }

    pub fn parse_upcoming_reminders(&self, response: HttpResponse) -> Result<Vec<Record>, ApiError> {
        parse_list(&response, "reminders")
    }

    pub fn build_create_reminder(&self, user_id: &str, product_name: &str) -> Result<HttpRequest, ApiError> {
        let payload = CreateReminderRequest {
            user_id: user_id.to_string(),
            product_name: product_name.to_string(),
        };
        self.post(self.url(endpoints::CREATE_REMINDER), &payload, false)
    }

    pub fn parse_create_reminder(&self, response: HttpResponse) -> Result<Record, ApiError> {
        parse_record(&response)
    }

    /// Creates calendar reminders for every expiring warranty; can take a while.
    pub fn build_create_all_reminders(&self, user_id: &str) -> Result<HttpRequest, ApiError> {
        let payload = CreateAllRemindersRequest {
            user_id: user_id.to_string(),
        };
        self.post(self.url(endpoints::CREATE_ALL_REMINDERS), &payload, true)
    }

    pub fn parse_create_all_reminders(&self, response: HttpResponse) -> Result<Record, ApiError> {
        parse_record(&response)
    }

    // -- wallet --------------------------------------------------------------

    pub fn build_eligible_wallet_items(&self, user_id: &str) -> HttpRequest {
        self.get(self.url_with_segment(endpoints::WALLET_ELIGIBLE_ITEMS, user_id))
    }

    pub fn parse_eligible_wallet_items(&self, response: HttpResponse) -> Result<Vec<Record>, ApiError> {
        parse_list(&response, "items")
    }

    pub fn build_user_passes(&self, user_id: &str) -> HttpRequest {
        self.get(self.url_with_segment(endpoints::WALLET_USER_PASSES, user_id))
    }

    pub fn parse_user_passes(&self, response: HttpResponse) -> Result<Vec<Record>, ApiError> {
        parse_list(&response, "passes")
    }

    pub fn build_generate_pass(
        &self,
        user_id: &str,
        item_id: &str,
        pass_type: PassType,
    ) -> Result<HttpRequest, ApiError> {
        let payload = GeneratePassRequest {
            item_id: item_id.to_string(),
            pass_type,
            user_id: user_id.to_string(),
        };
        self.post(self.url(endpoints::WALLET_GENERATE_PASS), &payload, true)
    }

    pub fn parse_generate_pass(&self, response: HttpResponse) -> Result<Record, ApiError> {
        parse_record(&response)
    }

    pub fn build_pass_status(&self, pass_id: &str) -> HttpRequest {
        self.get(self.url_with_segment(endpoints::WALLET_PASS_STATUS, pass_id))
    }

    pub fn parse_pass_status(&self, response: HttpResponse) -> Result<Record, ApiError> {
        parse_record(&response)
    }

    /// Remove a pass from the user's wallet.
    pub fn build_revoke_pass(&self, pass_id: &str) -> HttpRequest {
        self.delete(self.url_with_segment(endpoints::WALLET_PASS, pass_id))
    }

    pub fn parse_revoke_pass(&self, response: HttpResponse) -> Result<Record, ApiError> {
        parse_record(&response)
    }

    // -- receipts ------------------------------------------------------------

    pub fn build_receipts(&self, user_id: &str, limit: u32, offset: u32) -> HttpRequest {
        let url = format!(
            "{}?user_id={}&limit={limit}&offset={offset}",
            self.url(endpoints::RECEIPTS),
            urlencoding::encode(user_id)
        );
        self.get(url)
    }

    /// The listing is a bare array, newest first.
    pub fn parse_receipts(&self, response: HttpResponse) -> Result<Vec<Record>, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn build_receipt(&self, receipt_id: &str) -> HttpRequest {
        self.get(self.url_with_segment(endpoints::RECEIPTS, receipt_id))
    }

    pub fn parse_receipt(&self, response: HttpResponse) -> Result<Record, ApiError> {
        parse_record(&response)
    }

    /// Spending summary, optionally bounded by ISO dates (inclusive).
    pub fn build_analytics(&self, user_id: &str, start_date: Option<&str>, end_date: Option<&str>) -> HttpRequest {
        let mut url = self.url_with_segment(endpoints::ANALYTICS, user_id);
        let params: Vec<String> = [("start_date", start_date), ("end_date", end_date)]
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| format!("{key}={}", urlencoding::encode(v))))
            .collect();
        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.join("&"));
        }
        self.get(url)
    }

    pub fn parse_analytics(&self, response: HttpResponse) -> Result<Record, ApiError> {
        parse_record(&response)
    }

    // -- chat and dashboard --------------------------------------------------

    pub fn build_chat(&self, user_email: &str, message: &str) -> Result<HttpRequest, ApiError> {
        let payload = ChatRequest {
            user_email: user_email.to_string(),
            message: message.to_string(),
            message_type: "text".to_string(),
        };
        self.post(self.url(endpoints::CHAT), &payload, false)
    }

    pub fn parse_chat(&self, response: HttpResponse) -> Result<Record, ApiError> {
        parse_record(&response)
    }

    pub fn build_dashboard(&self, user_id: &str) -> HttpRequest {
        self.get(self.url_with_segment(endpoints::DASHBOARD, user_id))
    }

    pub fn parse_dashboard(&self, response: HttpResponse) -> Result<Record, ApiError> {
        parse_record(&response)
    }

    /// `page` starts at 1.
    pub fn build_graphs(&self, user_id: &str, page: u32, limit: u32) -> HttpRequest {
        let url = format!(
            "{}?page={page}&limit={limit}",
            self.url_with_segment(endpoints::GRAPHS, user_id)
        );
        self.get(url)
    }

    pub fn parse_graphs(&self, response: HttpResponse) -> Result<Vec<Record>, ApiError> {
        parse_list(&response, "graphs")
    }

    pub fn build_graph_details(&self, graph_id: &str) -> HttpRequest {
        self.get(format!("{}/details", self.url_with_segment(endpoints::GRAPH_DETAILS, graph_id)))
    }

    /// An unknown graph still comes back as 200 with `"success": false`.
    pub fn parse_graph_details(&self, response: HttpResponse) -> Result<Record, ApiError> {
        parse_record(&response)
    }
}

/// Anything but 200 is a failure carrying the status code.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.status == 200 {
        return Ok(());
    }
    Err(ApiError::Status {
        status: response.status,
        body: response.body.clone(),
    })
}

fn decode<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

fn parse_record(response: &HttpResponse) -> Result<Record, ApiError> {
    check_status(response)?;
    decode(&response.body)
}

fn parse_list(response: &HttpResponse, field: &str) -> Result<Vec<Record>, ApiError> {
    let mut record = parse_record(response)?;
    match record.remove(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(value) => serde_json::from_value(value)
            .map_err(|e| ApiError::Decode(format!("field {field:?}: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::http::JSON_CONTENT_TYPE;

    fn client() -> RaseedClient {
        RaseedClient::new(
            ApiConfig::default()
                .with_base_url("http://localhost:8080")
                .with_request_timeout(Duration::from_secs(10))
                .with_upload_timeout(Duration::from_secs(90)),
        )
    }

    fn json_header() -> Vec<(String, String)> {
        vec![(JSON_CONTENT_TYPE.0.to_string(), JSON_CONTENT_TYPE.1.to_string())]
    }

    #[test]
    fn build_health_produces_correct_request() {
        let req = client().build_health();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:8080/health");
        assert!(req.body.is_none());
        assert_eq!(req.headers, json_header());
        assert_eq!(req.timeout, Duration::from_secs(10));
    }

    #[test]
    fn parse_health_is_true_only_for_200() {
        let c = client();
        assert!(c.parse_health(&HttpResponse::new(200, "")));
        assert!(!c.parse_health(&HttpResponse::new(204, "")));
        assert!(!c.parse_health(&HttpResponse::new(503, "{\"status\":\"unhealthy\"}")));
    }

    #[test]
    fn build_sign_in_posts_credentials() {
        let creds = Credentials {
            email: "priya@example.com".to_string(),
            password: "secret1".to_string(),
        };
        let req = client().build_sign_in(&creds).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:8080/auth/signin");
        assert_eq!(req.headers, json_header());
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["email"], "priya@example.com");
        assert_eq!(body["password"], "secret1");
    }

    #[test]
    fn parse_sign_in_reads_outcome() {
        let response = HttpResponse::new(200, r#"{"success":true,"user_id":"priya@example.com"}"#);
        let outcome = client().parse_sign_in(response).unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.user_id.as_deref(), Some("priya@example.com"));
    }

    #[test]
    fn parse_sign_in_unauthorized() {
        let err = client()
            .parse_sign_in(HttpResponse::new(401, r#"{"detail":"Invalid credentials"}"#))
            .unwrap_err();
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn warranty_products_encodes_email_in_path() {
        let req = client().build_warranty_products("priya+home@example.com");
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(
            req.url,
            "http://localhost:8080/warranty-reminders/warranty-products/priya%2Bhome%40example.com"
        );
    }

    #[test]
    fn parse_warranty_products_returns_list() {
        let response = HttpResponse::new(
            200,
            r#"{"success":true,"warranty_products":[{"name":"TV","expiry":"2026-01-01"}],"count":1}"#,
        );
        let products = client().parse_warranty_products(response).unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0]["name"], "TV");
        assert_eq!(products[0]["expiry"], "2026-01-01");
        assert_eq!(products[0].len(), 2);
    }

    #[test]
    fn parse_warranty_products_not_found() {
        let err = client()
            .parse_warranty_products(HttpResponse::new(404, ""))
            .unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 404, .. }));
    }

    #[test]
    fn upcoming_reminders_puts_user_in_query() {
        let req = client().build_upcoming_reminders("a b@example.com", 14);
        assert_eq!(
            req.url,
            "http://localhost:8080/warranty-reminders/upcoming/?user_id=a%20b%40example.com&days_ahead=14"
        );
    }

    #[test]
    fn parse_upcoming_reminders_missing_field_is_empty() {
        let response = HttpResponse::new(200, r#"{"success":true,"count":0}"#);
        let reminders = client().parse_upcoming_reminders(response).unwrap();
        assert!(reminders.is_empty());
    }

    #[test]
    fn parse_upcoming_reminders_null_field_is_empty() {
        let response = HttpResponse::new(200, r#"{"reminders":null}"#);
        assert!(client().parse_upcoming_reminders(response).unwrap().is_empty());
    }

    #[test]
    fn parse_list_rejects_non_array_field() {
        let response = HttpResponse::new(200, r#"{"reminders":"soon"}"#);
        let err = client().parse_upcoming_reminders(response).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn parse_list_bad_json() {
        let err = client()
            .parse_eligible_wallet_items(HttpResponse::new(200, "not json"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn build_create_reminder_body() {
        let req = client().build_create_reminder("u@example.com", "Air Fryer").unwrap();
        assert_eq!(req.url, "http://localhost:8080/warranty-reminders/create-single/");
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["user_id"], "u@example.com");
        assert_eq!(body["product_name"], "Air Fryer");
        assert_eq!(req.timeout, Duration::from_secs(10));
    }

    #[test]
    fn long_running_calls_use_upload_timeout() {
        let c = client();
        let bulk = c.build_create_all_reminders("u@example.com").unwrap();
        assert_eq!(bulk.timeout, Duration::from_secs(90));
        let pass = c.build_generate_pass("u@example.com", "r-1", PassType::Receipt).unwrap();
        assert_eq!(pass.timeout, Duration::from_secs(90));
        assert_eq!(pass.url, "http://localhost:8080/wallet/generate-pass");
        let body: Value = serde_json::from_str(pass.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["pass_type"], "receipt");
    }

    #[test]
    fn parse_user_passes_extracts_passes() {
        let response = HttpResponse::new(
            200,
            r#"{"success":true,"user_id":"u","passes":[{"pass_id":"p1"},{"pass_id":"p2"}],"total_passes":2}"#,
        );
        let passes = client().parse_user_passes(response).unwrap();
        assert_eq!(passes.len(), 2);
        assert_eq!(passes[1]["pass_id"], "p2");
    }

    #[test]
    fn build_chat_sends_text_message() {
        let req = client().build_chat("u@example.com", "How much did I spend?").unwrap();
        assert_eq!(req.url, "http://localhost:8080/economix/chat");
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["message_type"], "text");
        assert_eq!(body["user_email"], "u@example.com");
    }

    #[test]
    fn parse_dashboard_returns_record_as_is() {
        let response = HttpResponse::new(200, r#"{"success":true,"has_data":false,"stats":{"total_graphs":0}}"#);
        let dashboard = client().parse_dashboard(response).unwrap();
        assert_eq!(dashboard["has_data"], false);
        assert_eq!(dashboard["stats"]["total_graphs"], 0);
    }

    #[test]
    fn parse_record_rejects_array_body() {
        let err = client().parse_chat(HttpResponse::new(200, "[]")).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn revoke_pass_is_a_delete_with_encoded_id() {
        let req = client().build_revoke_pass("pass/1 a");
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.url, "http://localhost:8080/wallet/pass/pass%2F1%20a");
        assert!(req.body.is_none());
        assert_eq!(req.timeout, Duration::from_secs(10));
    }

    #[test]
    fn pass_status_reads_record() {
        let c = client();
        assert_eq!(c.build_pass_status("p1").url, "http://localhost:8080/wallet/pass-status/p1");
        let status = c
            .parse_pass_status(HttpResponse::new(200, r#"{"success":true,"pass_id":"p1","status":"created"}"#))
            .unwrap();
        assert_eq!(status["status"], "created");
    }

    #[test]
    fn receipts_listing_is_a_bare_array() {
        let c = client();
        let req = c.build_receipts("priya@example.com", 20, 40);
        assert_eq!(
            req.url,
            "http://localhost:8080/receipts?user_id=priya%40example.com&limit=20&offset=40"
        );
        let receipts = c
            .parse_receipts(HttpResponse::new(200, r#"[{"id":"r1","merchant_name":"Croma"},{"id":"r2"}]"#))
            .unwrap();
        assert_eq!(receipts.len(), 2);
        assert_eq!(receipts[0]["merchant_name"], "Croma");
    }

    #[test]
    fn receipts_listing_rejects_object_body() {
        let err = client()
            .parse_receipts(HttpResponse::new(200, r#"{"receipts":[]}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn receipt_not_found() {
        let c = client();
        assert_eq!(c.build_receipt("r 1").url, "http://localhost:8080/receipts/r%201");
        let err = c
            .parse_receipt(HttpResponse::new(404, r#"{"detail":"Receipt not found"}"#))
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn analytics_query_only_carries_given_dates() {
        let c = client();
        assert_eq!(
            c.build_analytics("u@example.com", None, None).url,
            "http://localhost:8080/analytics/u%40example.com"
        );
        assert_eq!(
            c.build_analytics("u@example.com", Some("2025-01-01"), None).url,
            "http://localhost:8080/analytics/u%40example.com?start_date=2025-01-01"
        );
        assert_eq!(
            c.build_analytics("u@example.com", Some("2025-01-01"), Some("2025-03-31")).url,
            "http://localhost:8080/analytics/u%40example.com?start_date=2025-01-01&end_date=2025-03-31"
        );
    }

    #[test]
    fn graphs_are_paged_and_nested() {
        let c = client();
        assert_eq!(
            c.build_graphs("u@example.com", 2, 5).url,
            "http://localhost:8080/ui/graphs/u%40example.com?page=2&limit=5"
        );
        let graphs = c
            .parse_graphs(HttpResponse::new(200, r#"{"success":true,"total_graphs":1,"graphs":[{"id":"g1"}]}"#))
            .unwrap();
        assert_eq!(graphs[0]["id"], "g1");
        let empty = c.parse_graphs(HttpResponse::new(200, r#"{"success":true,"total_graphs":0}"#)).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn graph_details_path() {
        let c = client();
        assert_eq!(c.build_graph_details("g 1").url, "http://localhost:8080/ui/graph/g%201/details");
        let missing = c
            .parse_graph_details(HttpResponse::new(200, r#"{"success":false,"error":"Graph not found"}"#))
            .unwrap();
        assert_eq!(missing["success"], false);
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = RaseedClient::with_base_url("http://localhost:8080/");
        assert_eq!(client.build_health().url, "http://localhost:8080/health");
    }
}
