use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub password: String,
}

/// In-memory stand-in for the backend's Firestore collections, keyed by user id.
#[derive(Debug, Default)]
pub struct Store {
    users: HashMap<String, User>,
    products: HashMap<String, Vec<Value>>,
    wallet_items: HashMap<String, Vec<Value>>,
    passes: HashMap<String, Vec<Value>>,
    reminders: HashMap<String, Vec<Value>>,
    receipts: HashMap<String, Vec<Value>>,
    graphs: HashMap<String, Vec<Value>>,
}

impl Store {
    pub fn with_user(mut self, name: &str, email: &str, password: &str) -> Self {
        self.users.insert(
            email.to_string(),
            User {
                name: name.to_string(),
                password: password.to_string(),
            },
        );
        self
    }

    /// `product` should carry `name`; `days_until_expiry` makes it show up
    /// in upcoming reminders.
    pub fn with_warranty_product(mut self, user_id: &str, product: Value) -> Self {
        self.products.entry(user_id.to_string()).or_default().push(product);
        self
    }

    /// `item` should carry `id` and `item_type`.
    pub fn with_wallet_item(mut self, user_id: &str, item: Value) -> Self {
        self.wallet_items.entry(user_id.to_string()).or_default().push(item);
        self
    }

    /// `receipt` should carry `id`, `merchant_name`, `total_amount`,
    /// `category` and an ISO `date`.
    pub fn with_receipt(mut self, user_id: &str, receipt: Value) -> Self {
        self.receipts.entry(user_id.to_string()).or_default().push(receipt);
        self
    }

    /// `graph` should carry `id`.
    pub fn with_graph(mut self, user_id: &str, graph: Value) -> Self {
        self.graphs.entry(user_id.to_string()).or_default().push(graph);
        self
    }

    fn find_by_id<'a>(collection: &'a HashMap<String, Vec<Value>>, key: &str, id: &str) -> Option<&'a Value> {
        collection.values().flatten().find(|v| v[key] == id)
    }

    fn find_product(&self, user_id: &str, name: &str) -> Option<&Value> {
        self.products
            .get(user_id)?
            .iter()
            .find(|p| p["name"].as_str().is_some_and(|n| n.eq_ignore_ascii_case(name)))
    }
}

#[derive(Deserialize)]
pub struct SignIn {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct SignUp {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct UpcomingQuery {
    pub user_id: String,
    #[serde(default = "default_days_ahead")]
    pub days_ahead: i64,
}

fn default_days_ahead() -> i64 {
    30
}

#[derive(Deserialize)]
pub struct CreateSingle {
    pub user_id: String,
    pub product_name: String,
}

#[derive(Deserialize)]
pub struct CreateAll {
    pub user_id: String,
}

#[derive(Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum PassType {
    Receipt,
    Warranty,
}

#[derive(Deserialize)]
pub struct GeneratePass {
    pub item_id: String,
    pub pass_type: PassType,
    pub user_id: String,
}

#[derive(Deserialize)]
pub struct ReceiptsQuery {
    pub user_id: String,
    #[serde(default = "default_receipt_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_receipt_limit() -> usize {
    50
}

#[derive(Deserialize)]
pub struct AnalyticsQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Deserialize)]
pub struct GraphsQuery {
    #[serde(default = "first_page")]
    pub page: usize,
    #[serde(default = "default_graph_limit")]
    pub limit: usize,
}

fn first_page() -> usize {
    1
}

fn default_graph_limit() -> usize {
    10
}

#[derive(Deserialize)]
pub struct Chat {
    #[serde(default)]
    pub user_email: String,
    #[serde(default)]
    pub message: String,
    #[serde(default = "default_message_type")]
    pub message_type: String,
}

fn default_message_type() -> String {
    "text".to_string()
}

pub type Db = Arc<RwLock<Store>>;

type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

fn detail(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "detail": message.into() })))
}

pub fn app() -> Router {
    app_with(Store::default())
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/health", get(health))
        .route("/auth/signin", post(sign_in))
        .route("/auth/signup", post(sign_up))
        .route("/warranty-reminders/warranty-products/{user_id}", get(warranty_products))
        .route("/warranty-reminders/upcoming/", get(upcoming_reminders))
        .route("/warranty-reminders/create-single/", post(create_single_reminder))
        .route("/warranty-reminders/create-all/", post(create_all_reminders))
        .route("/wallet/eligible-items/{user_id}", get(eligible_items))
        .route("/wallet/user-passes/{user_id}", get(user_passes))
        .route("/wallet/generate-pass", post(generate_pass))
        .route("/wallet/pass-status/{pass_id}", get(pass_status))
        .route("/wallet/pass/{pass_id}", delete(revoke_pass))
        .route("/receipts", get(list_receipts))
        .route("/receipts/{receipt_id}", get(get_receipt))
        .route("/analytics/{user_id}", get(analytics))
        .route("/economix/chat", post(chat))
        .route("/ui/dashboard/{user_id}", get(dashboard))
        .route("/ui/graphs/{user_id}", get(graphs))
        .route("/ui/graph/{graph_id}/details", get(graph_details))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, Store::default()).await
}

pub async fn run_with(listener: TcpListener, store: Store) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(store)).await
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

async fn sign_in(State(db): State<Db>, Json(input): Json<SignIn>) -> ApiResult {
    let store = db.read().await;
    match store.users.get(&input.email) {
        Some(user) if user.password == input.password => Ok(Json(json!({
            "success": true,
            "user_id": input.email,
            "message": format!("Welcome back, {}", user.name),
        }))),
        _ => {
            tracing::debug!(email = %input.email, "rejected sign-in");
            Err(detail(StatusCode::UNAUTHORIZED, "Invalid email or password"))
        }
    }
}

async fn sign_up(State(db): State<Db>, Json(input): Json<SignUp>) -> ApiResult {
    let mut store = db.write().await;
    if store.users.contains_key(&input.email) {
        return Err(detail(StatusCode::CONFLICT, "An account with this email already exists"));
    }
    store.users.insert(
        input.email.clone(),
        User {
            name: input.name,
            password: input.password,
        },
    );
    Ok(Json(json!({ "success": true, "user_id": input.email })))
}

async fn warranty_products(State(db): State<Db>, Path(user_id): Path<String>) -> Json<Value> {
    let store = db.read().await;
    let products = store.products.get(&user_id).cloned().unwrap_or_default();
    Json(json!({
        "success": true,
        "count": products.len(),
        "warranty_products": products,
    }))
}

async fn upcoming_reminders(State(db): State<Db>, Query(query): Query<UpcomingQuery>) -> Json<Value> {
    let store = db.read().await;
    let reminders: Vec<Value> = store
        .products
        .get(&query.user_id)
        .into_iter()
        .flatten()
        .filter(|p| {
            p["days_until_expiry"]
                .as_i64()
                .is_some_and(|days| (0..=query.days_ahead).contains(&days))
        })
        .cloned()
        .collect();
    Json(json!({
        "success": true,
        "count": reminders.len(),
        "reminders": reminders,
        "days_ahead": query.days_ahead,
    }))
}

async fn create_single_reminder(State(db): State<Db>, Json(input): Json<CreateSingle>) -> ApiResult {
    let mut store = db.write().await;
    let Some(product) = store.find_product(&input.user_id, &input.product_name).cloned() else {
        return Err(detail(
            StatusCode::NOT_FOUND,
            format!("No warranty product named {}", input.product_name),
        ));
    };
    let event_id = Uuid::new_v4();
    let event = json!({
        "event_id": event_id,
        "summary": format!("Warranty expiring: {}", input.product_name),
        "product": product,
    });
    store.reminders.entry(input.user_id).or_default().push(event.clone());
    Ok(Json(json!({
        "status": "success",
        "message": format!("Calendar reminder created for {}", input.product_name),
        "event_details": event,
        "event_link": format!("https://calendar.google.com/event?eid={event_id}"),
    })))
}

async fn create_all_reminders(State(db): State<Db>, Json(input): Json<CreateAll>) -> Json<Value> {
    let mut store = db.write().await;
    let products = store.products.get(&input.user_id).cloned().unwrap_or_default();
    let events: Vec<Value> = products
        .iter()
        .map(|p| json!({ "event_id": Uuid::new_v4(), "product": p }))
        .collect();
    let created = events.len();
    store.reminders.entry(input.user_id).or_default().extend(events);
    Json(json!({
        "status": "success",
        "message": "Reminders created",
        "reminders_created": created,
        "total_warranties": products.len(),
        "failed_reminders": [],
    }))
}

async fn eligible_items(State(db): State<Db>, Path(user_id): Path<String>) -> Json<Value> {
    let store = db.read().await;
    let items = store.wallet_items.get(&user_id).cloned().unwrap_or_default();
    let count = |kind: &str| items.iter().filter(|i| i["item_type"] == kind).count();
    Json(json!({
        "success": true,
        "total_receipts": count("receipt"),
        "total_warranties": count("warranty"),
        "items": items,
    }))
}

async fn user_passes(State(db): State<Db>, Path(user_id): Path<String>) -> Json<Value> {
    let store = db.read().await;
    let passes = store.passes.get(&user_id).cloned().unwrap_or_default();
    Json(json!({
        "success": true,
        "user_id": user_id,
        "total_passes": passes.len(),
        "passes": passes,
    }))
}

async fn generate_pass(State(db): State<Db>, Json(input): Json<GeneratePass>) -> ApiResult {
    let mut store = db.write().await;
    let known = store
        .wallet_items
        .get(&input.user_id)
        .is_some_and(|items| items.iter().any(|i| i["id"] == input.item_id.as_str()));
    if !known {
        return Err(detail(StatusCode::NOT_FOUND, format!("Unknown item {}", input.item_id)));
    }
    let pass_id = Uuid::new_v4().to_string();
    store.passes.entry(input.user_id).or_default().push(json!({
        "pass_id": pass_id,
        "item_id": input.item_id,
        "type": input.pass_type,
        "status": "created",
        "added_to_wallet": true,
    }));
    Ok(Json(json!({
        "success": true,
        "pass_id": pass_id,
        "wallet_url": format!("https://pay.google.com/gp/v/save/{pass_id}"),
    })))
}

async fn pass_status(State(db): State<Db>, Path(pass_id): Path<String>) -> ApiResult {
    let store = db.read().await;
    let Some(pass) = Store::find_by_id(&store.passes, "pass_id", &pass_id) else {
        return Err(detail(StatusCode::NOT_FOUND, format!("Unknown pass {pass_id}")));
    };
    Ok(Json(json!({
        "success": true,
        "pass_id": pass_id,
        "status": pass["status"],
        "message": "Pass status check completed",
    })))
}

async fn revoke_pass(State(db): State<Db>, Path(pass_id): Path<String>) -> ApiResult {
    let mut store = db.write().await;
    let Some(pass) = store
        .passes
        .values_mut()
        .flatten()
        .find(|p| p["pass_id"] == pass_id.as_str())
    else {
        return Err(detail(StatusCode::NOT_FOUND, format!("Unknown pass {pass_id}")));
    };
    pass["status"] = json!("revoked");
    pass["added_to_wallet"] = json!(false);
    Ok(Json(json!({
        "success": true,
        "pass_id": pass_id,
        "message": "Pass revocation completed",
    })))
}

async fn list_receipts(State(db): State<Db>, Query(query): Query<ReceiptsQuery>) -> ApiResult {
    if query.limit > 100 {
        return Err(detail(StatusCode::UNPROCESSABLE_ENTITY, "limit must be at most 100"));
    }
    let store = db.read().await;
    let page: Vec<Value> = store
        .receipts
        .get(&query.user_id)
        .into_iter()
        .flatten()
        .skip(query.offset)
        .take(query.limit)
        .cloned()
        .collect();
    Ok(Json(Value::Array(page)))
}

async fn get_receipt(State(db): State<Db>, Path(receipt_id): Path<String>) -> ApiResult {
    let store = db.read().await;
    Store::find_by_id(&store.receipts, "id", &receipt_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "Receipt not found"))
}

/// Totals over the user's receipts whose `date` falls in the optional range.
async fn analytics(
    State(db): State<Db>,
    Path(user_id): Path<String>,
    Query(query): Query<AnalyticsQuery>,
) -> Json<Value> {
    let store = db.read().await;
    let in_range = |receipt: &&Value| {
        let date = receipt["date"].as_str().unwrap_or_default();
        let day = date.get(..10).unwrap_or(date);
        query.start_date.as_deref().is_none_or(|start| day >= start)
            && query.end_date.as_deref().is_none_or(|end| day <= end)
    };
    let receipts: Vec<&Value> = store.receipts.get(&user_id).into_iter().flatten().filter(in_range).collect();

    let mut merchants: HashMap<&str, f64> = HashMap::new();
    let mut categories: HashMap<&str, f64> = HashMap::new();
    let mut total = 0.0;
    for receipt in &receipts {
        let amount = receipt["total_amount"].as_f64().unwrap_or(0.0);
        total += amount;
        *merchants.entry(receipt["merchant_name"].as_str().unwrap_or("Unknown")).or_default() += amount;
        *categories.entry(receipt["category"].as_str().unwrap_or("other")).or_default() += amount;
    }
    let mut top_merchants: Vec<(&str, f64)> = merchants.into_iter().collect();
    top_merchants.sort_by(|a, b| b.1.total_cmp(&a.1));
    top_merchants.truncate(10);

    let average = if receipts.is_empty() { 0.0 } else { total / receipts.len() as f64 };
    Json(json!({
        "total_receipts": receipts.len(),
        "total_amount": total,
        "average_amount": average,
        "currency": "USD",
        "top_merchants": top_merchants
            .iter()
            .map(|(name, total)| json!({ "name": name, "total": total }))
            .collect::<Vec<_>>(),
        "category_breakdown": categories,
    }))
}

async fn chat(State(db): State<Db>, Json(input): Json<Chat>) -> ApiResult {
    if input.user_email.is_empty() || input.message.is_empty() {
        return Err(detail(StatusCode::BAD_REQUEST, "user_email and message are required"));
    }
    let store = db.read().await;
    if !store.users.contains_key(&input.user_email) {
        return Err(detail(StatusCode::UNAUTHORIZED, "User authentication failed"));
    }
    let transaction_count = store.wallet_items.get(&input.user_email).map_or(0, Vec::len);
    Ok(Json(json!({
        "success": true,
        "response": format!("You have {transaction_count} tracked transactions."),
        "message_type": input.message_type,
        "user_id": input.user_email,
        "financial_summary": { "transaction_count": transaction_count },
    })))
}

async fn dashboard(State(db): State<Db>, Path(user_id): Path<String>) -> Json<Value> {
    let store = db.read().await;
    let products = store.products.get(&user_id).map_or(0, Vec::len);
    let items = store.wallet_items.get(&user_id).map_or(0, Vec::len);
    let has_data = products + items > 0;
    Json(json!({
        "success": true,
        "user_id": user_id,
        "has_data": has_data,
        "ui_state": if has_data { "ready" } else { "empty" },
        "stats": {
            "warranty_products": products,
            "wallet_items": items,
        },
    }))
}

async fn graphs(
    State(db): State<Db>,
    Path(user_id): Path<String>,
    Query(query): Query<GraphsQuery>,
) -> ApiResult {
    if query.page == 0 || !(1..=50).contains(&query.limit) {
        return Err(detail(StatusCode::UNPROCESSABLE_ENTITY, "page must be >= 1 and limit 1..=50"));
    }
    let store = db.read().await;
    let all = store.graphs.get(&user_id).map(Vec::as_slice).unwrap_or_default();
    let page: Vec<Value> = all
        .iter()
        .skip((query.page - 1) * query.limit)
        .take(query.limit)
        .cloned()
        .collect();
    Ok(Json(json!({
        "success": true,
        "user_id": user_id,
        "total_graphs": all.len(),
        "graphs": page,
        "pagination": {
            "current_page": query.page,
            "total_pages": all.len().div_ceil(query.limit),
            "total_items": all.len(),
        },
    })))
}

/// Unknown graphs answer 200 with `success: false`, like the real backend.
async fn graph_details(State(db): State<Db>, Path(graph_id): Path<String>) -> Json<Value> {
    let store = db.read().await;
    match Store::find_by_id(&store.graphs, "id", &graph_id) {
        Some(graph) => Json(json!({ "success": true, "graph": graph })),
        None => Json(json!({ "success": false, "error": "Graph not found" })),
    }
}
