//! Client core for the Raseed receipt-management backend.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). A `Transport` performs the
//! round-trip; `ApiService` combines the two into one call per endpoint.
//! Screen controllers in `screen` drive sign-in, sign-up and the home view
//! on top of the service.
//!
//! # Design
//! - `RaseedClient` is stateless; it holds only `ApiConfig`.
//! - Every request carries its own timeout.
//! - Errors are tagged (`ApiError`) so callers can tell a timeout from a
//!   404 from a malformed body without reading messages.
//! - The signed-in user is a `Session` value passed to each call, never a
//!   global.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod screen;
pub mod service;
pub mod session;
pub mod transport;
pub mod types;
pub mod validation;

pub use client::{RaseedClient, DEFAULT_DAYS_AHEAD, DEFAULT_GRAPH_LIMIT, DEFAULT_RECEIPT_LIMIT};
pub use config::{ApiConfig, ConfigError};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use screen::{
    AuthScreen, HomeScreen, ScreenState, ScreenUpdate, SignInScreen, SignUpScreen, SubmitRejected, Toast, ToastKind,
};
pub use service::{ApiService, AuthApi};
pub use session::Session;
pub use transport::{Transport, UreqTransport};
pub use types::{AuthOutcome, Credentials, PassType, Record, SignUpRequest};
pub use validation::{FieldError, SignInForm, SignUpForm};
