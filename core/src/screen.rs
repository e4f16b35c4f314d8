//! Screen controllers: form state, submit flow, toasts and navigation.
//!
//! # Design
//! A screen owns its form and a `ScreenState`. Submitting is split into
//! `begin` (validate, lock the form) and `complete` (turn the call's result
//! into a toast and an optional navigation target) so a front end can show
//! the in-flight state between the two. `submit` runs both around a single
//! call for front ends that block.

use thiserror::Error;

use crate::client::DEFAULT_DAYS_AHEAD;
use crate::error::ApiError;
use crate::service::{ApiService, AuthApi};
use crate::session::Session;
use crate::transport::Transport;
use crate::types::{AuthOutcome, Credentials, Record, SignUpRequest};
use crate::validation::{FieldError, SignInForm, SignUpForm};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

/// A transient, non-blocking notification of an operation's outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenState {
    Idle,
    Submitting,
    ResultShown(Toast),
}

/// What the front end should do once a submit finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenUpdate {
    pub toast: Toast,
    pub navigate_to: Option<Session>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitRejected {
    #[error("{}", join_errors(.0))]
    Invalid(Vec<FieldError>),
    #[error("a request is already in progress")]
    InFlight,
}

fn join_errors(errors: &[FieldError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// A form whose submit is one auth call.
pub trait AuthForm {
    type Payload;

    const SUCCESS_MESSAGE: &'static str;
    const FAILURE_MESSAGE: &'static str;

    fn validate(&self) -> Result<Self::Payload, Vec<FieldError>>;

    fn send<A: AuthApi + ?Sized>(api: &A, payload: &Self::Payload) -> Result<AuthOutcome, ApiError>;
}

impl AuthForm for SignInForm {
    type Payload = Credentials;

    const SUCCESS_MESSAGE: &'static str = "Signed in successfully";
    const FAILURE_MESSAGE: &'static str = "Sign in failed";

    fn validate(&self) -> Result<Credentials, Vec<FieldError>> {
        SignInForm::validate(self)
    }

    fn send<A: AuthApi + ?Sized>(api: &A, payload: &Credentials) -> Result<AuthOutcome, ApiError> {
        api.sign_in(payload)
    }
}

impl AuthForm for SignUpForm {
    type Payload = SignUpRequest;

    const SUCCESS_MESSAGE: &'static str = "Account created";
    const FAILURE_MESSAGE: &'static str = "Sign up failed";

    fn validate(&self) -> Result<SignUpRequest, Vec<FieldError>> {
        SignUpForm::validate(self)
    }

    fn send<A: AuthApi + ?Sized>(api: &A, payload: &SignUpRequest) -> Result<AuthOutcome, ApiError> {
        api.sign_up(payload)
    }
}

pub struct AuthScreen<F: AuthForm> {
    form: F,
    state: ScreenState,
}

pub type SignInScreen = AuthScreen<SignInForm>;
pub type SignUpScreen = AuthScreen<SignUpForm>;

impl<F: AuthForm> AuthScreen<F> {
    pub fn new(form: F) -> Self {
        Self {
            form,
            state: ScreenState::Idle,
        }
    }

    pub fn state(&self) -> &ScreenState {
        &self.state
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    /// Editable form, or `None` while a submit is in flight.
    pub fn form_mut(&mut self) -> Option<&mut F> {
        if self.inputs_enabled() {
            Some(&mut self.form)
        } else {
            None
        }
    }

    pub fn inputs_enabled(&self) -> bool {
        self.state != ScreenState::Submitting
    }

    /// Validate the form and enter `Submitting`. Nothing is sent on failure.
    pub fn begin(&mut self) -> Result<F::Payload, SubmitRejected> {
        if self.state == ScreenState::Submitting {
            return Err(SubmitRejected::InFlight);
        }
        let payload = self.form.validate().map_err(SubmitRejected::Invalid)?;
        self.state = ScreenState::Submitting;
        Ok(payload)
    }

    /// Record the call's result and leave `Submitting`. Returns `None`, and
    /// leaves the state alone, when no submit is in flight.
    pub fn complete(&mut self, result: Result<AuthOutcome, ApiError>) -> Option<ScreenUpdate> {
        if self.state != ScreenState::Submitting {
            tracing::debug!(state = ?self.state, "ignoring result with no submit in flight");
            return None;
        }
        Some(self.finish(result))
    }

    fn finish(&mut self, result: Result<AuthOutcome, ApiError>) -> ScreenUpdate {
        let update = match result {
            Ok(outcome) => match Session::from_outcome(&outcome) {
                Some(session) => {
                    tracing::info!(user = session.user_id(), "session established");
                    ScreenUpdate {
                        toast: Toast::success(outcome.message.unwrap_or_else(|| F::SUCCESS_MESSAGE.to_string())),
                        navigate_to: Some(session),
                    }
                }
                None if outcome.success => {
                    tracing::warn!("auth reported success without a user id");
                    ScreenUpdate {
                        toast: Toast::error(format!("{}: no user id returned", F::FAILURE_MESSAGE)),
                        navigate_to: None,
                    }
                }
                None => ScreenUpdate {
                    toast: Toast::error(outcome.message.unwrap_or_else(|| F::FAILURE_MESSAGE.to_string())),
                    navigate_to: None,
                },
            },
            Err(e) => ScreenUpdate {
                toast: Toast::error(format!("{}: {e}", F::FAILURE_MESSAGE)),
                navigate_to: None,
            },
        };
        self.state = ScreenState::ResultShown(update.toast.clone());
        update
    }

    /// `begin`, one call, `complete`.
    pub fn submit<A: AuthApi + ?Sized>(&mut self, api: &A) -> Result<ScreenUpdate, SubmitRejected> {
        let payload = self.begin()?;
        let result = F::send(api, &payload);
        Ok(self.finish(result))
    }

    /// Clear the shown result.
    pub fn dismiss(&mut self) {
        if matches!(self.state, ScreenState::ResultShown(_)) {
            self.state = ScreenState::Idle;
        }
    }
}

/// Landing screen after sign-in: warranty products and upcoming reminders.
pub struct HomeScreen {
    session: Session,
    days_ahead: u32,
    products: Vec<Record>,
    reminders: Vec<Record>,
}

impl HomeScreen {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            days_ahead: DEFAULT_DAYS_AHEAD,
            products: Vec::new(),
            reminders: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_days_ahead(mut self, days_ahead: u32) -> Self {
        self.days_ahead = days_ahead;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn products(&self) -> &[Record] {
        &self.products
    }

    pub fn reminders(&self) -> &[Record] {
        &self.reminders
    }

    /// Refresh both sections. A failing section keeps its previous contents
    /// and contributes an error toast; the other section still loads.
    pub fn load<T: Transport>(&mut self, api: &ApiService<T>) -> Vec<Toast> {
        let mut toasts = Vec::new();
        match api.warranty_products(&self.session) {
            Ok(products) => self.products = products,
            Err(e) => toasts.push(Toast::error(format!("Could not load warranty products: {e}"))),
        }
        match api.upcoming_reminders(&self.session, self.days_ahead) {
            Ok(reminders) => self.reminders = reminders,
            Err(e) => toasts.push(Toast::error(format!("Could not load reminders: {e}"))),
        }
        toasts
    }

    /// Add a calendar reminder for one product.
    pub fn remind<T: Transport>(&self, api: &ApiService<T>, product_name: &str) -> Toast {
        match api.create_reminder(&self.session, product_name) {
            Ok(_) => Toast::success(format!("Calendar reminder created for {product_name}")),
            Err(e) => Toast::error(format!("Could not create reminder: {e}")),
        }
    }
}
