//! Subcommand handlers. Each one drives a screen controller or makes one
//! service call and prints the result.

use anyhow::{bail, Result};
use raseed_core::{
    ApiConfig, ApiService, HomeScreen, Record, Session, SignInForm, SignInScreen, SignUpForm, SignUpScreen, Toast,
    ToastKind,
};

use crate::Command;

pub fn run(command: Command, config: ApiConfig) -> Result<()> {
    let api = ApiService::from_config(config);

    match command {
        Command::Health => {
            if api.health_check() {
                println!("healthy");
            } else {
                bail!("backend is unhealthy or unreachable");
            }
        }
        Command::SignIn { email, password } => {
            sign_in(&api, email, password)?;
        }
        Command::SignUp { name, email, password } => {
            let mut screen = SignUpScreen::new(SignUpForm {
                name,
                email,
                confirm_password: password.clone(),
                password,
            });
            let update = screen.submit(&api)?;
            show_toast(&update.toast);
            if update.navigate_to.is_none() {
                bail!("sign up did not establish a session");
            }
        }
        Command::Home { email, password, days } => {
            let session = sign_in(&api, email, password)?;
            let mut home = HomeScreen::new(session).with_days_ahead(days);
            for toast in home.load(&api) {
                show_toast(&toast);
            }
            println!("Warranty products:");
            print_list(home.products());
            println!("Expiring within {days} days:");
            print_list(home.reminders());
        }
        Command::Products { user } => print_list(&api.warranty_products(&Session::for_user(user))?),
        Command::Reminders { user, days } => {
            print_list(&api.upcoming_reminders(&Session::for_user(user), days)?);
        }
        Command::Remind { user, product } => {
            let home = HomeScreen::new(Session::for_user(user));
            let toast = home.remind(&api, &product);
            show_toast(&toast);
            if toast.kind == ToastKind::Error {
                bail!("reminder was not created");
            }
        }
        Command::RemindAll { user } => print_record(&api.create_all_reminders(&Session::for_user(user))?),
        Command::WalletItems { user } => print_list(&api.eligible_wallet_items(&Session::for_user(user))?),
        Command::Passes { user } => print_list(&api.user_passes(&Session::for_user(user))?),
        Command::GeneratePass { user, item, pass_type } => {
            print_record(&api.generate_pass(&Session::for_user(user), &item, pass_type)?);
        }
        Command::PassStatus { pass } => print_record(&api.pass_status(&pass)?),
        Command::RevokePass { pass } => print_record(&api.revoke_pass(&pass)?),
        Command::Receipts { user, limit, offset } => {
            print_list(&api.receipts(&Session::for_user(user), limit, offset)?);
        }
        Command::Receipt { id } => print_record(&api.receipt(&id)?),
        Command::Analytics { user, from, to } => {
            print_record(&api.analytics(&Session::for_user(user), from.as_deref(), to.as_deref())?);
        }
        Command::Chat { user, message } => {
            let reply = api.chat(&Session::for_user(user), &message)?;
            match reply.get("response").and_then(|r| r.as_str()) {
                Some(text) => println!("{text}"),
                None => print_record(&reply),
            }
        }
        Command::Dashboard { user } => print_record(&api.dashboard(&Session::for_user(user))?),
        Command::Graphs { user, page, limit } => {
            print_list(&api.graphs(&Session::for_user(user), page, limit)?);
        }
        Command::Graph { id } => {
            let details = api.graph_details(&id)?;
            if details.get("success").and_then(|s| s.as_bool()) == Some(false) {
                bail!("graph {id} not found");
            }
            print_record(&details);
        }
    }
    Ok(())
}

fn sign_in(api: &ApiService, email: String, password: String) -> Result<Session> {
    let mut screen = SignInScreen::new(SignInForm::new(email, password));
    let update = screen.submit(api)?;
    show_toast(&update.toast);
    match update.navigate_to {
        Some(session) => Ok(session),
        None => bail!("sign in did not establish a session"),
    }
}

fn show_toast(toast: &Toast) {
    match toast.kind {
        ToastKind::Success => eprintln!("✔ {}", toast.message),
        ToastKind::Error => eprintln!("✘ {}", toast.message),
    }
}

fn print_record(record: &Record) {
    match serde_json::to_string_pretty(record) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::warn!(error = %e, "could not render response"),
    }
}

fn print_list(records: &[Record]) {
    if records.is_empty() {
        println!("  (none)");
        return;
    }
    for record in records {
        print_record(record);
    }
}
