//! Account commands.

use zenthra_leads::{SignUpOutcome, Stores};

use super::CliError;

/// Sign in and report the resulting capabilities.
pub async fn sign_in(stores: &Stores, email: &str, password: &str) -> Result<(), CliError> {
    stores.auth.sign_in(email, password).await?;
    whoami(stores);
    Ok(())
}

/// Create an account; whether it authenticates immediately depends on the
/// backend's confirmation policy.
pub async fn sign_up(
    stores: &Stores,
    email: &str,
    password: &str,
    full_name: &str,
) -> Result<(), CliError> {
    match stores.auth.sign_up(email, password, full_name).await? {
        SignUpOutcome::SessionEstablished => whoami(stores),
        SignUpOutcome::ConfirmationRequired => {
            println!("account created; check {email} for a confirmation link");
        }
    }
    Ok(())
}

/// Sign out and clear all locally persisted session state.
pub async fn sign_out(stores: &Stores) {
    stores.auth.sign_out().await;
    println!("signed out");
}

/// Show the signed-in account and its capabilities.
pub fn whoami(stores: &Stores) {
    match stores.auth.profile() {
        Some(profile) => {
            let capability = if profile.is_admin() { "admin" } else { "user" };
            println!(
                "{} <{}> ({capability}{})",
                profile.full_name,
                profile.email,
                if profile.is_active { "" } else { ", inactive" },
            );
        }
        None => match stores.auth.user() {
            Some(user) => println!("{} (no profile resolved)", user.email),
            None => println!("not signed in"),
        },
    }
}

/// Change the account password.
pub async fn change_password(stores: &Stores, current: &str, new: &str) -> Result<(), CliError> {
    stores.auth.change_password(current, new).await?;
    println!("password updated; sign in again");
    stores.auth.sign_out().await;
    Ok(())
}
