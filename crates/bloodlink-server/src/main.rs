//! bloodlink: command-line entry point.

mod cli;

use anyhow::Context;
use bloodlink_auth::{AuthConfig, RegisterUser};
use bloodlink_core::models::session::Session;
use bloodlink_core::models::user::UserRole;
use bloodlink_db::{DbConfig, DbManager};
use bloodlink_matching::{NewBloodRequest, NewDonorResponse};
use bloodlink_server::app::{Contact, DonationInput};
use bloodlink_server::{App, MessageOutcome};
use clap::Parser;
use serde::Serialize;
use surrealdb::engine::any::Any;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands, ContactArg, Login, ResetStep};

fn print<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Log in, or print the failure envelope and return `None`.
async fn session(app: &App<Any>, login: &Login) -> anyhow::Result<Option<Session>> {
    match app
        .login(&login.username, &login.password, UserRole::from(login.role))
        .await
    {
        Ok(session) => Ok(Some(session)),
        Err(e) => {
            print(&MessageOutcome::failed(e))?;
            Ok(None)
        }
    }
}

fn contact(arg: ContactArg) -> Contact {
    match arg {
        ContactArg::Email => Contact::Email,
        ContactArg::Phone => Contact::Phone,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("bloodlink=info".parse()?))
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    let db_config = DbConfig::from(cli.db);
    let auth_config = AuthConfig::from(cli.auth);

    let manager = DbManager::connect(&db_config)
        .await
        .with_context(|| format!("connecting to {}", db_config.url))?;
    bloodlink_db::run_migrations(manager.client())
        .await
        .context("applying migrations")?;

    let app = App::new(manager.client().clone(), auth_config);

    match cli.command {
        Commands::Register {
            username,
            email,
            phone,
            password,
            confirm_password,
            role,
            blood_group,
            age,
        } => {
            let outcome = app
                .register(RegisterUser {
                    username,
                    email,
                    phone,
                    password,
                    confirm_password,
                    role: role.into(),
                    blood_group,
                    age,
                })
                .await;
            print(&outcome)?;
        }

        Commands::SendOtp { contact: c, address } => {
            print(&app.send_otp(contact(c), &address).await)?;
        }

        Commands::VerifyOtp {
            contact: c,
            address,
            code,
        } => {
            print(&app.verify_otp(contact(c), &address, &code).await)?;
        }

        Commands::Request {
            login,
            blood_group,
            quantity,
            urgency,
            required_date,
            reason,
            contact_info,
        } => {
            if let Some(session) = session(&app, &login).await? {
                let outcome = app
                    .submit_request(
                        &session,
                        NewBloodRequest {
                            blood_group,
                            quantity,
                            urgency,
                            required_date,
                            reason,
                            contact_info,
                        },
                    )
                    .await;
                print(&outcome)?;
            }
        }

        Commands::Respond {
            login,
            request_id,
            kind,
            quantity,
            message,
        } => {
            if let Some(session) = session(&app, &login).await? {
                let outcome = app
                    .respond(
                        &session,
                        NewDonorResponse {
                            request_id,
                            kind,
                            message,
                            quantity_offered: quantity,
                        },
                    )
                    .await;
                print(&outcome)?;
            }
        }

        Commands::Pending { login } => {
            if let Some(session) = session(&app, &login).await? {
                print(&app.pending_requests(&session).await)?;
            }
        }

        Commands::Responses { login } => {
            if let Some(session) = session(&app, &login).await? {
                if session.is_donor() {
                    print(&app.my_responses(&session).await)?;
                } else {
                    print(&app.my_requests(&session).await)?;
                }
            }
        }

        Commands::Status {
            login,
            request_id,
            status,
        } => {
            if let Some(session) = session(&app, &login).await? {
                print(&app.update_request_status(&session, &request_id, status).await)?;
            }
        }

        Commands::Donate {
            login,
            blood_group,
            quantity,
            date,
            blood_bank,
            notes,
        } => {
            if let Some(session) = session(&app, &login).await? {
                let outcome = app
                    .donate(
                        &session,
                        DonationInput {
                            blood_group,
                            quantity,
                            date: date.unwrap_or_else(|| chrono::Utc::now().date_naive()),
                            blood_bank,
                            notes,
                        },
                    )
                    .await;
                print(&outcome)?;
            }
        }

        Commands::Donations { login } => {
            if let Some(session) = session(&app, &login).await? {
                print(&app.my_donations(&session).await)?;
            }
        }

        Commands::Reset { step } => match step {
            ResetStep::Initiate { email } => {
                print(&app.initiate_password_reset(&email).await)?;
            }
            ResetStep::Complete {
                email,
                token,
                new_password,
                confirm_password,
            } => {
                print(
                    &app.reset_password(&email, &token, &new_password, &confirm_password)
                        .await,
                )?;
            }
        },

        Commands::ChangePassword {
            login,
            new_password,
            confirm_password,
        } => {
            if let Some(session) = session(&app, &login).await? {
                let outcome = app
                    .change_password(&session, &login.password, &new_password, &confirm_password)
                    .await;
                print(&outcome)?;
            }
        }

        Commands::Inventory => print(&app.inventory().await)?,

        Commands::Stats => print(&app.statistics().await)?,

        Commands::Notifications { address } => print(&app.notifications(&address).await)?,

        Commands::SweepCodes => print(&app.sweep_codes().await)?,
    }

    Ok(())
}
