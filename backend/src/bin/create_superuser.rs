//! Create a staff/superuser account directly in the database.
//!
//! The password is never accepted on the command line: it is read from
//! `GARDEN_SUPERUSER_PASSWORD` or prompted for on the terminal.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::sync::Arc;

use backend::domain::ports::{AccountCommand, SuperuserRequest};
use backend::domain::{AccountService, EmailAddress, UserName};
use backend::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
use backend::outbound::security::Argon2PasswordHasher;
use backend::settings::AppSettings;
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, eyre};
use dialoguer::Password;
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use zeroize::Zeroizing;

const PASSWORD_ENV: &str = "GARDEN_SUPERUSER_PASSWORD";

/// `create-superuser` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "create-superuser",
    about = "Create an administrative account with full permissions",
    version
)]
struct CliArgs {
    /// E-mail address used to log in.
    #[arg(long, value_name = "email")]
    email: String,
    /// Display name.
    #[arg(long, value_name = "name", default_value = "Administrator")]
    name: String,
    /// Database connection URL. Falls back to `GARDEN_DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
}

/// Password from the environment, else an interactive confirmed prompt.
fn read_password() -> Result<Zeroizing<String>> {
    if let Ok(password) = env::var(PASSWORD_ENV) {
        return Ok(Zeroizing::new(password));
    }
    Password::new()
        .with_prompt("Password")
        .with_confirmation("Password (again)", "Passwords do not match")
        .interact()
        .map(Zeroizing::new)
        .wrap_err_with(|| format!("no terminal for the password prompt; set {PASSWORD_ENV}"))
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    let args = CliArgs::parse();
    let settings = AppSettings::load_from_iter([std::ffi::OsString::from("create-superuser")])
        .wrap_err("failed to load settings")?;
    let database_url = match args.database_url {
        Some(url) => url,
        None => settings.database_url()?.to_owned(),
    };
    let password = read_password()?;

    let request = SuperuserRequest {
        email: EmailAddress::new(&args.email).wrap_err("invalid e-mail address")?,
        name: UserName::new(&args.name).wrap_err("invalid name")?,
        password,
    };

    let pool = DbPool::new(PoolConfig::new(&database_url).with_max_size(1))
        .await
        .wrap_err("create database pool")?;
    let accounts = AccountService::new(
        Arc::new(DieselUserRepository::new(pool)),
        Arc::new(Argon2PasswordHasher::default()),
        settings.min_password_length(),
    );

    let user = accounts
        .create_superuser(request)
        .await
        .map_err(|err| eyre!("could not create superuser: {}", err.message()))?;
    println!("created superuser {} ({})", user.email(), user.id());
    Ok(())
}
