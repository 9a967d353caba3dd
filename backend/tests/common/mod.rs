//! Shared setup for tests that need a live PostgreSQL database.
//!
//! `DATABASE_URL` points the suite at an existing server. Without it an
//! embedded cluster is bootstrapped through `pg-embed-setup-unpriv` and each
//! test binary gets its own freshly migrated database. Bootstrap failures fail
//! the test unless `SKIP_TEST_CLUSTER` is truthy.

use std::path::PathBuf;

use backend::domain::ports::UserRepository;
use backend::domain::{EmailAddress, PasswordDigest, PermissionFlags, User, UserId, UserName};
use backend::outbound::persistence::{
    DbPool, DieselUserRepository, PoolConfig, run_pending_migrations,
};
use pg_embedded_setup_unpriv::test_support::shared_cluster_handle;
use tokio::sync::OnceCell;
use uuid::Uuid;

static RESOLVED_URL: OnceCell<Option<String>> = OnceCell::const_new();

/// Returns true when `SKIP_TEST_CLUSTER` is "1", "true" or "yes".
fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skip with a marker when allowed, otherwise fail loudly.
fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

fn pg_embed_dir() -> PathBuf {
    std::env::var_os("CARGO_TARGET_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("..").join("target"))
        .join("pg-embed")
}

fn env_or(name: &str, fallback: impl FnOnce() -> String) -> Option<String> {
    Some(std::env::var(name).unwrap_or_else(|_| fallback()))
}

/// Start (or join) the embedded cluster and create a database for this binary.
fn embedded_database_url() -> Result<String, String> {
    let base = pg_embed_dir();
    // Binaries are shared; each test process initialises its own data directory.
    let data_dir = base.join(format!("data-{}-{}", std::process::id(), Uuid::new_v4()));
    let _env = env_lock::lock_env([
        (
            "PG_RUNTIME_DIR",
            env_or("PG_RUNTIME_DIR", || {
                base.join("install").to_string_lossy().into_owned()
            }),
        ),
        (
            "PG_DATA_DIR",
            env_or("PG_DATA_DIR", || data_dir.to_string_lossy().into_owned()),
        ),
    ]);

    let cluster = shared_cluster_handle().map_err(|err| format!("{err:?}"))?;
    let name = format!("garden_test_{}", Uuid::new_v4().simple());
    cluster
        .create_database(name.as_str())
        .map_err(|err| format!("create database: {err:?}"))?;
    Ok(cluster.connection().database_url(name.as_str()))
}

async fn resolve_database_url() -> Option<String> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        // The cluster bootstrap blocks and drives its own runtime.
        Err(_) => match tokio::task::spawn_blocking(embedded_database_url).await {
            Ok(Ok(url)) => url,
            Ok(Err(reason)) => return handle_cluster_setup_failure(reason),
            Err(join_error) => return handle_cluster_setup_failure(join_error),
        },
    };
    run_pending_migrations(&url)
        .await
        .expect("migrations apply");
    Some(url)
}

/// Migrated pool, or `None` when cluster tests are explicitly skipped.
pub async fn database() -> Option<DbPool> {
    let url = RESOLVED_URL
        .get_or_init(resolve_database_url)
        .await
        .clone()?;
    Some(
        DbPool::new(PoolConfig::new(&url).with_max_size(4))
            .await
            .expect("pool builds"),
    )
}

/// Insert a fresh user with a unique e-mail address.
pub async fn seed_user(pool: &DbPool) -> User {
    let id = UserId::random();
    let user = User::new(
        id.clone(),
        EmailAddress::new(format!("{id}@example.com")).expect("valid email"),
        UserName::new("Seeded User").expect("valid name"),
        PermissionFlags::default(),
        PasswordDigest::new("plain$testpass123"),
    );
    DieselUserRepository::new(pool.clone())
        .insert(&user)
        .await
        .expect("user inserts");
    user
}
