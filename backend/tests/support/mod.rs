//! Shared helpers for the Diesel adapter suites.
//!
//! Each suite gets its own embedded cluster and a freshly migrated database.
//! Machines without the PostgreSQL binaries (or network access to fetch
//! them) skip these suites unless `REQUIRE_TEST_CLUSTER` is truthy, in which
//! case setup failures fail the test.

pub mod pg_embed;

use pg_embedded_setup_unpriv::TestCluster;
use postgres::{Client, NoTls};
use tokio::runtime::Runtime;
use uuid::Uuid;

use storyscape::outbound::persistence::{DbPool, PoolConfig, run_migrations};

/// Render a `postgres` error with its SQLSTATE and detail.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };
    let mut summary = format!("postgres error {:?}: {}", db_error.code(), db_error.message());
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    summary
}

fn require_test_cluster() -> bool {
    std::env::var("REQUIRE_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skip with a marker, or panic when the cluster is required.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if require_test_cluster() {
        panic!("Test cluster setup failed: {reason}");
    }
    eprintln!("SKIP-TEST-CLUSTER: {reason}");
    None
}

/// Migrated database on a private cluster, plus the runtime driving its pool.
pub struct TestDatabase {
    pub pool: DbPool,
    pub url: String,
    pub runtime: Runtime,
    _cluster: TestCluster,
}

impl TestDatabase {
    /// Synchronous client for assertions that bypass the repositories.
    pub fn client(&self) -> Result<Client, String> {
        Client::connect(&self.url, NoTls).map_err(|err| format_postgres_error(&err))
    }
}

fn create_database(cluster: &TestCluster, name: &str) -> Result<String, String> {
    let admin_url = cluster.connection().database_url("postgres");
    let mut admin = Client::connect(&admin_url, NoTls).map_err(|err| format_postgres_error(&err))?;
    admin
        .batch_execute(&format!("CREATE DATABASE \"{name}\""))
        .map_err(|err| format_postgres_error(&err))?;
    Ok(cluster.connection().database_url(name))
}

/// Start a cluster, create a uniquely named database, migrate it and open a
/// small pool.
pub fn test_database(prefix: &str) -> Result<TestDatabase, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = pg_embed::test_cluster()?;
    let name = format!("{prefix}_{}", Uuid::new_v4().simple());
    let url = create_database(&cluster, &name)?;

    let pool = runtime.block_on(async {
        run_migrations(&url).await.map_err(|err| err.to_string())?;
        DbPool::new(PoolConfig::new(url.as_str()).with_max_size(4))
            .await
            .map_err(|err| err.to_string())
    })?;

    Ok(TestDatabase {
        pool,
        url,
        runtime,
        _cluster: cluster,
    })
}
