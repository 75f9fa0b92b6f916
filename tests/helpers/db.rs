use std::sync::Arc;

use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use tempfile::NamedTempFile;

use valoris::authz::engine::PolicyEngine;
use valoris::authz::resolver::ResourceResolver;
use valoris::authz::service::PolicyAdminService;
use valoris::authz::types::PolicyTuple;
use valoris::settings::Settings;
use valoris::web::AppState;

/// Test database with automatic cleanup
pub struct TestDb {
    connection: DatabaseConnection,
    _temp_file: NamedTempFile,
}

impl TestDb {
    /// Create a new test database with migrations applied
    pub async fn new() -> Self {
        // Create temporary SQLite database file
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let db_path = temp_file.path().to_str().expect("Invalid temp file path");
        let db_url = format!("sqlite://{}?mode=rwc", db_path);

        // Connect to database
        let connection = Database::connect(&db_url)
            .await
            .expect("Failed to connect to test database");

        // Run migrations
        migration::Migrator::up(&connection, None)
            .await
            .expect("Failed to run migrations");

        Self {
            connection,
            _temp_file: temp_file,
        }
    }

    /// Get database connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }
}

/// Insert a permission tuple directly into the store
pub async fn seed_policy(db: &DatabaseConnection, role: &str, resource: &str, action: &str) {
    valoris::storage::insert(db, &PolicyTuple::permission(role, resource, action))
        .await
        .expect("Failed to seed policy");
}

/// Build the application state over a freshly loaded engine
pub async fn app_state(db: &DatabaseConnection) -> AppState {
    let engine = Arc::new(PolicyEngine::new(db.clone()));
    engine.load().await.expect("Failed to load engine");
    let resolver = Arc::new(ResourceResolver::new());
    let admin = PolicyAdminService::new(db.clone(), engine.clone());
    AppState {
        settings: Arc::new(Settings::default()),
        db: db.clone(),
        engine,
        resolver,
        admin,
    }
}
