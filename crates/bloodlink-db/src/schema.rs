//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode. Enums are stored as
//! strings with ASSERT constraints; field names match the JSON documents
//! the application has always written (`requester`, `blood_group`,
//! `response_type`, ...).

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "initial_schema",
        sql: SCHEMA_V1,
    },
    Migration {
        version: 2,
        name: "seed_inventory",
        sql: SEED_INVENTORY_V2,
    },
];

// -----------------------------------------------------------------------
// Schema v1: initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Users
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD username ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD phone ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD role ON TABLE user TYPE string \
    ASSERT $value IN ['donor', 'receiver'];
DEFINE FIELD blood_group ON TABLE user TYPE option<string> \
    ASSERT $value = NONE OR $value IN \
    ['O-', 'O+', 'A-', 'A+', 'B-', 'B+', 'AB-', 'AB+'];
DEFINE FIELD age ON TABLE user TYPE option<int>;
DEFINE FIELD email_verified ON TABLE user TYPE bool DEFAULT false;
DEFINE FIELD phone_verified ON TABLE user TYPE bool DEFAULT false;
DEFINE FIELD registration_date ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_username ON TABLE user COLUMNS username UNIQUE;
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email;
DEFINE INDEX idx_user_role ON TABLE user COLUMNS role;

-- =======================================================================
-- Blood requests
-- =======================================================================
DEFINE TABLE blood_request SCHEMAFULL;
DEFINE FIELD requester ON TABLE blood_request TYPE string;
DEFINE FIELD blood_group ON TABLE blood_request TYPE string \
    ASSERT $value IN ['O-', 'O+', 'A-', 'A+', 'B-', 'B+', 'AB-', 'AB+'];
DEFINE FIELD quantity ON TABLE blood_request TYPE int ASSERT $value > 0;
DEFINE FIELD urgency ON TABLE blood_request TYPE string \
    ASSERT $value IN ['Low', 'Medium', 'High', 'Critical'];
DEFINE FIELD required_date ON TABLE blood_request TYPE string;
DEFINE FIELD reason ON TABLE blood_request TYPE string;
DEFINE FIELD contact_info ON TABLE blood_request TYPE string;
DEFINE FIELD date ON TABLE blood_request TYPE datetime;
DEFINE FIELD status ON TABLE blood_request TYPE string \
    ASSERT $value IN ['pending', 'fulfilled', 'cancelled'];
DEFINE FIELD updated_at ON TABLE blood_request TYPE option<datetime>;
DEFINE INDEX idx_blood_request_requester ON TABLE blood_request \
    COLUMNS requester;
DEFINE INDEX idx_blood_request_status ON TABLE blood_request \
    COLUMNS status;

-- =======================================================================
-- Donor responses
-- =======================================================================
DEFINE TABLE donor_response SCHEMAFULL;
DEFINE FIELD request_id ON TABLE donor_response TYPE string;
DEFINE FIELD donor_username ON TABLE donor_response TYPE string;
DEFINE FIELD ordinal ON TABLE donor_response TYPE int;
DEFINE FIELD response_type ON TABLE donor_response TYPE string \
    ASSERT $value IN ['accept', 'decline'];
DEFINE FIELD message ON TABLE donor_response TYPE option<string>;
DEFINE FIELD quantity_offered ON TABLE donor_response TYPE int \
    ASSERT $value >= 0;
DEFINE FIELD response_date ON TABLE donor_response TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD status ON TABLE donor_response TYPE string \
    ASSERT $value IN ['pending_approval'];
DEFINE INDEX idx_donor_response_request ON TABLE donor_response \
    COLUMNS request_id;
DEFINE INDEX idx_donor_response_identity ON TABLE donor_response \
    COLUMNS request_id, donor_username, ordinal UNIQUE;

-- =======================================================================
-- One-time codes (record id = purpose:subject)
-- =======================================================================
DEFINE TABLE one_time_code SCHEMAFULL;
DEFINE FIELD purpose ON TABLE one_time_code TYPE string \
    ASSERT $value IN ['email_verification', 'phone_verification', \
    'password_reset'];
DEFINE FIELD subject ON TABLE one_time_code TYPE string;
DEFINE FIELD code_hash ON TABLE one_time_code TYPE string;
DEFINE FIELD created_at ON TABLE one_time_code TYPE datetime;
DEFINE FIELD expires_at ON TABLE one_time_code TYPE datetime;
DEFINE FIELD consumed ON TABLE one_time_code TYPE bool DEFAULT false;
DEFINE FIELD consumed_at ON TABLE one_time_code TYPE option<datetime>;
DEFINE INDEX idx_one_time_code_expiry ON TABLE one_time_code \
    COLUMNS expires_at;

-- =======================================================================
-- Notifications (append-only)
-- =======================================================================
DEFINE TABLE notification SCHEMAFULL;
DEFINE FIELD channel ON TABLE notification TYPE string \
    ASSERT $value IN ['email', 'sms'];
DEFINE FIELD recipient ON TABLE notification TYPE string;
DEFINE FIELD subject ON TABLE notification TYPE option<string>;
DEFINE FIELD message ON TABLE notification TYPE string;
DEFINE FIELD timestamp ON TABLE notification TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD status ON TABLE notification TYPE string \
    ASSERT $value IN ['sent'];
DEFINE INDEX idx_notification_recipient ON TABLE notification \
    COLUMNS recipient;

-- =======================================================================
-- Donations and inventory counters (record id = blood group slug)
-- =======================================================================
DEFINE TABLE donation SCHEMAFULL;
DEFINE FIELD donor ON TABLE donation TYPE string;
DEFINE FIELD blood_group ON TABLE donation TYPE string \
    ASSERT $value IN ['O-', 'O+', 'A-', 'A+', 'B-', 'B+', 'AB-', 'AB+'];
DEFINE FIELD quantity ON TABLE donation TYPE int ASSERT $value > 0;
DEFINE FIELD date ON TABLE donation TYPE string;
DEFINE FIELD blood_bank ON TABLE donation TYPE string;
DEFINE FIELD notes ON TABLE donation TYPE string DEFAULT '';
DEFINE FIELD timestamp ON TABLE donation TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_donation_donor ON TABLE donation COLUMNS donor;

DEFINE TABLE inventory SCHEMAFULL;
DEFINE FIELD blood_group ON TABLE inventory TYPE string \
    ASSERT $value IN ['O-', 'O+', 'A-', 'A+', 'B-', 'B+', 'AB-', 'AB+'];
DEFINE FIELD quantity ON TABLE inventory TYPE int DEFAULT 0 \
    ASSERT $value >= 0;
";

// -----------------------------------------------------------------------
// v2: zero-initialised inventory counters
// -----------------------------------------------------------------------

const SEED_INVENTORY_V2: &str = "\
CREATE inventory:o_neg SET blood_group = 'O-', quantity = 0;
CREATE inventory:o_pos SET blood_group = 'O+', quantity = 0;
CREATE inventory:a_neg SET blood_group = 'A-', quantity = 0;
CREATE inventory:a_pos SET blood_group = 'A+', quantity = 0;
CREATE inventory:b_neg SET blood_group = 'B-', quantity = 0;
CREATE inventory:b_pos SET blood_group = 'B+', quantity = 0;
CREATE inventory:ab_neg SET blood_group = 'AB-', quantity = 0;
CREATE inventory:ab_pos SET blood_group = 'AB+', quantity = 0;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );
        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!(
                "Migration v{} '{}' failed: {}",
                migration.version, migration.name, e,
            ))
        })?;

        db.query(
            "CREATE _migration SET version = $version, \
             name = $name",
        )
        .bind(("version", migration.version))
        .bind(("name", migration.name))
        .await?
        .check()
        .map_err(|e| {
            DbError::Migration(format!(
                "Failed to record migration v{}: {}",
                migration.version, e,
            ))
        })?;

        info!(
            version = migration.version,
            "Migration applied successfully"
        );
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
