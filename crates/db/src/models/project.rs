//! Project entity model and DTOs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use atelio_core::types::{DbId, Timestamp};

/// A project row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub client_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub status: String,
    pub progress: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new project.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    /// Defaults to the authenticated client when omitted; required when an
    /// admin creates a project on a client's behalf.
    pub client_id: Option<DbId>,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
}

/// DTO for updating an existing project. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProject {
    pub description: Option<String>,
    pub status: Option<String>,
    pub progress: Option<i32>,
}
