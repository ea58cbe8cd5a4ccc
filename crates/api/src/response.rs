//! The `{ "data": ... }` envelope every resource handler responds with.

use serde::Serialize;

/// Typed response envelope; serializes to `{ "data": <payload> }`.
///
/// Handlers construct it directly: `Json(DataResponse { data: project })`.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
