pub mod admin;
pub mod auth;
pub mod billing;
pub mod health;
pub mod notification;
pub mod project;
pub mod ticket;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                                    WebSocket
///
/// /auth/register                         client self-signup (public)
/// /auth/login                            login (public)
/// /auth/refresh                          refresh (public)
/// /auth/logout                           logout (requires auth)
///
/// /projects                              list, create
/// /projects/{id}                         get, update (admin)
/// /projects/{id}/timeline                delivery timeline
/// /projects/{project_id}/stages          list, create (admin)
/// /projects/{project_id}/negotiations    list, create
///
/// /stages/{id}/proof                     submit proof (owning client)
/// /stages/{id}/approve                   approve (admin)
/// /stages/{id}/reject                    reject (admin)
/// /stages/{id}/invoice                   settlement document download
///
/// /negotiations/{id}/respond             accept / reject / counter
///
/// /tickets                               list, create
/// /tickets/{id}                          ticket + thread
/// /tickets/{id}/responses                reply
/// /tickets/{id}/close                    close
///
/// /notifications                         list
/// /notifications/read-all                mark all read
/// /notifications/unread-count            unread count
/// /notifications/{id}/read               mark read
///
/// /billing-profile                       get, put
///
/// /admin/users                           list, create (admin only)
/// /admin/users/{id}/deactivate           deactivate (admin only)
/// /admin/notifications                   ad hoc notice (admin only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // WebSocket endpoint.
        .route("/ws", get(ws::ws_handler))
        // Authentication routes (register, login, refresh, logout).
        .nest("/auth", auth::router())
        // Projects and their nested stages / negotiations / timeline.
        .nest("/projects", project::router())
        // Stage-scoped operations (proof, verification, invoice).
        .nest("/stages", project::stage_router())
        // Negotiation responses.
        .nest("/negotiations", project::negotiation_router())
        // Support tickets.
        .nest("/tickets", ticket::router())
        // Notifications.
        .nest("/notifications", notification::router())
        // Billing profile for settlement documents.
        .nest("/billing-profile", billing::router())
        // Admin user management and notices.
        .nest("/admin", admin::router())
}
