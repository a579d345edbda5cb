//! HTTP REST API routes

mod conflict_routes;
mod error;
mod resolution_routes;
mod tactical_routes;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::infrastructure::state::AppState;

pub use error::{ApiError, ErrorBody};

/// Create all API routes
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Conflict lifecycle
        .route("/api/conflicts", get(conflict_routes::list_conflicts))
        .route("/api/conflicts", post(conflict_routes::create_conflict))
        .route("/api/conflicts/{id}", get(conflict_routes::get_conflict))
        .route("/api/conflicts/{id}/join", post(conflict_routes::join_conflict))
        .route("/api/conflicts/{id}/leave", post(conflict_routes::leave_conflict))
        .route("/api/conflicts/{id}/objectives", put(conflict_routes::set_objective))
        .route("/api/conflicts/{id}/winners", post(conflict_routes::declare_winner))
        .route("/api/conflicts/{id}/defeated", post(conflict_routes::mark_defeated))
        .route("/api/conflicts/{id}/end", post(conflict_routes::end_conflict))
        .route(
            "/api/locations/{location_id}/conflicts",
            get(conflict_routes::list_location_conflicts),
        )
        .route(
            "/api/locations/{location_id}/conflicts/{variant}",
            get(conflict_routes::find_location_conflict),
        )
        // Zones
        .route("/api/conflicts/{id}/zones", post(tactical_routes::add_zone))
        .route("/api/conflicts/{id}/connections", post(tactical_routes::connect_zones))
        .route("/api/conflicts/{id}/adjacent", post(tactical_routes::adjacent_zones))
        // Assets
        .route("/api/catalog", get(tactical_routes::list_catalog))
        .route("/api/conflicts/{id}/assets", post(tactical_routes::add_catalog_asset))
        .route(
            "/api/conflicts/{id}/assets/intangible",
            post(tactical_routes::add_intangible_asset),
        )
        .route(
            "/api/conflicts/{id}/assets/{asset_id}/move",
            post(tactical_routes::move_asset),
        )
        .route("/api/conflicts/{id}/assets/{asset_id}/aim", post(tactical_routes::aim_asset))
        .route(
            "/api/conflicts/{id}/assets/{asset_id}/defeat",
            post(tactical_routes::defeat_asset),
        )
        .route(
            "/api/conflicts/{id}/assets/{asset_id}/destroy",
            post(tactical_routes::destroy_asset),
        )
        .route(
            "/api/conflicts/{id}/assets/{asset_id}/expose",
            post(tactical_routes::expose_asset),
        )
        .route(
            "/api/conflicts/{id}/assets/{asset_id}/rally",
            post(tactical_routes::rally_asset),
        )
        .route(
            "/api/conflicts/{id}/participants/{participant_id}/move",
            post(tactical_routes::move_participant),
        )
        // Difficulty and visibility
        .route("/api/conflicts/{id}/difficulty", post(tactical_routes::difficulty))
        .route("/api/conflicts/{id}/reveal/zone", post(tactical_routes::reveal_zone))
        .route(
            "/api/conflicts/{id}/reveal/connection",
            post(tactical_routes::reveal_connection),
        )
        .route("/api/conflicts/{id}/disposition", put(tactical_routes::set_disposition))
        .route(
            "/api/conflicts/{id}/disposition/query",
            post(tactical_routes::get_disposition),
        )
        .route(
            "/api/conflicts/{id}/disposition/clear",
            post(tactical_routes::clear_disposition_override),
        )
        .route("/api/conflicts/{id}/desire", put(tactical_routes::set_desire))
        .route("/api/conflicts/{id}/desire/query", post(tactical_routes::desire_for))
        .route("/api/conflicts/{id}/control", put(tactical_routes::set_zone_control))
        // Turns
        .route("/api/conflicts/{id}/turns", post(tactical_routes::begin_turns))
        .route("/api/conflicts/{id}/turns/next", post(tactical_routes::next_turn))
        .route("/api/conflicts/{id}/turns/keep", post(tactical_routes::keep_initiative))
        // Rolls and extended tasks
        .route("/api/rolls/plan", post(resolution_routes::plan_roll))
        .route("/api/rolls", post(resolution_routes::roll))
        .route("/api/conflicts/{id}/tasks", post(resolution_routes::start_task))
        .route(
            "/api/conflicts/{id}/tasks/desire",
            post(resolution_routes::start_desire_task),
        )
        .route(
            "/api/conflicts/{id}/tasks/{task_id}",
            get(resolution_routes::task_status),
        )
        .route(
            "/api/conflicts/{id}/tasks/{task_id}",
            delete(resolution_routes::discard_task),
        )
        .route(
            "/api/conflicts/{id}/tasks/{task_id}/contributions",
            post(resolution_routes::contribute),
        )
        .route(
            "/api/conflicts/{id}/tasks/{task_id}/rolls",
            post(resolution_routes::apply_roll_to_task),
        )
        .route(
            "/api/conflicts/{id}/control/rolls",
            post(resolution_routes::apply_roll_to_zone),
        )
}
