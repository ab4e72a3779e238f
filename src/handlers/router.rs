//! Route table. Auth endpoints and the health probe are public; everything
//! else sits behind the bearer-token middleware.

use axum::middleware;
use axum::routing::{delete, get, post, put};
use axum::Router;

use super::state::AppState;
use super::{
    auth, body_states, circumstances, emotions, entries, health, people, relations, skills, stats,
    tags,
};
use crate::auth::require_auth;

pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health::health))
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/recover", post(auth::recover));

    let protected = Router::new()
        .route("/api/v1/auth/me", get(auth::me))
        .route(
            "/api/v1/auth/backup-codes",
            post(auth::regenerate_backup_codes),
        )
        .route("/api/v1/entries", post(entries::create).get(entries::list))
        .route(
            "/api/v1/entries/{id}",
            get(entries::get).put(entries::update).delete(entries::delete),
        )
        .route("/api/v1/entries/{id}/tags", put(entries::set_tags))
        .route("/api/v1/entries/{id}/people", put(entries::set_people))
        .route("/api/v1/entries/{id}/emotions", put(entries::set_emotions))
        .route("/api/v1/relations", post(relations::create))
        .route("/api/v1/relations/types", get(relations::types))
        .route("/api/v1/relations/{id}", delete(relations::delete))
        .route("/api/v1/relations/entry/{id}", get(relations::for_entry))
        .route("/api/v1/relations/chain/{id}", get(relations::chain))
        .route(
            "/api/v1/relations/most-connected",
            get(relations::most_connected),
        )
        .route("/api/v1/relations/graph", get(relations::graph_export))
        .route("/api/v1/people", post(people::create).get(people::list))
        .route(
            "/api/v1/people/{id}",
            get(people::get).put(people::update).delete(people::delete),
        )
        .route("/api/v1/tags", post(tags::create).get(tags::list))
        .route(
            "/api/v1/tags/{id}",
            put(tags::rename).delete(tags::delete),
        )
        .route("/api/v1/emotions", post(emotions::create).get(emotions::list))
        .route(
            "/api/v1/emotions/{id}",
            put(emotions::rename).delete(emotions::delete),
        )
        .route("/api/v1/skills", post(skills::create).get(skills::list))
        .route(
            "/api/v1/skills/{id}",
            get(skills::get).put(skills::rename).delete(skills::delete),
        )
        .route("/api/v1/skills/{id}/progress", post(skills::add_progress))
        .route(
            "/api/v1/circumstances",
            post(circumstances::create).get(circumstances::list),
        )
        .route(
            "/api/v1/circumstances/{id}",
            get(circumstances::get)
                .put(circumstances::update)
                .delete(circumstances::delete),
        )
        .route(
            "/api/v1/body-states",
            post(body_states::create).get(body_states::list),
        )
        .route(
            "/api/v1/body-states/{id}",
            get(body_states::get)
                .put(body_states::update)
                .delete(body_states::delete),
        )
        .route("/api/v1/stats/overview", get(stats::overview))
        .route("/api/v1/stats/streak", get(stats::streak))
        .route("/api/v1/stats/heatmap", get(stats::heatmap))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    public.merge(protected).with_state(state)
}
