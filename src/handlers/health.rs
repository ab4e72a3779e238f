use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use super::state::AppState;
use super::types::ApiResponse;

/// Liveness probe; verifies the database answers a trivial query.
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<Value>> {
    let database_ok = {
        let conn = state.db.conn();
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .is_ok()
    };

    Json(ApiResponse {
        success: true,
        data: json!({
            "status": if database_ok { "ok" } else { "degraded" },
            "version": env!("CARGO_PKG_VERSION"),
        }),
    })
}
