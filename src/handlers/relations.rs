//! Relation endpoints: edge CRUD, chain walking, hub ranking and graph export.
//!
//! Cycle prevention is advisory. A relation that closes a loop is still
//! created; the response carries `has_cycle: true` so clients can warn.

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::state::AppState;
use super::types::{ok, ApiResponse};
use crate::auth::AuthUser;
use crate::errors::{AppError, Result, ValidationErrorExt};
use crate::graph::{self, Chain, Direction};
use crate::models::{Relation, RelationType};
use crate::repo::entries;
use crate::repo::relations::{self, EntryRelations};
use crate::validation;

#[derive(Debug, Deserialize)]
pub struct CreateRelationRequest {
    pub from_entry_id: i64,
    pub to_entry_id: i64,
    pub relation_type: RelationType,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateRelationResponse {
    pub relation: Relation,
    /// True when this edge closed a loop in the graph
    pub has_cycle: bool,
}

#[derive(Debug, Deserialize)]
pub struct ChainQuery {
    pub depth: Option<usize>,
    pub direction: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MostConnectedQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ConnectedEntry {
    pub entry_id: i64,
    pub connections: usize,
}

#[derive(Debug, Deserialize)]
pub struct GraphQuery {
    /// Restrict the export to edges touching this entry
    pub entry_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct GraphResponse {
    pub nodes: Vec<i64>,
    pub edges: Vec<Relation>,
}

/// All relation type names, for client dropdowns.
pub async fn types() -> Json<ApiResponse<Vec<&'static str>>> {
    ok(RelationType::ALL.iter().map(|ty| ty.as_str()).collect())
}

pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<CreateRelationRequest>,
) -> Result<Json<ApiResponse<CreateRelationResponse>>> {
    if req.from_entry_id == req.to_entry_id {
        return Err(AppError::InvalidInput {
            field: "to_entry_id".to_string(),
            reason: "an entry cannot relate to itself".to_string(),
        });
    }
    if let Some(description) = &req.description {
        validation::validate_description(description).map_validation_err("description")?;
    }

    let (relation, has_cycle) = {
        let conn = state.db.conn();
        let edges = relations::edges_for_user(&conn, auth.id)?;
        let has_cycle = graph::would_create_cycle(&edges, req.from_entry_id, req.to_entry_id);
        let relation = relations::create(
            &conn,
            auth.id,
            req.from_entry_id,
            req.to_entry_id,
            req.relation_type,
            req.description.as_deref(),
        )?;
        (relation, has_cycle)
    };

    if has_cycle {
        tracing::warn!(
            user_id = auth.id,
            relation_id = relation.id,
            "relation closes a cycle"
        );
    }

    Ok(ok(CreateRelationResponse { relation, has_cycle }))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>> {
    {
        let conn = state.db.conn();
        relations::delete(&conn, auth.id, id)?;
    }
    Ok(ok(serde_json::json!({ "deleted": id })))
}

/// Relations touching one entry, split into incoming and outgoing.
pub async fn for_entry(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(entry_id): Path<i64>,
) -> Result<Json<ApiResponse<EntryRelations>>> {
    let listing = {
        let conn = state.db.conn();
        relations::for_entry(&conn, auth.id, entry_id)?
    };
    Ok(ok(listing))
}

/// Walk the chain reachable from an entry.
pub async fn chain(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(entry_id): Path<i64>,
    Query(query): Query<ChainQuery>,
) -> Result<Json<ApiResponse<Chain>>> {
    let depth = validation::validate_depth(
        query.depth.unwrap_or(validation::DEFAULT_CHAIN_DEPTH),
    )
    .map_validation_err("depth")?;
    let direction = match query.direction.as_deref() {
        None => Direction::Forward,
        Some(raw) => Direction::from_str(raw).map_err(|reason| AppError::InvalidInput {
            field: "direction".to_string(),
            reason,
        })?,
    };

    let chain = {
        let conn = state.db.conn();
        // Ownership check; the walk itself only sees the user's own edges
        entries::get_owned(&conn, auth.id, entry_id)?;
        let edges = relations::edges_for_user(&conn, auth.id)?;
        graph::walk_chain(&edges, entry_id, depth, direction)
    };
    Ok(ok(chain))
}

/// Entries ranked by total relation count.
pub async fn most_connected(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<MostConnectedQuery>,
) -> Result<Json<ApiResponse<Vec<ConnectedEntry>>>> {
    let limit = validation::validate_limit(query.limit.unwrap_or(10)).map_validation_err("limit")?;

    let ranked = {
        let conn = state.db.conn();
        let edges = relations::edges_for_user(&conn, auth.id)?;
        graph::rank_by_degree(&edges, limit)
    };
    Ok(ok(ranked
        .into_iter()
        .map(|(entry_id, connections)| ConnectedEntry {
            entry_id,
            connections,
        })
        .collect()))
}

/// Export the relation graph: the full graph, or the one-hop neighborhood
/// of a single entry.
pub async fn graph_export(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<GraphQuery>,
) -> Result<Json<ApiResponse<GraphResponse>>> {
    // The focal entry is always a node, even when it has no relations
    let mut nodes: Vec<i64> = Vec::new();
    let edges = {
        let conn = state.db.conn();
        match query.entry_id {
            Some(entry_id) => {
                entries::get_owned(&conn, auth.id, entry_id)?;
                nodes.push(entry_id);
                let listing = relations::for_entry(&conn, auth.id, entry_id)?;
                let mut edges = listing.outgoing;
                edges.extend(listing.incoming);
                edges
            }
            None => relations::list_for_user(&conn, auth.id)?,
        }
    };

    nodes.extend(
        edges
            .iter()
            .flat_map(|r| [r.from_entry_id, r.to_entry_id]),
    );
    nodes.sort_unstable();
    nodes.dedup();

    Ok(ok(GraphResponse { nodes, edges }))
}
