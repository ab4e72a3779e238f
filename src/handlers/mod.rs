//! HTTP layer: request/response types, shared state and per-resource routes.

pub mod auth;
pub mod body_states;
pub mod circumstances;
pub mod emotions;
pub mod entries;
pub mod health;
pub mod people;
pub mod relations;
pub mod router;
pub mod skills;
pub mod state;
pub mod stats;
pub mod tags;
pub mod types;
