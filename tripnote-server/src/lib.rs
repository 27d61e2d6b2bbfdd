pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod feed;
pub mod geocoding;
pub mod middleware;
pub mod routes;
pub mod state;
