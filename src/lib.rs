pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod shutdown;
pub mod state;

#[cfg(test)]
pub mod testing;
