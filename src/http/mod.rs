pub mod app_error;
pub mod connections;
pub mod events;
pub mod health;
pub mod server;
pub mod state;
