pub mod api_doc;
pub mod config;
pub mod database;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod services;
pub mod state;
pub mod utils;

pub use database::Database;
