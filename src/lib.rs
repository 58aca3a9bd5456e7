pub mod commands;
pub mod daemon;
pub mod db;
pub mod engine;
pub mod models;
