pub mod census;
pub mod config;
pub mod db;
pub mod importers;
pub mod models;
pub mod services;
