pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod improve;
pub mod repo;
pub mod resumes;
pub mod state;
pub mod users;
