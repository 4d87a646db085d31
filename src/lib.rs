// src/lib.rs

pub mod error;
pub mod config;
pub mod metadata;
pub mod blobs;
pub mod auth;
pub mod users;
pub mod orders;
pub mod service;
pub mod app_state;
