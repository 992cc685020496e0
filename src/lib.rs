//! Atelier - backend for a community visual-arts platform
//!
//! This library provides artwork submission and moderation, events,
//! projects, notifications, and role-based access control.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
