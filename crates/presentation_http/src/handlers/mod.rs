//! HTTP handlers

pub mod calls;
pub mod health;
pub mod media;
pub mod queries;
