//! Infrastructure layer: in-memory storage, connection registry and wire DTOs.

pub mod dto;
pub mod registry;
pub mod repository;
