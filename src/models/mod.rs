// src/models/mod.rs

pub mod exam;
pub mod pagination;
pub mod result;
pub mod user;
