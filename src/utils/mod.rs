// src/utils/mod.rs

pub mod jwt;
pub mod object_id;
