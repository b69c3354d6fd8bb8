// src/handlers/mod.rs

pub mod result;
