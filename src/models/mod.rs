// src/models/mod.rs

pub mod answer;
pub mod form;
pub mod question;
pub mod status;
