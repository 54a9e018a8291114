// src/utils/mod.rs

pub mod html;
pub mod http;
pub mod report;
pub mod time;
