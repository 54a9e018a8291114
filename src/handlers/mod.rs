// src/handlers/mod.rs

pub mod answers;
pub mod choices;
pub mod participant;
pub mod quiz;
pub mod quizmaster;

/// Page-level follow-up a handler asks its host for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Reload the current page so server-rendered state resynchronizes.
    Reload,
    /// Go to another page of the site.
    Navigate(String),
}
