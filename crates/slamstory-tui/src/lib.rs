//! Terminal front end: upload, storyboard and commentary screens driven by
//! an action bus.

pub mod action;
pub mod app;
pub mod components;
pub mod event;
pub mod theme;

pub use app::App;
