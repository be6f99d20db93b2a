pub mod backend;
pub mod config;
pub mod error;
pub mod image;
pub mod opponent;
pub mod panel;
pub mod pipeline;
pub mod state;
pub mod template;
pub mod text;

pub use backend::GenerativeBackend;
pub use config::SlamConfig;
pub use error::{Result, StoryError};
pub use opponent::Opponent;
pub use state::StoryState;
