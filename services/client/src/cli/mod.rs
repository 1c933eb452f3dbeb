pub mod args;
pub mod commands;
pub mod dashboard;
pub mod state;

pub use args::{Cli, Commands};
pub use state::AppState;
