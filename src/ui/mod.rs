//! Terminal UI: board view and the key-driven game loop.

mod app;
mod game_view;

pub use app::App;
