/// Slash command parsing and the command menu
pub mod commands;
/// teloxide endpoints and dispatcher tree
pub mod handlers;
/// Photo decoding and normalization
pub mod media;
/// Event routing
pub mod router;
/// Per-user analysis mode
pub mod state;
/// Messaging platform abstraction
pub mod transport;
/// Texts and keyboards
pub mod views;

pub use router::{Inbound, Router};
pub use state::{AnalysisMode, InMemoryModeStore, ModeStore};
