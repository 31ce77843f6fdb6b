pub mod app;
pub mod cli;
pub mod render;
pub mod session;

pub use app::{rest_client, Application};
pub use cli::{run, Cli, Command};
pub use session::InteractiveSession;
