mod args;
mod inject;
mod manifest;

pub use args::ConfigArgs;
pub use inject::{InjectArgs, cmd_inject};
pub use manifest::cmd_manifest;
