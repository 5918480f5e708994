// authorizer-stack - CLI front end
//
// Loads stack props (file, environment, flags), resolves them into a
// deployment configuration and plans the resources of the authorizer stack.

pub mod commands;
mod init;

pub use init::{init_tracing, LogFormat};
