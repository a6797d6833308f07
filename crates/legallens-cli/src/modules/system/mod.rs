pub(crate) mod args;
pub(crate) mod config;
mod notifier;
pub(crate) mod types;

pub(crate) use config::{
    ensure_secure_addr, handle_config_command, load_config, open_session, resolve_addr,
    save_config,
};
pub(crate) use types::CommandContext;
