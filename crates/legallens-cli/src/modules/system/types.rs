use clap::ValueEnum;
use legallens_session::Session;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    File,
    Keyring,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct CliConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addr: Option<String>,
    #[serde(default)]
    pub credential_store: StoreKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renewal_timeout_secs: Option<u64>,
}

pub struct CommandContext<'a> {
    pub session: &'a Session,
    pub addr: &'a str,
}
