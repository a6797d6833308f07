use clap::{Args, Subcommand};

use super::types::StoreKind;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    #[command(about = "Print the current configuration")]
    Show,
    #[command(about = "Set the default server base URL")]
    SetAddr(SetAddrArgs),
    #[command(about = "Choose where session credentials are kept")]
    SetStore(SetStoreArgs),
    #[command(about = "Set the session renewal timeout in seconds")]
    SetRenewalTimeout(SetRenewalTimeoutArgs),
}

#[derive(Args)]
pub struct SetAddrArgs {
    #[arg(help = "Server base URL")]
    pub addr: String,
}

#[derive(Args)]
pub struct SetStoreArgs {
    #[arg(value_enum)]
    pub store: StoreKind,
}

#[derive(Args)]
pub struct SetRenewalTimeoutArgs {
    pub seconds: u64,
}
