use clap::{ArgAction, Parser, Subcommand};

pub use crate::modules::auth::args::*;
pub use crate::modules::chat::args::*;
pub use crate::modules::documents::args::*;
pub use crate::modules::system::args::*;

#[derive(Parser)]
#[command(name = "legallens")]
#[command(about = "LegalLens CLI")]
pub struct Cli {
    #[arg(long, env = "LEGALLENS_ADDR", help = "Server base URL")]
    pub addr: Option<String>,
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
    #[arg(long, help = "Allow http:// to non-loopback hosts and invalid TLS certificates")]
    pub insecure: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[command(about = "Log in and store the session credentials")]
    Login(LoginArgs),
    #[command(about = "Forget the stored session credentials")]
    Logout,
    #[command(about = "Create an account (does not log in)")]
    Register(RegisterArgs),
    #[command(about = "Print the logged-in user's profile")]
    Whoami,
    #[command(about = "Print the session phase")]
    Status,
    Documents(DocumentsArgs),
    #[command(about = "Ask a question about a document")]
    Chat(ChatArgs),
    Config(ConfigArgs),
}
