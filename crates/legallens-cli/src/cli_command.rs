use crate::cli_args::*;
use crate::modules::auth::{
    handle_login, handle_logout, handle_register, handle_status, handle_whoami,
};
use crate::modules::chat::handle_chat;
use crate::modules::documents::handle_documents;
use crate::modules::system::CommandContext;

pub(crate) async fn handle_command(
    command: Command,
    ctx: &CommandContext<'_>,
) -> anyhow::Result<()> {
    match command {
        Command::Login(args) => handle_login(args, ctx).await?,
        Command::Logout => handle_logout(ctx),
        Command::Register(args) => handle_register(args, ctx).await?,
        Command::Whoami => handle_whoami(ctx).await?,
        Command::Status => handle_status(ctx).await,
        Command::Documents(args) => handle_documents(args, ctx).await?,
        Command::Chat(args) => handle_chat(args, ctx).await?,
        Command::Config(_) => unreachable!(),
    }

    Ok(())
}
