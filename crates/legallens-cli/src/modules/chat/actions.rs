use legallens_core::{paths, ChatRequest, ChatResponse};
use legallens_session::ApiRequest;
use tracing::debug;

use crate::cli_args::ChatArgs;
use crate::modules::auth::require_user;
use crate::modules::system::CommandContext;

pub(crate) async fn handle_chat(args: ChatArgs, ctx: &CommandContext<'_>) -> anyhow::Result<()> {
    let message = args.message.join(" ");
    if message.trim().is_empty() {
        anyhow::bail!("message is required");
    }
    require_user(ctx).await?;

    let request = ApiRequest::post(paths::CHAT).json(&ChatRequest {
        document_id: args.document_id,
        message,
    })?;
    let reply: ChatResponse = ctx.session.gateway().send_json(&request).await?;
    debug!(document_id = args.document_id, "chat reply received");
    println!("{}", reply.response.trim());
    Ok(())
}
