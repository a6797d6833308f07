use legallens_core::UserProfile;
use legallens_session::SessionPhase;
use tracing::info;

use crate::cli_args::{LoginArgs, RegisterArgs};
use crate::modules::system::CommandContext;
use crate::{prompt_line, prompt_password};

fn credentials(
    email: Option<String>,
    password: Option<String>,
) -> anyhow::Result<(String, String)> {
    let email = match email {
        Some(email) => email,
        None => prompt_line("Email: ")?,
    };
    let password = match password {
        Some(password) => password,
        None => prompt_password("Password: ")?,
    };
    Ok((email, password))
}

pub(crate) async fn handle_login(args: LoginArgs, ctx: &CommandContext<'_>) -> anyhow::Result<()> {
    let (email, password) = credentials(args.email, args.password)?;
    let user = ctx.session.login(&email, &password).await?;
    info!(addr = %ctx.addr, user_id = user.id, "login complete");
    println!("Logged in as {}", user.email);
    Ok(())
}

pub(crate) fn handle_logout(ctx: &CommandContext<'_>) {
    ctx.session.logout();
}

pub(crate) async fn handle_register(
    args: RegisterArgs,
    ctx: &CommandContext<'_>,
) -> anyhow::Result<()> {
    let (email, password) = credentials(args.email, args.password)?;
    ctx.session.register(&email, &password).await?;
    println!("Account created for {email}. Run `legallens login` to sign in.");
    Ok(())
}

/// Settles the session and returns the logged-in user, or fails with a
/// hint to log in.
pub(crate) async fn require_user(ctx: &CommandContext<'_>) -> anyhow::Result<UserProfile> {
    match ctx.session.initialize().await {
        SessionPhase::Authenticated(user) => Ok(user),
        _ => anyhow::bail!("not logged in; run `legallens login`"),
    }
}

pub(crate) async fn handle_whoami(ctx: &CommandContext<'_>) -> anyhow::Result<()> {
    let user = require_user(ctx).await?;
    println!("{}", serde_json::to_string_pretty(&user)?);
    Ok(())
}

pub(crate) async fn handle_status(ctx: &CommandContext<'_>) {
    match ctx.session.initialize().await {
        SessionPhase::Authenticated(user) => {
            println!("Logged in as {} ({})", user.email, ctx.addr)
        }
        _ => println!("Not logged in ({})", ctx.addr),
    }
}
