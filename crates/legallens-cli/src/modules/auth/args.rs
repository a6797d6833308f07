use clap::Args;

#[derive(Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long, help = "Password (prompted when omitted)")]
    pub password: Option<String>,
}

#[derive(Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long, help = "Password (prompted when omitted)")]
    pub password: Option<String>,
}
