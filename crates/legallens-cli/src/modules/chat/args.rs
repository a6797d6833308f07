use clap::Args;

#[derive(Args)]
pub struct ChatArgs {
    #[arg(help = "Document ID")]
    pub document_id: i64,
    #[arg(required = true, trailing_var_arg = true, help = "Question to ask")]
    pub message: Vec<String>,
}
