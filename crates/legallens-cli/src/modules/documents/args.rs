use std::path::PathBuf;

use clap::{Args, Subcommand};

#[derive(Args)]
pub struct DocumentsArgs {
    #[command(subcommand)]
    pub command: DocumentsCommand,
}

#[derive(Subcommand)]
pub enum DocumentsCommand {
    #[command(about = "List analyzed documents")]
    List(DocumentListArgs),
    #[command(about = "Show a document's summary, clauses and red flags")]
    Get(DocumentGetArgs),
    #[command(about = "Upload a PDF for analysis")]
    Upload(DocumentUploadArgs),
    #[command(about = "Delete a document")]
    Delete(DocumentDeleteArgs),
}

#[derive(Args)]
pub struct DocumentListArgs {
    #[arg(long, help = "Print the raw JSON response")]
    pub json: bool,
}

#[derive(Args)]
pub struct DocumentGetArgs {
    pub id: i64,
    #[arg(long, help = "Print the raw JSON response")]
    pub json: bool,
}

#[derive(Args)]
pub struct DocumentDeleteArgs {
    pub id: i64,
}

#[derive(Args)]
pub struct DocumentUploadArgs {
    #[arg(help = "Path to the document")]
    pub path: PathBuf,
    #[arg(long, help = "Print the raw JSON response")]
    pub json: bool,
}
