use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use legallens_core::{paths, DocumentDetail, DocumentListItem, UploadResponse};
use legallens_session::ApiRequest;
use tracing::debug;

use crate::cli_args::{DocumentsArgs, DocumentsCommand};
use crate::modules::auth::require_user;
use crate::modules::system::CommandContext;

pub(crate) async fn handle_documents(
    args: DocumentsArgs,
    ctx: &CommandContext<'_>,
) -> anyhow::Result<()> {
    require_user(ctx).await?;
    let gateway = ctx.session.gateway();

    match args.command {
        DocumentsCommand::List(args) => {
            let documents: Vec<DocumentListItem> = gateway.get_json(paths::DOCUMENTS).await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&documents)?);
            } else {
                print!("{}", format_document_list(&documents));
            }
        }
        DocumentsCommand::Get(args) => {
            let document: DocumentDetail = gateway.get_json(&paths::document(args.id)).await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&document)?);
            } else {
                print!("{}", format_document(&document));
            }
        }
        DocumentsCommand::Upload(args) => {
            let request = upload_request(&args.path)?;
            let uploaded: UploadResponse = gateway.send_json(&request).await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&uploaded)?);
            } else {
                print!("{}", format_upload(&uploaded));
            }
        }
        DocumentsCommand::Delete(args) => {
            gateway
                .send(&ApiRequest::delete(paths::document(args.id)))
                .await?
                .error_for_status()?;
            println!("Deleted document {}", args.id);
        }
    }

    Ok(())
}

pub(crate) fn upload_request(path: &Path) -> anyhow::Result<ApiRequest> {
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow::anyhow!("not a file: {}", path.display()))?;
    let data = fs::read(path)
        .map_err(|err| anyhow::anyhow!("failed to read {}: {err}", path.display()))?;
    if data.is_empty() {
        anyhow::bail!("file is empty: {}", path.display());
    }
    debug!(filename, size = data.len(), "uploading document");
    Ok(ApiRequest::post(paths::UPLOAD).multipart(
        "file",
        filename,
        content_type_for(path),
        data,
    ))
}

fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

fn format_date(value: Option<&DateTime<Utc>>) -> String {
    value
        .map(|value| value.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub(crate) fn format_document_list(documents: &[DocumentListItem]) -> String {
    if documents.is_empty() {
        return "No documents.\n".to_string();
    }
    let mut out = String::new();
    for document in documents {
        out.push_str(&format!(
            "{:>6}  {:<10}  {}\n",
            document.id,
            format_date(document.created_at.as_ref()),
            document.title
        ));
    }
    out
}

pub(crate) fn format_document(document: &DocumentDetail) -> String {
    let mut out = format!(
        "{} (#{}, {})\n",
        document.title,
        document.id,
        format_date(document.created_at.as_ref())
    );
    if !document.summary.trim().is_empty() {
        out.push_str(&format!("\n{}\n", document.summary.trim()));
    }
    if !document.clauses.is_empty() {
        out.push_str("\nClauses:\n");
        for clause in &document.clauses {
            out.push_str(&format!("  - {}: {}\n", clause.title, clause.content.trim()));
        }
    }
    if !document.red_flags.is_empty() {
        out.push_str("\nRed flags:\n");
        for flag in &document.red_flags {
            out.push_str(&format!("  ! {flag}\n"));
        }
    }
    out
}

pub(crate) fn format_upload(uploaded: &UploadResponse) -> String {
    let mut out = format!(
        "Uploaded {} as document #{}\n",
        uploaded.filename.as_deref().unwrap_or("file"),
        uploaded.id
    );
    if !uploaded.summary.trim().is_empty() {
        out.push_str(&format!("\n{}\n", uploaded.summary.trim()));
    }
    if !uploaded.red_flags.is_empty() {
        out.push_str("\nRed flags:\n");
        for flag in &uploaded.red_flags {
            out.push_str(&format!("  ! {flag}\n"));
        }
    }
    out
}
