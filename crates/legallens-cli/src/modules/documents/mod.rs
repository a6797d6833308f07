mod actions;
pub(crate) mod args;

pub(crate) use actions::handle_documents;
#[cfg(test)]
pub(crate) use actions::{format_document, format_document_list, format_upload, upload_request};
