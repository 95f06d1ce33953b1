pub mod clipboard_backend;
pub mod document_backend;
