//! Native file dialog wrapper restricted to File Search compatible documents.

use std::path::PathBuf;

/// Extensions the Gemini File Search service accepts for import.
const SUPPORTED_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "ppt", "pptx", "xls", "xlsx", "csv", "txt", "md", "html", "py", "js",
    "java", "cpp", "json", "xml", "rtf",
];

/// Open a native file dialog and return the chosen document, if any.
///
/// The dialog offers the supported-document allow-list plus an "All Files" fallback and
/// starts in `upload/` when that directory exists. An empty selection returns `None`.
pub async fn select_file() -> Option<PathBuf> {
    let initial_dir = if std::path::Path::new("upload").is_dir() {
        PathBuf::from("upload")
    } else {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    };

    tracing::info!("Opening file selection dialog");
    let handle = rfd::AsyncFileDialog::new()
        .set_title("Select a file for Gemini File Search")
        .add_filter("Supported Files", SUPPORTED_EXTENSIONS)
        .add_filter("All Files", &["*"])
        .set_directory(initial_dir)
        .pick_file()
        .await;

    match handle {
        Some(file) => Some(file.path().to_path_buf()),
        None => {
            tracing::warn!("No file selected");
            None
        }
    }
}
