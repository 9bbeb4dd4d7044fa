//! Output path resolution.

use std::path::{Path, PathBuf};

/// Directory outputs for `input` are written to: next to the input.
pub fn output_dir_for(input: &Path) -> PathBuf {
    input
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Default output path: `<dir>/<input stem><suffix>.<extension>`.
pub fn output_path_for(input: &Path, suffix: &str, extension: &str) -> PathBuf {
    // Use to_string_lossy() to handle non-UTF-8 filenames gracefully
    let stem = input.file_stem().map_or_else(
        || std::borrow::Cow::Borrowed("output"),
        |s| s.to_string_lossy(),
    );

    output_dir_for(input).join(format!("{stem}{suffix}.{extension}"))
}

/// The explicit output path if given, else the default one.
pub fn resolve_output(
    explicit: Option<&Path>,
    input: &Path,
    suffix: &str,
    extension: &str,
) -> PathBuf {
    explicit.map_or_else(
        || output_path_for(input, suffix, extension),
        Path::to_path_buf,
    )
}
