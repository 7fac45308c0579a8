//! Screenshot file naming and collision-free persistence

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::io::AsyncWriteExt;

use crate::utils::{ActionError, ActionResult};

const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

/// Give up reserving a name after this many collisions
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Replace path separators and control characters with `_`
fn sanitize(hint: &str) -> String {
    hint.trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Drop trailing image extensions, case-insensitively, until none is left
fn strip_image_extension(name: &str) -> &str {
    let mut stem = name;
    while let Some((head, ext)) = stem.rsplit_once('.') {
        if head.is_empty() || !IMAGE_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)) {
            break;
        }
        stem = head;
    }
    stem
}

/// File stem for a screenshot, before any collision suffix
pub(crate) fn file_stem(hint: Option<&str>) -> String {
    let cleaned = hint.map(sanitize).unwrap_or_default();
    let stem = strip_image_extension(&cleaned).trim_matches('.');
    if stem.is_empty() {
        format!("screenshot_{}", Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        stem.to_string()
    }
}

/// `stem.png`, or `stem_N.png` for the Nth retry
pub(crate) fn file_name(stem: &str, attempt: u32) -> String {
    if attempt == 0 {
        format!("{stem}.png")
    } else {
        format!("{stem}_{attempt}.png")
    }
}

/// Write `bytes` to a fresh file in `dir`, never overwriting an existing one
pub(crate) async fn save_png(dir: &Path, hint: Option<&str>, bytes: &[u8]) -> ActionResult<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| ActionError::io(dir, e))?;

    let stem = file_stem(hint);
    for attempt in 0..MAX_NAME_ATTEMPTS {
        let path = dir.join(file_name(&stem, attempt));
        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(ActionError::io(path, e)),
        };

        file.write_all(bytes)
            .await
            .map_err(|e| ActionError::io(&path, e))?;
        file.flush().await.map_err(|e| ActionError::io(&path, e))?;
        return Ok(path);
    }

    Err(ActionError::io(
        dir.join(file_name(&stem, MAX_NAME_ATTEMPTS)),
        std::io::Error::new(ErrorKind::AlreadyExists, "no free screenshot name"),
    ))
}
