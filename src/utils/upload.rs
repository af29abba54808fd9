//! Component image storage keyed by sanitized part number

use std::io;
use std::path::Path;

/// Convert text to a filesystem-safe filename. Keeps letters, numbers,
/// dot, dash, underscore; any other run of characters becomes a single '-'.
pub fn safe_filename(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_dash = false;

    for ch in text.trim().chars() {
        if ch.is_ascii_alphanumeric() || ch == '.' || ch == '_' {
            out.push(ch);
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }

    out
}

/// Stored name for a component image: sanitized part number plus the
/// lowercased extension of the uploaded file.
pub fn image_filename(part_no: &str, original_name: &str) -> String {
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default();
    format!("{}{}", safe_filename(part_no), ext)
}

/// Write the image and return the relative path stored on the component.
pub fn save_image(upload_dir: &Path, filename: &str, data: &[u8]) -> io::Result<String> {
    std::fs::create_dir_all(upload_dir)?;
    std::fs::write(upload_dir.join(filename), data)?;
    Ok(format!("uploads/components/{}", filename))
}

/// Remove a previously stored image. Missing files are not an error.
pub fn delete_image(upload_dir: &Path, image_path: &str) {
    let Some(name) = Path::new(image_path).file_name() else {
        return;
    };
    let path = upload_dir.join(name);
    if path.exists() {
        if let Err(e) = std::fs::remove_file(&path) {
            tracing::warn!("Failed to delete image {:?}: {}", path, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_safe_characters() {
        assert_eq!(safe_filename("R-1001_v2.A"), "R-1001_v2.A");
    }

    #[test]
    fn replaces_unsafe_runs_with_single_dash() {
        assert_eq!(safe_filename("part no #42"), "part-no-42");
        assert_eq!(safe_filename("a/\\..//b"), "a-..-b");
    }

    #[test]
    fn collapses_repeated_dashes() {
        assert_eq!(safe_filename("a---b"), "a-b");
        assert_eq!(safe_filename("a- -b"), "a-b");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(safe_filename("  R-1 "), "R-1");
    }

    #[test]
    fn filename_uses_lowercased_extension() {
        assert_eq!(image_filename("R-1001", "Photo.JPG"), "R-1001.jpg");
        assert_eq!(image_filename("R 1001", "pic.png"), "R-1001.png");
        assert_eq!(image_filename("R-1001", "noext"), "R-1001");
    }
}
