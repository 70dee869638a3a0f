//! ローカルファイル操作モジュール
//!
//! エディタ内容（および変換結果）のローカル書き出しと、ローカルファイルの
//! 読み込みを提供する。ネットワークは介在しない。

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::MAX_IMPORT_SIZE;
use crate::convert::ConvertedDocument;
use crate::error::FileError;

/// チルダ等を展開してパスへ変換する
pub fn expand_path(input: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(input).into_owned())
}

/// 内容を指定パスへ書き出す
pub fn export_text(path: &Path, content: &str) -> Result<(), FileError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| FileError::Io {
                message: e.to_string(),
            })?;
        }
    }
    fs::write(path, content).map_err(|e| FileError::Io {
        message: e.to_string(),
    })
}

/// 変換結果を `stem.{ext}` として書き出し、書き出したパスを返す
pub fn export_document(
    dir: &Path,
    stem: &str,
    document: &ConvertedDocument,
) -> Result<PathBuf, FileError> {
    let path = dir.join(format!("{stem}.{}", document.format.extension()));
    export_text(&path, &document.content)?;
    Ok(path)
}

/// ローカルファイルを読み込む（10MiB 上限、UTF-8 のみ）
pub fn import_text(path: &Path) -> Result<String, FileError> {
    let metadata = fs::metadata(path).map_err(|_| FileError::NotFound {
        path: path.display().to_string(),
    })?;
    if metadata.len() > MAX_IMPORT_SIZE {
        return Err(FileError::TooLarge {
            size: metadata.len(),
            limit: MAX_IMPORT_SIZE,
        });
    }

    let bytes = fs::read(path).map_err(|e| FileError::Io {
        message: e.to_string(),
    })?;
    String::from_utf8(bytes).map_err(|e| FileError::Encoding {
        message: e.to_string(),
    })
}

/// 人間向けのサイズ表記（B / KB / MB / GB）
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut size = bytes as f64;
    let mut unit = 0usize;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.2} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{ConvertedDocument, ExportFormat};

    #[test]
    fn export_and_import_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        export_text(&path, "{\"sites\":[]}").unwrap();
        assert_eq!(import_text(&path).unwrap(), "{\"sites\":[]}");
    }

    #[test]
    fn export_document_names_by_format() {
        let dir = tempfile::tempdir().unwrap();
        let document = ConvertedDocument {
            format: ExportFormat::Yaml,
            content: "sites: []\n".to_string(),
        };
        let path = export_document(dir.path(), "luna-tv-config", &document).unwrap();
        assert!(path.ends_with("luna-tv-config.yaml"));
        assert!(path.exists());
    }

    #[test]
    fn import_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = import_text(&dir.path().join("nope.json"));
        assert!(matches!(result, Err(FileError::NotFound { .. })));
    }

    #[test]
    fn import_rejects_non_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bin.json");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        assert!(matches!(import_text(&path), Err(FileError::Encoding { .. })));
    }

    #[test]
    fn size_formatting_scales_units() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
    }

    #[test]
    fn tilde_paths_expand_to_home() {
        let expanded = expand_path("~/config.json");
        assert!(!expanded.to_string_lossy().starts_with('~'));
    }
}
