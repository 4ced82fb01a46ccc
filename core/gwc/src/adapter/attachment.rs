//! `--image` 引数を画像添付に解決する
//!
//! URL（http/https/data）はそのまま、ローカルファイルは読み込んで data URL にする。

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use common::error::Error;
use common::ports::outbound::FileSystem;

use crate::domain::Attachment;

fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

fn is_url(s: &str) -> bool {
    ["http://", "https://", "data:"]
        .iter()
        .any(|p| s.starts_with(p))
}

/// 画像の指定を Attachment に変換する
pub fn resolve_image(fs: &dyn FileSystem, image: &str) -> Result<Attachment, Error> {
    let image = image.trim();
    if image.is_empty() {
        return Err(Error::invalid_argument("--image is empty"));
    }
    if is_url(image) {
        return Ok(Attachment::ImageUrl(image.to_string()));
    }
    let path = Path::new(image);
    let mime = mime_for(path).ok_or_else(|| {
        Error::invalid_argument(format!(
            "unsupported image type: {} (png, jpg, gif, webp)",
            image
        ))
    })?;
    let bytes = fs
        .read(path)
        .map_err(|e| e.with_context(&format!("read image {}", image)))?;
    Ok(Attachment::ImageUrl(format!(
        "data:{};base64,{}",
        mime,
        STANDARD.encode(bytes)
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::adapter::StdFileSystem;
    use tempfile::tempdir;

    #[test]
    fn test_urls_pass_through() {
        let fs = StdFileSystem;
        for url in ["https://example.com/cat.png", "data:image/png;base64,AAAA"] {
            assert_eq!(
                resolve_image(&fs, url).unwrap(),
                Attachment::ImageUrl(url.to_string())
            );
        }
    }

    #[test]
    fn test_local_file_becomes_data_url() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dot.PNG");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();
        let Attachment::ImageUrl(url) = resolve_image(&StdFileSystem, path.to_str().unwrap()).unwrap();
        assert_eq!(url, "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn test_unknown_extension_is_usage_error() {
        let err = resolve_image(&StdFileSystem, "notes.txt").unwrap_err();
        assert!(err.is_usage());
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.jpg");
        let err = resolve_image(&StdFileSystem, path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("read image"));
    }
}
