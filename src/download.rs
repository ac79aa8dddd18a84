//! Blocking HTTP download of upstream artifacts.
//!
//! One attempt per file, no resume, no retry. The orchestration loop treats a
//! failed download as fatal for that dependency only and moves on.

use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use crate::error::SetupError;
use crate::output;

/// Bounded timeout for the whole request; upstream archives are small.
const HTTP_TIMEOUT_SECS: u64 = 30;

/// Download `url` to `dest`, streaming with a progress bar.
///
/// Returns the number of bytes written on success.
pub fn download_file(url: &str, dest: &Path) -> Result<u64, SetupError> {
    let filename = dest
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "download".to_string());

    output::detail(&format!("downloading {}", url));
    let pb = output::create_spinner(&format!("downloading {}", filename));

    let response = ureq::get(url)
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .call()
        .map_err(|e| {
            pb.finish_and_clear();
            SetupError::download(url, e)
        })?;

    if let Some(len) = response
        .header("content-length")
        .and_then(|s| s.parse().ok())
    {
        output::upgrade_to_bytes(&pb, len);
    }

    let result = write_body(url, response, dest, &pb);
    pb.finish_and_clear();

    let total_bytes = result?;
    output::detail(&format!("downloaded {} ({} bytes)", filename, total_bytes));
    Ok(total_bytes)
}

fn write_body(
    url: &str,
    response: ureq::Response,
    dest: &Path,
    pb: &indicatif::ProgressBar,
) -> Result<u64, SetupError> {
    let mut file = std::fs::File::create(dest)
        .map_err(|e| SetupError::download(url, format!("cannot create {}: {}", dest.display(), e)))?;

    let mut reader = response.into_reader();
    let mut buffer = [0u8; 8192];
    let mut total_bytes = 0u64;

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| SetupError::download(url, format!("read error: {}", e)))?;

        if bytes_read == 0 {
            break;
        }

        file.write_all(&buffer[..bytes_read])
            .map_err(|e| SetupError::download(url, format!("write error: {}", e)))?;

        total_bytes += bytes_read as u64;
        pb.set_position(total_bytes);
    }

    Ok(total_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_invalid_url() {
        let temp = tempfile::tempdir().unwrap();
        let result = download_file("not-a-valid-url", &temp.path().join("out"));
        assert!(matches!(result, Err(SetupError::Download { .. })));
    }

    #[test]
    fn test_download_unreachable_host() {
        let temp = tempfile::tempdir().unwrap();
        let result = download_file(
            "http://127.0.0.1:1/nothing.zip",
            &temp.path().join("nothing.zip"),
        );
        assert!(matches!(result, Err(SetupError::Download { .. })));
    }

    #[test]
    fn test_timeout_is_reasonable() {
        assert!(HTTP_TIMEOUT_SECS >= 5);
        assert!(HTTP_TIMEOUT_SECS <= 120);
    }
}
