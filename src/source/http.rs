//! HTTP(S)/FTP source download with bounded retry, exponential backoff,
//! `Range`-resumed retries, and periodic progress logging.

use std::fs::OpenOptions;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use reqwest::header::RANGE;
use reqwest::StatusCode;

use super::error::{Error, Result};

const MAX_ATTEMPTS: u32 = 4;
const INITIAL_BACKOFF: Duration = Duration::from_millis(500);
const CHUNK_SIZE: usize = 64 * 1024;
const PROGRESS_STEP_PCT: u64 = 10;

/// Downloads `url` to `dest`, retrying recoverable transport failures
/// (timeouts, connection resets, 5xx responses) with exponential backoff.
/// A 4xx response is not retried. A retry resumes from however much of
/// `dest` survived the previous attempt via a `Range` request, falling
/// back to a full restart if the server doesn't honor it.
pub fn download(url: &str, dest: &Path) -> Result<()> {
    let client = reqwest::blocking::Client::builder()
        .build()
        .map_err(|e| Error::Http(url.to_string(), e))?;

    let mut backoff = INITIAL_BACKOFF;
    let mut last_err = None;
    for attempt in 1..=MAX_ATTEMPTS {
        match try_download(&client, url, dest) {
            Ok(()) => return Ok(()),
            Err(Retry::Fatal(e)) => return Err(e),
            Err(Retry::Recoverable(e)) => {
                log::warn!("download of '{url}' failed (attempt {attempt}/{MAX_ATTEMPTS}): {e}");
                last_err = Some(e);
                if attempt < MAX_ATTEMPTS {
                    std::thread::sleep(backoff);
                    backoff *= 2;
                }
            }
        }
    }
    let _ = last_err;
    Err(Error::HttpRetriesExhausted(url.to_string(), MAX_ATTEMPTS))
}

enum Retry {
    Recoverable(Error),
    Fatal(Error),
}

fn try_download(client: &reqwest::blocking::Client, url: &str, dest: &Path) -> std::result::Result<(), Retry> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Retry::Fatal(e.into()))?;
    }

    let resume_from = std::fs::metadata(dest).map(|m| m.len()).unwrap_or(0);
    let mut request = client.get(url);
    if resume_from > 0 {
        request = request.header(RANGE, format!("bytes={resume_from}-"));
    }
    let response = request.send().map_err(|e| classify(url, e))?;
    let status = response.status();
    if status.is_server_error() {
        return Err(Retry::Recoverable(Error::Http(
            url.to_string(),
            response.error_for_status().unwrap_err(),
        )));
    }

    let resuming = resume_from > 0 && status == StatusCode::PARTIAL_CONTENT;
    let response = response
        .error_for_status()
        .map_err(|e| Retry::Fatal(Error::Http(url.to_string(), e)))?;

    let already = if resuming { resume_from } else { 0 };
    let total = response.content_length().map(|len| len + already);

    let mut file = if resuming {
        OpenOptions::new().append(true).open(dest)
    } else {
        std::fs::File::create(dest)
    }
    .map_err(|e| Retry::Fatal(e.into()))?;

    stream_with_progress(url, response, &mut file, already, total)
}

/// Reads `response` in fixed-size chunks, appending each to `file` and
/// logging progress every [`PROGRESS_STEP_PCT`] once `total` is known. A
/// server that doesn't report `Content-Length` just gets a running byte
/// count instead of a percentage.
fn stream_with_progress(
    url: &str,
    mut response: reqwest::blocking::Response,
    file: &mut std::fs::File,
    already: u64,
    total: Option<u64>,
) -> std::result::Result<(), Retry> {
    let mut buf = [0u8; CHUNK_SIZE];
    let mut downloaded = already;
    let mut next_report_pct = PROGRESS_STEP_PCT;
    loop {
        let read = response.read(&mut buf).map_err(classify_io)?;
        if read == 0 {
            break;
        }
        file.write_all(&buf[..read]).map_err(|e| Retry::Fatal(e.into()))?;
        downloaded += read as u64;
        match total {
            Some(total) if total > 0 => {
                let pct = percent(downloaded, total);
                if pct >= next_report_pct {
                    log::info!("downloading '{url}': {pct}% ({downloaded}/{total} bytes)");
                    next_report_pct = next_milestone(pct);
                }
            }
            _ => log::debug!("downloading '{url}': {downloaded} bytes"),
        }
    }
    Ok(())
}

fn classify(url: &str, err: reqwest::Error) -> Retry {
    if err.is_timeout() || err.is_connect() {
        Retry::Recoverable(Error::Http(url.to_string(), err))
    } else {
        Retry::Fatal(Error::Http(url.to_string(), err))
    }
}

fn percent(downloaded: u64, total: u64) -> u64 {
    downloaded.saturating_mul(100) / total
}

fn next_milestone(pct: u64) -> u64 {
    pct + PROGRESS_STEP_PCT - (pct % PROGRESS_STEP_PCT)
}

fn classify_io(err: std::io::Error) -> Retry {
    use std::io::ErrorKind;
    match err.kind() {
        ErrorKind::TimedOut | ErrorKind::ConnectionReset | ErrorKind::UnexpectedEof => {
            Retry::Recoverable(Error::Io(err))
        }
        _ => Retry::Fatal(Error::Io(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds_down() {
        assert_eq!(percent(33, 100), 33);
        assert_eq!(percent(0, 100), 0);
        assert_eq!(percent(100, 100), 100);
    }

    #[test]
    fn next_milestone_skips_to_the_next_unreached_step() {
        assert_eq!(next_milestone(0), 10);
        assert_eq!(next_milestone(9), 10);
        assert_eq!(next_milestone(10), 20);
        assert_eq!(next_milestone(27), 30);
    }
}
