// Helper functions shared by the downloader modules

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::Stdio;

use tokio::io::AsyncReadExt;
use tokio::process::Command as TokioCommand;
use tokio::time::{timeout, Duration as TokioDuration};

/// Run a command to completion and collect its output, killing it after
/// `timeout_secs`.
pub async fn run_output_with_timeout(
    program: &str,
    args: Vec<String>,
    timeout_secs: u64,
) -> Result<std::process::Output, String> {
    let mut child = TokioCommand::new(program)
        .args(&args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| format!("Failed to start {}: {}", program, e))?;

    let mut stdout_pipe = child
        .stdout
        .take()
        .ok_or_else(|| format!("Failed to capture stdout from {}", program))?;
    let mut stderr_pipe = child
        .stderr
        .take()
        .ok_or_else(|| format!("Failed to capture stderr from {}", program))?;

    // Drain both pipes concurrently so a chatty child cannot block on a
    // full pipe buffer while we wait for it to exit
    let stdout_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stdout_pipe
            .read_to_end(&mut buf)
            .await
            .map_err(|e| format!("Failed to read stdout: {}", e))?;
        Ok::<Vec<u8>, String>(buf)
    });
    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stderr_pipe
            .read_to_end(&mut buf)
            .await
            .map_err(|e| format!("Failed to read stderr: {}", e))?;
        Ok::<Vec<u8>, String>(buf)
    });

    let waited = timeout(TokioDuration::from_secs(timeout_secs), child.wait()).await;
    match waited {
        Ok(status_res) => {
            let status =
                status_res.map_err(|e| format!("Failed to wait for {}: {}", program, e))?;
            let stdout = stdout_task
                .await
                .map_err(|e| format!("stdout task failed: {}", e))??;
            let stderr = stderr_task
                .await
                .map_err(|e| format!("stderr task failed: {}", e))??;
            Ok(std::process::Output {
                status,
                stdout,
                stderr,
            })
        }
        Err(_) => {
            let _ = child.kill().await;
            stdout_task.abort();
            stderr_task.abort();
            Err(format!("Timed out after {}s", timeout_secs))
        }
    }
}

/// Expand a leading `~` to the user's home directory.
/// Anything without the prefix passes through unchanged.
pub fn expand_tilde(path: &str) -> Result<PathBuf, String> {
    if path == "~" {
        return dirs::home_dir().ok_or_else(|| "could not resolve the home directory".to_string());
    }
    if let Some(rest) = path.strip_prefix("~/") {
        let home =
            dirs::home_dir().ok_or_else(|| "could not resolve the home directory".to_string())?;
        return Ok(home.join(rest));
    }
    Ok(PathBuf::from(path))
}

/// Byte count in the form the information blocks print, e.g. "85.0 MB".
pub fn format_size(bytes: u64) -> String {
    let mb = bytes as f64 / 1_048_576.0;
    if mb >= 1024.0 {
        format!("{:.1} GB", mb / 1024.0)
    } else {
        format!("{:.1} MB", mb)
    }
}

/// Duration in fractional minutes, e.g. "12.5 minutes".
pub fn format_duration_minutes(seconds: f64) -> String {
    format!("{:.1} minutes", seconds / 60.0)
}

/// Timestamp suffix appended to output filenames, e.g. "20240131_093055".
pub fn timestamp_suffix() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Ask `question (y/n):` on stdout and loop until the answer is y or n.
/// EOF on stdin counts as declining.
pub fn confirm(question: &str) -> io::Result<bool> {
    let stdin = io::stdin();
    loop {
        print!("\n{} (y/n): ", question);
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(false);
        }
        match line.trim().to_lowercase().as_str() {
            "y" => return Ok(true),
            "n" => return Ok(false),
            _ => println!("Please enter 'y' for yes or 'n' for no."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_tilde_bare() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~").unwrap(), home);
        }
    }

    #[test]
    fn test_expand_tilde_prefix() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(
                expand_tilde("~/Downloads/videos").unwrap(),
                home.join("Downloads/videos")
            );
        }
    }

    #[test]
    fn test_expand_tilde_passthrough() {
        assert_eq!(
            expand_tilde("/tmp/videos").unwrap(),
            PathBuf::from("/tmp/videos")
        );
        assert_eq!(
            expand_tilde("relative/dir").unwrap(),
            PathBuf::from("relative/dir")
        );
        // A tilde that is not the leading component stays literal
        assert_eq!(
            expand_tilde("/tmp/~backup").unwrap(),
            PathBuf::from("/tmp/~backup")
        );
    }

    #[test]
    fn test_format_size_megabytes() {
        assert_eq!(format_size(85 * 1024 * 1024), "85.0 MB");
        assert_eq!(format_size(1_500_000), "1.4 MB");
    }

    #[test]
    fn test_format_size_gigabytes() {
        assert_eq!(format_size(2 * 1024 * 1024 * 1024), "2.0 GB");
    }

    #[test]
    fn test_format_duration_minutes() {
        assert_eq!(format_duration_minutes(90.0), "1.5 minutes");
        assert_eq!(format_duration_minutes(754.0), "12.6 minutes");
    }

    #[test]
    fn test_timestamp_suffix_shape() {
        let ts = timestamp_suffix();
        assert_eq!(ts.len(), 15);
        assert_eq!(ts.as_bytes()[8], b'_');
        assert!(ts
            .chars()
            .enumerate()
            .all(|(i, c)| i == 8 || c.is_ascii_digit()));
    }
}
