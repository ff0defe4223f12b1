use assert_cmd::Command;
use predicates::str::contains;
use std::error::Error;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

// Helper function to get the path to the compiled binary
fn seqpress_cmd() -> Command {
    Command::cargo_bin("seqpress").expect("Failed to find seqpress binary")
}

#[test]
fn test_help_lists_convert_command() -> Result<(), Box<dyn Error>> {
    seqpress_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("convert"));
    Ok(())
}

#[test]
fn test_convert_requires_videos_dir() -> Result<(), Box<dyn Error>> {
    seqpress_cmd()
        .arg("convert")
        .assert()
        .failure()
        .stderr(contains("--videos"));
    Ok(())
}

#[test]
fn test_convert_non_existent_videos_dir() -> Result<(), Box<dyn Error>> {
    seqpress_cmd()
        .arg("convert")
        .arg("--videos")
        .arg("surely/this/does/not/exist")
        .assert()
        .code(1)
        .stderr(contains("Invalid videos directory"));
    Ok(())
}

#[test]
fn test_convert_unknown_codec_fails_before_touching_clips() -> Result<(), Box<dyn Error>> {
    let videos_dir = tempdir()?;
    let clip = videos_dir.path().join("GH010001.MP4");
    std::fs::write(&clip, "dummy content")?;

    seqpress_cmd()
        .arg("convert")
        .arg("-v")
        .arg(videos_dir.path())
        .arg("--codec")
        .arg("vp9")
        .assert()
        .code(1)
        .stderr(contains("Unsupported codec/accelerator combination"));

    // Configuration errors surface before organizing.
    assert!(clip.exists());
    assert!(!videos_dir.path().join("0001").exists());
    Ok(())
}

#[test]
fn test_convert_rejects_out_of_range_ratio() -> Result<(), Box<dyn Error>> {
    let videos_dir = tempdir()?;

    seqpress_cmd()
        .arg("convert")
        .arg("-v")
        .arg(videos_dir.path())
        .arg("--ratio-max")
        .arg("1.5")
        .assert()
        .code(1)
        .stderr(contains("ratio max must be within (0, 1]"));
    Ok(())
}

#[test]
fn test_convert_writes_run_log_into_log_dir() -> Result<(), Box<dyn Error>> {
    let videos_dir = tempdir()?;
    let log_dir = tempdir()?;

    seqpress_cmd()
        .arg("convert")
        .arg("-v")
        .arg(videos_dir.path())
        .arg("-l")
        .arg(log_dir.path())
        .arg("-a")
        .arg("gpu")
        .assert()
        .code(1);

    let logs: Vec<_> = std::fs::read_dir(log_dir.path())?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("seqpress_run_") && name.ends_with(".log"))
        .collect();
    assert_eq!(logs.len(), 1);
    Ok(())
}

fn run_log_contains(log_dir: &Path, needle: &str) -> bool {
    let Ok(entries) = fs::read_dir(log_dir) else {
        return false;
    };
    entries.filter_map(Result::ok).any(|entry| {
        entry.file_name().to_string_lossy().starts_with("seqpress_run_")
            && fs::read_to_string(entry.path()).is_ok_and(|content| content.contains(needle))
    })
}

#[cfg(unix)]
#[test]
fn test_sigint_exits_with_interrupt_status() -> Result<(), Box<dyn Error>> {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;
    use std::os::unix::fs::PermissionsExt;
    use std::process::Stdio;
    use std::time::{Duration, Instant};

    let videos = tempdir()?;
    let logs = tempdir()?;
    let bin = tempdir()?;

    // An ffmpeg that hangs on the startup version check.
    let fake_ffmpeg = bin.path().join("ffmpeg");
    fs::write(&fake_ffmpeg, "#!/bin/sh\nexec sleep 5\n")?;
    fs::set_permissions(&fake_ffmpeg, fs::Permissions::from_mode(0o755))?;
    let path = format!(
        "{}:{}",
        bin.path().display(),
        std::env::var("PATH").unwrap_or_default()
    );

    let mut child = std::process::Command::new(assert_cmd::cargo::cargo_bin("seqpress"))
        .arg("convert")
        .arg("-v")
        .arg(videos.path())
        .arg("-l")
        .arg(logs.path())
        .env("PATH", path)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    // Signal handlers are installed before the run logs its directories.
    let deadline = Instant::now() + Duration::from_secs(10);
    while !run_log_contains(logs.path(), "Log directory:") {
        if Instant::now() > deadline {
            let _ = child.kill();
            panic!("seqpress did not start the run");
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    kill(Pid::from_raw(child.id() as i32), Signal::SIGINT)?;
    let status = child.wait()?;

    assert_eq!(status.code(), Some(130));
    assert!(run_log_contains(logs.path(), "Received SIGINT"));
    Ok(())
}
