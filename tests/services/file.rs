use artful_debug::core::dispatch::ServiceName;
use artful_debug::services::file::{FileMode, FileService, previous_path};
use artful_debug::{Level, Logger};
use serde_json::json;
use std::fs;

fn file_logger(path: &std::path::Path, mode: FileMode) -> Logger {
    let mut logger = Logger::new().with_service(Box::new(FileService::new(path, mode).unwrap()));
    logger.set_service_level(ServiceName::File, Level::Log).unwrap();
    logger
}

#[test]
fn append_mode_keeps_earlier_runs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("debug.log");

    let mut first = file_logger(&path, FileMode::Append);
    first.log("run one", None).unwrap();
    first.flush().unwrap();
    drop(first);

    let mut second = file_logger(&path, FileMode::Append);
    second.log("run two", None).unwrap();
    second.flush().unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("run one"));
    assert!(content.contains("run two"));
    assert_eq!(content.lines().count(), 2);
}

#[test]
fn overwrite_mode_moves_previous_file_aside() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("debug.log");
    fs::write(&path, "old contents\n").unwrap();

    let mut logger = file_logger(&path, FileMode::Overwrite);
    logger.log("fresh", None).unwrap();
    logger.flush().unwrap();

    assert_eq!(
        fs::read_to_string(previous_path(&path)).unwrap(),
        "old contents\n"
    );
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("fresh"));
    assert!(!content.contains("old contents"));
}

#[test]
fn file_is_opened_lazily_in_nested_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a").join("b").join("debug.log");
    let mut logger = file_logger(&path, FileMode::Append);
    assert!(!path.exists());
    logger.log(">> nested", None).unwrap();
    logger.log("<< nested", None).unwrap();
    logger.flush().unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains(">> nested"));
    assert!(lines[1].contains("stack"));
    assert!(lines[1].contains("<< nested"));
}

#[cfg(unix)]
#[test]
fn file_is_created_group_writable() {
    use std::os::unix::fs::PermissionsExt;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("debug.log");
    let mut logger = file_logger(&path, FileMode::Append);
    logger.log("hello", None).unwrap();
    logger.flush().unwrap();
    // The process umask may only clear bits.
    let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode & !0o660, 0);
    assert_ne!(mode & 0o600, 0);
}

#[test]
fn secrets_in_vars_are_redacted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("debug.log");
    let mut logger = file_logger(&path, FileMode::Append);
    logger
        .log("login", Some(json!({"user": "ada", "password": "hunter2hunter2"})))
        .unwrap();
    logger.flush().unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("\"user\":\"ada\""));
    assert!(content.contains("[REDACTED]"));
    assert!(!content.contains("hunter2hunter2"));
}
