use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use std::process::Command;
use std::thread;
use std::time::{Duration, Instant};

use filetime::FileTime;

fn mirsync_output(args: &[&OsStr]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_mirsync"))
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .unwrap_or_else(|error| panic!("failed to run mirsync: {error}"))
}

fn once(source: &Path, replica: &Path, extra: &[&str]) -> std::process::Output {
    let mut args: Vec<&OsStr> = vec![
        source.as_os_str(),
        replica.as_os_str(),
        OsStr::new("1"),
        OsStr::new("--once"),
    ];
    args.extend(extra.iter().map(OsStr::new));
    mirsync_output(&args)
}

fn stdout_utf8(output: &std::process::Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("stdout should be valid UTF-8")
}

fn wait_until(what: &str, condition: impl Fn() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(15);
    while Instant::now() < deadline {
        if condition() {
            return;
        }
        thread::sleep(Duration::from_millis(200));
    }
    panic!("timed out waiting for {what}");
}

#[test]
fn one_cycle_populates_a_fresh_replica() {
    let temp = tempfile::tempdir().expect("temp dir");
    let source = temp.path().join("source");
    let replica = temp.path().join("replica");
    fs::create_dir_all(source.join("a/c")).expect("create source dirs");
    fs::write(source.join("a/b.txt"), b"hello").expect("write source file");

    let output = once(&source, &replica, &[]);

    assert!(output.status.success(), "one-shot mirror should succeed");
    assert_eq!(
        fs::read(replica.join("a/b.txt")).expect("read copy"),
        b"hello"
    );
    assert!(replica.join("a/c").is_dir());
    let verification = digests::verify(&source, &replica).expect("digest both trees");
    assert!(verification.converged(), "trees should digest identically");
}

#[test]
fn a_second_cycle_copies_nothing() {
    let temp = tempfile::tempdir().expect("temp dir");
    let source = temp.path().join("source");
    let replica = temp.path().join("replica");
    fs::create_dir(&source).expect("create source");
    fs::write(source.join("file.txt"), b"data").expect("write source file");

    let first = once(&source, &replica, &[]);
    assert!(first.status.success());
    let second = once(&source, &replica, &[]);

    assert!(second.status.success());
    assert!(stdout_utf8(&first).contains("copy file"));
    assert!(!stdout_utf8(&second).contains("copy file"));
}

#[test]
fn a_file_removed_from_the_source_disappears_from_the_replica() {
    let temp = tempfile::tempdir().expect("temp dir");
    let source = temp.path().join("source");
    let replica = temp.path().join("replica");
    fs::create_dir(&source).expect("create source");
    fs::write(source.join("keep.txt"), b"keep").expect("write source file");
    fs::write(source.join("x.txt"), b"doomed").expect("write source file");

    assert!(once(&source, &replica, &[]).status.success());
    fs::remove_file(source.join("x.txt")).expect("remove source file");
    let output = once(&source, &replica, &[]);

    assert!(output.status.success());
    assert!(stdout_utf8(&output).contains("delete file 'x.txt'"));
    assert!(!replica.join("x.txt").exists());
    assert_eq!(
        fs::read(replica.join("keep.txt")).expect("read kept file"),
        b"keep"
    );
}

#[test]
fn dry_run_logs_the_plan_without_mutating() {
    let temp = tempfile::tempdir().expect("temp dir");
    let source = temp.path().join("source");
    let replica = temp.path().join("replica");
    fs::create_dir(&source).expect("create source");
    fs::write(source.join("file.txt"), b"data").expect("write source file");

    let output = once(&source, &replica, &["--dry-run"]);

    assert!(output.status.success());
    let stdout = stdout_utf8(&output);
    assert!(stdout.contains("copy file 'file.txt'"));
    assert!(stdout.contains("dry_run=true"));
    assert!(!replica.exists());
}

#[test]
fn timestamps_inside_the_window_leave_the_replica_file_alone() {
    let temp = tempfile::tempdir().expect("temp dir");
    let source = temp.path().join("source");
    let replica = temp.path().join("replica");
    fs::create_dir(&source).expect("create source");
    fs::create_dir(&replica).expect("create replica");
    fs::write(source.join("note.txt"), b"source variant").expect("write source file");
    fs::write(replica.join("note.txt"), b"replica variant").expect("write replica file");
    let stamp = FileTime::from_unix_time(1_700_000_000, 0);
    filetime::set_file_mtime(source.join("note.txt"), stamp).expect("set source mtime");
    filetime::set_file_mtime(replica.join("note.txt"), stamp).expect("set replica mtime");

    let output = once(&source, &replica, &[]);

    assert!(output.status.success());
    assert_eq!(
        fs::read(replica.join("note.txt")).expect("read replica file"),
        b"replica variant"
    );
}

#[test]
fn log_file_captures_the_cycle_events() {
    let temp = tempfile::tempdir().expect("temp dir");
    let source = temp.path().join("source");
    let replica = temp.path().join("replica");
    let log_path = temp.path().join("mirror.log");
    fs::create_dir(&source).expect("create source");
    fs::write(source.join("file.txt"), b"data").expect("write source file");

    let output = once(
        &source,
        &replica,
        &["--log-file", log_path.to_str().expect("utf-8 path")],
    );

    assert!(output.status.success());
    let log = fs::read_to_string(&log_path).expect("read log file");
    assert!(log.contains("mirror scheduler started"));
    assert!(log.contains("copy file 'file.txt'"));
    assert!(log.contains("cycle complete"));
}

#[test]
fn the_scheduler_keeps_cycling_until_killed() {
    let temp = tempfile::tempdir().expect("temp dir");
    let source = temp.path().join("source");
    let replica = temp.path().join("replica");
    fs::create_dir(&source).expect("create source");
    fs::write(source.join("first.txt"), b"first").expect("write source file");

    let mut daemon = Command::new(env!("CARGO_BIN_EXE_mirsync"))
        .env_remove("RUST_LOG")
        .arg(&source)
        .arg(&replica)
        .arg("1")
        .spawn()
        .expect("spawn daemon");

    wait_until("the first cycle to copy first.txt", || {
        replica.join("first.txt").is_file()
    });
    fs::write(source.join("second.txt"), b"second").expect("write source file");
    wait_until("a later cycle to copy second.txt", || {
        replica.join("second.txt").is_file()
    });

    daemon.kill().expect("kill daemon");
    let _ = daemon.wait();
}
