mod common;

use std::fs;
use std::fs::File;
use std::process::Command;

use std::thread::sleep;
use std::time::Duration;

use common::{run_script, stderr_of, stdout_of, Session};

#[test]
fn sort_round_trip_matches_direct_run() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let infile = dir.path().join("in.txt");
    let outfile = dir.path().join("out.txt");
    fs::write(&infile, "pear\napple\nfig\napple\n").expect("write input");

    let script = format!(
        "sort < {} > {}\nexit\n",
        infile.display(),
        outfile.display()
    );
    let output = run_script(&script);
    assert!(output.status.success(), "shell failed: {:?}", output);

    let direct = Command::new("sort")
        .stdin(File::open(&infile).expect("open input"))
        .output()
        .expect("run sort directly");
    let through_shell = fs::read(&outfile).expect("read redirected output");
    assert_eq!(through_shell, direct.stdout);
}

#[test]
fn output_redirection_truncates_existing_file() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let outfile = dir.path().join("out.txt");
    fs::write(&outfile, "a much longer line that must disappear\n").expect("prefill");

    let output = run_script(&format!("echo hello > {}\nexit\n", outfile.display()));
    assert!(output.status.success());
    assert_eq!(fs::read_to_string(&outfile).unwrap(), "hello\n");
    assert!(!stdout_of(&output).contains("hello"));
}

#[test]
fn output_before_input_is_accepted() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let infile = dir.path().join("in.txt");
    let outfile = dir.path().join("out.txt");
    fs::write(&infile, "one\ntwo\n").expect("write input");

    let script = format!(
        "wc -l > {} < {}\nexit\n",
        outfile.display(),
        infile.display()
    );
    run_script(&script);
    assert_eq!(fs::read_to_string(&outfile).unwrap().trim(), "2");
}

#[test]
fn missing_input_file_fails_only_the_child() {
    let output = run_script("cat < /no/such/input/file\nstatus\necho still here\nexit\n");
    let stderr = stderr_of(&output);
    let stdout = stdout_of(&output);

    assert!(output.status.success(), "shell failed: {:?}", output);
    assert!(stderr.contains("/no/such/input/file"), "stderr: {stderr}");
    assert!(stdout.contains("exit value 1\n"), "stdout: {stdout}");
    assert!(stdout.contains("still here\n"), "stdout: {stdout}");
}

#[test]
fn unwritable_output_fails_only_the_child() {
    let output = run_script("echo hi > /no/such/dir/out.txt\nstatus\nexit\n");
    assert!(stderr_of(&output).contains("/no/such/dir/out.txt"));
    assert!(stdout_of(&output).contains("exit value 1\n"));
}

#[test]
fn redirection_only_recognised_in_trailing_positions() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let outfile = dir.path().join("out.txt");

    // `>` sits third from the end, so it is an ordinary argument
    let script = format!("echo one two > {} extra\nexit\n", outfile.display());
    let output = run_script(&script);

    assert!(
        stdout_of(&output).contains(&format!("one two > {} extra\n", outfile.display())),
        "stdout: {}",
        stdout_of(&output)
    );
    assert!(!outfile.exists());
}

#[test]
fn background_input_file_wins_over_null_device() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let infile = dir.path().join("in.txt");
    let outfile = dir.path().join("out.txt");
    fs::write(&infile, "one\ntwo\nthree\n").expect("write input");

    let mut shell = Session::start(&[]);
    let pid = shell.spawn_background(&format!(
        "wc -l < {} > {}",
        infile.display(),
        outfile.display()
    ));

    sleep(Duration::from_millis(500));
    shell.send("");
    shell.wait_for(&format!("background pid {} is done: exit value 0", pid));
    shell.send("exit");
    let (status, _) = shell.finish();

    assert!(status.success());
    assert_eq!(fs::read_to_string(&outfile).unwrap().trim(), "3");
}
