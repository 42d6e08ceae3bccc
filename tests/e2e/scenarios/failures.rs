use crate::harness::Scenario;
use std::time::Duration;

#[test]
fn test_missing_tool_only_thins_out_the_result() {
    Scenario::new("missing_tool_only_thins_out_the_result")
        .from_fixture("default")
        .tool_missing("pep8", "app.py")
        .tool_reports("pylint", "app.py", "W:  5, 4: Unused variable 'unused'\n")
        .start()
        .assert_diagnostics("app.py", 1)
        .assert_flagged("app.py", 5, "Pylint", "W")
        .assert_clean("util.py")
        .run()
        .expect("scenario should pass");
}

#[test]
fn test_hanging_tool_times_out_without_blocking_others() {
    Scenario::new("hanging_tool_times_out_without_blocking_others")
        .from_fixture("default")
        .task_timeout(Duration::from_secs(1))
        .start()
        .tool_hangs("pep8", "app.py")
        .edit("app.py", b"import os\n")
        .tick()
        .assert_scanned()
        .assert_timed_out("app.py")
        .assert_flagged("app.py", 1, "lintblame", "timeout")
        .assert_clean("util.py")
        .assert_clean("main.go")
        // pylint never ran on app.py after pep8 used up the budget
        .assert_tool_calls("pylint", "app.py", 1)
        .run()
        .unwrap();
}

#[test]
fn test_malformed_output_fails_the_scan() {
    Scenario::new("malformed_output_fails_the_scan")
        .from_fixture("default")
        .start()
        .tool_reports("pylint", "util.py", "W:  1, 99999999999999999999999: nonsense\n")
        .edit("util.py", b"VALUE = 1\n")
        .tick_fails("Pylint produced malformed column")
        .assert_scans(1)
        .run()
        .unwrap();
}

#[test]
fn test_loop_recovers_once_tool_output_is_sane_again() {
    Scenario::new("loop_recovers_once_tool_output_is_sane_again")
        .from_fixture("default")
        .start()
        .tool_reports("pep8", "app.py", "app.py:99999999999999999999999:1: E000 overflow\n")
        .touch("app.py")
        .tick_fails("malformed")
        .tool_reports("pep8", "app.py", "app.py:1:10: E401 multiple imports on one line\n")
        .touch("app.py")
        .tick()
        .assert_scanned()
        .assert_scans(2)
        .assert_flagged("app.py", 1, "PEP8", "E401")
        .run()
        .unwrap();
}

#[test]
fn test_whole_file_issue_does_not_stop_the_loop() {
    Scenario::new("whole_file_issue_does_not_stop_the_loop")
        .from_fixture("default")
        .start()
        .tool_reports("pep8", "app.py", "app.py:0:1: E902 TokenError: EOF in multi-line statement\n")
        .touch("app.py")
        .tick()
        .assert_scanned()
        .assert_flagged("app.py", 1, "PEP8", "E902")
        .touch("util.py")
        .tick()
        .assert_scanned()
        .assert_scans(3)
        .run()
        .unwrap();
}
