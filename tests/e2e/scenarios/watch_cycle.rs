use crate::harness::{Assertion, Scenario};

#[test]
fn test_start_scans_every_recognized_file() {
    Scenario::new("start_scans_every_recognized_file")
        .from_fixture("default")
        .start()
        .assert_tracked(3)
        .assert_scans(1)
        .assert(Assertion::CompletedCount(3))
        .assert_clean("app.py")
        .assert_clean("util.py")
        .assert_clean("main.go")
        .run()
        .expect("scenario should pass");
}

#[test]
fn test_quiet_tick_does_not_rescan() {
    Scenario::new("quiet_tick_does_not_rescan")
        .from_fixture("default")
        .start()
        .tick()
        .assert_idle()
        .tick()
        .assert_idle()
        .assert_scans(1)
        .run()
        .unwrap();
}

#[test]
fn test_edit_triggers_full_rescan() {
    Scenario::new("edit_triggers_full_rescan")
        .from_fixture("default")
        .start()
        .tool_reports("pep8", "util.py", "util.py:2:5: E111 indentation is not a multiple of four")
        .edit("util.py", b"def helper(value):\n   return value * 2\n")
        .tick()
        .assert_scanned()
        .assert_scans(2)
        .assert(Assertion::CompletedCount(6))
        .assert_flagged("util.py", 2, "PEP8", "E111")
        .assert_tool_calls("pep8", "app.py", 2)
        .run()
        .unwrap();
}

#[test]
fn test_touch_without_content_change_rescans() {
    Scenario::new("touch_without_content_change_rescans")
        .from_fixture("default")
        .start()
        .touch("main.go")
        .tick()
        .assert_scanned()
        .assert_scans(2)
        .run()
        .unwrap();
}

#[test]
fn test_edits_in_one_interval_share_one_scan() {
    Scenario::new("edits_in_one_interval_share_one_scan")
        .from_fixture("default")
        .start()
        .edit("app.py", b"import os\n")
        .edit("util.py", b"VALUE = 2\n")
        .tick()
        .assert_scanned()
        .tick()
        .assert_idle()
        .assert_scans(2)
        .run()
        .unwrap();
}

#[test]
fn test_refresh_picks_up_new_file() {
    Scenario::new("refresh_picks_up_new_file")
        .from_fixture("default")
        .refresh_every(3)
        .start()
        .edit("extra.py", b"print('hi')\n")
        .tick()
        .assert_idle()
        .tick()
        .assert_idle()
        .assert_tracked(3)
        .tick()
        .assert_scanned()
        .assert(Assertion::LastTickSetChanged(true))
        .assert_tracked(4)
        .assert(Assertion::Tracks("extra.py".into()))
        .assert_clean("extra.py")
        .run()
        .unwrap();
}

#[test]
fn test_refresh_drops_deleted_file() {
    Scenario::new("refresh_drops_deleted_file")
        .from_fixture("default")
        .start()
        .delete("util.py")
        .tick()
        .assert_scanned()
        .assert_tracked(2)
        .assert_order(&["app.py", "main.go"])
        .run()
        .unwrap();
}

#[test]
fn test_unrecognized_files_are_ignored() {
    Scenario::new("unrecognized_files_are_ignored")
        .from_fixture("default")
        .start()
        .edit("notes.txt", b"remember the milk\n")
        .edit("README.md", b"# changed\n")
        .tick()
        .assert_idle()
        .assert_tracked(3)
        .run()
        .unwrap();
}

#[test]
fn test_empty_directory_scans_nothing() {
    Scenario::new("empty_directory_scans_nothing")
        .start()
        .assert_tracked(0)
        .assert_scans(1)
        .assert(Assertion::Custom(Box::new(|recording| {
            anyhow::ensure!(recording.last_scan()?.is_empty(), "scan was not empty");
            Ok(())
        })))
        .edit("first.py", b"x = 1\n")
        .tick()
        .assert_scanned()
        .assert_tracked(1)
        .run()
        .unwrap();
}
