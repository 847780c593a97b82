use std::fs;
use std::path::Path;

use gnav_core::Graph;
use gnav_trials::{check_directory, run_batch, subject_path, SubjectState, TrialConfig};
use tempfile::tempdir;

fn config_for(dir: &Path, subjects: usize) -> TrialConfig {
    let mut config = TrialConfig::default();
    config.subjects = subjects;
    config.output.directory = dir.to_path_buf();
    config.output.parallelism = 2;
    config
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn writes_one_file_per_subject() {
    let dir = tempdir().unwrap();
    let config = config_for(dir.path(), 4);
    let report = run_batch(&config).unwrap();

    assert_eq!(report.written, 4);
    assert_eq!(report.failed, 0);
    assert_eq!(
        report.subjects.iter().map(|s| s.index).collect::<Vec<_>>(),
        vec![1, 2, 3, 4]
    );
    assert_eq!(file_names(dir.path()), vec!["1.json", "2.json", "3.json", "4.json"]);
    assert_eq!(
        report.subjects[1].path.as_deref(),
        Some(subject_path(dir.path(), 2).as_path())
    );

    let checks = check_directory(dir.path()).unwrap();
    assert_eq!(checks.len(), 4);
    assert!(checks.iter().all(|check| check.is_ok()));
}

#[test]
fn batches_are_reproducible_across_thread_counts() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    let mut config_a = config_for(a.path(), 3);
    config_a.output.parallelism = 1;
    let config_b = config_for(b.path(), 3);

    let report_a = run_batch(&config_a).unwrap();
    let report_b = run_batch(&config_b).unwrap();
    let hashes = |r: &gnav_trials::BatchReport| {
        r.subjects
            .iter()
            .map(|s| s.sha256.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(hashes(&report_a), hashes(&report_b));
    assert_eq!(
        fs::read(a.path().join("2.json")).unwrap(),
        fs::read(b.path().join("2.json")).unwrap()
    );
}

#[test]
fn failed_subjects_leave_no_files() {
    let dir = tempdir().unwrap();
    let mut config = config_for(dir.path(), 3);
    config.template = Graph::from_adjacency(vec![vec![1], vec![]]);

    let report = run_batch(&config).unwrap();
    assert_eq!(report.written, 0);
    assert_eq!(report.failed, 3);
    for subject in &report.subjects {
        assert_eq!(subject.state, SubjectState::Failed);
        let info = subject.error.as_ref().unwrap();
        assert_eq!(info.code, "start-children");
        assert_eq!(info.context.get("phase"), Some(&"learn_rewards".to_string()));
        assert_eq!(info.context.get("subject"), Some(&subject.index.to_string()));
    }
    assert!(file_names(dir.path()).is_empty());
}

#[test]
fn fail_fast_returns_the_error() {
    let dir = tempdir().unwrap();
    let mut config = config_for(dir.path(), 2);
    config.template = Graph::from_adjacency(vec![vec![1], vec![]]);
    config.output.fail_fast = true;

    let err = run_batch(&config).unwrap_err();
    assert_eq!(err.info().code, "start-children");
    assert!(file_names(dir.path()).is_empty());
}

#[test]
fn tampered_file_is_reported() {
    let dir = tempdir().unwrap();
    run_batch(&config_for(dir.path(), 1)).unwrap();
    let path = dir.path().join("1.json");
    let mut doc: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    doc["trials"]["main"][0]["rewards"] = serde_json::json!([1, 2]);
    fs::write(&path, serde_json::to_vec(&doc).unwrap()).unwrap();

    let checks = check_directory(dir.path()).unwrap();
    assert_eq!(checks.len(), 1);
    assert!(!checks[0].is_ok());
    assert_eq!(checks[0].issues[0].phase, "main[0]");
}

#[test]
fn write_failures_skip_the_subject_and_leave_no_temp_files() {
    let dir = tempdir().unwrap();
    let blocked = subject_path(dir.path(), 2);
    fs::create_dir(&blocked).unwrap();
    fs::write(blocked.join("keep"), b"x").unwrap();

    let report = run_batch(&config_for(dir.path(), 3)).unwrap();
    assert_eq!(report.written, 2);
    assert_eq!(report.failed, 1);
    let failed = &report.subjects[1];
    assert_eq!(failed.state, SubjectState::Failed);
    assert!(failed.path.is_none());
    let info = failed.error.as_ref().unwrap();
    assert_eq!(info.code, "subject-persist");
    assert_eq!(info.context.get("phase"), Some(&"write".to_string()));
    assert_eq!(info.context.get("subject"), Some(&"2".to_string()));
    assert_eq!(file_names(dir.path()), vec!["1.json", "2.json", "3.json"]);
    assert!(blocked.is_dir());
}

#[test]
fn fail_fast_reports_the_lowest_failing_subject() {
    for parallelism in [1, 4] {
        let dir = tempdir().unwrap();
        for index in [2, 3, 5] {
            let blocked = subject_path(dir.path(), index);
            fs::create_dir(&blocked).unwrap();
            fs::write(blocked.join("keep"), b"x").unwrap();
        }
        let mut config = config_for(dir.path(), 6);
        config.output.parallelism = parallelism;
        config.output.fail_fast = true;

        let err = run_batch(&config).unwrap_err();
        assert_eq!(err.info().code, "subject-persist");
        assert_eq!(err.info().context.get("subject"), Some(&"2".to_string()));
        assert!(file_names(dir.path()).iter().all(|name| !name.starts_with(".tmp")));
    }
}

#[test]
fn dangling_child_is_reported_not_panicked_on() {
    let dir = tempdir().unwrap();
    run_batch(&config_for(dir.path(), 1)).unwrap();
    let path = dir.path().join("1.json");
    let mut doc: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    doc["trials"]["main"][0]["graph"][0] = serde_json::json!([42]);
    fs::write(&path, serde_json::to_vec(&doc).unwrap()).unwrap();

    let checks = check_directory(dir.path()).unwrap();
    assert_eq!(checks.len(), 1);
    assert_eq!(checks[0].issues.len(), 1);
    assert_eq!(checks[0].issues[0].phase, "main[0]");
    assert!(checks[0].issues[0].message.contains("dangling-edge"));
}
