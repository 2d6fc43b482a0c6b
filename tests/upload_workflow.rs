mod support;

use flowbox::sync::upload;
use flowbox::{ErrorCategory, RemotePath, SyncCommand, SyncSettings};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use support::MemoryStore;
use tempfile::TempDir;

fn results_dir(with_vtk: bool) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("flow_data.json"), "{}").unwrap();
    fs::write(root.join("summary.csv"), "t,p\n").unwrap();
    fs::write(root.join("turbine.step"), "step").unwrap();
    fs::create_dir(root.join("logs")).unwrap();
    fs::write(root.join("logs/solver.log"), "log").unwrap();
    if with_vtk {
        fs::create_dir_all(root.join("VTK/frames")).unwrap();
        fs::write(root.join("VTK/series.pvd"), "pvd").unwrap();
        fs::write(root.join("VTK/frames/f_0.vtu"), "vtu0").unwrap();
        fs::write(root.join("VTK/frames/f_1.vtu"), "vtu1").unwrap();
    }
    temp_dir
}

fn strings(paths: &[RemotePath]) -> Vec<String> {
    paths.iter().map(|p| p.to_string()).collect()
}

#[tokio::test]
async fn every_top_level_file_is_uploaded_exactly_once() {
    let temp_dir = results_dir(false);
    let mut store = MemoryStore::default();
    let remote = RemotePath::parse("/results").unwrap();

    let report = upload::run(&mut store, temp_dir.path(), &remote, None)
        .await
        .unwrap();

    let expected = vec![
        "/results/flow_data.json".to_string(),
        "/results/summary.csv".to_string(),
        "/results/turbine.step".to_string(),
    ];
    assert_eq!(strings(&report.uploaded), expected);
    assert_eq!(store.uploads(), expected);
    assert!(!store.file_paths().iter().any(|p| p.contains("solver.log")));
}

#[tokio::test]
async fn vtk_directory_is_uploaded_recursively() {
    let temp_dir = results_dir(true);
    let mut store = MemoryStore::default();
    let remote = RemotePath::parse("/results").unwrap();

    let report = upload::run(&mut store, temp_dir.path(), &remote, Some("VTK"))
        .await
        .unwrap();

    assert_eq!(report.skipped_subdir, None);
    assert_eq!(
        strings(&report.uploaded),
        vec![
            "/results/flow_data.json",
            "/results/summary.csv",
            "/results/turbine.step",
            "/results/VTK/frames/f_0.vtu",
            "/results/VTK/frames/f_1.vtu",
            "/results/VTK/series.pvd",
        ]
    );
    assert_eq!(store.files["/results/VTK/frames/f_1.vtu"], b"vtu1".to_vec());
}

#[tokio::test]
async fn missing_vtk_directory_is_a_warning_not_a_failure() {
    let temp_dir = results_dir(false);
    let mut store = MemoryStore::default();
    let remote = RemotePath::parse("/results").unwrap();

    let report = upload::run(&mut store, temp_dir.path(), &remote, Some("VTK"))
        .await
        .expect("missing subdirectory must not fail the upload");

    assert_eq!(report.uploaded.len(), 3);
    assert_eq!(report.skipped_subdir, Some(temp_dir.path().join("VTK")));
}

#[tokio::test]
async fn missing_local_base_is_fatal_before_any_upload() {
    let mut store = MemoryStore::default();
    let remote = RemotePath::parse("/results").unwrap();

    let err = upload::run(&mut store, Path::new("/nonexistent/results"), &remote, Some("VTK"))
        .await
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Filesystem);
    assert!(store.calls.is_empty());
}

#[tokio::test]
async fn first_upload_failure_stops_the_run() {
    let temp_dir = results_dir(true);
    let mut store = MemoryStore::default().failing_on("/results/summary.csv");
    let remote = RemotePath::parse("/results").unwrap();

    let result = upload::run(&mut store, temp_dir.path(), &remote, Some("VTK")).await;

    assert!(result.is_err());
    assert_eq!(
        store.uploads(),
        vec![
            "/results/flow_data.json".to_string(),
            "/results/summary.csv".to_string(),
        ]
    );
}

#[tokio::test]
async fn single_file_to_folder_keeps_file_name() {
    let temp_dir = results_dir(false);
    let mut store = MemoryStore::default();

    let report = upload::upload_path(&mut store, &temp_dir.path().join("summary.csv"), "/results/")
        .await
        .unwrap();

    assert_eq!(strings(&report.uploaded), vec!["/results/summary.csv"]);
}

#[tokio::test]
async fn single_file_to_explicit_path_is_renamed() {
    let temp_dir = results_dir(false);
    let mut store = MemoryStore::default();

    let report = upload::upload_path(
        &mut store,
        &temp_dir.path().join("summary.csv"),
        "/results/run-42.csv",
    )
    .await
    .unwrap();

    assert_eq!(strings(&report.uploaded), vec!["/results/run-42.csv"]);
}

#[tokio::test]
async fn directory_upload_path_walks_the_tree() {
    let temp_dir = results_dir(true);
    let mut store = MemoryStore::default();

    let report = upload::upload_path(&mut store, &temp_dir.path().join("VTK"), "/results/VTK")
        .await
        .unwrap();

    assert_eq!(
        strings(&report.uploaded),
        vec![
            "/results/VTK/frames/f_0.vtu",
            "/results/VTK/frames/f_1.vtu",
            "/results/VTK/series.pvd",
        ]
    );
}

#[tokio::test]
async fn upload_path_requires_existing_source() {
    let mut store = MemoryStore::default();

    let result = upload::upload_path(&mut store, Path::new("/nonexistent/file.csv"), "/results/").await;

    assert!(result.is_err());
    assert!(store.calls.is_empty());
}

#[tokio::test]
async fn publish_command_uses_given_subdirectory() {
    let temp_dir = results_dir(true);
    let mut command = SyncCommand::with_store(MemoryStore::default(), SyncSettings::default());

    let report = command
        .execute_publish(temp_dir.path(), &RemotePath::parse("/results").unwrap(), Some("VTK"))
        .await
        .unwrap();

    assert_eq!(report.uploaded.len(), 6);
    assert_eq!(command.store().uploads().len(), 6);
}

#[cfg(unix)]
#[tokio::test]
async fn dangling_symlink_does_not_stop_the_upload() {
    let temp_dir = results_dir(false);
    std::os::unix::fs::symlink(
        temp_dir.path().join("missing-target.json"),
        temp_dir.path().join("m.link"),
    )
    .unwrap();
    let mut store = MemoryStore::default();
    let remote = RemotePath::parse("/results").unwrap();

    let report = upload::run(&mut store, temp_dir.path(), &remote, None)
        .await
        .expect("broken links are skipped");

    assert_eq!(
        strings(&report.uploaded),
        vec![
            "/results/flow_data.json",
            "/results/summary.csv",
            "/results/turbine.step",
        ]
    );
    assert!(!store.uploads().iter().any(|p| p.contains("m.link")));
}

#[tokio::test]
async fn only_a_trailing_slash_marks_a_destination_folder() {
    let temp_dir = results_dir(false);
    let mut store = MemoryStore::default();

    let report = upload::upload_path(&mut store, &temp_dir.path().join("summary.csv"), "/results\\")
        .await
        .unwrap();

    assert_eq!(strings(&report.uploaded), vec!["/results"]);
}
