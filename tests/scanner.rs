mod helper;

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use helper::{FakeProvider, create_test_host, installed_component, mod_version};
use modkeeper::catalog::types::VersionType;
use modkeeper::update::scanner::UpdateScanner;

const TARGET: &str = "1.18.1";

#[tokio::test]
async fn scan_reports_only_components_with_newer_releases() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    let host = create_test_host(
        TARGET,
        TARGET,
        vec![
            installed_component(dir, "minecraft", "Minecraft", TARGET),
            installed_component(dir, "sodium", "Sodium", "0.4.0"),
            installed_component(dir, "lithium", "Lithium", "0.7.5"),
            installed_component(dir, "snapshot-mod", "Snapshot Mod", "${version}"),
        ],
    );
    let provider = Arc::new(
        FakeProvider::new()
            .with_project(
                "AANobbMI",
                "Sodium",
                vec![
                    mod_version("0.4.0", VersionType::Release, &[TARGET]),
                    mod_version("0.4.1", VersionType::Release, &[TARGET]),
                    mod_version("0.5.0-beta.1", VersionType::Beta, &[TARGET]),
                    mod_version("0.6.0", VersionType::Release, &["1.19"]),
                ],
            )
            .with_project(
                "gvQqBUqZ",
                "Lithium",
                vec![
                    mod_version("0.7.0", VersionType::Release, &[TARGET]),
                    mod_version("0.7.5", VersionType::Release, &[TARGET]),
                ],
            ),
    );

    let report = UpdateScanner::new(provider.clone(), Arc::new(host))
        .with_stagger_delay(Duration::ZERO)
        .scan()
        .await;

    assert_eq!(report.updates().len(), 1);
    assert!(report.has_update("aanobbmi", "unrelated"));
    assert!(report.has_update("unrelated", "Sodium"));
    assert!(!report.has_update("gvQqBUqZ", "lithium"));
    assert_eq!(
        report.get_update("AANobbMI").map(|v| v.version.as_str()),
        Some("0.4.1")
    );

    let mut searches = provider.searches();
    searches.sort();
    assert_eq!(searches, vec!["Lithium", "Sodium"]);
}

#[tokio::test]
async fn scan_honours_custom_excluded_ids() {
    let temp_dir = TempDir::new().unwrap();
    let host = create_test_host(
        TARGET,
        TARGET,
        vec![installed_component(temp_dir.path(), "sodium", "Sodium", "0.4.0")],
    );
    let provider = Arc::new(FakeProvider::new().with_project(
        "AANobbMI",
        "Sodium",
        vec![mod_version("0.4.1", VersionType::Release, &[TARGET])],
    ));

    let report = UpdateScanner::new(provider.clone(), Arc::new(host))
        .with_excluded_ids(vec!["sodium".to_string()])
        .with_stagger_delay(Duration::ZERO)
        .spawn()
        .await
        .unwrap();

    assert!(!report.any_updates_available());
    assert!(provider.searches().is_empty());
}

#[tokio::test]
async fn scan_skips_mods_missing_from_catalog() {
    let temp_dir = TempDir::new().unwrap();
    let host = create_test_host(
        TARGET,
        TARGET,
        vec![installed_component(temp_dir.path(), "private", "Private Mod", "1.0.0")],
    );

    let report = UpdateScanner::new(Arc::new(FakeProvider::new()), Arc::new(host))
        .with_stagger_delay(Duration::ZERO)
        .scan()
        .await;

    assert!(!report.any_updates_available());
}
