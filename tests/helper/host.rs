//! Host platform test utilities

use std::path::Path;

use modkeeper::local::host::{DeclaredVersion, InstalledComponent, ManifestHost};

/// A component backed by a real file under `dir`
pub fn installed_component(dir: &Path, id: &str, name: &str, version: &str) -> InstalledComponent {
    let path = dir.join(format!("{id}.jar"));
    std::fs::write(&path, b"jar").unwrap();
    InstalledComponent {
        id: id.to_string(),
        name: name.to_string(),
        version: DeclaredVersion::classify(version),
        path,
    }
}

pub fn create_test_host(
    platform_version: &str,
    release_target: &str,
    components: Vec<InstalledComponent>,
) -> ManifestHost {
    ManifestHost::new(platform_version, release_target, components)
}
