//! Shared fixtures for integration tests.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary host root plus a separate area for symlink targets.
pub struct HostRootFixture {
    temp: TempDir,
}

#[allow(dead_code)]
impl HostRootFixture {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("hosts")).unwrap();
        std::fs::create_dir(temp.path().join("apps")).unwrap();
        Self { temp }
    }

    pub fn host_root(&self) -> PathBuf {
        self.temp.path().join("hosts")
    }

    /// Create a real directory entry in the host root.
    pub fn dir(&self, name: &str) -> PathBuf {
        let path = self.host_root().join(name);
        std::fs::create_dir(&path).unwrap();
        path
    }

    /// Create a regular file entry in the host root.
    pub fn file(&self, name: &str) {
        std::fs::write(self.host_root().join(name), "").unwrap();
    }

    /// Create an application directory outside the host root and link
    /// `name` to it. Returns the canonical application path.
    #[cfg(unix)]
    pub fn linked_app(&self, name: &str, app: &str) -> PathBuf {
        let target = self.temp.path().join("apps").join(app);
        std::fs::create_dir_all(&target).unwrap();
        std::os::unix::fs::symlink(&target, self.host_root().join(name)).unwrap();
        target.canonicalize().unwrap()
    }

    /// Link `name` to a path that does not exist.
    #[cfg(unix)]
    pub fn broken_link(&self, name: &str) {
        let target = self.temp.path().join("apps").join("missing");
        std::os::unix::fs::symlink(target, self.host_root().join(name)).unwrap();
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }
}
