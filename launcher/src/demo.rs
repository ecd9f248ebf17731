//! Demo requests and their host-side storage.
//!
//! A demo request names the environment to record and the host port its VNC
//! server should be reachable on. Each environment gets its own directory
//! under the demo root; the container writes recorded demonstrations there.

use crate::error::{LauncherError, LauncherResult};
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

pub const USAGE: &str = "Usage: wob-demo <env_id> <port>";

/// A validated `<env_id> <port>` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DemoRequest {
    /// Environment identifier, e.g. `wob.mini.ClickShape-v0`
    pub env_id: String,
    /// Host port exactly as given on the command line
    pub port: String,
}

impl DemoRequest {
    /// Build a request, rejecting identifiers that would not name a single
    /// directory under the demo root.
    pub fn new(env_id: impl Into<String>, port: impl Into<String>) -> LauncherResult<Self> {
        let env_id = env_id.into();
        validate_env_id(&env_id)?;
        Ok(Self {
            env_id,
            port: port.into(),
        })
    }

    /// Interpret positional arguments.
    ///
    /// Returns `Ok(None)` unless exactly two arguments were given; callers
    /// print [`USAGE`] and exit successfully in that case.
    pub fn from_args<I, S>(args: I) -> LauncherResult<Option<Self>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args: Vec<String> = args.into_iter().map(Into::into).collect();
        if args.len() != 2 {
            return Ok(None);
        }

        let port = args.pop().unwrap_or_default();
        let env_id = args.pop().unwrap_or_default();
        Self::new(env_id, port).map(Some)
    }

    /// Directory this request's demos are written to
    pub fn demo_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.env_id)
    }
}

fn validate_env_id(env_id: &str) -> LauncherResult<()> {
    let invalid = |reason: &str| {
        Err(LauncherError::InvalidEnvId {
            env_id: env_id.to_string(),
            reason: reason.to_string(),
        })
    };

    if env_id.is_empty() {
        return invalid("environment id cannot be empty");
    }

    if env_id.contains('\0') {
        return invalid("environment id cannot contain NUL bytes");
    }

    // The id ends up in `-v <host>:<mount>`, which runtimes split on ':'.
    if env_id.contains(':') {
        return invalid("environment id cannot contain ':'");
    }

    let mut components = Path::new(env_id).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !env_id.contains('/') => Ok(()),
        _ => invalid("environment id must be a single path component"),
    }
}

/// Create `<root>/<env_id>`, including missing parents. Succeeds if the
/// directory already exists.
pub fn ensure_demo_dir(root: &Path, env_id: &str) -> LauncherResult<PathBuf> {
    validate_env_id(env_id)?;
    let dir = root.join(env_id);

    std::fs::create_dir_all(&dir).map_err(|source| LauncherError::DemoDir {
        path: dir.display().to_string(),
        source,
    })?;

    debug!(path = %dir.display(), "demo directory ready");
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_args_exactly_two() {
        let request = DemoRequest::from_args(["wob.mini.ClickShape-v0", "21000"])
            .unwrap()
            .unwrap();
        assert_eq!(request.env_id, "wob.mini.ClickShape-v0");
        assert_eq!(request.port, "21000");
    }

    #[test]
    fn test_from_args_wrong_count() {
        assert!(DemoRequest::from_args(Vec::<String>::new())
            .unwrap()
            .is_none());
        assert!(DemoRequest::from_args(["wob.mini.ClickShape-v0"])
            .unwrap()
            .is_none());
        assert!(DemoRequest::from_args(["a", "1", "extra"]).unwrap().is_none());
    }

    #[test]
    fn test_port_is_not_interpreted() {
        let request = DemoRequest::from_args(["env", "127.0.0.1:021000"])
            .unwrap()
            .unwrap();
        assert_eq!(request.port, "127.0.0.1:021000");

        let request = DemoRequest::from_args(["env", "not-a-port"]).unwrap().unwrap();
        assert_eq!(request.port, "not-a-port");
    }

    #[test]
    fn test_env_id_validation() {
        assert!(DemoRequest::new("wob.mini.ClickShape-v0", "1").is_ok());
        assert!(DemoRequest::new("name with spaces; rm -rf", "1").is_ok());

        for bad in ["", ".", "..", "a/b", "/abs", "../escape", "nul\0byte", "a:b", "wob:evil"] {
            assert!(
                matches!(
                    DemoRequest::new(bad, "1"),
                    Err(LauncherError::InvalidEnvId { .. })
                ),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_colon_rejected_before_directory_creation() {
        let root = TempDir::new().unwrap();

        let result = ensure_demo_dir(root.path(), "wob:evil");

        assert!(matches!(result, Err(LauncherError::InvalidEnvId { .. })));
        assert!(!root.path().join("wob:evil").exists());
        assert!(!root.path().join("wob").exists());
    }

    #[test]
    fn test_demo_dir_path() {
        let request = DemoRequest::new("wob.mini.ClickShape-v0", "21000").unwrap();
        assert_eq!(
            request.demo_dir(Path::new("/tmp/world-of-bits-demo")),
            PathBuf::from("/tmp/world-of-bits-demo/wob.mini.ClickShape-v0")
        );
    }

    #[test]
    fn test_ensure_demo_dir_creates_parents() {
        let root = TempDir::new().unwrap();
        let demo_root = root.path().join("nested").join("demos");

        let dir = ensure_demo_dir(&demo_root, "wob.mini.ClickShape-v0").unwrap();
        assert!(dir.is_dir());
        assert_eq!(dir, demo_root.join("wob.mini.ClickShape-v0"));
    }

    #[test]
    fn test_ensure_demo_dir_is_idempotent() {
        let root = TempDir::new().unwrap();
        let first = ensure_demo_dir(root.path(), "env").unwrap();
        std::fs::write(first.join("demo.rbs"), b"recorded").unwrap();

        let second = ensure_demo_dir(root.path(), "env").unwrap();
        assert_eq!(first, second);
        assert!(second.join("demo.rbs").exists());
    }

    #[test]
    fn test_ensure_demo_dir_fails_under_file() {
        let root = TempDir::new().unwrap();
        let blocker = root.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();

        let result = ensure_demo_dir(&blocker, "env");
        assert!(matches!(result, Err(LauncherError::DemoDir { .. })));
    }
}
