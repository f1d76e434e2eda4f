use std::path::PathBuf;
use tracing::error;

pub struct PortablePathManager;

impl PortablePathManager {
    /// Application root: `apps/core` in a debug build run from the workspace,
    /// otherwise the directory holding the executable.
    pub fn root_dir() -> PathBuf {
        let exe_dir = match std::env::current_exe() {
            Ok(mut path) => {
                path.pop(); // remove exe name
                path
            }
            Err(e) => {
                error!("Failed to get current exe path: {}. Falling back to current_dir.", e);
                return std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            }
        };

        if cfg!(debug_assertions) {
            // target/debug → workspace root
            if let Some(workspace) = exe_dir.parent().and_then(|p| p.parent()) {
                let core_path = workspace.join("apps").join("core");
                if core_path.exists() {
                    return core_path;
                }
            }
        }

        exe_dir
    }

    /// Main data directory (./data).
    pub fn data_dir() -> PathBuf {
        Self::root_dir().join("data")
    }

    /// Default tournament snapshot (./data/db.json).
    pub fn dataset_path() -> PathBuf {
        Self::data_dir().join("db.json")
    }

    /// Lexicon files (./data/lexicon).
    pub fn lexicon_dir() -> PathBuf {
        Self::data_dir().join("lexicon")
    }

    /// Resolves a configured path: absolute paths are kept, relative ones
    /// are taken from the application root.
    pub fn resolve(path: impl Into<PathBuf>) -> PathBuf {
        let path = path.into();
        if path.is_absolute() {
            path
        } else {
            Self::root_dir().join(path)
        }
    }
}
