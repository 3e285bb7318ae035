use std::path::{Path, PathBuf};

pub const ROSTER_ENV: &str = "COUNSELING_ROSTER";
pub const OUT_DIR_ENV: &str = "COUNSELING_OUT_DIR";

const DEFAULT_ROSTER: &str = "roster.json";
const DEFAULT_OUT_DIR: &str = ".";

/// Where the CLI reads and writes. Flags win over environment variables,
/// which win over the defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub roster_path: PathBuf,
    pub out_dir: PathBuf,
}

impl Config {
    pub fn resolve(roster_flag: Option<PathBuf>, out_dir_flag: Option<PathBuf>) -> Self {
        Self::resolve_with(roster_flag, out_dir_flag, |key| std::env::var(key).ok())
    }

    fn resolve_with(
        roster_flag: Option<PathBuf>,
        out_dir_flag: Option<PathBuf>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let from_env = |key: &str, default: &str| {
            env(key)
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(default))
        };
        Self {
            roster_path: roster_flag.unwrap_or_else(|| from_env(ROSTER_ENV, DEFAULT_ROSTER)),
            out_dir: out_dir_flag.unwrap_or_else(|| from_env(OUT_DIR_ENV, DEFAULT_OUT_DIR)),
        }
    }

    pub fn out_path(&self, file_name: &str) -> PathBuf {
        self.out_dir.join(Path::new(file_name))
    }
}
