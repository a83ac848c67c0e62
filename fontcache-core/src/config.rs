//! Cache location and font roots (made by FontLab https://www.fontlab.com/)
//!
//! Everything that depends on the process environment is resolved once, from
//! an [`Environment`] snapshot, into a [`CacheConfig`].

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{anyhow, Result};

use crate::scan::DEFAULT_MAX_DEPTH;

/// Environment variable that replaces the platform font directories.
pub const FONT_DIRS_VAR: &str = "FONTCACHE_FONT_DIRS";

/// The environment variables the cache cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    pub home: Option<PathBuf>,
    pub xdg_cache_home: Option<PathBuf>,
    pub local_app_data: Option<PathBuf>,
    pub system_root: Option<PathBuf>,
    pub font_dirs: Option<String>,
}

impl Environment {
    /// Read the current process environment. Empty values count as unset.
    pub fn capture() -> Self {
        Self {
            home: var_path("HOME"),
            xdg_cache_home: var_path("XDG_CACHE_HOME"),
            local_app_data: var_path("LOCALAPPDATA"),
            system_root: var_path("SYSTEMROOT"),
            font_dirs: env::var(FONT_DIRS_VAR).ok().filter(|v| !v.is_empty()),
        }
    }
}

fn var_path(name: &str) -> Option<PathBuf> {
    env::var_os(name)
        .filter(|v: &OsString| !v.is_empty())
        .map(PathBuf::from)
}

/// Where the cache lives and what it scans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    app_name: String,
    cache_file: Option<PathBuf>,
    font_dirs: Vec<PathBuf>,
    max_depth: usize,
}

impl CacheConfig {
    /// Resolve against the live process environment.
    pub fn new(app_name: &str) -> Result<Self> {
        Self::resolve(app_name, &Environment::capture())
    }

    pub fn resolve(app_name: &str, env: &Environment) -> Result<Self> {
        if app_name.is_empty() || app_name.contains(['/', '\\']) {
            return Err(anyhow!(
                "application name must be non-empty without path separators: {app_name:?}"
            ));
        }

        let cache_file = cache_dir(env).map(|dir| dir.join(format!("{app_name}.dat")));
        let font_dirs = match &env.font_dirs {
            Some(raw) => raw
                .split([':', ';'])
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .collect(),
            None => platform_font_dirs(env),
        };

        Ok(Self {
            app_name: app_name.to_string(),
            cache_file,
            font_dirs,
            max_depth: DEFAULT_MAX_DEPTH,
        })
    }

    pub fn with_cache_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_file = Some(path.into());
        self
    }

    /// Never read or write a cache file; every construction rescans.
    pub fn without_persistence(mut self) -> Self {
        self.cache_file = None;
        self
    }

    pub fn with_font_dirs<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.font_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn cache_file(&self) -> Option<&std::path::Path> {
        self.cache_file.as_deref()
    }

    pub fn font_dirs(&self) -> &[PathBuf] {
        &self.font_dirs
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

#[cfg(target_os = "macos")]
fn cache_dir(env: &Environment) -> Option<PathBuf> {
    env.home.as_ref().map(|home| home.join("Library/Caches"))
}

#[cfg(windows)]
fn cache_dir(env: &Environment) -> Option<PathBuf> {
    env.local_app_data.clone()
}

#[cfg(all(unix, not(target_os = "macos")))]
fn cache_dir(env: &Environment) -> Option<PathBuf> {
    env.xdg_cache_home
        .clone()
        .or_else(|| env.home.as_ref().map(|home| home.join(".cache")))
}

#[cfg(not(any(unix, windows)))]
fn cache_dir(_env: &Environment) -> Option<PathBuf> {
    None
}

fn platform_font_dirs(env: &Environment) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();

    #[cfg(target_os = "macos")]
    {
        candidates.push(PathBuf::from("/System/Library/Fonts"));
        candidates.push(PathBuf::from("/Library/Fonts"));
        if let Some(home) = &env.home {
            candidates.push(home.join("Library/Fonts"));
        }
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    {
        candidates.push(PathBuf::from("/usr/share/fonts"));
        candidates.push(PathBuf::from("/usr/local/share/fonts"));
        candidates.push(PathBuf::from("/usr/X11R6/lib/X11/fonts"));
        if let Some(home) = &env.home {
            candidates.push(home.join(".fonts"));
            candidates.push(home.join(".local/share/fonts"));
        }
    }

    #[cfg(windows)]
    {
        if let Some(system_root) = &env.system_root {
            candidates.push(system_root.join("Fonts"));
        }
        if let Some(local_appdata) = &env.local_app_data {
            candidates.push(local_appdata.join("Microsoft/Windows/Fonts"));
        }
    }

    #[cfg(not(any(unix, windows)))]
    let _ = env;

    candidates
}
