//! Headless browser lifecycle
//!
//! This module produces a working headless browser session without assuming
//! any particular OS or browser is installed:
//! - Detect the host OS (informational, logged with the chosen browser)
//! - Probe the executable search path for a Chrome-family binary, then a
//!   Firefox-family one
//! - Launch exactly one headless browser of the first family found
//!
//! Sessions are torn down explicitly through [`BrowserSession::quit`].

mod chrome;
mod firefox;

pub use chrome::ChromeSession;
pub use firefox::FirefoxSession;

use crate::BuildError;
use anyhow::Result;
use async_trait::async_trait;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

/// Binary names probed for the Chrome family, in order
pub const CHROME_CANDIDATES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chrome",
    "chromium",
    "chromium-browser",
];

/// Binary names probed for the Firefox family, in order
pub const FIREFOX_CANDIDATES: &[&str] = &["geckodriver", "firefox"];

/// Host operating system family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOs {
    Windows,
    MacOs,
    Linux,
    Unknown,
}

impl HostOs {
    /// Detects the OS this process is running on
    pub fn detect() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }

    fn from_os_name(name: &str) -> Self {
        match name {
            "windows" => Self::Windows,
            "macos" => Self::MacOs,
            "linux" => Self::Linux,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for HostOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Windows => "Windows",
            Self::MacOs => "macOS",
            Self::Linux => "Linux",
            Self::Unknown => "Unknown",
        };
        write!(f, "{}", s)
    }
}

/// Browser family a session is launched from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserFamily {
    Chrome,
    Firefox,
}

impl fmt::Display for BrowserFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chrome => write!(f, "Chrome"),
            Self::Firefox => write!(f, "Firefox"),
        }
    }
}

/// Browser binaries located by a probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserInstall {
    /// Chrome or Chromium executable
    Chrome { executable: PathBuf },

    /// Firefox; at least one of the two is present
    Firefox {
        geckodriver: Option<PathBuf>,
        firefox: Option<PathBuf>,
    },
}

impl BrowserInstall {
    pub fn family(&self) -> BrowserFamily {
        match self {
            Self::Chrome { .. } => BrowserFamily::Chrome,
            Self::Firefox { .. } => BrowserFamily::Firefox,
        }
    }
}

/// Looks for browser executables on a search path
#[derive(Debug, Clone, Default)]
pub struct BrowserProbe {
    search_path: Option<OsString>,
}

impl BrowserProbe {
    /// Probe using the process `PATH`
    pub fn from_env() -> Self {
        Self { search_path: None }
    }

    /// Probe using an explicit, platform-formatted search path
    pub fn with_search_path(search_path: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(search_path.into()),
        }
    }

    /// Finds the first installed browser, Chrome family first
    ///
    /// Returns `None` when neither family is present.
    pub fn probe(&self) -> Option<BrowserInstall> {
        if let Some(executable) = CHROME_CANDIDATES.iter().find_map(|name| self.find(name)) {
            return Some(BrowserInstall::Chrome { executable });
        }

        let geckodriver = self.find("geckodriver");
        let firefox = self.find("firefox");
        if geckodriver.is_some() || firefox.is_some() {
            return Some(BrowserInstall::Firefox {
                geckodriver,
                firefox,
            });
        }

        None
    }

    fn find(&self, name: &str) -> Option<PathBuf> {
        match &self.search_path {
            Some(paths) => {
                let cwd = std::env::current_dir().ok()?;
                which::which_in(name, Some(paths), cwd).ok()
            }
            None => which::which(name).ok(),
        }
    }
}

/// A live headless browser session
#[async_trait]
pub trait BrowserSession: Send {
    fn family(&self) -> BrowserFamily;

    /// Navigates the session's page to `url`
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Returns the current rendered page source
    async fn page_source(&mut self) -> Result<String>;

    /// Shuts the browser down and releases its process
    async fn quit(self: Box<Self>) -> Result<()>;
}

/// Probes for a browser and launches a headless session
///
/// # Errors
///
/// * `BuildError::NoBrowser` - neither family was found
/// * `BuildError::DriverLaunch` - the chosen browser failed to start
pub async fn launch(probe: &BrowserProbe) -> Result<Box<dyn BrowserSession>, BuildError> {
    let os = HostOs::detect();
    let install = probe.probe().ok_or(BuildError::NoBrowser { os })?;
    let family = install.family();

    let session: Box<dyn BrowserSession> = match install {
        BrowserInstall::Chrome { executable } => {
            tracing::debug!("Launching headless Chrome from {}", executable.display());
            Box::new(ChromeSession::launch(executable).await.map_err(|e| {
                BuildError::DriverLaunch {
                    browser: family,
                    message: format!("{:#}", e),
                }
            })?)
        }
        BrowserInstall::Firefox {
            geckodriver,
            firefox,
        } => {
            let geckodriver = geckodriver.ok_or_else(|| BuildError::DriverLaunch {
                browser: family,
                message: "geckodriver not found on the search path".to_string(),
            })?;
            tracing::debug!("Launching headless Firefox via {}", geckodriver.display());
            Box::new(
                FirefoxSession::launch(geckodriver, firefox)
                    .await
                    .map_err(|e| BuildError::DriverLaunch {
                        browser: family,
                        message: format!("{:#}", e),
                    })?,
            )
        }
    };

    tracing::info!("[driver] Using {} on {}", family, os);
    Ok(session)
}
