use std::env;
use std::path::PathBuf;

use crate::errors::KindctlError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    Linux,
    MacOs,
    Windows,
    Other(&'static str),
}

/// Host OS and CPU architecture, as used in download URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub os: Os,
    pub arch: &'static str,
}

impl Platform {
    pub fn current() -> Self {
        let os = match env::consts::OS {
            "linux" => Os::Linux,
            "macos" => Os::MacOs,
            "windows" => Os::Windows,
            other => Os::Other(other),
        };
        Platform {
            os,
            arch: env::consts::ARCH,
        }
    }

    pub fn os_slug(&self) -> Result<&'static str, KindctlError> {
        match self.os {
            Os::Linux => Ok("linux"),
            Os::MacOs => Ok("darwin"),
            Os::Windows => Ok("windows"),
            Os::Other(os) => Err(KindctlError::UnsupportedPlatform(format!("OS {os}"))),
        }
    }

    pub fn arch_slug(&self) -> Result<&'static str, KindctlError> {
        match self.arch {
            "x86_64" => Ok("amd64"),
            "aarch64" => Ok("arm64"),
            other => Err(KindctlError::UnsupportedPlatform(format!(
                "architecture {other}"
            ))),
        }
    }

    /// File name of an executable on this platform.
    pub fn executable(&self, name: &str) -> String {
        match self.os {
            Os::Windows => format!("{name}.exe"),
            _ => name.to_string(),
        }
    }

    pub fn default_install_dir(&self, tool: &str) -> PathBuf {
        match self.os {
            Os::Windows => {
                let program_files =
                    env::var("ProgramFiles").unwrap_or_else(|_| r"C:\Program Files".to_string());
                PathBuf::from(program_files).join(tool)
            }
            _ => PathBuf::from("/usr/local/bin"),
        }
    }

    pub fn hosts_path(&self) -> PathBuf {
        match self.os {
            Os::Windows => PathBuf::from(r"C:\Windows\System32\drivers\etc\hosts"),
            _ => PathBuf::from("/etc/hosts"),
        }
    }
}
