use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::config::ConfigState;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub endpoint: Option<EndpointConfig>,
    pub device: Option<DeviceConfig>,
    pub limits: Option<LimitsConfig>,
    pub display: Option<DisplayConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub user_agent: Option<String>,
    pub viewport_width: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LimitsConfig {
    pub max_file_size_mb: Option<u64>,
    pub max_mobile_file_size_mb: Option<u64>,
    pub max_batch_files: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub theme: Option<String>,
    pub presentation: Option<String>,
}

/// Platform config directory path: `<config_dir>/pdfpeek/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pdfpeek").join("config.toml"))
}

/// Load config by cascading CWD `.pdfpeek.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".pdfpeek.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparsable config");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let endpoint = |f: fn(&EndpointConfig) -> Option<String>| {
        overlay
            .endpoint
            .as_ref()
            .and_then(f)
            .or_else(|| base.endpoint.as_ref().and_then(f))
    };
    let device = |f: fn(&DeviceConfig) -> Option<String>| {
        overlay
            .device
            .as_ref()
            .and_then(f)
            .or_else(|| base.device.as_ref().and_then(f))
    };
    let display = |f: fn(&DisplayConfig) -> Option<String>| {
        overlay
            .display
            .as_ref()
            .and_then(f)
            .or_else(|| base.display.as_ref().and_then(f))
    };

    ConfigFile {
        endpoint: Some(EndpointConfig {
            url: endpoint(|e| e.url.clone()),
            timeout_secs: overlay
                .endpoint
                .as_ref()
                .and_then(|e| e.timeout_secs)
                .or_else(|| base.endpoint.as_ref().and_then(|e| e.timeout_secs)),
        }),
        device: Some(DeviceConfig {
            user_agent: device(|d| d.user_agent.clone()),
            viewport_width: overlay
                .device
                .as_ref()
                .and_then(|d| d.viewport_width)
                .or_else(|| base.device.as_ref().and_then(|d| d.viewport_width)),
        }),
        limits: Some(LimitsConfig {
            max_file_size_mb: overlay
                .limits
                .as_ref()
                .and_then(|l| l.max_file_size_mb)
                .or_else(|| base.limits.as_ref().and_then(|l| l.max_file_size_mb)),
            max_mobile_file_size_mb: overlay
                .limits
                .as_ref()
                .and_then(|l| l.max_mobile_file_size_mb)
                .or_else(|| {
                    base.limits
                        .as_ref()
                        .and_then(|l| l.max_mobile_file_size_mb)
                }),
            max_batch_files: overlay
                .limits
                .as_ref()
                .and_then(|l| l.max_batch_files)
                .or_else(|| base.limits.as_ref().and_then(|l| l.max_batch_files)),
        }),
        display: Some(DisplayConfig {
            theme: display(|d| d.theme.clone()),
            presentation: display(|d| d.presentation.clone()),
        }),
    }
}

/// Convert a `ConfigFile` into partial fills on a `ConfigState`.
/// Only sets values that are `Some` in the file config (doesn't overwrite with defaults).
pub fn apply_to_config_state(file_cfg: &ConfigFile, state: &mut ConfigState) {
    if let Some(ep) = &file_cfg.endpoint {
        if let Some(url) = ep.url.as_ref().filter(|u| !u.is_empty()) {
            state.endpoint = url.clone();
        }
        if let Some(v) = ep.timeout_secs {
            state.timeout_secs = v.max(1);
        }
    }
    if let Some(dev) = &file_cfg.device {
        if let Some(ua) = dev.user_agent.as_ref().filter(|u| !u.is_empty()) {
            state.user_agent = Some(ua.clone());
        }
        if let Some(w) = dev.viewport_width {
            state.viewport_width = w.max(1);
        }
    }
    if let Some(limits) = &file_cfg.limits {
        if let Some(v) = limits.max_file_size_mb {
            state.max_file_size_mb = v.max(1);
        }
        if let Some(v) = limits.max_mobile_file_size_mb {
            state.max_mobile_file_size_mb = v.max(1);
        }
        if let Some(v) = limits.max_batch_files {
            state.max_batch_files = v.max(1);
        }
    }
    if let Some(disp) = &file_cfg.display {
        if let Some(theme) = disp.theme.as_ref().filter(|t| !t.is_empty()) {
            state.theme_name = theme.clone();
        }
        if let Some(p) = &disp.presentation {
            match p.parse() {
                Ok(presentation) => state.presentation = presentation,
                Err(e) => tracing::warn!(error = %e, "ignoring display.presentation"),
            }
        }
    }
}
