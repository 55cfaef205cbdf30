use std::time::Duration;

use pdfpeek_core::intake::MB;
use pdfpeek_core::{DEFAULT_ENDPOINT, DeviceProfile, InputPolicy, Presentation, WidgetConfig};

/// Resolved settings after merging config files, environment and CLI.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigState {
    pub endpoint: String,
    pub timeout_secs: u64,
    /// User agent used for device sniffing. `None` means desktop.
    pub user_agent: Option<String>,
    pub viewport_width: u32,
    pub max_file_size_mb: u64,
    pub max_mobile_file_size_mb: u64,
    pub max_batch_files: usize,
    pub theme_name: String,
    pub presentation: Presentation,
}

impl Default for ConfigState {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 120,
            user_agent: None,
            viewport_width: 1280,
            max_file_size_mb: 50,
            max_mobile_file_size_mb: 15,
            max_batch_files: 10,
            theme_name: "hacker".to_string(),
            presentation: Presentation::Sidebar,
        }
    }
}

impl ConfigState {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn device(&self) -> DeviceProfile {
        DeviceProfile::from_user_agent(self.user_agent.as_deref(), self.viewport_width)
    }

    pub fn policy(&self) -> InputPolicy {
        InputPolicy {
            device: self.device(),
            max_file_size_bytes: self.max_file_size_mb * MB,
            max_mobile_file_size_bytes: self.max_mobile_file_size_mb * MB,
            max_batch_files: self.max_batch_files,
        }
    }

    pub fn widget_config(&self) -> WidgetConfig {
        WidgetConfig {
            policy: self.policy(),
            presentation: self.presentation,
            ..Default::default()
        }
    }
}
