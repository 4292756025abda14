//! Shared application state

use crate::utils::upload::UploadLimits;
use pixshift_core::Config;
use pixshift_processing::OptionResolver;

/// Read-only state shared by every handler. The service keeps nothing
/// between requests.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Config,
    pub option_resolver: OptionResolver,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let option_resolver = OptionResolver::new(config.default_quality);
        Self {
            config,
            option_resolver,
        }
    }

    pub fn upload_limits(&self) -> UploadLimits {
        UploadLimits {
            max_file_size: self.config.max_file_size_bytes,
            max_files: self.config.max_files_per_request,
        }
    }
}
