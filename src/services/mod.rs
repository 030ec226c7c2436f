//! Scanner services

pub mod device_selection;
pub mod events;
pub mod lookup;
pub mod scanner;

use std::sync::Arc;

use crate::{
    config::ScannerConfig,
    media::{CodeDecoder, MediaDevices},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub lookup: lookup::LookupService,
    pub scanner: scanner::ScannerService,
}

impl Services {
    /// Wire services over the HTTP repository and a media backend
    pub fn new(
        repository: Repository,
        media: Arc<dyn MediaDevices>,
        decoder: Arc<dyn CodeDecoder>,
        scanner_config: ScannerConfig,
    ) -> Self {
        let lookup = lookup::LookupService::new(Arc::new(repository.equipment));
        Self {
            scanner: scanner::ScannerService::new(media, decoder, lookup.clone(), scanner_config),
            lookup,
        }
    }
}
