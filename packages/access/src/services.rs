//! The access layer wired together from one config.

use std::io;
use std::sync::Arc;

use crate::augmenter::Augmenter;
use crate::config::AccessConfig;
use crate::logging::BufferedLog;
use crate::resolver::Resolver;

/// A buffered log, a resolver reporting into it, and an augmenter using
/// that resolver.
///
/// ```rust
/// use entryview_access::{AccessConfig, Services};
/// use entryview_memory_store::MemoryLibrary;
///
/// let mut config = AccessConfig::default();
/// config.logging.file = std::env::temp_dir().join("entryview-doc.log");
/// config.logging.enabled = false;
/// let services = Services::from_config(&config);
///
/// let books = MemoryLibrary::new("Books", ["Title"]);
/// books.push(books.entry_builder().field("Title", "Dune"));
/// let dune = services.augmenter().first(&books).unwrap();
/// assert_eq!(services.resolver().title(dune.as_ref()), "Dune");
/// ```
#[derive(Debug)]
pub struct Services {
    log: Arc<BufferedLog>,
    resolver: Arc<Resolver>,
    augmenter: Augmenter,
}

impl Services {
    pub fn from_config(config: &AccessConfig) -> Self {
        let log = Arc::new(BufferedLog::from_config(&config.logging));
        log.initialize(None, None);
        let resolver = Arc::new(Resolver::new(log.clone()));
        let augmenter = Augmenter::with_config(resolver.clone(), config.augment.clone());
        Self {
            log,
            resolver,
            augmenter,
        }
    }

    pub fn log(&self) -> &Arc<BufferedLog> {
        &self.log
    }

    pub fn resolver(&self) -> &Arc<Resolver> {
        &self.resolver
    }

    pub fn augmenter(&self) -> &Augmenter {
        &self.augmenter
    }

    /// Drop cached views and accessors, and flush the log.
    pub fn shutdown(&self) -> io::Result<usize> {
        self.augmenter.reset();
        self.log.flush()
    }
}

impl Default for Services {
    fn default() -> Self {
        Self::from_config(&AccessConfig::default())
    }
}
