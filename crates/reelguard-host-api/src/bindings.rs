//! Bundle of host collaborators handed to the tracker

use std::sync::Arc;

use crate::{DocumentObserver, LocationSource, Navigator, OverlaySurface, Scheduler};

/// One handle per collaborator. Cheap to clone.
#[derive(Clone)]
pub struct HostBindings {
    pub location: Arc<dyn LocationSource>,
    pub overlay: Arc<dyn OverlaySurface>,
    pub navigator: Arc<dyn Navigator>,
    pub observer: Arc<dyn DocumentObserver>,
    pub scheduler: Arc<dyn Scheduler>,
}

impl HostBindings {
    /// Bind every collaborator to a single host that implements them all
    pub fn from_host<H>(host: Arc<H>) -> Self
    where
        H: LocationSource + OverlaySurface + Navigator + DocumentObserver + Scheduler + 'static,
    {
        Self {
            location: host.clone(),
            overlay: host.clone(),
            navigator: host.clone(),
            observer: host.clone(),
            scheduler: host,
        }
    }
}

impl std::fmt::Debug for HostBindings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostBindings")
            .field("location", &self.location.current_location())
            .finish_non_exhaustive()
    }
}
