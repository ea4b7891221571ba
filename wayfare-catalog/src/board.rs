use std::sync::Arc;
use std::time::Duration;
use futures_util::future::join_all;
use tracing::{info, warn};
use wayfare_core::catalog::{CatalogService, CatalogServiceError};
use wayfare_core::{CancelSignal, Interrupted, Leg};
use crate::seatmap::{normalize, LegCatalog};

/// State of one leg's catalog on the seat screen.
#[derive(Debug, Clone, PartialEq)]
pub enum LegSlot {
    Pending,
    Loaded(LegCatalog),
    Failed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog fetch for leg {} failed: {source}", .leg_index + 1)]
    Fetch {
        leg_index: usize,
        #[source]
        source: CatalogServiceError,
    },

    #[error("Catalog fetch for leg {} {source}", .leg_index + 1)]
    Interrupted {
        leg_index: usize,
        #[source]
        source: Interrupted,
    },

    #[error("Leg {} asked for service {expected} but catalog returned {actual}", .leg_index + 1)]
    ServiceMismatch {
        leg_index: usize,
        expected: String,
        actual: String,
    },

    #[error("Leg index {0} is out of range")]
    LegOutOfRange(usize),
}

/// Per-leg catalog snapshots. Slots are only ever replaced wholesale.
#[derive(Debug, Clone)]
pub struct CatalogBoard {
    service_ids: Vec<String>,
    class_type: String,
    slots: Vec<LegSlot>,
}

impl CatalogBoard {
    pub fn new(service_ids: Vec<String>, class_type: impl Into<String>) -> Self {
        let slots = vec![LegSlot::Pending; service_ids.len()];
        Self {
            service_ids,
            class_type: class_type.into(),
            slots,
        }
    }

    pub fn leg_count(&self) -> usize {
        self.slots.len()
    }

    pub fn slot(&self, leg_index: usize) -> Option<&LegSlot> {
        self.slots.get(leg_index)
    }

    pub fn catalog(&self, leg_index: usize) -> Option<&LegCatalog> {
        match self.slots.get(leg_index) {
            Some(LegSlot::Loaded(catalog)) => Some(catalog),
            _ => None,
        }
    }

    /// True once every leg has a loaded catalog. Booking is blocked until then.
    pub fn is_ready(&self) -> bool {
        self.slots.iter().all(|s| matches!(s, LegSlot::Loaded(_)))
    }

    pub fn unresolved_legs(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| !matches!(s, LegSlot::Loaded(_)))
            .map(|(i, _)| i)
            .collect()
    }

    /// Resolved legs in trip order, or `None` while any leg is unresolved.
    pub fn legs(&self) -> Option<Vec<Leg>> {
        self.slots
            .iter()
            .map(|s| match s {
                LegSlot::Loaded(catalog) => Some(catalog.leg.clone()),
                _ => None,
            })
            .collect()
    }

    fn replace(&mut self, leg_index: usize, slot: LegSlot) {
        if let Some(existing) = self.slots.get_mut(leg_index) {
            *existing = slot;
        }
    }
}

/// Fetches and normalizes leg catalogs.
pub struct CatalogLoader {
    service: Arc<dyn CatalogService>,
    timeout: Duration,
}

impl CatalogLoader {
    pub fn new(service: Arc<dyn CatalogService>, timeout: Duration) -> Self {
        Self { service, timeout }
    }

    /// Fetch one leg. Bounded by the loader timeout and by `cancel`.
    pub async fn fetch_leg(
        &self,
        leg_index: usize,
        service_id: &str,
        class_type: &str,
        cancel: &CancelSignal,
    ) -> Result<LegCatalog, CatalogError> {
        info!("Fetching catalog for leg {} ({})", leg_index + 1, service_id);

        let details = cancel
            .bounded(self.timeout, self.service.get_leg_details(service_id))
            .await
            .map_err(|source| CatalogError::Interrupted { leg_index, source })?
            .map_err(|source| CatalogError::Fetch { leg_index, source })?;

        if details.service_id != service_id {
            return Err(CatalogError::ServiceMismatch {
                leg_index,
                expected: service_id.to_string(),
                actual: details.service_id,
            });
        }

        Ok(normalize(details, class_type))
    }

    /// Fetch every leg concurrently and replace each slot with the result.
    ///
    /// A failed leg does not affect the others; the failures are returned so the
    /// caller can offer a retry.
    pub async fn load_all(&self, board: &mut CatalogBoard, cancel: &CancelSignal) -> Vec<CatalogError> {
        let fetches = board
            .service_ids
            .iter()
            .enumerate()
            .map(|(i, id)| self.fetch_leg(i, id, &board.class_type, cancel));
        let results = join_all(fetches).await;

        let mut errors = Vec::new();
        for (i, result) in results.into_iter().enumerate() {
            match result {
                Ok(catalog) => board.replace(i, LegSlot::Loaded(catalog)),
                Err(e) => {
                    warn!("{}", e);
                    board.replace(i, LegSlot::Failed(e.to_string()));
                    errors.push(e);
                }
            }
        }
        errors
    }

    /// Re-fetch a single leg, replacing its slot whatever the outcome.
    pub async fn retry_leg<'a>(
        &self,
        board: &'a mut CatalogBoard,
        leg_index: usize,
        cancel: &CancelSignal,
    ) -> Result<&'a LegCatalog, CatalogError> {
        let service_id = board
            .service_ids
            .get(leg_index)
            .cloned()
            .ok_or(CatalogError::LegOutOfRange(leg_index))?;

        match self.fetch_leg(leg_index, &service_id, &board.class_type, cancel).await {
            Ok(catalog) => {
                board.replace(leg_index, LegSlot::Loaded(catalog));
                board.catalog(leg_index).ok_or(CatalogError::LegOutOfRange(leg_index))
            }
            Err(e) => {
                warn!("{}", e);
                board.replace(leg_index, LegSlot::Failed(e.to_string()));
                Err(e)
            }
        }
    }
}
