use std::sync::Arc;

use crate::{
    cache::{Lookup, ResolutionCache},
    geocoder::GeocodingService,
    Coordinates, CountryCoordinates,
};

/// Resolves canonical country names into [`Coordinates`].
///
/// Resolution tries, in order, the cache, the static table and each remote service,
/// stopping at the first success. Every outcome, including "unresolved", is cached.
pub struct Resolver {
    table: CountryCoordinates,
    services: Vec<Box<dyn GeocodingService>>,
    cache: Arc<ResolutionCache>,
}

impl Resolver {
    /// Returns a [`Resolver`] over the embedded table and no remote service
    pub fn new(cache: Arc<ResolutionCache>) -> Self {
        Self::with_table(CountryCoordinates::new(), cache)
    }

    pub fn with_table(table: CountryCoordinates, cache: Arc<ResolutionCache>) -> Self {
        Self {
            table,
            services: vec![],
            cache,
        }
    }

    /// Appends `service` to the services tried when the static table misses
    pub fn with_service(mut self, service: impl GeocodingService + 'static) -> Self {
        self.services.push(Box::new(service));
        self
    }

    pub fn cache(&self) -> &Arc<ResolutionCache> {
        &self.cache
    }

    /// Returns the coordinates of `country`, or `None` if it cannot be resolved.
    /// # Implementation
    /// This function is idempotent but not pure: it writes to the cache.
    /// Failures of individual services are logged and never returned.
    pub async fn resolve(&self, country: &str) -> Option<Coordinates> {
        if let Lookup::Hit(value) = self.cache.get(country) {
            log::debug!("{country} - cache hit");
            return value;
        }

        if let Some(coordinates) = self.table.get(country) {
            return self.cache.insert(country, Some(coordinates));
        }

        log::info!("{country} - not in table");
        for service in &self.services {
            log::debug!("{country} - trying {}", service.name());
            match service.lookup(country).await {
                Ok(Some(coordinates)) => {
                    match Coordinates::checked(coordinates.latitude(), coordinates.longitude()) {
                        Some(coordinates) => {
                            log::info!("{country} - resolved by {}", service.name());
                            return self.cache.insert(country, Some(coordinates));
                        }
                        None => log::warn!(
                            "{country} - {} answered invalid coordinates {coordinates:?}",
                            service.name()
                        ),
                    }
                }
                Ok(None) => log::debug!("{country} - {} has no coordinates", service.name()),
                Err(e) => log::warn!("{country} - {} failed: {e}", service.name()),
            }
        }

        log::info!("{country} - unresolved");
        self.cache.insert(country, None)
    }
}
