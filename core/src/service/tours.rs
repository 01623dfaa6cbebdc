//! Tour catalogue operations.

use crate::environment::Clock;
use crate::error::{Error, Result};
use crate::policy::{require_role, TOUR_MANAGERS, TOUR_STAFF};
use crate::query::TourQuery;
use crate::stats::{self, DifficultyStats, MonthlyPlan};
use crate::store::TourStore;
use crate::tour::{NewTour, Tour, TourPatch};
use crate::types::{Actor, TourId};

/// Tour use cases.
#[derive(Clone, Debug)]
pub struct TourService<T, C> {
    tours: T,
    clock: C,
}

impl<T, C> TourService<T, C>
where
    T: TourStore,
    C: Clock,
{
    /// Create a service over the given store.
    #[must_use]
    pub const fn new(tours: T, clock: C) -> Self {
        Self { tours, clock }
    }

    /// Add a tour with default ratings.
    ///
    /// # Errors
    ///
    /// [`Error::Forbidden`], [`Error::Validation`], [`Error::Conflict`] on a
    /// duplicate name or slug, or [`Error::StoreUnavailable`].
    pub async fn create(&self, actor: &Actor, input: NewTour) -> Result<Tour> {
        require_role(actor, TOUR_MANAGERS)?;
        let tour = Tour::new(input, self.clock.now())?;
        let created = self.tours.create(&tour).await?;
        tracing::info!(tour_id = %created.id, slug = %created.slug, "Tour created");
        Ok(created)
    }

    /// Fetch one tour, secret or not.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] or [`Error::StoreUnavailable`].
    pub async fn get(&self, id: TourId) -> Result<Tour> {
        self.tours
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found("Tour", id))
    }

    /// Fetch one tour by slug.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] or [`Error::StoreUnavailable`].
    pub async fn get_by_slug(&self, slug: &str) -> Result<Tour> {
        self.tours
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| Error::not_found("Tour", slug))
    }

    /// Filtered, sorted, paginated listing.
    ///
    /// # Errors
    ///
    /// [`Error::StoreUnavailable`].
    pub async fn list(&self, query: &TourQuery) -> Result<Vec<Tour>> {
        self.tours.list(query).await
    }

    /// Edit a tour. The derived rating fields cannot be reached from here.
    ///
    /// # Errors
    ///
    /// [`Error::Forbidden`], [`Error::Validation`], [`Error::NotFound`],
    /// [`Error::Conflict`] or [`Error::StoreUnavailable`].
    pub async fn update(&self, actor: &Actor, id: TourId, patch: TourPatch) -> Result<Tour> {
        require_role(actor, TOUR_MANAGERS)?;
        let updated = self
            .tours
            .update(id, &patch)
            .await?
            .ok_or_else(|| Error::not_found("Tour", id))?;
        tracing::info!(tour_id = %id, "Tour updated");
        Ok(updated)
    }

    /// Remove a tour.
    ///
    /// # Errors
    ///
    /// [`Error::Forbidden`], [`Error::NotFound`] or [`Error::StoreUnavailable`].
    pub async fn delete(&self, actor: &Actor, id: TourId) -> Result<()> {
        require_role(actor, TOUR_MANAGERS)?;
        if !self.tours.delete(id).await? {
            return Err(Error::not_found("Tour", id));
        }
        tracing::info!(tour_id = %id, "Tour deleted");
        Ok(())
    }

    /// Per-difficulty statistics.
    ///
    /// # Errors
    ///
    /// [`Error::StoreUnavailable`].
    pub async fn stats(&self) -> Result<Vec<DifficultyStats>> {
        let tours = self.tours.list_all().await?;
        Ok(stats::tour_stats(&tours))
    }

    /// Tour starts per month of `year`, staff only.
    ///
    /// # Errors
    ///
    /// [`Error::Forbidden`] or [`Error::StoreUnavailable`].
    pub async fn monthly_plan(&self, actor: &Actor, year: i32) -> Result<Vec<MonthlyPlan>> {
        require_role(actor, TOUR_STAFF)?;
        let tours = self.tours.list_all().await?;
        Ok(stats::monthly_plan(&tours, year))
    }
}
