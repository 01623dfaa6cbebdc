//! In-memory store implementations.
//!
//! Fast, deterministic stand-ins for the `PostgreSQL` stores. Both share the
//! same contract, including the unique constraints, so the consistency
//! engine can be tested without a database.
//!
//! Each store also carries an [`Outage`] switch: while it is tripped every
//! call fails with [`Error::StoreUnavailable`], which is how tests exercise
//! the "recomputation failed after a successful mutation" path.

use natours_core::error::{Error, Result};
use natours_core::query::TourQuery;
use natours_core::ratings::{RatingsSummary, TourRatings};
use natours_core::review::{Review, ReviewFilter, ReviewPatch};
use natours_core::store::{ReviewStore, TourStore};
use natours_core::tour::{Tour, TourPatch};
use natours_core::types::{ReviewId, TourId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Shared on/off switch simulating an unreachable backend.
#[derive(Clone, Debug, Default)]
pub struct Outage(Arc<AtomicBool>);

impl Outage {
    /// Make every subsequent call fail.
    pub fn trip(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Bring the store back.
    pub fn restore(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    /// Whether the store is currently down.
    #[must_use]
    pub fn is_tripped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn check(&self, store: &str) -> Result<()> {
        if self.is_tripped() {
            Err(Error::StoreUnavailable(format!("{store} is unreachable")))
        } else {
            Ok(())
        }
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| Error::StoreUnavailable("lock poisoned".into()))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| Error::StoreUnavailable("lock poisoned".into()))
}

// ============================================================================
// Reviews
// ============================================================================

/// `HashMap`-backed review store.
///
/// # Example
///
/// ```
/// use natours_testing::InMemoryReviewStore;
///
/// let store = InMemoryReviewStore::new();
/// assert!(store.is_empty());
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryReviewStore {
    reviews: Arc<RwLock<HashMap<ReviewId, Review>>>,
    outage: Outage,
}

impl InMemoryReviewStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Outage switch for this store.
    #[must_use]
    pub const fn outage(&self) -> &Outage {
        &self.outage
    }

    /// Number of stored reviews.
    #[must_use]
    pub fn len(&self) -> usize {
        read(&self.reviews).map_or(0, |reviews| reviews.len())
    }

    /// Whether the store holds no reviews.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Star ratings currently stored for `tour`, in no particular order.
    #[must_use]
    pub fn ratings_of(&self, tour: TourId) -> Vec<u8> {
        read(&self.reviews).map_or_else(
            |_| Vec::new(),
            |reviews| {
                reviews
                    .values()
                    .filter(|r| r.tour == tour)
                    .map(|r| r.rating.value())
                    .collect()
            },
        )
    }
}

impl ReviewStore for InMemoryReviewStore {
    async fn create(&self, review: &Review) -> Result<Review> {
        self.outage.check("review store")?;
        let mut reviews = write(&self.reviews)?;

        if reviews
            .values()
            .any(|r| r.tour == review.tour && r.user == review.user)
        {
            return Err(Error::DuplicateReview {
                tour: review.tour.to_string(),
                user: review.user.to_string(),
            });
        }

        reviews.insert(review.id, review.clone());
        Ok(review.clone())
    }

    async fn find_by_id(&self, id: ReviewId) -> Result<Option<Review>> {
        self.outage.check("review store")?;
        Ok(read(&self.reviews)?.get(&id).cloned())
    }

    async fn update(&self, id: ReviewId, patch: &ReviewPatch) -> Result<Option<Review>> {
        self.outage.check("review store")?;
        let mut reviews = write(&self.reviews)?;
        Ok(reviews.get_mut(&id).map(|review| {
            review.apply(patch);
            review.clone()
        }))
    }

    async fn delete(&self, id: ReviewId) -> Result<bool> {
        self.outage.check("review store")?;
        Ok(write(&self.reviews)?.remove(&id).is_some())
    }

    async fn list(&self, filter: ReviewFilter) -> Result<Vec<Review>> {
        self.outage.check("review store")?;
        let mut selected: Vec<Review> = read(&self.reviews)?
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        selected.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(selected)
    }

    async fn ratings_summary(&self, tour: TourId) -> Result<RatingsSummary> {
        self.outage.check("review store")?;
        let reviews = read(&self.reviews)?;
        Ok(RatingsSummary::from_ratings(
            reviews
                .values()
                .filter(|r| r.tour == tour)
                .map(|r| r.rating.value()),
        ))
    }
}

// ============================================================================
// Tours
// ============================================================================

/// `HashMap`-backed tour store.
#[derive(Clone, Debug, Default)]
pub struct InMemoryTourStore {
    tours: Arc<RwLock<HashMap<TourId, Tour>>>,
    outage: Outage,
}

impl InMemoryTourStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Outage switch for this store.
    #[must_use]
    pub const fn outage(&self) -> &Outage {
        &self.outage
    }

    /// Number of stored tours.
    #[must_use]
    pub fn len(&self) -> usize {
        read(&self.tours).map_or(0, |tours| tours.len())
    }

    /// Whether the store holds no tours.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current ratings of a tour, bypassing the outage switch.
    #[must_use]
    pub fn ratings_of(&self, id: TourId) -> Option<TourRatings> {
        read(&self.tours)
            .ok()
            .and_then(|tours| tours.get(&id).map(Tour::ratings))
    }
}

/// Name and slug are both unique across tours.
fn check_unique(tours: &HashMap<TourId, Tour>, candidate: &Tour) -> Result<()> {
    let others = || tours.values().filter(|t| t.id != candidate.id);
    if others().any(|t| t.name == candidate.name) {
        return Err(Error::Conflict(format!("a tour named {} already exists", candidate.name)));
    }
    if others().any(|t| t.slug == candidate.slug) {
        return Err(Error::Conflict(format!("a tour with slug {} already exists", candidate.slug)));
    }
    Ok(())
}

impl TourStore for InMemoryTourStore {
    async fn create(&self, tour: &Tour) -> Result<Tour> {
        self.outage.check("tour store")?;
        let mut tours = write(&self.tours)?;
        check_unique(&tours, tour)?;
        tours.insert(tour.id, tour.clone());
        Ok(tour.clone())
    }

    async fn find_by_id(&self, id: TourId) -> Result<Option<Tour>> {
        self.outage.check("tour store")?;
        Ok(read(&self.tours)?.get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tour>> {
        self.outage.check("tour store")?;
        Ok(read(&self.tours)?.values().find(|t| t.slug == slug).cloned())
    }

    async fn list(&self, query: &TourQuery) -> Result<Vec<Tour>> {
        self.outage.check("tour store")?;
        Ok(query.apply(read(&self.tours)?.values()))
    }

    async fn list_all(&self) -> Result<Vec<Tour>> {
        self.outage.check("tour store")?;
        Ok(read(&self.tours)?.values().cloned().collect())
    }

    async fn update(&self, id: TourId, patch: &TourPatch) -> Result<Option<Tour>> {
        self.outage.check("tour store")?;
        let mut tours = write(&self.tours)?;
        let Some(mut edited) = tours.get(&id).cloned() else {
            return Ok(None);
        };
        edited.apply(patch.clone())?;
        check_unique(&tours, &edited)?;
        tours.insert(id, edited.clone());
        Ok(Some(edited))
    }

    async fn delete(&self, id: TourId) -> Result<bool> {
        self.outage.check("tour store")?;
        Ok(write(&self.tours)?.remove(&id).is_some())
    }

    async fn set_ratings(&self, id: TourId, ratings: TourRatings) -> Result<()> {
        self.outage.check("tour store")?;
        if let Some(tour) = write(&self.tours)?.get_mut(&id) {
            tour.set_ratings(ratings);
        }
        Ok(())
    }
}
