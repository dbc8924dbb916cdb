//! The recipe store
//!
//! The [`RecipeStore`] owns the canonical collection. It wraps a durable
//! [`Slot`] with an in-memory mirror and the derived [`TagIndex`], and is the
//! only way to change either.
//!
//! Every write follows the same order: validate, build the next collection,
//! persist it, and only then swap it in as the mirror. A failed write leaves
//! the mirror exactly as it was. Committed changes are then queued for the
//! remote, if one is configured, and delivered in the background.

use std::{
    fmt, io,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use chrono::{DateTime, TimeDelta, Utc};
use tracing::instrument;

use crate::{
    domain::{FeaturedStrategy, Query, Recipe, RecipeId, RecipeInput, TagIndex, ValidationError},
    storage::{
        collection::Collection,
        format::{self, ParseError},
        mirror::{Change, Mirror},
        Slot,
    },
    transport::{RemoteDiff, Transport, TransportError},
};

/// The in-memory recipe collection, backed by a durable slot.
///
/// Mutating operations take `&mut self`, so a store serves one writer at a
/// time. A front end that runs the store on a worker thread must not issue a
/// second write for the same recipe while one is in flight; it can watch
/// [`RecipeStore::busy_flag`] to disable its controls.
pub struct RecipeStore<S> {
    slot: S,
    mirror: Option<Mirror>,
    recipes: Collection,
    tags: TagIndex,
    busy: BusyFlag,
    last_error: Option<Fault>,
    last_stamp: Option<DateTime<Utc>>,
}

impl<S: Slot> RecipeStore<S> {
    /// Creates a store over `slot` with an empty mirror.
    ///
    /// Call [`RecipeStore::load`] to read the slot.
    #[must_use]
    pub fn new(slot: S) -> Self {
        Self {
            slot,
            mirror: None,
            recipes: Collection::default(),
            tags: TagIndex::default(),
            busy: BusyFlag::default(),
            last_error: None,
            last_stamp: None,
        }
    }

    /// Mirrors every successful write to `transport`, best-effort.
    ///
    /// Changes are sent from a background thread, so a slow remote never holds
    /// up a write. Dropping the store waits for queued changes to be sent.
    #[must_use]
    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.mirror = Some(Mirror::spawn(Arc::new(transport)));
        self
    }

    /// Reads the slot and replaces the mirror.
    ///
    /// An absent slot is an empty collection.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Persistence`] if the slot cannot be read. The mirror is
    ///   left unchanged.
    /// - [`StoreError::Parse`] if the contents are malformed. The mirror is
    ///   reset to an empty collection so the store stays usable.
    #[instrument(skip(self))]
    pub fn load(&mut self) -> Result<&[Recipe], StoreError> {
        let _busy = self.busy.raise();
        let outcome = self.read_slot();
        self.settle(outcome)?;
        Ok(self.recipes.as_slice())
    }

    /// Validates and adds a new recipe.
    ///
    /// The recipe gets a fresh id and the current time as its last update.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Validation`] if a required field is empty. Nothing is
    ///   written.
    /// - [`StoreError::Persistence`] if the slot cannot be written. The mirror
    ///   is left unchanged.
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub fn create(&mut self, input: &RecipeInput) -> Result<Recipe, StoreError> {
        let _busy = self.busy.raise();
        let outcome = self.insert(input);
        self.settle(outcome)
    }

    /// Replaces the content of an existing recipe, keeping its id and its
    /// position in the collection.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] if no recipe has this id.
    /// - [`StoreError::Validation`] if a required field is empty.
    /// - [`StoreError::Persistence`] if the slot cannot be written.
    ///
    /// The mirror is unchanged in every case.
    #[instrument(skip(self, input))]
    pub fn update(&mut self, id: RecipeId, input: &RecipeInput) -> Result<Recipe, StoreError> {
        let _busy = self.busy.raise();
        let outcome = self.revise(id, input);
        self.settle(outcome)
    }

    /// Removes a recipe.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] if no recipe has this id.
    /// - [`StoreError::Persistence`] if the slot cannot be written.
    ///
    /// The mirror is unchanged in either case.
    #[instrument(skip(self))]
    pub fn delete(&mut self, id: RecipeId) -> Result<(), StoreError> {
        let _busy = self.busy.raise();
        let outcome = self.remove(id);
        self.settle(outcome)
    }

    fn read_slot(&mut self) -> Result<(), StoreError> {
        let bytes = self.slot.get()?;
        let decoded = bytes.as_deref().map_or_else(|| Ok(Vec::new()), format::decode);

        match decoded {
            Ok(recipes) => {
                self.replace_mirror(recipes);
                tracing::debug!("Loaded {} recipes", self.recipes.len());
                Ok(())
            }
            Err(e) => {
                self.replace_mirror(Vec::new());
                Err(e.into())
            }
        }
    }

    fn replace_mirror(&mut self, recipes: Vec<Recipe>) {
        self.recipes = recipes.into_iter().collect();
        self.tags = TagIndex::rebuild(self.recipes.as_slice());
        let newest = self
            .recipes
            .as_slice()
            .iter()
            .map(Recipe::last_updated)
            .max();
        self.last_stamp = self.last_stamp.max(newest);
    }

    fn insert(&mut self, input: &RecipeInput) -> Result<Recipe, StoreError> {
        let data = input.normalize()?;
        let stamp = self.next_stamp();
        let recipe = Recipe::new(data, stamp);

        let mut next = self.recipes.clone();
        next.insert(recipe.clone());
        self.commit(next, stamp)?;
        self.tags.merge(recipe.tags());

        tracing::info!("Added recipe: {} ({})", recipe.title(), recipe.id());
        self.notify(Change::Created(recipe.clone()));

        Ok(recipe)
    }

    fn revise(&mut self, id: RecipeId, input: &RecipeInput) -> Result<Recipe, StoreError> {
        if !self.recipes.contains(id) {
            return Err(StoreError::NotFound(id));
        }
        let data = input.normalize()?;
        let stamp = self.next_stamp();

        let mut next = self.recipes.clone();
        let recipe = next.get_mut(id).ok_or(StoreError::NotFound(id))?;
        recipe.revise(data, stamp);
        let recipe = recipe.clone();

        self.commit(next, stamp)?;
        self.tags = TagIndex::rebuild(self.recipes.as_slice());

        tracing::info!("Updated recipe: {} ({})", recipe.title(), recipe.id());
        self.notify(Change::Updated(recipe.clone()));

        Ok(recipe)
    }

    fn remove(&mut self, id: RecipeId) -> Result<(), StoreError> {
        let mut next = self.recipes.clone();
        let removed = next.remove(id).ok_or(StoreError::NotFound(id))?;

        self.persist(&next)?;
        self.recipes = next;
        self.tags = TagIndex::rebuild(self.recipes.as_slice());

        tracing::info!("Deleted recipe: {} ({id})", removed.title());
        self.notify(Change::Deleted(id));

        Ok(())
    }

    /// Persists `next` and, once the slot confirms, makes it the mirror.
    fn commit(&mut self, next: Collection, stamp: DateTime<Utc>) -> Result<(), StoreError> {
        self.persist(&next)?;
        self.recipes = next;
        self.last_stamp = Some(stamp);
        Ok(())
    }

    fn persist(&mut self, next: &Collection) -> Result<(), StoreError> {
        let bytes = format::encode(next.as_slice())?;
        self.slot.set(&bytes)?;
        Ok(())
    }

    fn settle<T>(&mut self, outcome: Result<T, StoreError>) -> Result<T, StoreError> {
        match &outcome {
            Ok(_) => self.last_error = None,
            Err(e) => {
                tracing::warn!("{e}");
                self.last_error = Some(Fault::from(e));
            }
        }
        outcome
    }

    fn notify(&self, change: Change) {
        if let Some(mirror) = &self.mirror {
            mirror.send(change);
        }
    }
}

impl<S> RecipeStore<S> {
    /// The current mirror, in collection order.
    #[must_use]
    pub fn recipes(&self) -> &[Recipe] {
        self.recipes.as_slice()
    }

    /// Looks up a recipe by id.
    #[must_use]
    pub fn get(&self, id: RecipeId) -> Option<&Recipe> {
        self.recipes.get(id)
    }

    /// The distinct tags across the current mirror.
    #[must_use]
    pub const fn tags(&self) -> &TagIndex {
        &self.tags
    }

    /// Applies `query` to the current mirror.
    #[must_use]
    pub fn query(&self, query: &Query) -> Vec<&Recipe> {
        query.apply(self.recipes())
    }

    /// Picks the featured recipe from the current mirror.
    #[must_use]
    pub fn featured(&self, strategy: FeaturedStrategy) -> Option<&Recipe> {
        strategy.select(self.recipes())
    }

    /// Whether a load or write is in progress.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// A handle to the busy signal that can be polled from another thread.
    #[must_use]
    pub fn busy_flag(&self) -> BusyFlag {
        self.busy.clone()
    }

    /// The failure of the most recent operation, if it failed.
    ///
    /// Cleared by the next successful load or write.
    #[must_use]
    pub const fn last_error(&self) -> Option<&Fault> {
        self.last_error.as_ref()
    }

    /// Compares the mirror with the remote collection.
    ///
    /// Waits for queued changes to be sent first. Returns `None` when no
    /// transport is configured.
    pub fn compare_remote(&self) -> Option<Result<RemoteDiff, TransportError>> {
        let mirror = self.mirror.as_ref()?;
        mirror.flush();
        Some(
            mirror
                .transport()
                .list()
                .map(|remote| RemoteDiff::between(self.recipes(), &remote)),
        )
    }

    /// Blocks until every change queued for the remote has been attempted.
    ///
    /// Does nothing when no transport is configured.
    pub fn flush_remote(&self) {
        if let Some(mirror) = &self.mirror {
            mirror.flush();
        }
    }

    /// The durable slot.
    #[must_use]
    pub const fn slot(&self) -> &S {
        &self.slot
    }

    /// Consumes the store, returning its slot.
    #[must_use]
    pub fn into_slot(self) -> S {
        self.slot
    }

    /// A timestamp for the next write, strictly after any previous one.
    fn next_stamp(&self) -> DateTime<Utc> {
        let now = Utc::now();
        match self.last_stamp {
            Some(previous) if now <= previous => previous + TimeDelta::microseconds(1),
            _ => now,
        }
    }
}

/// Errors returned by [`RecipeStore`] operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The input was rejected; nothing was written.
    #[error("invalid recipe: {0}")]
    Validation(#[from] ValidationError),
    /// No recipe has this id.
    #[error("recipe {0} not found")]
    NotFound(RecipeId),
    /// The durable slot could not be read or written.
    #[error("failed to access recipe store: {0}")]
    Persistence(#[from] io::Error),
    /// The durable slot holds malformed data.
    #[error("failed to parse recipe store: {0}")]
    Parse(#[from] ParseError),
}

impl StoreError {
    /// The category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Persistence(_) => ErrorKind::Persistence,
            Self::Parse(_) => ErrorKind::Parse,
        }
    }
}

/// Categories of [`StoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`StoreError::Validation`].
    Validation,
    /// See [`StoreError::NotFound`].
    NotFound,
    /// See [`StoreError::Persistence`].
    Persistence,
    /// See [`StoreError::Parse`].
    Parse,
}

/// A snapshot of the most recent failure, for presentation layers to poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    /// What went wrong.
    pub kind: ErrorKind,
    /// Human-readable description.
    pub message: String,
}

impl From<&StoreError> for Fault {
    fn from(error: &StoreError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// A shared flag that is raised while the store is loading or writing.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag(Arc<AtomicBool>);

impl BusyFlag {
    /// Whether an operation is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn raise(&self) -> BusyGuard {
        self.0.store(true, Ordering::Release);
        BusyGuard(Arc::clone(&self.0))
    }
}

/// Lowers the busy flag when dropped, on every exit path.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
