//! Candidate validation with a dual sync/async surface.
//!
//! The validator has two access modes with different freshness guarantees:
//!
//! - [`Validator::validate`] is the authoritative mode used when a chip is
//!   committed. It awaits asynchronous predicates and fails closed: a
//!   predicate error is indistinguishable from "invalid".
//! - [`Validator::validate_now`] is the instantaneous mode used for live
//!   provisional feedback while typing. Synchronous predicates answer
//!   directly; asynchronous ones optimistically report valid until the
//!   authoritative mode is consulted.
//!
//! When no predicate is configured, both modes return `None` so the
//! resulting chip carries no validity flag at all ("validation not
//! applicable") rather than a misleading `Some(true)`.

use futures::FutureExt;
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

pub type SyncPredicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;
pub type AsyncPredicate<T> =
    Arc<dyn Fn(T) -> BoxFuture<'static, anyhow::Result<bool>> + Send + Sync>;

/// A possibly-asynchronous predicate over candidate values.
///
/// The sync/async split is an explicit variant rather than an overloaded
/// callable, so the boundary check happens exactly once, here.
pub enum Validator<T> {
    Unset,
    Sync(SyncPredicate<T>),
    Async(AsyncPredicate<T>),
}

impl<T> Clone for Validator<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Unset => Self::Unset,
            Self::Sync(f) => Self::Sync(f.clone()),
            Self::Async(f) => Self::Async(f.clone()),
        }
    }
}

impl<T> Default for Validator<T> {
    fn default() -> Self {
        Self::Unset
    }
}

impl<T> fmt::Debug for Validator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unset => "Unset",
            Self::Sync(_) => "Sync",
            Self::Async(_) => "Async",
        };
        f.write_str(name)
    }
}

impl<T> Validator<T>
where
    T: Clone,
{
    pub fn sync(predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        Self::Sync(Arc::new(predicate))
    }

    pub fn future<F, Fut>(predicate: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
    {
        Self::Async(Arc::new(move |value| predicate(value).boxed()))
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// Authoritative validation. Never propagates predicate errors: a
    /// failing or erroring predicate yields `Some(false)`.
    pub async fn validate(&self, value: &T) -> Option<bool> {
        match self {
            Self::Unset => None,
            Self::Sync(predicate) => Some(predicate(value)),
            Self::Async(predicate) => match predicate(value.clone()).await {
                Ok(valid) => Some(valid),
                Err(err) => {
                    tracing::debug!("validator predicate failed, treating as invalid: {err:#}");
                    Some(false)
                }
            },
        }
    }

    /// Instantaneous validation for provisional UI feedback. Asynchronous
    /// predicates answer optimistically.
    pub fn validate_now(&self, value: &T) -> Option<bool> {
        match self {
            Self::Unset => None,
            Self::Sync(predicate) => Some(predicate(value)),
            Self::Async(_) => Some(true),
        }
    }
}
