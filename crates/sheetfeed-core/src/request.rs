//! Settled request handles with explicit continuation context.
//!
//! Workflows return a [`Request`] once their chain has settled. Subscribers
//! registered with [`Request::done`] receive the value and a [`Context`];
//! subscribers registered with [`Request::fail`] receive the literal failure
//! message and the same context. The context is the caller-supplied value when
//! one was given, otherwise the request itself (by id).

use crate::error::{Result, SheetError};
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Caller-supplied continuation context.
pub type ContextValue = Arc<dyn Any + Send + Sync>;

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

impl RequestId {
    fn next() -> Self {
        RequestId(NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestState {
    Resolved,
    Rejected,
}

/// Context handed to subscribers alongside the outcome.
#[derive(Clone, Copy)]
pub enum Context<'a> {
    /// No context was supplied: the request itself.
    Request(RequestId),
    Value(&'a (dyn Any + Send + Sync)),
}

impl<'a> Context<'a> {
    pub fn request_id(&self) -> Option<RequestId> {
        match *self {
            Context::Request(id) => Some(id),
            Context::Value(_) => None,
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&'a T> {
        match *self {
            Context::Value(value) => value.downcast_ref::<T>(),
            Context::Request(_) => None,
        }
    }
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Context::Request(id) => f.debug_tuple("Request").field(id).finish(),
            Context::Value(_) => f.write_str("Value(..)"),
        }
    }
}

/// Outcome of one workflow invocation. Settled exactly once, at construction.
pub struct Request<T> {
    id: RequestId,
    outcome: Result<T>,
    context: Option<ContextValue>,
}

impl<T> Request<T> {
    pub(crate) fn settle(outcome: Result<T>, context: Option<ContextValue>) -> Self {
        Request {
            id: RequestId::next(),
            outcome,
            context,
        }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn state(&self) -> RequestState {
        match self.outcome {
            Ok(_) => RequestState::Resolved,
            Err(_) => RequestState::Rejected,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn context(&self) -> Context<'_> {
        match &self.context {
            Some(value) => Context::Value(&**value),
            None => Context::Request(self.id),
        }
    }

    /// Run `f` with the value if the request resolved.
    pub fn done<F>(&self, f: F) -> &Self
    where
        F: FnOnce(&T, Context<'_>),
    {
        if let Ok(value) = &self.outcome {
            f(value, self.context());
        }
        self
    }

    /// Run `f` with the literal failure message if the request was rejected.
    pub fn fail<F>(&self, f: F) -> &Self
    where
        F: FnOnce(&str, Context<'_>),
    {
        if let Err(err) = &self.outcome {
            f(&err.message(), self.context());
        }
        self
    }

    pub fn value(&self) -> Option<&T> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&SheetError> {
        self.outcome.as_ref().err()
    }

    pub fn into_result(self) -> Result<T> {
        self.outcome
    }
}

impl<T: fmt::Debug> fmt::Debug for Request<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("id", &self.id)
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}
