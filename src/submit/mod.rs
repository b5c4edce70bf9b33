//! Delivery of collected form values to external webhooks.
//!
//! The form engine only sees a [`SubmitAdapter`]; whether the values travel as JSON
//! or as an urlencoded form post is decided here, per endpoint.

mod webhook;

use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;

use thiserror::Error;

use crate::form::{FormModel, FormValues};

pub use webhook::{WebhookSubmitter, check_success_flag, transport_runtime};

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook responded with HTTP {0}")]
    Status(u16),

    #[error("webhook reported failure")]
    Rejected,

    #[error("invalid webhook response: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    #[error("transport runtime unavailable: {0}")]
    Runtime(String),

    #[error("{0}")]
    Other(String),
}

pub type SubmitFuture = Pin<Box<dyn Future<Output = Result<(), SubmitError>> + Send + 'static>>;

/// The `onSubmit` side of a form: receives the full value map, resolves once delivered.
pub trait SubmitAdapter: Send + Sync + 'static {
    fn submit(&self, values: FormValues) -> SubmitFuture;
}

impl<F, Fut> SubmitAdapter for F
where
    F: Fn(FormValues) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), SubmitError>> + Send + 'static,
{
    fn submit(&self, values: FormValues) -> SubmitFuture {
        Box::pin((self)(values))
    }
}

/// Adapter handing the callback a typed model instead of the raw value map.
pub struct Typed<M, F> {
    handler: F,
    model: PhantomData<fn() -> M>,
}

pub fn typed<M, F, Fut>(handler: F) -> Typed<M, F>
where
    M: FormModel + 'static,
    F: Fn(M) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), SubmitError>> + Send + 'static,
{
    Typed {
        handler,
        model: PhantomData,
    }
}

impl<M, F, Fut> SubmitAdapter for Typed<M, F>
where
    M: FormModel + 'static,
    F: Fn(M) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), SubmitError>> + Send + 'static,
{
    fn submit(&self, values: FormValues) -> SubmitFuture {
        Box::pin((self.handler)(M::from_values(&values)))
    }
}
