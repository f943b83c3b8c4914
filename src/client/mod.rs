//! HTTP request dispatcher
//!
//! Sends a [`Request`] and delivers the [`Response`] in one of three ways:
//!
//! - [`Dispatcher::send`]: native async/await
//! - [`Dispatcher::call`]: returns at once; a completion handler runs exactly
//!   once on the runtime when the request finishes
//! - [`Dispatcher::call_blocking`]: parks the calling thread on a completion
//!   channel fed by that same handler
//!
//! The dispatcher reuses the tokio runtime it was created in, or starts and
//! owns a small multi-thread runtime when created outside one. An owned
//! runtime outlives the requests scheduled on it: dropping the dispatcher
//! outside async context waits for them to finish. Inside async context the
//! runtime is shut down in the background, and every handler still pending
//! receives [`HttpError::Cancelled`].

pub mod request;
pub mod response;
mod transport;

pub use request::{Request, RequestBuilder};
pub use response::Response;

use crate::config::{ClientConfig, COMPLETION_GRACE_SECS};
use crate::error::{HttpError, Result};
use log::{debug, warn};
use reqwest::Client;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use tokio_util::task::TaskTracker;

/// Issues HTTP requests over a pooled client
#[derive(Debug)]
pub struct Dispatcher {
    client: Client,
    config: ClientConfig,
    handle: Handle,
    runtime: Option<Runtime>,
    in_flight: TaskTracker,
}

impl Dispatcher {
    /// Create a dispatcher from `config`
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidConfig`] if `config` fails validation and
    /// [`HttpError::Runtime`] if the runtime or HTTP client cannot be started.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let (handle, runtime) = match Handle::try_current() {
            Ok(handle) => (handle, None),
            Err(_) => {
                let runtime = tokio::runtime::Builder::new_multi_thread()
                    .worker_threads(2)
                    .thread_name("simple-http")
                    .enable_all()
                    .build()
                    .map_err(|e| HttpError::Runtime(format!("Failed to start runtime: {e}")))?;
                (runtime.handle().clone(), Some(runtime))
            }
        };

        let client = transport::create_client(&config)?;
        debug!(
            "Dispatcher ready (user agent '{}', default timeout {}s, own runtime: {})",
            config.user_agent,
            config.timeout_secs,
            runtime.is_some()
        );

        Ok(Self {
            client,
            config,
            handle,
            runtime,
            in_flight: TaskTracker::new(),
        })
    }

    /// Create a dispatcher with the default configuration
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::new`].
    pub fn with_defaults() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Configuration in effect
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Start a request for `url` with the configured default timeout
    pub fn request(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(url).timeout(self.config.timeout())
    }

    /// Send `request` and await the outcome
    ///
    /// A non-2xx status is not an error here; see [`Response::error_for_status`].
    ///
    /// # Errors
    ///
    /// - [`HttpError::Timeout`] if the request exceeds its timeout
    /// - [`HttpError::Connection`] if the host cannot be reached
    /// - [`HttpError::Transport`] for any other transport failure
    pub async fn send(&self, request: &Request) -> Result<Response> {
        execute(&self.client, request).await
    }

    /// Schedule `request` and return immediately
    ///
    /// `on_complete` is invoked exactly once, on a runtime thread, with the
    /// outcome. There is no way to cancel a scheduled request; if the runtime
    /// goes away first, `on_complete` receives [`HttpError::Cancelled`].
    pub fn call<F>(&self, request: Request, on_complete: F)
    where
        F: FnOnce(Result<Response>) + Send + 'static,
    {
        let client = self.client.clone();
        let completion = Completion::new(on_complete);
        let _ = self.in_flight.spawn_on(
            async move {
                let outcome = execute(&client, &request).await;
                completion.complete(outcome);
            },
            &self.handle,
        );
    }

    /// Send `request` and block until it completes, returning the body
    ///
    /// The body is returned whatever the status; the status is logged.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::call_blocking_response`].
    pub fn call_blocking(&self, request: Request) -> Result<Vec<u8>> {
        let response = self.call_blocking_response(request)?;
        if !response.is_success() {
            warn!(
                "{} answered {} - {}",
                response.url(),
                response.status().as_u16(),
                response.reason()
            );
        }
        Ok(response.into_body())
    }

    /// Send `request` and block until it completes
    ///
    /// Waits at most the request timeout plus a one second grace period.
    ///
    /// # Errors
    ///
    /// - the errors of [`Dispatcher::send`]
    /// - [`HttpError::Timeout`] if no outcome arrives within the grace period
    /// - [`HttpError::Cancelled`] if the request task ended without an outcome
    /// - [`HttpError::Runtime`] when called from the current-thread runtime
    ///   the dispatcher itself runs on, where waiting would starve the request
    ///   task
    pub fn call_blocking_response(&self, request: Request) -> Result<Response> {
        let in_worker = match Handle::try_current() {
            Ok(current) if current.runtime_flavor() == RuntimeFlavor::CurrentThread => {
                if self.runtime.is_none() {
                    return Err(HttpError::Runtime(
                        "blocking call issued from a current-thread runtime; use `send` instead"
                            .to_string(),
                    ));
                }
                // requests run on our own runtime; block_in_place is unavailable here
                false
            }
            Ok(_) => true,
            Err(_) => false,
        };

        let timeout = request.timeout();
        let wait_limit = timeout + Duration::from_secs(COMPLETION_GRACE_SECS);
        let (tx, rx) = mpsc::sync_channel(1);

        self.call(request, move |outcome| {
            // receiver gone means the caller already gave up
            let _ = tx.send(outcome);
        });

        let wait = || rx.recv_timeout(wait_limit);
        let received = if in_worker {
            tokio::task::block_in_place(wait)
        } else {
            wait()
        };

        match received {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => {
                warn!("No outcome within {}s, giving up", wait_limit.as_secs_f64());
                Err(HttpError::Timeout(timeout))
            }
            Err(RecvTimeoutError::Disconnected) => Err(HttpError::Cancelled),
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        let _ = self.in_flight.close();
        let Some(runtime) = self.runtime.take() else {
            return;
        };

        if Handle::try_current().is_ok() {
            // Runtime::drop and block_on both panic inside an async context
            if !self.in_flight.is_empty() {
                warn!(
                    "Dropping dispatcher with {} request(s) in flight; cancelling",
                    self.in_flight.len()
                );
            }
            runtime.shutdown_background();
        } else {
            // each request is bounded by its own timeout
            runtime.block_on(self.in_flight.wait());
        }
    }
}

/// Runs the completion handler exactly once: with the outcome, or with
/// [`HttpError::Cancelled`] if the request task is dropped first
struct Completion<F>
where
    F: FnOnce(Result<Response>),
{
    handler: Option<F>,
}

impl<F> Completion<F>
where
    F: FnOnce(Result<Response>),
{
    const fn new(handler: F) -> Self {
        Self {
            handler: Some(handler),
        }
    }

    fn complete(mut self, outcome: Result<Response>) {
        if let Some(handler) = self.handler.take() {
            handler(outcome);
        }
    }
}

impl<F> Drop for Completion<F>
where
    F: FnOnce(Result<Response>),
{
    fn drop(&mut self) {
        if let Some(handler) = self.handler.take() {
            handler(Err(HttpError::Cancelled));
        }
    }
}

async fn execute(client: &Client, request: &Request) -> Result<Response> {
    let outcome = perform(client, request).await;
    match &outcome {
        Ok(response) => debug!(
            "Status Code: {} - {}",
            response.status().as_u16(),
            response.status().canonical_reason().unwrap_or("Unknown")
        ),
        Err(err) => warn!("{} {} failed: {err}", request.method(), request.url()),
    }
    outcome
}

async fn perform(client: &Client, request: &Request) -> Result<Response> {
    let url = request.url().as_str();
    let timeout = request.timeout();

    let mut builder = client
        .request(request.method().clone(), request.url().clone())
        .headers(request.headers().clone())
        .timeout(timeout);
    if let Some(body) = request.body() {
        builder = builder.body(body.to_vec());
    }

    let response = builder
        .send()
        .await
        .map_err(|e| HttpError::from_transport(e, url, timeout))?;

    let status = response.status();
    let headers = response.headers().clone();
    let final_url = response.url().clone();
    let body = response
        .bytes()
        .await
        .map_err(|e| HttpError::from_transport(e, url, timeout))?;

    Ok(Response::new(status, headers, final_url, body.to_vec()))
}
