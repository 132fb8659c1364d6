//! The guard wrapper.
//!
//! Wrapping attaches evaluation metadata to a function without changing what
//! the function does. Production call sites invoke the wrapped function as
//! before; only a `Runner` reads the attached config and exercises the
//! evaluation pipeline.
//!
//! # Example
//!
//! ```ignore
//! use goldguard_core::{GuardConfig, guard};
//!
//! let greet = guard(GuardConfig::new("greet"), |name: String| async move {
//!     Ok::<_, std::io::Error>(format!("hello {name}"))
//! });
//!
//! // Transparent in production:
//! let greeting = greet.call("world".to_string()).await?;
//! ```

use std::future::Future;

use crate::config::GuardConfig;

/// A function with a [`GuardConfig`] riding along as a side channel.
pub struct Guarded<F> {
    config: GuardConfig,
    target: F,
}

/// Attach evaluation metadata to `target`.
pub fn guard<F>(config: GuardConfig, target: F) -> Guarded<F> {
    Guarded { config, target }
}

impl<F> Guarded<F> {
    /// The attached metadata.
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// The wrapped function.
    pub fn target(&self) -> &F {
        &self.target
    }

    /// Invoke the wrapped function. No scoring, no storage, no provider
    /// calls; the output and error pass through untouched.
    pub async fn call<A, Fut, T, E>(&self, args: A) -> Result<T, E>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        (self.target)(args).await
    }
}
