//! HTTP client for the Tessera renderer and its hosting page.
//!
//! This crate provides a typed client for the three kinds of remote calls a
//! rendering session needs:
//!
//! - **Actions**: execute `api`-type action handlers and return the response
//!   object as a state patch
//! - **Data**: fetch values for `api` data bindings
//! - **Workflows**: start flow executions on the workflow engine and poll
//!   their status
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use tessera_client::{Result, TesseraClient};
//!
//! # async fn example() -> Result<()> {
//! let engine = TesseraClient::builder()
//!     .base_url("http://localhost:8080")
//!     .build()?;
//!
//! let execution = engine
//!     .workflows()
//!     .execute("tessera", "pdf-processor", Default::default())
//!     .await?;
//! let done = engine
//!     .workflows()
//!     .wait(&execution.id, Duration::from_secs(5), 120)
//!     .await?;
//! println!("{} finished: {}", done.id, done.state);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod types;

pub use client::{ClientBuilder, TesseraClient};
pub use error::{Error, Result};
pub use types::*;
