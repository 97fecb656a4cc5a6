//! Accession resolution: from run accessions to remote file locations.
//!
//! The [`LinkResolver`] trait is the contract the rest of the crate relies on;
//! [`EnaResolver`] implements it over HTTP. [`resolve_all`] flattens the
//! locations of several accessions, in order, applying a [`ResolvePolicy`]
//! to accessions that fail.
//!
//! ```rust,no_run
//! use srafetch::resolver::{resolve_all, EnaResolver, ResolvePolicy};
//!
//! # async fn example() -> Result<(), srafetch::Error> {
//! let resolver = EnaResolver::new()?;
//! let accessions = vec!["SRR000001".to_string()];
//! let locations = resolve_all(&resolver, &accessions, ResolvePolicy::Abort).await?;
//! # Ok(())
//! # }
//! ```

pub mod ena;

pub use ena::{EnaResolver, DEFAULT_ENDPOINT};

use crate::download::RemoteLocation;
use crate::error::Result;

use async_trait::async_trait;
use tracing::{info, warn};

/// Turns an accession into the ordered list of its remote files.
#[async_trait]
pub trait LinkResolver: Send + Sync {
    async fn resolve(&self, accession: &str) -> Result<Vec<RemoteLocation>>;
}

/// What to do with an accession that cannot be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolvePolicy {
    /// Stop and return the first resolution error.
    #[default]
    Abort,
    /// Log the failure and continue without that accession's files.
    Skip,
}

/// Resolve every accession in order and concatenate their locations.
pub async fn resolve_all<R>(
    resolver: &R,
    accessions: &[String],
    policy: ResolvePolicy,
) -> Result<Vec<RemoteLocation>>
where
    R: LinkResolver + ?Sized,
{
    let mut locations = Vec::new();
    for accession in accessions {
        match resolver.resolve(accession).await {
            Ok(found) => {
                info!(accession = %accession, files = found.len(), "resolved accession");
                locations.extend(found);
            }
            Err(e) => match policy {
                ResolvePolicy::Abort => return Err(e),
                ResolvePolicy::Skip => {
                    warn!(accession = %accession, "skipping accession: {}", e);
                }
            },
        }
    }
    Ok(locations)
}
