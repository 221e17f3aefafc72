//! Index-level operations: index, merge, analyze and copy.

pub mod analyze;
pub mod copy;
pub mod index;
pub mod merge;

pub use analyze::analyze_source;
pub use copy::{copy_source, CopyReport};
pub use index::{collect_docs, index_source, IndexReport, IndexTarget};
pub use merge::merge_sources;

use atlas_core::errors::StoreError;
use atlas_core::traits::Source;

/// Shard level a Source's blobs are written at.
pub fn shardlevel_of(source: &dyn Source) -> Result<u32, StoreError> {
    Ok(source.info()?.geocoder_shardlevel.unwrap_or(0))
}

/// Run `body` with `to` in writing state. Writing is stopped whether or
/// not `body` succeeds; the body's error wins over a failed stop.
pub fn while_writing<T>(
    to: &dyn Source,
    body: impl FnOnce() -> Result<T, StoreError>,
) -> Result<T, StoreError> {
    let Some(writer) = to.writer() else {
        return body();
    };
    writer.start_writing()?;
    let outcome = body();
    let stopped = writer.stop_writing();
    let value = outcome?;
    stopped?;
    Ok(value)
}
