//! Copy a Source's metadata, geocoder data and features to another.

use atlas_core::errors::StoreError;
use atlas_core::traits::{Source, SourceWriter};
use serde::Serialize;
use tracing::info;

use super::while_writing;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CopyReport {
    pub blobs: usize,
    pub features: usize,
}

pub fn copy_source(from: &dyn Source, to: &dyn Source) -> Result<CopyReport, StoreError> {
    let writer = to.writer().ok_or(StoreError::Unsupported {
        capability: "writer",
    })?;
    let report = while_writing(to, || copy_contents(from, to, writer))?;
    info!(blobs = report.blobs, features = report.features, "copied source");
    Ok(report)
}

fn copy_contents(
    from: &dyn Source,
    to: &dyn Source,
    writer: &dyn SourceWriter,
) -> Result<CopyReport, StoreError> {
    writer.put_info(&from.info()?)?;

    let mut report = CopyReport::default();
    if let (Some(src), Some(dst)) = (from.geocoder_data(), to.geocoder_data()) {
        for (kind, shard) in src.geocoder_data_keys()? {
            if let Some(bytes) = src.get_geocoder_data(&kind, shard)? {
                dst.put_geocoder_data(&kind, shard, bytes)?;
                report.blobs += 1;
            }
        }
    }
    if let (Some(src), Some(dst)) = (from.features(), to.features()) {
        for id in src.feature_ids()? {
            if let Some(doc) = src.get_feature(id)? {
                dst.put_feature(&doc)?;
                report.features += 1;
            }
        }
    }

    Ok(report)
}
