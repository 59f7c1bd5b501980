//! Frame rasters and the video render pipeline.

/// Canvas-sized premultiplied raster.
pub mod layer;
/// Job to MP4: text layers, effect timelines, frame loop and encode.
pub mod pipeline;
