//! Rescale stage: parallel bicubic upscale to the fixed working
//! resolution.
//!
//! Active only when both source dimensions strictly exceed the
//! configured thresholds (see
//! [`PipelineConfig::rescale_active`](crate::PipelineConfig::rescale_active)).
//! Each worker covers a disjoint range of destination rows and invokes
//! the bicubic sampler per destination pixel; the source image is only
//! read, so no synchronization is needed within the phase.

use image::RgbImage;

use crate::bicubic;
use crate::partition;
use crate::shared::SharedImage;

/// Fill worker `id`'s destination-row partition of `dest` by bicubic
/// sampling from `source`.
///
/// Each destination pixel `(x, y)` is normalized by
/// `(width - 1, height - 1)` so the destination corners map exactly
/// onto the source corners.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn rescale_rows(source: &RgbImage, dest: &SharedImage, id: usize, workers: usize) {
    let width = dest.width();
    let height = dest.height();
    let last_x = (width.saturating_sub(1)) as f32;
    let last_y = (height.saturating_sub(1)) as f32;

    for y in partition::span(id, workers, height as usize) {
        let v = y as f32 / last_y;
        for x in 0..width {
            let u = x as f32 / last_x;
            dest.set_pixel(x, y as u32, bicubic::sample(source, u, v));
        }
    }
}
