// THEORY:
// Pass 2 of the vision pipeline counts vertical edges along a single scanline, the
// middle row of the frame. Each column is compared against the column
// `edge_probe_offset` pixels to its right, both read through the smoothed sampler,
// and a brightness jump past `edge_sensitivity` is an edge.
//
// Two filters keep the count meaningful. Edges within `edge_border_margin` of either
// side are ignored because the frame border itself is not an object feature. And
// after an edge is counted the scan skips `edge_cooldown_columns` columns, so a wide
// gradient or a patch of printed text on an object counts once rather than many
// times.

use crate::core_modules::frame::Frame;
use crate::core_modules::smoothed_sampler::smoothed_sampler::SmoothedSampler;
use crate::pipeline::PipelineConfig;

/// Columns kept clear of the right edge so the probe stays inside the frame.
const RIGHT_SCAN_PADDING: u32 = 6;
const FIRST_SCAN_COLUMN: u32 = 2;

pub fn scan(
    frame: &Frame,
    width: u32,
    height: u32,
    sampler: &SmoothedSampler,
    config: &PipelineConfig,
) -> u32 {
    let row = height / 2;
    let margin = config.edge_border_margin;
    let last_probe = width.saturating_sub(1);

    let mut edges = 0u32;
    let mut cooldown = 0u32;

    for x in FIRST_SCAN_COLUMN..width.saturating_sub(RIGHT_SCAN_PADDING) {
        if cooldown > 0 {
            cooldown -= 1;
            continue;
        }

        let here = sampler.luminance(frame, x, row);
        let ahead = sampler.luminance(frame, (x + config.edge_probe_offset).min(last_probe), row);

        if here.abs_diff(ahead) > config.edge_sensitivity && x > margin && x + margin < width {
            edges += 1;
            cooldown = config.edge_cooldown_columns;
        }
    }

    edges
}
