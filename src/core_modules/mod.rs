pub mod classifier;
pub mod edge_scan;
pub mod frame;
pub mod motion_scan;
pub mod pixel;
pub mod smoothed_sampler;
pub mod utils;
