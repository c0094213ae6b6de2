pub mod springsim_vis2d;
pub mod springsim_vis3d;
