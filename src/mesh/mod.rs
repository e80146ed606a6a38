pub mod flags;
pub mod generator;
pub mod radial;
pub mod sector;
pub mod topology;
