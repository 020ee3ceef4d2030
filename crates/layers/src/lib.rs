pub mod heat;
pub mod markers;
pub mod raster;
pub mod symbology;
pub mod zones;
