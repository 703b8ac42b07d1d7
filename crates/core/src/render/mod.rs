//! Conversion of generated data into file formats that other tools can
//! display. Each format is gated behind a feature of the same name. None of
//! this is needed to generate a world, it's just for inspecting the output.

#[cfg(feature = "stl")]
pub mod stl;
#[cfg(feature = "svg")]
pub mod svg;
