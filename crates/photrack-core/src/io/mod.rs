pub mod coords;
pub mod fits;
pub mod image_io;
pub mod sequence;

pub use coords::{load_coordinates, parse_coordinates};
pub use fits::{FitsHeader, FitsReader};
pub use sequence::{list_frames, load_frame, FrameSequence};
