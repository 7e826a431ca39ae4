pub mod allocator;
pub mod image;
pub mod inspect;
pub mod inputs;

pub use image::{BuildReport, FileReport, FloppyImage, ImageBuilder, Payload};
pub use inspect::{inspect_image, Inspection};
pub use models::FloppyError;
