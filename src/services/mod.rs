pub mod packager;

pub use packager::{CapturePackage, Packager};
