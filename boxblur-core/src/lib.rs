pub mod bmp;
pub mod config;
pub mod error;
pub mod grid;
pub mod kernel;
pub mod partition;
pub mod pixel;

pub use bmp::{read_bmp, write_bmp, BmpHeader, BmpImage, FileHeader, InfoHeader};
pub use config::BlurConfig;
pub use error::{ConfigError, ImageError};
pub use grid::{GridView, PixelGrid};
pub use kernel::{blur_once, blur_pixel, blur_rounds, blur_rows};
pub use partition::{partition_rows, RowSpan};
pub use pixel::Pixel;
