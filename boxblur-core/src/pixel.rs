use serde::{Deserialize, Serialize};

/// One 24-bit truecolor pixel.
///
/// Channels are stored blue, green, red, which is the byte order of BMP pixel data.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pixel {
    pub blue: u8,
    pub green: u8,
    pub red: u8,
}

impl Pixel {
    /// Size of one pixel in the BMP pixel array.
    pub const BYTES: usize = 3;

    pub const BLACK: Pixel = Pixel::rgb(0, 0, 0);
    pub const WHITE: Pixel = Pixel::rgb(255, 255, 255);

    /// Create a pixel from red, green, blue components.
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { blue, green, red }
    }

    /// Decode from BMP byte order (blue, green, red).
    pub fn from_bgr_bytes(bytes: [u8; 3]) -> Self {
        Self {
            blue: bytes[0],
            green: bytes[1],
            red: bytes[2],
        }
    }

    /// Encode to BMP byte order (blue, green, red).
    pub fn to_bgr_bytes(self) -> [u8; 3] {
        [self.blue, self.green, self.red]
    }
}
