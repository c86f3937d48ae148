//! Uncompressed 24-bit BMP loading and saving.
//!
//! Layout on disk (all little-endian):
//! - Bytes 0-13: file header (`BM` magic, file size, reserved, pixel data offset)
//! - Bytes 14-53: `BITMAPINFOHEADER`
//! - Bytes 54..offset: anything else the writer put there, kept verbatim
//! - Bytes offset..: `width * height` BGR triples, bottom row first
//!
//! The loader widens the image to a multiple of 4 pixels and reads the pixel array as
//! one unpadded block of `width * height` triples. For widths that are already a
//! multiple of 4 this matches the BMP row alignment exactly.

use crate::{ImageError, Pixel, PixelGrid};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// `BM` read as a little-endian u16.
pub const BMP_MAGIC: u16 = 0x4D42;
pub const FILE_HEADER_SIZE: usize = 14;
pub const INFO_HEADER_SIZE: usize = 40;
/// Combined size of the two fixed headers.
pub const HEADERS_SIZE: usize = FILE_HEADER_SIZE + INFO_HEADER_SIZE;

/// Largest accepted image, in pixels (16384 x 16384).
pub const MAX_PIXELS: usize = 1 << 28;

const SUPPORTED_BIT_COUNT: u16 = 24;
const BI_RGB: u32 = 0;

/// `BITMAPFILEHEADER`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileHeader {
    pub magic: u16,
    pub file_size: u32,
    pub reserved1: u16,
    pub reserved2: u16,
    pub pixel_offset: u32,
}

impl FileHeader {
    pub fn to_bytes(&self) -> [u8; FILE_HEADER_SIZE] {
        let mut bytes = [0u8; FILE_HEADER_SIZE];
        bytes[0..2].copy_from_slice(&self.magic.to_le_bytes());
        bytes[2..6].copy_from_slice(&self.file_size.to_le_bytes());
        bytes[6..8].copy_from_slice(&self.reserved1.to_le_bytes());
        bytes[8..10].copy_from_slice(&self.reserved2.to_le_bytes());
        bytes[10..14].copy_from_slice(&self.pixel_offset.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8; FILE_HEADER_SIZE]) -> Self {
        Self {
            magic: le_u16(bytes, 0),
            file_size: le_u32(bytes, 2),
            reserved1: le_u16(bytes, 6),
            reserved2: le_u16(bytes, 8),
            pixel_offset: le_u32(bytes, 10),
        }
    }
}

/// `BITMAPINFOHEADER`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InfoHeader {
    pub header_size: u32,
    pub width: i32,
    pub height: i32,
    pub planes: u16,
    pub bit_count: u16,
    pub compression: u32,
    pub image_size: u32,
    pub x_pixels_per_meter: i32,
    pub y_pixels_per_meter: i32,
    pub colors_used: u32,
    pub colors_important: u32,
}

impl InfoHeader {
    pub fn to_bytes(&self) -> [u8; INFO_HEADER_SIZE] {
        let mut bytes = [0u8; INFO_HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.header_size.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.width.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.height.to_le_bytes());
        bytes[12..14].copy_from_slice(&self.planes.to_le_bytes());
        bytes[14..16].copy_from_slice(&self.bit_count.to_le_bytes());
        bytes[16..20].copy_from_slice(&self.compression.to_le_bytes());
        bytes[20..24].copy_from_slice(&self.image_size.to_le_bytes());
        bytes[24..28].copy_from_slice(&self.x_pixels_per_meter.to_le_bytes());
        bytes[28..32].copy_from_slice(&self.y_pixels_per_meter.to_le_bytes());
        bytes[32..36].copy_from_slice(&self.colors_used.to_le_bytes());
        bytes[36..40].copy_from_slice(&self.colors_important.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8; INFO_HEADER_SIZE]) -> Self {
        Self {
            header_size: le_u32(bytes, 0),
            width: le_u32(bytes, 4) as i32,
            height: le_u32(bytes, 8) as i32,
            planes: le_u16(bytes, 12),
            bit_count: le_u16(bytes, 14),
            compression: le_u32(bytes, 16),
            image_size: le_u32(bytes, 20),
            x_pixels_per_meter: le_u32(bytes, 24) as i32,
            y_pixels_per_meter: le_u32(bytes, 28) as i32,
            colors_used: le_u32(bytes, 32),
            colors_important: le_u32(bytes, 36),
        }
    }
}

/// Everything in a BMP file except the pixel array.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BmpHeader {
    pub file: FileHeader,
    pub info: InfoHeader,
    /// Bytes between the info header and the pixel array.
    pub extra: Vec<u8>,
}

impl BmpHeader {
    /// Headers for a freshly encoded 24-bit image of the given size.
    ///
    /// Fails with [`ImageError::Format`] if the image exceeds [`MAX_PIXELS`].
    pub fn for_dimensions(width: usize, height: usize) -> Result<Self, ImageError> {
        let too_large = || ImageError::Format(format!("{width}x{height} image is too large"));
        let image_size = u32::try_from(pixel_array_len(width, height)?).map_err(|_| too_large())?;
        let file_size = image_size
            .checked_add(HEADERS_SIZE as u32)
            .ok_or_else(too_large)?;
        let width = i32::try_from(width).map_err(|_| too_large())?;
        let height = i32::try_from(height).map_err(|_| too_large())?;
        Ok(Self {
            file: FileHeader {
                magic: BMP_MAGIC,
                file_size,
                reserved1: 0,
                reserved2: 0,
                pixel_offset: HEADERS_SIZE as u32,
            },
            info: InfoHeader {
                header_size: INFO_HEADER_SIZE as u32,
                width,
                height,
                planes: 1,
                bit_count: SUPPORTED_BIT_COUNT,
                compression: BI_RGB,
                image_size,
                x_pixels_per_meter: 2835,
                y_pixels_per_meter: 2835,
                colors_used: 0,
                colors_important: 0,
            },
            extra: Vec::new(),
        })
    }

    pub fn width(&self) -> usize {
        self.info.width as usize
    }

    pub fn height(&self) -> usize {
        self.info.height as usize
    }
}

/// A decoded image: headers plus pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BmpImage {
    pub header: BmpHeader,
    pub pixels: PixelGrid,
}

impl BmpImage {
    /// Wrap a grid with generated 24-bit headers.
    pub fn from_grid(pixels: PixelGrid) -> Result<Self, ImageError> {
        Ok(Self {
            header: BmpHeader::for_dimensions(pixels.width(), pixels.height())?,
            pixels,
        })
    }

    /// Decode a BMP stream.
    pub fn decode<R: Read>(mut reader: R) -> Result<Self, ImageError> {
        let mut file_bytes = [0u8; FILE_HEADER_SIZE];
        read_header_bytes(&mut reader, &mut file_bytes, "file header")?;
        let file = FileHeader::from_bytes(&file_bytes);
        if file.magic != BMP_MAGIC {
            return Err(ImageError::Format(format!(
                "bad magic {:#06x}, expected {:#06x}",
                file.magic, BMP_MAGIC
            )));
        }

        let mut info_bytes = [0u8; INFO_HEADER_SIZE];
        read_header_bytes(&mut reader, &mut info_bytes, "info header")?;
        let mut info = InfoHeader::from_bytes(&info_bytes);
        validate_info(&info)?;

        let padded = padded_width(info.width as usize);
        if padded != info.width as usize {
            info.width = i32::try_from(padded).map_err(|_| {
                ImageError::Format(format!("width {} too large to pad", info.width))
            })?;
            log::info!("Padding image width to {}", padded);
        }

        let (width, height) = (info.width as usize, info.height as usize);
        let expected = pixel_array_len(width, height)?;

        let extra_len = (file.pixel_offset as usize).saturating_sub(HEADERS_SIZE);
        let mut extra = Vec::new();
        (&mut reader)
            .take(extra_len as u64)
            .read_to_end(&mut extra)?;
        if extra.len() < extra_len {
            return Err(ImageError::Format("truncated header gap".to_string()));
        }

        let mut data = Vec::new();
        reader.take(expected as u64).read_to_end(&mut data)?;
        if data.len() < expected {
            log::warn!(
                "Pixel data truncated: expected {} bytes, found {}; filling the rest with black",
                expected,
                data.len()
            );
            data.resize(expected, 0);
        }

        let pixels = data
            .chunks_exact(Pixel::BYTES)
            .map(|c| Pixel::from_bgr_bytes([c[0], c[1], c[2]]))
            .collect();

        Ok(Self {
            header: BmpHeader { file, info, extra },
            pixels: PixelGrid::from_pixels(width, height, pixels),
        })
    }

    /// Encode headers and pixels into a BMP stream.
    pub fn encode<W: Write>(&self, writer: W) -> Result<(), ImageError> {
        encode_parts(&self.header, &self.pixels, writer)
    }
}

/// Load a BMP file.
pub fn read_bmp(path: impl AsRef<Path>) -> Result<BmpImage, ImageError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ImageError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    BmpImage::decode(BufReader::new(file))
}

/// Write `pixels` under `header` to a BMP file.
///
/// The grid must have the dimensions recorded in the header.
pub fn write_bmp(
    path: impl AsRef<Path>,
    header: &BmpHeader,
    pixels: &PixelGrid,
) -> Result<(), ImageError> {
    let path = path.as_ref();
    if header.file.magic != BMP_MAGIC {
        return Err(ImageError::Format(format!(
            "refusing to write header with magic {:#06x}",
            header.file.magic
        )));
    }
    let file = File::create(path).map_err(|source| ImageError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    encode_parts(header, pixels, BufWriter::new(file))
}

/// Round a width in pixels up to the next multiple of 4.
pub fn padded_width(width: usize) -> usize {
    width.div_ceil(4) * 4
}

/// Byte length of a `width * height` pixel array, bounded by [`MAX_PIXELS`].
fn pixel_array_len(width: usize, height: usize) -> Result<usize, ImageError> {
    width
        .checked_mul(height)
        .filter(|&pixels| pixels <= MAX_PIXELS)
        .map(|pixels| pixels * Pixel::BYTES)
        .ok_or_else(|| {
            ImageError::Format(format!(
                "{width}x{height} exceeds the {MAX_PIXELS} pixel limit"
            ))
        })
}

fn encode_parts<W: Write>(
    header: &BmpHeader,
    pixels: &PixelGrid,
    mut writer: W,
) -> Result<(), ImageError> {
    if pixels.width() != header.width() || pixels.height() != header.height() {
        return Err(ImageError::Format(format!(
            "pixel grid is {}x{} but header describes {}x{}",
            pixels.width(),
            pixels.height(),
            header.width(),
            header.height()
        )));
    }

    writer.write_all(&header.file.to_bytes())?;
    writer.write_all(&header.info.to_bytes())?;
    writer.write_all(&header.extra)?;

    let mut data = Vec::with_capacity(pixels.len() * Pixel::BYTES);
    for pixel in pixels.pixels() {
        data.extend_from_slice(&pixel.to_bgr_bytes());
    }
    writer.write_all(&data)?;
    writer.flush()?;
    Ok(())
}

fn validate_info(info: &InfoHeader) -> Result<(), ImageError> {
    if info.bit_count != SUPPORTED_BIT_COUNT {
        return Err(ImageError::UnsupportedFormat(format!(
            "{} bits per pixel, only {} is supported",
            info.bit_count, SUPPORTED_BIT_COUNT
        )));
    }
    if info.compression != BI_RGB {
        return Err(ImageError::UnsupportedFormat(format!(
            "compression method {}, only uncompressed images are supported",
            info.compression
        )));
    }
    if info.width <= 0 {
        return Err(ImageError::Format(format!("width {}", info.width)));
    }
    if info.height < 0 {
        return Err(ImageError::UnsupportedFormat(
            "top-down bitmaps (negative height)".to_string(),
        ));
    }
    if info.height == 0 {
        return Err(ImageError::Format("height 0".to_string()));
    }
    Ok(())
}

fn read_header_bytes<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
    what: &str,
) -> Result<(), ImageError> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => ImageError::Format(format!("truncated {what}")),
        _ => ImageError::Io(e),
    })
}

fn le_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn le_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}
