//! Parser for the IDX binary format used by MNIST and its derivatives
//! (Fashion-MNIST, EMNIST, …).
//!
//! # IDX3 image file layout
//! ```text
//! bytes  0-1:   0x00 0x00   (reserved, must be zero)
//! byte   2:     0x08        (dtype = uint8)
//! byte   3:     0x03        (number of dimensions = 3)
//! bytes  4-7:   N           (number of images, big-endian u32)
//! bytes  8-11:  rows        (image height in pixels, big-endian u32)
//! bytes 12-15:  cols        (image width in pixels, big-endian u32)
//! bytes 16..:   N * rows * cols bytes, row-major, uint8
//! ```
//!
//! # IDX1 label file layout
//! ```text
//! bytes  0-1:   0x00 0x00   (reserved, must be zero)
//! byte   2:     0x08        (dtype = uint8)
//! byte   3:     0x01        (number of dimensions = 1)
//! bytes  4-7:   N           (number of labels, big-endian u32)
//! bytes  8..:   N bytes
//! ```

use crate::data::image::{normalize_pixel, Image};
use crate::error::{GanError, Result};
use crate::math::ImageShape;

fn be_u32(bytes: &[u8], offset: usize) -> usize {
    u32::from_be_bytes([
        bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3],
    ]) as usize
}

fn check_header(bytes: &[u8], what: &str, dims: u8, header_len: usize) -> Result<()> {
    if bytes.len() < header_len {
        return Err(GanError::Dataset(format!(
            "IDX {} file too short: expected at least {} header bytes, got {}.",
            what, header_len, bytes.len()
        )));
    }
    if bytes[0] != 0x00 || bytes[1] != 0x00 {
        return Err(GanError::Dataset(format!(
            "IDX {} file: bytes 0-1 must be 0x00 0x00 (reserved), got 0x{:02X} 0x{:02X}.",
            what, bytes[0], bytes[1]
        )));
    }
    if bytes[2] != 0x08 {
        return Err(GanError::Dataset(format!(
            "IDX {} file: byte 2 (dtype) must be 0x08 (uint8), got 0x{:02X}.",
            what, bytes[2]
        )));
    }
    if bytes[3] != dims {
        return Err(GanError::Dataset(format!(
            "IDX {} file: byte 3 (dimensions) must be {}, got {}.",
            what, dims, bytes[3]
        )));
    }
    Ok(())
}

/// Parses an IDX3 image file into single-channel images scaled to `[-1, 1]`.
pub fn parse_images(bytes: &[u8]) -> Result<Vec<Image>> {
    check_header(bytes, "image", 0x03, 16)?;

    let n_items = be_u32(bytes, 4);
    let rows = be_u32(bytes, 8);
    let cols = be_u32(bytes, 12);

    let n_pixels = rows.checked_mul(cols).ok_or_else(|| {
        GanError::Dataset(format!("IDX image file: rows * cols overflows (rows={}, cols={}).", rows, cols))
    })?;
    if n_pixels == 0 {
        return Err(GanError::Dataset(format!("IDX image file: empty {}×{} images.", rows, cols)));
    }
    let data_len = n_items.checked_mul(n_pixels).ok_or_else(|| {
        GanError::Dataset(format!(
            "IDX image file: n_items * n_pixels overflows (n_items={}, n_pixels={}).",
            n_items, n_pixels
        ))
    })?;

    if bytes.len() - 16 < data_len {
        return Err(GanError::Dataset(format!(
            "IDX image file too short: header declares {} items of {}×{} pixels \
             ({} data bytes needed after header), but file is only {} bytes total.",
            n_items, rows, cols, data_len, bytes.len()
        )));
    }

    let shape = ImageShape::new(1, rows, cols);
    bytes[16..16 + data_len]
        .chunks_exact(n_pixels)
        .map(|chunk| Image::new(shape, chunk.iter().map(|&px| normalize_pixel(px)).collect()))
        .collect()
}

/// Parses an IDX1 label file into raw class bytes.
pub fn parse_labels(bytes: &[u8]) -> Result<Vec<u8>> {
    check_header(bytes, "label", 0x01, 8)?;
    let n_items = be_u32(bytes, 4);
    if bytes.len() - 8 < n_items {
        return Err(GanError::Dataset(format!(
            "IDX label file too short: header declares {} labels but file is only {} bytes.",
            n_items, bytes.len()
        )));
    }
    Ok(bytes[8..8 + n_items].to_vec())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builds an IDX3 file holding `images` of `rows × cols`.
    pub(crate) fn idx3(rows: u32, cols: u32, images: &[Vec<u8>]) -> Vec<u8> {
        let mut out = vec![0x00, 0x00, 0x08, 0x03];
        out.extend_from_slice(&(images.len() as u32).to_be_bytes());
        out.extend_from_slice(&rows.to_be_bytes());
        out.extend_from_slice(&cols.to_be_bytes());
        for img in images {
            out.extend_from_slice(img);
        }
        out
    }

    pub(crate) fn idx1(labels: &[u8]) -> Vec<u8> {
        let mut out = vec![0x00, 0x00, 0x08, 0x01];
        out.extend_from_slice(&(labels.len() as u32).to_be_bytes());
        out.extend_from_slice(labels);
        out
    }

    #[test]
    fn parses_and_rescales_images() {
        let bytes = idx3(2, 2, &[vec![0, 255, 0, 255], vec![255, 255, 0, 0]]);
        let images = parse_images(&bytes).unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].shape(), ImageShape::new(1, 2, 2));
        assert_eq!(images[0].pixels(), &[-1.0, 1.0, -1.0, 1.0]);
    }

    #[test]
    fn rejects_label_file_as_images() {
        let err = parse_images(&idx1(&[1, 2, 3])).unwrap_err();
        assert!(matches!(err, GanError::Dataset(_)));
    }

    #[test]
    fn rejects_truncated_pixels() {
        let mut bytes = idx3(2, 2, &[vec![0, 0, 0, 0]]);
        bytes.pop();
        assert!(parse_images(&bytes).is_err());
    }

    #[test]
    fn parses_labels() {
        assert_eq!(parse_labels(&idx1(&[7, 3])).unwrap(), vec![7, 3]);
        let mut short = idx1(&[7, 3]);
        short.pop();
        assert!(parse_labels(&short).is_err());
    }
}
