//! # Pixel Helpers
//!
//! Size computation and row flipping for client-side pixel uploads.

use crate::constants::{
    ALPHA, FLOAT, HALF_FLOAT, LUMINANCE, LUMINANCE_ALPHA, RGB, RGBA, UNSIGNED_BYTE,
    UNSIGNED_SHORT_4_4_4_4, UNSIGNED_SHORT_5_5_5_1, UNSIGNED_SHORT_5_6_5,
};

/// Bytes occupied by one pixel of `ty` / `format`, or 0 if unsupported.
///
/// Packed 16-bit types are two bytes regardless of format.
#[must_use]
pub const fn bytes_per_pixel(ty: u32, format: u32) -> u32 {
    let bytes_per_component = match ty {
        UNSIGNED_BYTE => 1,
        FLOAT => 4,
        HALF_FLOAT => 2,
        UNSIGNED_SHORT_5_6_5 | UNSIGNED_SHORT_4_4_4_4 | UNSIGNED_SHORT_5_5_5_1 => return 2,
        _ => 0,
    };

    match format {
        LUMINANCE | ALPHA => bytes_per_component,
        LUMINANCE_ALPHA => 2 * bytes_per_component,
        RGB => 3 * bytes_per_component,
        RGBA => 4 * bytes_per_component,
        _ => 0,
    }
}

/// `width * height * bytes_per_pixel`, or `None` on overflow.
#[must_use]
pub fn expected_len(width: u32, height: u32, bytes_per_pixel: u32) -> Option<usize> {
    let width = usize::try_from(width).ok()?;
    let height = usize::try_from(height).ok()?;
    let bpp = usize::try_from(bytes_per_pixel).ok()?;
    width.checked_mul(height)?.checked_mul(bpp)
}

/// Reverses the order of rows in place.
///
/// A trailing partial row (when `buf.len()` is not a multiple of
/// `bytes_per_row`) is left untouched.
pub fn flip_rows(buf: &mut [u8], bytes_per_row: usize) {
    if bytes_per_row == 0 {
        return;
    }
    let rows = buf.len() / bytes_per_row;
    for top in 0..rows / 2 {
        let bottom = rows - 1 - top;
        let (upper, lower) = buf.split_at_mut(bottom * bytes_per_row);
        upper[top * bytes_per_row..(top + 1) * bytes_per_row]
            .swap_with_slice(&mut lower[..bytes_per_row]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_per_pixel_table() {
        assert_eq!(bytes_per_pixel(UNSIGNED_BYTE, RGBA), 4);
        assert_eq!(bytes_per_pixel(UNSIGNED_BYTE, RGB), 3);
        assert_eq!(bytes_per_pixel(UNSIGNED_BYTE, LUMINANCE_ALPHA), 2);
        assert_eq!(bytes_per_pixel(UNSIGNED_BYTE, ALPHA), 1);
        assert_eq!(bytes_per_pixel(FLOAT, RGBA), 16);
        assert_eq!(bytes_per_pixel(HALF_FLOAT, RGB), 6);
        assert_eq!(bytes_per_pixel(UNSIGNED_SHORT_5_6_5, RGB), 2);
        assert_eq!(bytes_per_pixel(UNSIGNED_SHORT_4_4_4_4, 0xFFFF), 2);
    }

    #[test]
    fn test_bytes_per_pixel_unknown_is_zero() {
        assert_eq!(bytes_per_pixel(0x1234, RGBA), 0);
        assert_eq!(bytes_per_pixel(UNSIGNED_BYTE, 0x1234), 0);
    }

    #[test]
    fn test_expected_len() {
        assert_eq!(expected_len(4, 2, 4), Some(32));
        assert_eq!(expected_len(0, 100, 4), Some(0));
    }

    #[test]
    fn test_flip_rows_even() {
        let mut buf = vec![1, 1, 2, 2, 3, 3, 4, 4];
        flip_rows(&mut buf, 2);
        assert_eq!(buf, vec![4, 4, 3, 3, 2, 2, 1, 1]);
    }

    #[test]
    fn test_flip_rows_odd_keeps_middle() {
        let mut buf = vec![1, 2, 3, 4, 5, 6, 7, 8, 9];
        flip_rows(&mut buf, 3);
        assert_eq!(buf, vec![7, 8, 9, 4, 5, 6, 1, 2, 3]);
    }

    #[test]
    fn test_flip_rows_degenerate() {
        let mut single = vec![1, 2, 3];
        flip_rows(&mut single, 3);
        assert_eq!(single, vec![1, 2, 3]);

        let mut empty: Vec<u8> = Vec::new();
        flip_rows(&mut empty, 0);
        assert!(empty.is_empty());
    }
}
