//! Borrowed 16-bit depth image view.
//!
//! Samples are distances in millimetres, `0` meaning no return. The view is
//! borrowed for the duration of a single detection call.
use crate::error::{CliffError, Result};
use crate::types::FrameHeader;

#[derive(Clone, Copy, Debug)]
pub struct DepthImage<'a> {
    pub w: usize,
    pub h: usize,
    pub stride: usize, // u16 elements between rows
    pub data: &'a [u16],
}

impl<'a> DepthImage<'a> {
    /// Tightly packed view (`stride == w`).
    pub fn new(w: usize, h: usize, data: &'a [u16]) -> Self {
        Self {
            w,
            h,
            stride: w,
            data,
        }
    }

    /// Checks that the buffer covers `w × h` samples at the given stride.
    pub fn validate(&self) -> Result<()> {
        if self.w == 0 || self.h == 0 {
            return Err(CliffError::frame(format!(
                "empty depth image {}x{}",
                self.w, self.h
            )));
        }
        if self.stride < self.w {
            return Err(CliffError::frame(format!(
                "stride {} smaller than width {}",
                self.stride, self.w
            )));
        }
        let needed = (self.h - 1) * self.stride + self.w;
        if self.data.len() < needed {
            return Err(CliffError::frame(format!(
                "depth buffer holds {} samples, {}x{} with stride {} needs {}",
                self.data.len(),
                self.w,
                self.h,
                self.stride,
                needed
            )));
        }
        Ok(())
    }
}

impl<'a> crate::image::traits::ImageView for DepthImage<'a> {
    type Pixel = u16;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn stride(&self) -> usize {
        self.stride
    }
    #[inline]
    fn row(&self, y: usize) -> &[u16] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }
    #[inline]
    fn as_slice(&self) -> Option<&[u16]> {
        (self.stride == self.w).then_some(&self.data[..self.w * self.h])
    }
}

/// Depth image paired with the header identifying where and when it was taken.
#[derive(Clone, Debug)]
pub struct DepthFrame<'a> {
    pub header: FrameHeader,
    pub image: DepthImage<'a>,
}
