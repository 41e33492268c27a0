//! Owned 16-bit depth image in row-major layout (stride == width).
//!
//! Used for the annotated depth copy republished for visualization.
use super::{DepthImage, ImageView};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DepthImageBuf {
    /// Image width in pixels
    pub w: usize,
    /// Image height in pixels
    pub h: usize,
    /// Backing storage in row-major order
    pub data: Vec<u16>,
}

impl DepthImageBuf {
    /// Construct a zero-initialized buffer of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![0; w * h],
        }
    }

    /// Copy a (possibly strided) view into a packed buffer.
    pub fn from_view(view: &DepthImage<'_>) -> Self {
        let mut data = Vec::with_capacity(view.w * view.h);
        for row in view.rows() {
            data.extend_from_slice(row);
        }
        Self {
            w: view.w,
            h: view.h,
            data,
        }
    }

    /// Fill the rectangle `[x0, x0+w) × [y0, y0+h)`, clipped to the image.
    pub fn fill_rect(&mut self, x0: usize, y0: usize, w: usize, h: usize, v: u16) {
        let x1 = (x0 + w).min(self.w);
        let y1 = (y0 + h).min(self.h);
        for y in y0.min(y1)..y1 {
            let start = y * self.w;
            self.data[start + x0.min(x1)..start + x1].fill(v);
        }
    }

    pub fn as_view(&self) -> DepthImage<'_> {
        DepthImage::new(self.w, self.h, &self.data)
    }
}

impl crate::image::traits::ImageView for DepthImageBuf {
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
        self.w
    }
    #[inline]
    fn row(&self, y: usize) -> &[u16] {
        let start = y * self.w;
        &self.data[start..start + self.w]
    }
    #[inline]
    fn as_slice(&self) -> Option<&[u16]> {
        Some(&self.data)
    }
}
