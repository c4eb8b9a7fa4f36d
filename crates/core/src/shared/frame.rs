use ndarray::ArrayView3;

/// Bytes per pixel; every adapter in this pipeline converses in RGB24.
pub const FRAME_CHANNELS: usize = 3;

/// A single captured frame: contiguous RGB bytes in row-major order,
/// plus a monotonically increasing capture index.
///
/// Pixel format conversion happens at I/O boundaries only; within the
/// pipeline a frame is always RGB24 at native capture resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    index: u64,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, index: u64) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * FRAME_CHANNELS,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
            index,
        }
    }

    /// A black frame of the given dimensions.
    pub fn blank(width: u32, height: u32, index: u64) -> Self {
        Self::new(
            vec![0; (width as usize) * (height as usize) * FRAME_CHANNELS],
            width,
            height,
            index,
        )
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    /// RGB triple at (x, y). Panics if out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let at = self.offset(x, y);
        [self.data[at], self.data[at + 1], self.data[at + 2]]
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        let at = self.offset(x, y);
        self.data[at..at + 3].copy_from_slice(&rgb);
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        let shape = (
            self.height as usize,
            self.width as usize,
            FRAME_CHANNELS,
        );
        ArrayView3::from_shape(shape, &self.data)
            .expect("Frame data length must match dimensions")
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        ((y as usize) * (self.width as usize) + (x as usize)) * FRAME_CHANNELS
    }
}
