//! The set of decoded cube face images fed to the stitcher.

use image::{Rgb, RgbImage};

use crate::geometry::{CubeFaceId, FaceCoord};

/// Six optional cube face images indexed by [`CubeFaceId`].
///
/// Any face may be absent; directions owned by an absent face are left at
/// the background color when stitching. Faces do not need to be square or
/// share a size.
#[derive(Debug, Clone, Default)]
pub struct CubeFaceSet {
    faces: [Option<RgbImage>; 6],
}

impl CubeFaceSet {
    /// Creates an empty face set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_face(mut self, id: CubeFaceId, image: RgbImage) -> Self {
        self.insert(id, image);
        self
    }

    /// Stores `image` for `id`, returning the image it replaced.
    pub fn insert(&mut self, id: CubeFaceId, image: RgbImage) -> Option<RgbImage> {
        self.faces[id.index()].replace(image)
    }

    /// Removes and returns the image for `id`.
    pub fn remove(&mut self, id: CubeFaceId) -> Option<RgbImage> {
        self.faces[id.index()].take()
    }

    /// Returns the image for `id`, if present.
    pub fn face(&self, id: CubeFaceId) -> Option<&RgbImage> {
        self.faces[id.index()].as_ref()
    }

    /// Returns true if an image is stored for `id`.
    pub fn contains(&self, id: CubeFaceId) -> bool {
        self.faces[id.index()].is_some()
    }

    /// Faces that have an image, in key order.
    pub fn present(&self) -> Vec<CubeFaceId> {
        CubeFaceId::all()
            .into_iter()
            .filter(|&id| self.contains(id))
            .collect()
    }

    /// Faces without an image, in key order.
    pub fn absent(&self) -> Vec<CubeFaceId> {
        CubeFaceId::all()
            .into_iter()
            .filter(|&id| !self.contains(id))
            .collect()
    }

    /// Number of faces present.
    pub fn len(&self) -> usize {
        self.faces.iter().filter(|f| f.is_some()).count()
    }

    /// Returns true if no face is present.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Nearest-neighbour sample at `coord`.
    ///
    /// Returns `None` when the face is absent or has zero area.
    #[inline]
    pub fn sample(&self, coord: FaceCoord) -> Option<Rgb<u8>> {
        let image = self.face(coord.face)?;
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return None;
        }
        let (px, py) = coord.to_pixel(width, height);
        Some(*image.get_pixel(px, py))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(size: u32, color: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(size, size, Rgb(color))
    }

    #[test]
    fn test_empty_set() {
        let set = CubeFaceSet::new();
        assert!(set.is_empty());
        assert_eq!(set.absent().len(), 6);
        assert!(set.sample(FaceCoord::new(CubeFaceId::Front, 0.5, 0.5)).is_none());
    }

    #[test]
    fn test_insert_and_replace() {
        let mut set = CubeFaceSet::new().with_face(CubeFaceId::Top, solid(4, [255, 255, 255]));
        assert!(set.contains(CubeFaceId::Top));
        assert_eq!(set.present(), vec![CubeFaceId::Top]);

        let old = set.insert(CubeFaceId::Top, solid(4, [1, 2, 3]));
        assert_eq!(old.unwrap().get_pixel(0, 0), &Rgb([255, 255, 255]));
        assert_eq!(set.len(), 1);

        assert!(set.remove(CubeFaceId::Top).is_some());
        assert!(set.is_empty());
    }

    #[test]
    fn test_sample_nearest_pixel() {
        let mut image = RgbImage::new(4, 2);
        for (x, y, px) in image.enumerate_pixels_mut() {
            *px = Rgb([x as u8, y as u8, 0]);
        }
        let set = CubeFaceSet::new().with_face(CubeFaceId::Left, image);

        let s = |u, v| set.sample(FaceCoord::new(CubeFaceId::Left, u, v)).unwrap();
        assert_eq!(s(0.0, 0.0), Rgb([0, 0, 0]));
        assert_eq!(s(0.49, 0.49), Rgb([1, 0, 0]));
        assert_eq!(s(0.5, 0.5), Rgb([2, 1, 0]));
        assert_eq!(s(1.0, 1.0), Rgb([3, 1, 0]));
    }

    #[test]
    fn test_sample_zero_area_face() {
        let set = CubeFaceSet::new().with_face(CubeFaceId::Back, RgbImage::new(0, 0));
        assert!(set.contains(CubeFaceId::Back));
        assert!(set.sample(FaceCoord::new(CubeFaceId::Back, 0.5, 0.5)).is_none());
    }
}
