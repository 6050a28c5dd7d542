//! Picking: from a canvas location to an object index.
//!
//! Renderers that support picking draw every object with a flat color that
//! encodes its index, into an offscreen buffer; reading the pixel under the
//! pointer yields the index. Index `0` is the cleared background. The
//! [`PickTable`] maps indices back to objects; [`PickBuffer`] is a CPU-side
//! copy of such an index target.

#[cfg(test)]
#[path = "pick_test.rs"]
mod pick_test;

use std::collections::HashMap;

use tracing::warn;

use crate::camera::Camera;
use crate::consts::{BACKGROUND_PICK_INDEX, MAX_PICK_BUFFER_PIXELS};
use crate::render::PixelRect;
use crate::routed::RoutedEvent;
use crate::scene::{ObjectId, Scene};

/// Index read from a pick target. `0` means background.
pub type PickIndex = u32;

pub trait Picker {
    /// Index of the object at the event's location, as seen through `camera`.
    fn pick_index(&mut self, scene: &Scene, camera: &Camera, event: &RoutedEvent) -> PickIndex;
}

impl<F> Picker for F
where
    F: FnMut(&Scene, &Camera, &RoutedEvent) -> PickIndex,
{
    fn pick_index(&mut self, scene: &Scene, camera: &Camera, event: &RoutedEvent) -> PickIndex {
        self(scene, camera, event)
    }
}

/// Stable assignment of pick indices to objects.
///
/// Indices start at 1 and are never reused while the table lives, so an
/// index written into a pick target by a previous frame cannot resolve to a
/// different object.
#[derive(Debug, Clone, Default)]
pub struct PickTable {
    /// Slot `i` holds the object for index `i + 1`; `None` marks a retired index.
    objects: Vec<Option<ObjectId>>,
    indices: HashMap<ObjectId, PickIndex>,
}

impl PickTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Index for `object`, assigning the next free one on first sight.
    pub fn assign(&mut self, object: ObjectId) -> PickIndex {
        if let Some(index) = self.indices.get(&object) {
            return *index;
        }
        self.objects.push(Some(object));
        let index = PickIndex::try_from(self.objects.len()).unwrap_or(PickIndex::MAX);
        self.indices.insert(object, index);
        index
    }

    /// Retire the index of an object that left the scene.
    pub fn retire(&mut self, object: ObjectId) -> Option<PickIndex> {
        let index = self.indices.remove(&object)?;
        if let Some(slot) = self.slot_mut(index) {
            *slot = None;
        }
        Some(index)
    }

    /// Bring the table in line with the scene: retire departed objects,
    /// assign indices to new ones in attachment order.
    pub fn sync(&mut self, scene: &Scene) {
        let departed: Vec<ObjectId> = self
            .indices
            .keys()
            .filter(|o| scene.owner_of(**o).is_none())
            .copied()
            .collect();
        for object in departed {
            self.retire(object);
        }
        for (object, _) in scene.objects() {
            self.assign(object);
        }
    }

    /// Object for an index. The background index never resolves.
    #[must_use]
    pub fn object(&self, index: PickIndex) -> Option<ObjectId> {
        if index == BACKGROUND_PICK_INDEX {
            return None;
        }
        let Ok(slot) = usize::try_from(index - 1) else {
            return None;
        };
        self.objects.get(slot).copied().flatten()
    }

    #[must_use]
    pub fn index_of(&self, object: ObjectId) -> Option<PickIndex> {
        self.indices.get(&object).copied()
    }

    /// Number of live objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    fn slot_mut(&mut self, index: PickIndex) -> Option<&mut Option<ObjectId>> {
        let Ok(slot) = usize::try_from(index.checked_sub(1)?) else {
            return None;
        };
        self.objects.get_mut(slot)
    }
}

/// CPU copy of an object-index render target, one index per canvas pixel.
#[derive(Debug, Clone, Default)]
pub struct PickBuffer {
    width: usize,
    height: usize,
    data: Vec<PickIndex>,
}

impl PickBuffer {
    /// A background-filled buffer. Sizes whose pixel count overflows or
    /// exceeds [`MAX_PICK_BUFFER_PIXELS`] give an empty buffer.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        let mut buffer = Self::default();
        buffer.resize(width, height);
        buffer
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Resize and clear to background.
    pub fn resize(&mut self, width: usize, height: usize) {
        let Some(len) = width.checked_mul(height).filter(|len| *len <= MAX_PICK_BUFFER_PIXELS) else {
            warn!(width, height, "pick buffer too large, leaving it empty");
            self.width = 0;
            self.height = 0;
            self.data = Vec::new();
            return;
        };
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data.resize(len, BACKGROUND_PICK_INDEX);
    }

    pub fn clear(&mut self) {
        self.data.fill(BACKGROUND_PICK_INDEX);
    }

    /// Write `index` over a rectangle (top-left origin, clipped to the buffer).
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn fill_rect(&mut self, rect: PixelRect, index: PickIndex) {
        let clamp_x = |v: f64| (v.max(0.0) as usize).min(self.width);
        let clamp_y = |v: f64| (v.max(0.0) as usize).min(self.height);
        let (x0, x1) = (clamp_x(rect.x.floor()), clamp_x((rect.x + rect.width).ceil()));
        let (y0, y1) = (clamp_y(rect.y.floor()), clamp_y((rect.y + rect.height).ceil()));
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        for y in y0..y1 {
            let row = y * self.width;
            self.data[row + x0..row + x1].fill(index);
        }
    }

    /// Index at a canvas-local point; background outside the buffer.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn index_at(&self, x: f64, y: f64) -> PickIndex {
        if !x.is_finite() || !y.is_finite() || x < 0.0 || y < 0.0 {
            return BACKGROUND_PICK_INDEX;
        }
        let (px, py) = (x.floor() as usize, y.floor() as usize);
        if px >= self.width || py >= self.height {
            return BACKGROUND_PICK_INDEX;
        }
        self.data[py * self.width + px]
    }
}

impl Picker for PickBuffer {
    fn pick_index(&mut self, _scene: &Scene, _camera: &Camera, event: &RoutedEvent) -> PickIndex {
        let local = event.input.local();
        self.index_at(local.x, local.y)
    }
}
