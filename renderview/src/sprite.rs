//! Sprite overlays: HTML elements pinned to points in the 3D scene.
//!
//! A [`SpriteGroup`] is a component. Its update step projects each sprite's
//! offset through the node's world matrix and the active camera into canvas
//! pixels. The DOM side is reached only through [`SpriteLayer`], so the group
//! itself runs headless; [`DomSpriteLayer`] is the browser implementation.

#[cfg(test)]
#[path = "sprite_test.rs"]
mod sprite_test;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlElement};

use crate::component::{Component, UpdateContext};
use crate::event::Point;
use crate::scene::Scene;

/// Sprite identity. Unique across every group in the process, so groups can
/// share one [`SpriteLayer`]. Later sprites compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpriteId(u64);

static NEXT_SPRITE_ID: AtomicU64 = AtomicU64::new(0);

impl SpriteId {
    fn next() -> Self {
        Self(NEXT_SPRITE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SpriteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sprite#{}", self.0)
    }
}

/// One overlay element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    /// Anchor relative to the owning node.
    pub offset: Vec3,
    pub class: String,
    pub html: String,
    pub visible: bool,
    /// Projected anchor in canvas pixels. `None` while off screen.
    #[serde(skip)]
    screen: Option<Point>,
}

impl Sprite {
    #[must_use]
    pub fn new(offset: Vec3, html: impl Into<String>) -> Self {
        Self { offset, class: String::new(), html: html.into(), visible: true, screen: None }
    }

    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = class.into();
        self
    }

    #[must_use]
    pub fn screen(&self) -> Option<Point> {
        self.screen
    }

    /// Visible and on screen.
    #[must_use]
    pub fn is_shown(&self) -> bool {
        self.visible && self.screen.is_some()
    }
}

/// Host-side element lifecycle for sprites.
pub trait SpriteLayer {
    type Error;

    /// Create the element for a newly added sprite.
    fn create(&mut self, id: SpriteId, sprite: &Sprite) -> Result<(), Self::Error>;

    /// Push changed class or content to an existing element.
    fn refresh(&mut self, id: SpriteId, sprite: &Sprite) -> Result<(), Self::Error>;

    /// Move and show or hide an existing element.
    fn place(&mut self, id: SpriteId, sprite: &Sprite) -> Result<(), Self::Error>;

    /// Remove an element. Unknown ids are ignored.
    fn destroy(&mut self, id: SpriteId) -> Result<(), Self::Error>;
}

/// Component holding sprites anchored to its node.
#[derive(Debug, Clone, Default)]
pub struct SpriteGroup {
    sprites: BTreeMap<SpriteId, Sprite>,
    mounted: BTreeSet<SpriteId>,
    stale: BTreeSet<SpriteId>,
    removed: Vec<SpriteId>,
}

impl SpriteGroup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, sprite: Sprite) -> SpriteId {
        let id = SpriteId::next();
        self.sprites.insert(id, sprite);
        id
    }

    /// Remove a sprite. Its element is destroyed on the next sync.
    pub fn remove(&mut self, id: SpriteId) -> Option<Sprite> {
        let sprite = self.sprites.remove(&id)?;
        self.stale.remove(&id);
        if self.mounted.remove(&id) {
            self.removed.push(id);
        }
        Some(sprite)
    }

    #[must_use]
    pub fn sprite(&self, id: SpriteId) -> Option<&Sprite> {
        self.sprites.get(&id)
    }

    pub fn set_html(&mut self, id: SpriteId, html: impl Into<String>) -> bool {
        let Some(sprite) = self.sprites.get_mut(&id) else {
            return false;
        };
        sprite.html = html.into();
        self.stale.insert(id);
        true
    }

    pub fn set_class(&mut self, id: SpriteId, class: impl Into<String>) -> bool {
        let Some(sprite) = self.sprites.get_mut(&id) else {
            return false;
        };
        sprite.class = class.into();
        self.stale.insert(id);
        true
    }

    pub fn set_visible(&mut self, id: SpriteId, visible: bool) -> bool {
        let Some(sprite) = self.sprites.get_mut(&id) else {
            return false;
        };
        sprite.visible = visible;
        true
    }

    pub fn set_offset(&mut self, id: SpriteId, offset: Vec3) -> bool {
        let Some(sprite) = self.sprites.get_mut(&id) else {
            return false;
        };
        sprite.offset = offset;
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (SpriteId, &Sprite)> {
        self.sprites.iter().map(|(id, s)| (*id, s))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    /// Ids whose element exists in the layer and is still owed to this
    /// group: mounted sprites plus removals not yet destroyed.
    pub fn elements(&self) -> impl Iterator<Item = SpriteId> + '_ {
        self.mounted.iter().chain(&self.removed).copied()
    }

    /// Bring the layer in line with the group: destroy removed elements,
    /// create new ones, refresh changed content, then place every sprite.
    ///
    /// # Errors
    ///
    /// The first error the layer reports. Work done before it is kept and
    /// the rest is retried on the next sync.
    pub fn sync<L: SpriteLayer + ?Sized>(&mut self, layer: &mut L) -> Result<(), L::Error> {
        while let Some(id) = self.removed.pop() {
            if let Err(err) = layer.destroy(id) {
                self.removed.push(id);
                return Err(err);
            }
        }
        for (id, sprite) in &self.sprites {
            if !self.mounted.contains(id) {
                layer.create(*id, sprite)?;
                self.mounted.insert(*id);
                self.stale.remove(id);
            }
        }
        while let Some(id) = self.stale.pop_first() {
            if let Some(sprite) = self.sprites.get(&id) {
                if let Err(err) = layer.refresh(id, sprite) {
                    self.stale.insert(id);
                    return Err(err);
                }
            }
        }
        for (id, sprite) in &self.sprites {
            layer.place(*id, sprite)?;
        }
        Ok(())
    }

    /// Destroy every element this group created.
    ///
    /// # Errors
    ///
    /// The first error the layer reports.
    pub fn detach<L: SpriteLayer + ?Sized>(&mut self, layer: &mut L) -> Result<(), L::Error> {
        self.removed.extend(std::mem::take(&mut self.mounted));
        while let Some(id) = self.removed.pop() {
            if let Err(err) = layer.destroy(id) {
                self.removed.push(id);
                return Err(err);
            }
        }
        self.stale.clear();
        Ok(())
    }
}

impl Component for SpriteGroup {
    fn name(&self) -> &'static str {
        "sprite_group"
    }

    fn update(&mut self, ctx: &UpdateContext<'_>) {
        let Some(camera) = ctx.camera else {
            for sprite in self.sprites.values_mut() {
                sprite.screen = None;
            }
            return;
        };
        for sprite in self.sprites.values_mut() {
            let world = ctx.world.transform_point3(sprite.offset);
            sprite.screen = camera
                .project(world)
                .filter(|ndc| ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0 && ndc.z.abs() <= 1.0)
                .map(|ndc| {
                    Point::new(
                        (f64::from(ndc.x) + 1.0) / 2.0 * ctx.canvas_width,
                        (1.0 - f64::from(ndc.y)) / 2.0 * ctx.canvas_height,
                    )
                });
        }
    }
}

/// One layer shared by every [`SpriteGroup`] in a scene.
///
/// Tracks which elements it has seen mounted so that groups dropped from the
/// scene (their component or node removed, or the scene replaced) have their
/// elements destroyed on the next sync.
pub struct SpriteOverlay<L> {
    layer: L,
    live: BTreeSet<SpriteId>,
}

impl<L: SpriteLayer> SpriteOverlay<L> {
    #[must_use]
    pub fn new(layer: L) -> Self {
        Self { layer, live: BTreeSet::new() }
    }

    #[must_use]
    pub fn layer(&self) -> &L {
        &self.layer
    }

    /// Elements currently mounted through this overlay.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Sync every group in `scene`, then destroy elements whose group is no
    /// longer in it.
    ///
    /// # Errors
    ///
    /// The first error the layer reports. Orphans are only swept once every
    /// group synced.
    pub fn sync(&mut self, scene: &mut Scene) -> Result<(), L::Error> {
        let mut owned = BTreeSet::new();
        for (_, group) in scene.components_mut::<SpriteGroup>() {
            let result = self.track(group, |group, layer| group.sync(layer));
            owned.extend(group.elements());
            result?;
        }
        let orphans: Vec<SpriteId> = self.live.difference(&owned).copied().collect();
        self.destroy_all(orphans)
    }

    /// Destroy every element: those of groups still in `scene`, then any left
    /// over from groups that are gone.
    ///
    /// # Errors
    ///
    /// The first error the layer reports.
    pub fn detach(&mut self, scene: Option<&mut Scene>) -> Result<(), L::Error> {
        if let Some(scene) = scene {
            for (_, group) in scene.components_mut::<SpriteGroup>() {
                self.track(group, |group, layer| group.detach(layer))?;
            }
        }
        let rest: Vec<SpriteId> = self.live.iter().copied().collect();
        self.destroy_all(rest)
    }

    /// Run `op` on `group` and move the group's element ids in `live` from
    /// what it owned before to what it owns after.
    fn track(
        &mut self,
        group: &mut SpriteGroup,
        op: impl FnOnce(&mut SpriteGroup, &mut L) -> Result<(), L::Error>,
    ) -> Result<(), L::Error> {
        let before: Vec<SpriteId> = group.elements().collect();
        let result = op(group, &mut self.layer);
        for id in before {
            self.live.remove(&id);
        }
        self.live.extend(group.elements());
        result
    }

    fn destroy_all(&mut self, ids: Vec<SpriteId>) -> Result<(), L::Error> {
        for id in ids {
            self.layer.destroy(id)?;
            self.live.remove(&id);
        }
        Ok(())
    }
}

/// Sprite layer made of absolutely positioned `div`s inside a container
/// laid over the canvas.
pub struct DomSpriteLayer {
    document: Document,
    container: HtmlElement,
    elements: BTreeMap<SpriteId, HtmlElement>,
}

impl DomSpriteLayer {
    /// # Errors
    ///
    /// Fails if the container is not attached to a document.
    pub fn new(container: HtmlElement) -> Result<Self, JsValue> {
        let document = container
            .owner_document()
            .ok_or_else(|| JsValue::from_str("sprite container has no owner document"))?;
        Ok(Self { document, container, elements: BTreeMap::new() })
    }

    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }
}

impl SpriteLayer for DomSpriteLayer {
    type Error = JsValue;

    fn create(&mut self, id: SpriteId, sprite: &Sprite) -> Result<(), JsValue> {
        let element = self.document.create_element("div")?.dyn_into::<HtmlElement>().map_err(JsValue::from)?;
        element.set_class_name(&sprite.class);
        element.set_inner_html(&sprite.html);
        let style = element.style();
        style.set_property("position", "absolute")?;
        style.set_property("pointer-events", "none")?;
        style.set_property("display", "none")?;
        self.container.append_child(&element)?;
        if let Some(previous) = self.elements.insert(id, element) {
            previous.remove();
        }
        Ok(())
    }

    fn refresh(&mut self, id: SpriteId, sprite: &Sprite) -> Result<(), JsValue> {
        if let Some(element) = self.elements.get(&id) {
            element.set_class_name(&sprite.class);
            element.set_inner_html(&sprite.html);
        }
        Ok(())
    }

    fn place(&mut self, id: SpriteId, sprite: &Sprite) -> Result<(), JsValue> {
        let Some(element) = self.elements.get(&id) else {
            return Ok(());
        };
        let style = element.style();
        match sprite.screen.filter(|_| sprite.visible) {
            Some(at) => {
                style.set_property("left", &format!("{}px", at.x))?;
                style.set_property("top", &format!("{}px", at.y))?;
                style.set_property("display", "block")?;
            }
            None => style.set_property("display", "none")?,
        }
        Ok(())
    }

    fn destroy(&mut self, id: SpriteId) -> Result<(), JsValue> {
        if let Some(element) = self.elements.remove(&id) {
            element.remove();
        }
        Ok(())
    }
}
