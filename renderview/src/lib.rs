//! Render-view component layer for a 3D scene hosted in the browser.
//!
//! This crate sits between raw DOM input and an external renderer. It owns
//! the routing of pointer and trigger events to viewports and picked scene
//! objects, a small scene graph with hierarchical transforms, and a handful
//! of components (orbit camera control, parametric box geometry, DOM sprite
//! overlays). Rendering itself, GPU picking passes and DOM layout are left to
//! the host through the [`render::Renderer`], [`pick::Picker`] and
//! [`sprite::SpriteLayer`] seams.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`view`] | [`view::RenderView`]: viewport registry, event routing, frame render |
//! | [`routed`] | The routed event handed to the render system and viewports |
//! | [`gesture`] | Sticky viewport/object/component state across a gesture |
//! | [`event`] | Pointer and trigger input model |
//! | [`viewport`] | Viewport trait and the region-based implementation |
//! | [`pick`] | Pick indices, index table, CPU pick buffer |
//! | [`system`] | Render system trait and the scene-backed implementation |
//! | [`render`] | Renderer trait, pixel rects, per-frame context |
//! | [`scene`] | Node arena, component storage, object ownership |
//! | [`component`] | Component capability trait and update context |
//! | [`transform`] | Translation / rotation / scale and matrix composition |
//! | [`camera`] | Perspective camera and orbit controller |
//! | [`geometry`] | Parametric box geometry |
//! | [`sprite`] | DOM-backed sprite overlays |
//! | [`engine`] | Browser glue wrapping the canvas element |
//! | [`error`] | Error types |
//! | [`consts`] | Shared constants |

pub mod camera;
pub mod component;
pub mod consts;
pub mod engine;
pub mod error;
pub mod event;
pub mod geometry;
pub mod gesture;
pub mod pick;
pub mod render;
pub mod routed;
pub mod scene;
pub mod sprite;
pub mod system;
pub mod transform;
pub mod view;
pub mod viewport;
