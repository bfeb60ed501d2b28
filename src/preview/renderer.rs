//! Immediate-style renderer interface and the graph-building backend.
//!
//! The preview builder talks to a [`Renderer`] the way a host viewport
//! would: scoped attribute and transform blocks, attribute assignments and
//! primitive submissions. [`SceneGraphRenderer`] records those calls into a
//! [`PreviewScene`] instead of drawing.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use glam::Mat4;

use crate::preview::graph::{GroupKey, PreviewScene};
use crate::preview::primitive::Primitive;
use crate::scene::{AttributeValue, SceneObject};

/// Attribute holding a group's name tag.
pub const NAME_ATTRIBUTE: &str = "name";
pub const USE_GL_LINES_ATTRIBUTE: &str = "gl:curvesPrimitive:useGLLines";
pub const GL_LINE_WIDTH_ATTRIBUTE: &str = "gl:curvesPrimitive:glLineWidth";

pub trait Renderer {
    /// Post-multiplies the current transform by `matrix`.
    fn concat_transform(&mut self, matrix: Mat4);

    fn set_attribute(&mut self, name: &str, value: AttributeValue);

    fn attribute_begin(&mut self);

    fn attribute_end(&mut self);

    fn transform_begin(&mut self);

    fn transform_end(&mut self);

    fn render(&mut self, primitive: Arc<Primitive>);
}

/// Scoped attribute block. Ends the block when dropped.
pub struct AttributeBlock<'a, R: Renderer + ?Sized> {
    renderer: &'a mut R,
}

impl<'a, R: Renderer + ?Sized> AttributeBlock<'a, R> {
    pub fn new(renderer: &'a mut R) -> Self {
        renderer.attribute_begin();
        Self { renderer }
    }
}

impl<R: Renderer + ?Sized> Deref for AttributeBlock<'_, R> {
    type Target = R;

    fn deref(&self) -> &Self::Target {
        self.renderer
    }
}

impl<R: Renderer + ?Sized> DerefMut for AttributeBlock<'_, R> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.renderer
    }
}

impl<R: Renderer + ?Sized> Drop for AttributeBlock<'_, R> {
    fn drop(&mut self) {
        self.renderer.attribute_end();
    }
}

/// Payloads that know how to submit themselves to a [`Renderer`].
pub trait Renderable {
    fn render(&self, renderer: &mut dyn Renderer);
}

impl Renderable for SceneObject {
    fn render(&self, renderer: &mut dyn Renderer) {
        match self {
            // Drawn by the preview builder as axes, outside the name state.
            Self::CoordinateSystem(_) => {}
            Self::Mesh(mesh) => renderer.render(Arc::new(Primitive::Mesh(mesh.clone()))),
            Self::Curves(curves) => renderer.render(Arc::new(Primitive::Curves(curves.clone()))),
            Self::Points(points) => renderer.render(Arc::new(Primitive::Points(points.clone()))),
        }
    }
}

/// Records renderer calls into a [`PreviewScene`].
///
/// Every attribute or transform block opens a new group under the current
/// one; `name` attributes set the group's name tag and everything else is
/// stored as a state override.
#[derive(Debug, Default)]
pub struct SceneGraphRenderer {
    scene: PreviewScene,
    stack: Vec<GroupKey>,
}

impl SceneGraphRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The group receiving calls right now.
    #[must_use]
    pub fn current(&self) -> GroupKey {
        self.stack.last().copied().unwrap_or(self.scene.root())
    }

    fn push(&mut self) {
        let parent = self.current();
        if let Some(key) = self.scene.add_group(parent) {
            self.stack.push(key);
        }
    }

    fn pop(&mut self) {
        if self.stack.pop().is_none() {
            log::warn!("Unbalanced block end ignored");
        }
    }

    /// Finishes recording and returns the graph.
    #[must_use]
    pub fn finish(self) -> PreviewScene {
        if !self.stack.is_empty() {
            log::warn!("{} blocks left open at end of recording", self.stack.len());
        }
        self.scene
    }
}

impl Renderer for SceneGraphRenderer {
    fn concat_transform(&mut self, matrix: Mat4) {
        let current = self.current();
        if let Some(group) = self.scene.group_mut(current) {
            group.transform *= matrix;
        }
    }

    fn set_attribute(&mut self, name: &str, value: AttributeValue) {
        let current = self.current();
        let Some(group) = self.scene.group_mut(current) else {
            return;
        };
        if name == NAME_ATTRIBUTE {
            if let AttributeValue::String(text) = value {
                group.state.name = Some(text);
            } else {
                log::warn!("Ignoring non-string name attribute ({})", value.type_name());
            }
        } else {
            group.state.attributes.insert(name.to_owned(), value);
        }
    }

    fn attribute_begin(&mut self) {
        self.push();
    }

    fn attribute_end(&mut self) {
        self.pop();
    }

    fn transform_begin(&mut self) {
        self.push();
    }

    fn transform_end(&mut self) {
        self.pop();
    }

    fn render(&mut self, primitive: Arc<Primitive>) {
        let current = self.current();
        self.scene.add_primitive(current, primitive);
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::scene::CurvesPrimitive;

    #[test]
    fn blocks_become_groups() {
        let mut renderer = SceneGraphRenderer::new();
        {
            let mut outer = AttributeBlock::new(&mut renderer);
            outer.set_attribute(NAME_ATTRIBUTE, "/a".into());
            outer.concat_transform(Mat4::from_translation(Vec3::X));
            {
                let mut inner = AttributeBlock::new(&mut *outer);
                inner.set_attribute(GL_LINE_WIDTH_ATTRIBUTE, AttributeValue::Float(2.0));
                inner.render(Arc::new(Primitive::Curves(CurvesPrimitive::axes())));
            }
        }
        let scene = renderer.finish();

        let root = scene.group(scene.root()).unwrap();
        let outer_key = root.child_groups().next().unwrap();
        let outer = scene.group(outer_key).unwrap();
        assert_eq!(outer.name(), Some("/a"));
        assert_eq!(outer.transform.w_axis.truncate(), Vec3::X);

        let inner_key = outer.child_groups().next().unwrap();
        let inner = scene.group(inner_key).unwrap();
        assert_eq!(inner.name(), None);
        assert_eq!(scene.effective_name(inner_key), "/a");
        assert_eq!(
            inner.state.attributes.get(GL_LINE_WIDTH_ATTRIBUTE),
            Some(&AttributeValue::Float(2.0))
        );
        assert_eq!(inner.primitives().count(), 1);
    }

    #[test]
    fn unbalanced_end_is_ignored() {
        let mut renderer = SceneGraphRenderer::new();
        renderer.attribute_end();
        renderer.render(Arc::new(Primitive::Curves(CurvesPrimitive::axes())));
        let scene = renderer.finish();
        assert_eq!(scene.primitive_count(scene.root()), 1);
    }
}
