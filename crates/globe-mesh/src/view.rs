//! Shared, read-only handle to a finished globe model.

use std::ops::Deref;
use std::sync::Arc;

use crate::TriangleGlobeModel;

/// A frozen [`TriangleGlobeModel`] that any number of threads can query.
///
/// Cloning shares the same model. There is no way back to a mutable model,
/// so every reader observes the fully built mesh.
#[derive(Clone, Debug)]
pub struct ImmutableGlobeModelView {
    model: Arc<TriangleGlobeModel>,
}

static_assertions::assert_impl_all!(ImmutableGlobeModelView: Send, Sync, Clone);
static_assertions::assert_impl_all!(TriangleGlobeModel: Send, Sync);

impl ImmutableGlobeModelView {
    #[must_use]
    pub fn new(model: TriangleGlobeModel) -> Self {
        Self {
            model: Arc::new(model),
        }
    }

    /// True if both handles share one model.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.model, &other.model)
    }
}

impl From<TriangleGlobeModel> for ImmutableGlobeModelView {
    fn from(model: TriangleGlobeModel) -> Self {
        Self::new(model)
    }
}

impl Deref for ImmutableGlobeModelView {
    type Target = TriangleGlobeModel;

    fn deref(&self) -> &TriangleGlobeModel {
        &self.model
    }
}

impl AsRef<TriangleGlobeModel> for ImmutableGlobeModelView {
    fn as_ref(&self) -> &TriangleGlobeModel {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use globe_projection::GeographicPosition;

    use super::*;
    use crate::GlobeModelBuilder;

    #[test]
    fn test_clones_share_model() {
        let view = GlobeModelBuilder::new(4, 2).build().unwrap().freeze();
        let other = view.clone();
        assert!(view.ptr_eq(&other));

        let p = GeographicPosition::surface(-12.0, 40.0);
        let a = view.locate(&p).unwrap();
        let b = other.locate(&p).unwrap();
        // Same model behind both handles, so triangles compare equal.
        assert_eq!(a, b);
    }

    #[test]
    fn test_view_moves_across_threads() {
        let view = GlobeModelBuilder::new(5, 3).build().unwrap().freeze();
        let p = GeographicPosition::surface(51.5, -0.1);
        let expected = view.locate(&p).unwrap().address();

        let handle = {
            let view = view.clone();
            std::thread::spawn(move || view.locate(&p).map(|t| t.address()))
        };
        assert_eq!(handle.join().unwrap().unwrap(), expected);
    }
}
