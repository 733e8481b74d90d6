//! Target handles and the resolver trait.
//!
//! The host owns every transform-bearing object. The core refers to them only
//! through [`TargetHandle`], an opaque index the host hands out from
//! [`TargetResolver::resolve`], and re-resolves at every run start.

use serde::{Deserialize, Serialize};

use crate::config::{Extent, Transform2D};

/// Opaque host-side index of a transform-bearing object.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TargetHandle(pub u64);

/// Configured identity of the target: a display name and, optionally, a stable id.
/// The name is authoritative; the id is tried only when the name does not resolve.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
}

impl TargetRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }
}

/// Trait for resolving configured targets to live objects and driving them.
/// Adapters (Bevy, plugin shells, tests) implement this and pass it into every
/// `MotionMachine` operation.
pub trait TargetResolver {
    /// Look up a live object by name.
    fn resolve(&mut self, name: &str) -> Option<TargetHandle>;

    /// Look up a live object by stable id.
    fn resolve_id(&mut self, _id: u64) -> Option<TargetHandle> {
        None
    }

    /// Current name of a live object.
    fn name_of(&self, handle: TargetHandle) -> Option<String>;

    /// Current position and scale; `None` once the object is gone.
    fn transform(&self, handle: TargetHandle) -> Option<Transform2D>;

    /// Unscaled size of the object, used to turn extents into scale factors.
    fn native_size(&self, handle: TargetHandle) -> Option<Extent>;

    fn set_transform(&mut self, handle: TargetHandle, transform: Transform2D);

    /// Take a reference on the object for the duration of a run.
    fn acquire(&mut self, handle: TargetHandle);

    /// Drop the reference taken by `acquire`.
    fn release(&mut self, handle: TargetHandle);
}

/// Outcome of resolving a [`TargetRef`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub handle: TargetHandle,
    /// Set when the name missed and the id matched: the object's current name,
    /// which the host should write back into its configuration.
    pub renamed: Option<String>,
}

/// Resolve by name first, then fall back to the id.
pub fn resolve_target(resolver: &mut dyn TargetResolver, target: &TargetRef) -> Option<Resolution> {
    if !target.name.is_empty() {
        if let Some(handle) = resolver.resolve(&target.name) {
            return Some(Resolution {
                handle,
                renamed: None,
            });
        }
    }
    let handle = resolver.resolve_id(target.id?)?;
    let renamed = resolver
        .name_of(handle)
        .filter(|name| *name != target.name);
    Some(Resolution { handle, renamed })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(Vec<(u64, &'static str)>);

    impl TargetResolver for Named {
        fn resolve(&mut self, name: &str) -> Option<TargetHandle> {
            self.0.iter().find(|(_, n)| *n == name).map(|(id, _)| TargetHandle(*id))
        }
        fn resolve_id(&mut self, id: u64) -> Option<TargetHandle> {
            self.0.iter().any(|(i, _)| *i == id).then_some(TargetHandle(id))
        }
        fn name_of(&self, handle: TargetHandle) -> Option<String> {
            self.0.iter().find(|(i, _)| *i == handle.0).map(|(_, n)| n.to_string())
        }
        fn transform(&self, _handle: TargetHandle) -> Option<Transform2D> {
            Some(Transform2D::default())
        }
        fn native_size(&self, _handle: TargetHandle) -> Option<Extent> {
            None
        }
        fn set_transform(&mut self, _handle: TargetHandle, _transform: Transform2D) {}
        fn acquire(&mut self, _handle: TargetHandle) {}
        fn release(&mut self, _handle: TargetHandle) {}
    }

    #[test]
    fn name_then_id() {
        let mut scene = Named(vec![(1, "a"), (2, "b")]);
        let by_name = resolve_target(&mut scene, &TargetRef::named("b").with_id(1)).unwrap();
        assert_eq!(by_name.handle, TargetHandle(2));
        assert_eq!(by_name.renamed, None);

        let by_id = resolve_target(&mut scene, &TargetRef::named("gone").with_id(1)).unwrap();
        assert_eq!(by_id.handle, TargetHandle(1));
        assert_eq!(by_id.renamed.as_deref(), Some("a"));

        assert!(resolve_target(&mut scene, &TargetRef::named("gone")).is_none());
        assert!(resolve_target(&mut scene, &TargetRef::default()).is_none());
    }
}
