#![allow(dead_code)]
//! In-memory scene used by the integration tests: named items with a
//! transform and a native size, plus acquire/release bookkeeping.

use std::collections::BTreeMap;

use motion_filter_core::{Extent, TargetHandle, TargetResolver, Transform2D, Vec2};

#[derive(Clone, Debug)]
pub struct MockItem {
    pub name: String,
    pub transform: Transform2D,
    pub native: Extent,
}

#[derive(Debug, Default)]
pub struct MockScene {
    items: BTreeMap<u64, MockItem>,
    next_id: u64,
    pub acquires: u32,
    pub releases: u32,
    pub writes: u32,
}

impl MockScene {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    pub fn spawn(&mut self, name: &str, position: Vec2, native: Extent) -> TargetHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.items.insert(
            id,
            MockItem {
                name: name.to_string(),
                transform: Transform2D {
                    position,
                    scale: Vec2::ONE,
                },
                native,
            },
        );
        TargetHandle(id)
    }

    pub fn remove(&mut self, handle: TargetHandle) {
        self.items.remove(&handle.0);
    }

    pub fn rename(&mut self, handle: TargetHandle, name: &str) {
        if let Some(item) = self.items.get_mut(&handle.0) {
            item.name = name.to_string();
        }
    }

    pub fn item(&self, handle: TargetHandle) -> &MockItem {
        self.items.get(&handle.0).expect("item exists")
    }

    pub fn position(&self, handle: TargetHandle) -> Vec2 {
        self.item(handle).transform.position
    }

    pub fn scale(&self, handle: TargetHandle) -> Vec2 {
        self.item(handle).transform.scale
    }

    pub fn place(&mut self, handle: TargetHandle, position: Vec2, scale: Vec2) {
        if let Some(item) = self.items.get_mut(&handle.0) {
            item.transform = Transform2D { position, scale };
        }
    }

    /// References taken and not yet released.
    pub fn outstanding(&self) -> i64 {
        self.acquires as i64 - self.releases as i64
    }
}

impl TargetResolver for MockScene {
    fn resolve(&mut self, name: &str) -> Option<TargetHandle> {
        self.items
            .iter()
            .find(|(_, item)| item.name == name)
            .map(|(id, _)| TargetHandle(*id))
    }

    fn resolve_id(&mut self, id: u64) -> Option<TargetHandle> {
        self.items.contains_key(&id).then_some(TargetHandle(id))
    }

    fn name_of(&self, handle: TargetHandle) -> Option<String> {
        self.items.get(&handle.0).map(|item| item.name.clone())
    }

    fn transform(&self, handle: TargetHandle) -> Option<Transform2D> {
        self.items.get(&handle.0).map(|item| item.transform)
    }

    fn native_size(&self, handle: TargetHandle) -> Option<Extent> {
        self.items.get(&handle.0).map(|item| item.native)
    }

    fn set_transform(&mut self, handle: TargetHandle, transform: Transform2D) {
        if let Some(item) = self.items.get_mut(&handle.0) {
            item.transform = transform;
            self.writes += 1;
        }
    }

    fn acquire(&mut self, _handle: TargetHandle) {
        self.acquires += 1;
    }

    fn release(&mut self, _handle: TargetHandle) {
        self.releases += 1;
    }
}

pub fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}
