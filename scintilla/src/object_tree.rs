//! Accessible-object graph with parent links.
//!
//! Scintilla editors surface an in-progress IME composition as a separate
//! accessible object somewhere between the focused object and its window.
//! `ParentChainLocator` finds it by walking from the focus towards the root.

use std::collections::HashMap;

use caretfix_core::{CompositionSnapshot, HostError, SessionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Window,
    Editor,
    /// In-progress IME composition
    InputComposition,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessibleObject {
    pub id: ObjectId,
    pub role: Role,
    /// Class name of the window this object was created for, if it owns one
    pub window_class: Option<String>,
    pub parent: Option<ObjectId>,
    /// Present on `InputComposition` objects
    pub composition_string: Option<String>,
}

impl AccessibleObject {
    pub fn new(id: ObjectId, role: Role) -> Self {
        Self {
            id,
            role,
            window_class: None,
            parent: None,
            composition_string: None,
        }
    }

    pub fn with_parent(mut self, parent: ObjectId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_window_class(mut self, class: impl Into<String>) -> Self {
        self.window_class = Some(class.into());
        self
    }

    pub fn with_composition(mut self, text: impl Into<String>) -> Self {
        self.composition_string = Some(text.into());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ObjectTree {
    objects: HashMap<ObjectId, AccessibleObject>,
    focus: Option<ObjectId>,
}

impl ObjectTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, object: AccessibleObject) {
        self.objects.insert(object.id, object);
    }

    /// Remove an object. Handles still pointing at it become stale.
    pub fn remove(&mut self, id: ObjectId) -> Option<AccessibleObject> {
        if self.focus == Some(id) {
            self.focus = None;
        }
        self.objects.remove(&id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&AccessibleObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut AccessibleObject> {
        self.objects.get_mut(&id)
    }

    pub fn focus(&self) -> Option<ObjectId> {
        self.focus
    }

    pub fn set_focus(&mut self, id: Option<ObjectId>) {
        self.focus = id;
    }

    fn resolve(&self, id: ObjectId) -> Result<&AccessibleObject, HostError> {
        self.objects
            .get(&id)
            .ok_or_else(|| HostError::StaleHandle(format!("object {}", id.0)))
    }

    /// Walk from `start` towards the root, at most `max_depth` steps, and
    /// return the first object accepted by `pred`.
    pub fn find_in_chain<F>(
        &self,
        start: ObjectId,
        max_depth: usize,
        mut pred: F,
    ) -> Result<Option<&AccessibleObject>, HostError>
    where
        F: FnMut(&AccessibleObject) -> bool,
    {
        let mut current = Some(start);
        let mut steps = 0;
        while let Some(id) = current {
            if steps > max_depth {
                return Err(HostError::Other(format!(
                    "parent chain from object {} deeper than {}",
                    start.0, max_depth
                )));
            }
            let object = self.resolve(id)?;
            if pred(object) {
                return Ok(Some(object));
            }
            current = object.parent;
            steps += 1;
        }
        Ok(None)
    }

    /// Class name of the nearest window at or above `id`.
    pub fn window_class(&self, id: ObjectId, max_depth: usize) -> Result<Option<String>, HostError> {
        Ok(self
            .find_in_chain(id, max_depth, |object| object.window_class.is_some())?
            .and_then(|object| object.window_class.clone()))
    }
}

/// Finds the composition owning a handle by walking its parent chain.
#[derive(Debug, Clone, Copy)]
pub struct ParentChainLocator {
    max_depth: usize,
}

impl ParentChainLocator {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// The nearest `InputComposition` at or above `start`.
    ///
    /// An object without a readable composition string counts as no
    /// composition at all.
    pub fn locate(
        &self,
        tree: &ObjectTree,
        start: ObjectId,
    ) -> Result<Option<CompositionSnapshot>, HostError> {
        let found = tree.find_in_chain(start, self.max_depth, |object| {
            object.role == Role::InputComposition
        })?;
        Ok(found.and_then(|object| {
            object
                .composition_string
                .as_ref()
                .map(|content| CompositionSnapshot {
                    id: SessionId(object.id.0),
                    content: content.clone(),
                })
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// window(1) > editor(2) > composition(3) > candidate(4)
    fn tree() -> ObjectTree {
        let mut tree = ObjectTree::new();
        tree.insert(AccessibleObject::new(ObjectId(1), Role::Window).with_window_class("Scintilla"));
        tree.insert(AccessibleObject::new(ObjectId(2), Role::Editor).with_parent(ObjectId(1)));
        tree.insert(
            AccessibleObject::new(ObjectId(3), Role::InputComposition)
                .with_parent(ObjectId(2))
                .with_composition("nihao"),
        );
        tree.insert(AccessibleObject::new(ObjectId(4), Role::Other).with_parent(ObjectId(3)));
        tree
    }

    #[test]
    fn test_locate_from_self() {
        let snapshot = ParentChainLocator::new(8)
            .locate(&tree(), ObjectId(3))
            .unwrap()
            .unwrap();
        assert_eq!(snapshot.id, SessionId(3));
        assert_eq!(snapshot.content, "nihao");
    }

    #[test]
    fn test_locate_from_descendant() {
        let snapshot = ParentChainLocator::new(8).locate(&tree(), ObjectId(4)).unwrap();
        assert_eq!(snapshot.map(|s| s.id), Some(SessionId(3)));
    }

    #[test]
    fn test_locate_misses_above_composition() {
        assert_eq!(ParentChainLocator::new(8).locate(&tree(), ObjectId(2)).unwrap(), None);
    }

    #[test]
    fn test_composition_without_string() {
        let mut tree = tree();
        tree.get_mut(ObjectId(3)).unwrap().composition_string = None;
        assert_eq!(ParentChainLocator::new(8).locate(&tree, ObjectId(4)).unwrap(), None);
    }

    #[test]
    fn test_dangling_parent_is_stale() {
        let mut tree = tree();
        tree.remove(ObjectId(2));
        let err = ParentChainLocator::new(8).locate(&tree, ObjectId(4)).unwrap_err();
        assert!(matches!(err, HostError::StaleHandle(_)));
    }

    #[test]
    fn test_cycle_hits_depth_limit() {
        let mut tree = ObjectTree::new();
        tree.insert(AccessibleObject::new(ObjectId(1), Role::Other).with_parent(ObjectId(2)));
        tree.insert(AccessibleObject::new(ObjectId(2), Role::Other).with_parent(ObjectId(1)));
        assert!(ParentChainLocator::new(4).locate(&tree, ObjectId(1)).is_err());
    }

    #[test]
    fn test_window_class_inherited() {
        let tree = tree();
        assert_eq!(tree.window_class(ObjectId(4), 8).unwrap().as_deref(), Some("Scintilla"));
    }

    #[test]
    fn test_removing_focus_clears_it() {
        let mut tree = tree();
        tree.set_focus(Some(ObjectId(3)));
        tree.remove(ObjectId(3));
        assert_eq!(tree.focus(), None);
    }
}
