//! Scene registry: the insertion-ordered set of live objects.
//!
//! The registry is the single owner of every [`SceneObject`]. Other parts of
//! the editor refer to objects by [`ObjectId`] only. Every mutation is
//! announced synchronously to subscribed [`SceneObserver`]s (the render graph
//! is one), so observers never see a registry state they were not told about.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use glam::{DMat4, DQuat, DVec3, EulerRot};
use serde::{Deserialize, Serialize};

use crate::bounds::Aabb;
use crate::color::Rgb;
use crate::consts::DEFAULT_METALNESS;
use crate::geometry::{GeometryKind, GeometryParams};

/// Unique identifier for a scene object within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Surface appearance of an object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub color: Rgb,
    pub metalness: f64,
    pub roughness: f64,
    /// Added light; black unless the object is highlighted.
    pub emissive: Rgb,
    pub wireframe: bool,
    pub double_sided: bool,
}

impl Material {
    /// The default material for a primitive kind with the given base color.
    #[must_use]
    pub fn for_kind(kind: GeometryKind, color: Rgb) -> Self {
        Self {
            color,
            metalness: DEFAULT_METALNESS,
            roughness: kind.default_roughness(),
            emissive: Rgb::BLACK,
            wireframe: false,
            double_sided: kind.double_sided(),
        }
    }
}

/// A live object in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub id: ObjectId,
    /// Display name, assigned by the registry on insertion.
    pub name: String,
    pub params: GeometryParams,
    pub position: DVec3,
    /// Euler angles in radians, applied in XYZ order.
    pub rotation: DVec3,
    pub scale: DVec3,
    pub material: Material,
}

impl SceneObject {
    /// A fresh object with the identity transform. `id` and `name` are
    /// placeholders until the object is added to a registry.
    #[must_use]
    pub fn new(params: GeometryParams, material: Material) -> Self {
        Self {
            id: ObjectId::default(),
            name: String::new(),
            params,
            position: DVec3::ZERO,
            rotation: DVec3::ZERO,
            scale: DVec3::ONE,
            material,
        }
    }

    #[must_use]
    pub fn kind(&self) -> GeometryKind {
        self.params.kind()
    }

    /// The rotation as a quaternion.
    #[must_use]
    pub fn orientation(&self) -> DQuat {
        DQuat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    /// Local → world transform: scale, then rotate, then translate.
    #[must_use]
    pub fn world_matrix(&self) -> DMat4 {
        DMat4::from_scale_rotation_translation(self.scale, self.orientation(), self.position)
    }

    /// World-space bounding box of the object's geometry.
    #[must_use]
    pub fn world_bounds(&self) -> Aabb {
        self.params.local_bounds().transformed(&self.world_matrix())
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.params.vertex_count()
    }
}

/// A change to the registry.
#[derive(Debug, Clone, Copy)]
pub enum SceneEvent<'a> {
    Added(&'a SceneObject),
    Updated(&'a SceneObject),
    Removed(ObjectId),
    Cleared,
}

/// Receives registry changes as they happen.
pub trait SceneObserver {
    fn on_scene_event(&mut self, event: SceneEvent<'_>);
}

/// Insertion-ordered collection of scene objects.
#[derive(Default)]
pub struct SceneRegistry {
    objects: Vec<SceneObject>,
    next_id: u64,
    observers: Vec<Rc<RefCell<dyn SceneObserver>>>,
}

impl fmt::Debug for SceneRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneRegistry")
            .field("objects", &self.objects)
            .field("next_id", &self.next_id)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl SceneRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer. It is told about every later mutation.
    pub fn subscribe(&mut self, observer: Rc<RefCell<dyn SceneObserver>>) {
        self.observers.push(observer);
    }

    /// Append an object, assigning it a fresh id and a display name.
    ///
    /// The name is `"<Kind>_<n>"` where `n` is the registry length at
    /// insertion. After deletions that name may already be taken; `n` is then
    /// bumped until the name is free.
    pub fn add(&mut self, mut object: SceneObject) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;

        object.id = id;
        object.name = self.free_name(object.kind());
        self.objects.push(object);

        if let Some(added) = self.objects.last() {
            log::debug!("scene: added {} ({id})", added.name);
            notify(&self.observers, SceneEvent::Added(added));
        }
        id
    }

    /// Remove an object. Returns `false` if no object has this id.
    pub fn remove(&mut self, id: ObjectId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let removed = self.objects.remove(index);
        log::debug!("scene: removed {} ({id})", removed.name);
        notify(&self.observers, SceneEvent::Removed(id));
        true
    }

    /// Remove every object. Ids are not reused afterwards.
    pub fn clear(&mut self) {
        self.objects.clear();
        notify(&self.observers, SceneEvent::Cleared);
    }

    /// All objects in insertion order.
    #[must_use]
    pub fn list(&self) -> &[SceneObject] {
        &self.objects
    }

    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.index_of(id).is_some()
    }

    /// Mutate an object in place and announce the change. Returns `false` if
    /// no object has this id. The closure cannot change the object's id.
    pub fn update<F: FnOnce(&mut SceneObject)>(&mut self, id: ObjectId, f: F) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let Some(object) = self.objects.get_mut(index) else {
            return false;
        };
        f(object);
        object.id = id;
        notify(&self.observers, SceneEvent::Updated(object));
        true
    }

    /// Apply `f` to every object, announcing each change.
    pub fn update_all<F: FnMut(&mut SceneObject)>(&mut self, mut f: F) {
        for object in &mut self.objects {
            let id = object.id;
            f(object);
            object.id = id;
            notify(&self.observers, SceneEvent::Updated(object));
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id == id)
    }

    fn free_name(&self, kind: GeometryKind) -> String {
        let mut n = self.objects.len();
        loop {
            let name = format!("{kind}_{n}");
            if !self.objects.iter().any(|o| o.name == name) {
                return name;
            }
            n += 1;
        }
    }
}

fn notify(observers: &[Rc<RefCell<dyn SceneObserver>>], event: SceneEvent<'_>) {
    for observer in observers {
        observer.borrow_mut().on_scene_event(event);
    }
}
