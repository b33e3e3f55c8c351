use crate::error::{DirectorError, DirectorResult};
use crate::layout::Bounds;
use crate::script::{lerp, AttrPatch, Color, Geometry, ObjectSpec, ShapeSpec, Vec2};
use std::collections::{BTreeSet, HashMap};
use std::ops::BitOr;

/// Set of attribute kinds touched by an animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PropertyMask(u8);

impl PropertyMask {
    pub const NONE: Self = Self(0);
    pub const POSITION: Self = Self(1);
    pub const SCALE: Self = Self(1 << 1);
    pub const COLOR: Self = Self(1 << 2);
    pub const OPACITY: Self = Self(1 << 3);
    pub const FILL: Self = Self(1 << 4);
    pub const STROKE: Self = Self(1 << 5);
    pub const GEOMETRY: Self = Self(1 << 6);
    pub const ALL: Self = Self(0x7f);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for PropertyMask {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Resolved, animatable state of a visual object
#[derive(Debug, Clone, PartialEq)]
pub struct Attributes {
    pub geometry: Geometry,
    pub position: Vec2,
    pub scale: f32,
    pub color: Color,
    pub opacity: f32,
    pub fill_opacity: f32,
    pub stroke_width: f32,
    pub gradient: Vec<Color>,
}

impl Attributes {
    pub fn from_shape(shape: &ShapeSpec) -> Self {
        let style = &shape.style;
        Self {
            geometry: shape.geometry.clone(),
            position: style.position,
            scale: style.scale,
            color: style.color,
            opacity: style.opacity,
            fill_opacity: style.fill_opacity,
            stroke_width: style.stroke_width,
            gradient: style.gradient.clone(),
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::around(self.position, self.geometry.size() * self.scale)
    }

    /// Interpolate every attribute from `self` toward `to`
    pub fn interpolate(&self, to: &Attributes, t: f32) -> Attributes {
        Attributes {
            geometry: self.geometry.lerp(&to.geometry, t),
            position: self.position.lerp(to.position, t),
            scale: lerp(self.scale, to.scale, t),
            color: self.color.lerp(to.color, t),
            opacity: lerp(self.opacity, to.opacity, t),
            fill_opacity: lerp(self.fill_opacity, to.fill_opacity, t),
            stroke_width: lerp(self.stroke_width, to.stroke_width, t),
            gradient: if t < 0.5 {
                self.gradient.clone()
            } else {
                to.gradient.clone()
            },
        }
    }

    /// Copy the masked attributes of `src` over `self`
    pub fn overlay(&mut self, src: &Attributes, mask: PropertyMask) {
        if mask.contains(PropertyMask::GEOMETRY) {
            self.geometry = src.geometry.clone();
            self.gradient = src.gradient.clone();
        }
        if mask.contains(PropertyMask::POSITION) {
            self.position = src.position;
        }
        if mask.contains(PropertyMask::SCALE) {
            self.scale = src.scale;
        }
        if mask.contains(PropertyMask::COLOR) {
            self.color = src.color;
        }
        if mask.contains(PropertyMask::OPACITY) {
            self.opacity = src.opacity;
        }
        if mask.contains(PropertyMask::FILL) {
            self.fill_opacity = src.fill_opacity;
        }
        if mask.contains(PropertyMask::STROKE) {
            self.stroke_width = src.stroke_width;
        }
    }

    /// Scale about `pivot` by `factor`
    pub fn scaled_about(&self, pivot: Vec2, factor: f32) -> Attributes {
        let mut out = self.clone();
        out.position = pivot + (self.position - pivot) * factor;
        out.scale *= factor;
        out
    }

    /// Apply an `animate` patch; `pivot` is the centre of the animated target
    pub fn patched(&self, patch: &AttrPatch, pivot: Vec2) -> Attributes {
        let mut out = match patch.scale {
            Some(factor) => self.scaled_about(pivot, factor),
            None => self.clone(),
        };
        if let Some(point) = patch.move_to {
            out.position += point - pivot;
        } else if let Some(delta) = patch.shift {
            out.position += delta;
        }
        if let Some(color) = patch.color {
            out.color = color;
        }
        if let Some(opacity) = patch.opacity {
            out.opacity = opacity;
        }
        if let Some(fill) = patch.fill_opacity {
            out.fill_opacity = fill;
        }
        if let Some(width) = patch.stroke_width {
            out.stroke_width = width;
        }
        out
    }
}

/// Attributes an animate patch can touch
pub fn patch_mask(patch: &AttrPatch) -> PropertyMask {
    let mut mask = PropertyMask::NONE;
    if patch.move_to.is_some() || patch.shift.is_some() || patch.scale.is_some() {
        mask = mask | PropertyMask::POSITION;
    }
    if patch.scale.is_some() {
        mask = mask | PropertyMask::SCALE;
    }
    if patch.color.is_some() {
        mask = mask | PropertyMask::COLOR;
    }
    if patch.opacity.is_some() {
        mask = mask | PropertyMask::OPACITY;
    }
    if patch.fill_opacity.is_some() {
        mask = mask | PropertyMask::FILL;
    }
    if patch.stroke_width.is_some() {
        mask = mask | PropertyMask::STROKE;
    }
    mask
}

/// An object currently on stage
#[derive(Debug, Clone)]
pub struct VisualObject {
    pub id: String,
    pub attrs: Attributes,
    /// Member ids; non-empty only for groups
    pub members: Vec<String>,
}

impl VisualObject {
    pub fn is_group(&self) -> bool {
        matches!(self.attrs.geometry, Geometry::Group)
    }
}

/// The set of visual objects currently on stage, in z-order
#[derive(Debug, Default)]
pub struct Scene {
    objects: HashMap<String, VisualObject>,
    order: Vec<String>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.objects.contains_key(id)
    }

    pub fn get(&self, id: &str) -> DirectorResult<&VisualObject> {
        self.objects
            .get(id)
            .ok_or_else(|| DirectorError::UnknownObject(id.to_string()))
    }

    /// Ids on stage, in z-order
    pub fn ids(&self) -> &[String] {
        &self.order
    }

    pub fn live_ids(&self) -> BTreeSet<String> {
        self.order.iter().cloned().collect()
    }

    /// Put a declared object (and its children) on stage.
    ///
    /// Returns the ids introduced, parent first.
    pub fn insert_spec(&mut self, spec: &ObjectSpec) -> DirectorResult<Vec<String>> {
        for object in spec.flatten() {
            if self.contains(&object.id) {
                return Err(DirectorError::DuplicateObject(object.id.clone()));
            }
        }
        let mut introduced = Vec::new();
        self.insert_recursive(spec, &mut introduced);
        Ok(introduced)
    }

    fn insert_recursive(&mut self, spec: &ObjectSpec, introduced: &mut Vec<String>) {
        let object = VisualObject {
            id: spec.id.clone(),
            attrs: Attributes::from_shape(&spec.shape),
            members: spec.children.iter().map(|c| c.id.clone()).collect(),
        };
        self.order.push(spec.id.clone());
        self.objects.insert(spec.id.clone(), object);
        introduced.push(spec.id.clone());
        for child in &spec.children {
            self.insert_recursive(child, introduced);
        }
    }

    /// Bundle existing objects under a new group id
    pub fn insert_group(&mut self, id: &str, members: &[String]) -> DirectorResult<()> {
        if self.contains(id) {
            return Err(DirectorError::DuplicateObject(id.to_string()));
        }
        for member in members {
            self.get(member)?;
        }
        let center = self.bounds_of_members(members).center();
        let mut attrs = Attributes::from_shape(&ShapeSpec {
            geometry: Geometry::Group,
            style: Default::default(),
        });
        attrs.position = center;
        self.order.push(id.to_string());
        self.objects.insert(
            id.to_string(),
            VisualObject {
                id: id.to_string(),
                attrs,
                members: members.to_vec(),
            },
        );
        Ok(())
    }

    /// Take an object off stage; groups take their members with them.
    ///
    /// Returns every id removed.
    pub fn remove(&mut self, id: &str) -> DirectorResult<Vec<String>> {
        self.get(id)?;
        let mut doomed = vec![id.to_string()];
        self.collect_descendants(id, &mut doomed);
        let doomed: Vec<String> = {
            let mut seen = BTreeSet::new();
            doomed.into_iter().filter(|d| seen.insert(d.clone())).collect()
        };

        for gone in &doomed {
            self.objects.remove(gone);
        }
        self.order.retain(|o| !doomed.contains(o));
        for object in self.objects.values_mut() {
            object.members.retain(|m| !doomed.contains(m));
        }
        Ok(doomed)
    }

    fn collect_descendants(&self, id: &str, out: &mut Vec<String>) {
        if let Some(object) = self.objects.get(id) {
            for member in &object.members {
                if self.objects.contains_key(member) {
                    out.push(member.clone());
                    self.collect_descendants(member, out);
                }
            }
        }
    }

    /// Non-group objects under `id` (itself when it is not a group), deduplicated
    pub fn leaves(&self, id: &str) -> DirectorResult<Vec<String>> {
        let object = self.get(id)?;
        if !object.is_group() {
            return Ok(vec![id.to_string()]);
        }
        let mut out = Vec::new();
        let mut seen = BTreeSet::new();
        self.collect_leaves(object, &mut out, &mut seen);
        Ok(out)
    }

    fn collect_leaves(&self, group: &VisualObject, out: &mut Vec<String>, seen: &mut BTreeSet<String>) {
        for member in &group.members {
            let Some(object) = self.objects.get(member) else {
                continue;
            };
            if object.is_group() {
                self.collect_leaves(object, out, seen);
            } else if seen.insert(member.clone()) {
                out.push(member.clone());
            }
        }
    }

    pub fn attrs(&self, id: &str) -> DirectorResult<&Attributes> {
        Ok(&self.get(id)?.attrs)
    }

    pub fn set_attrs(&mut self, id: &str, attrs: Attributes) -> DirectorResult<()> {
        let object = self
            .objects
            .get_mut(id)
            .ok_or_else(|| DirectorError::UnknownObject(id.to_string()))?;
        object.attrs = attrs;
        Ok(())
    }

    /// World bounds of an object; groups cover their leaves
    pub fn bounds(&self, id: &str) -> DirectorResult<Bounds> {
        let object = self.get(id)?;
        if !object.is_group() {
            return Ok(object.attrs.bounds());
        }
        let leaves = self.leaves(id)?;
        if leaves.is_empty() {
            return Ok(Bounds::around(object.attrs.position, Vec2::ZERO));
        }
        Ok(self.bounds_of_members(&leaves))
    }

    pub fn center(&self, id: &str) -> DirectorResult<Vec2> {
        Ok(self.bounds(id)?.center())
    }

    fn bounds_of_members(&self, members: &[String]) -> Bounds {
        members
            .iter()
            .filter_map(|m| self.bounds(m).ok())
            .reduce(|acc, b| acc.union(&b))
            .unwrap_or_else(|| Bounds::around(Vec2::ZERO, Vec2::ZERO))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle(id: &str, x: f32) -> ObjectSpec {
        let mut spec = ObjectSpec::new(id, Geometry::Circle { radius: 0.5 });
        spec.style_mut().position = Vec2::new(x, 0.0);
        spec
    }

    #[test]
    fn test_insert_and_duplicate() {
        let mut scene = Scene::new();
        let ids = scene.insert_spec(&circle("a", 0.0)).unwrap();
        assert_eq!(ids, vec!["a"]);
        assert!(matches!(
            scene.insert_spec(&circle("a", 1.0)),
            Err(DirectorError::DuplicateObject(id)) if id == "a"
        ));
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_group_spec_inserts_children() {
        let mut scene = Scene::new();
        let group = ObjectSpec::group("g", vec![circle("a", -1.0), circle("b", 1.0)]);
        let ids = scene.insert_spec(&group).unwrap();
        assert_eq!(ids, vec!["g", "a", "b"]);
        assert_eq!(scene.leaves("g").unwrap(), vec!["a", "b"]);
        assert_eq!(scene.center("g").unwrap(), Vec2::ZERO);
    }

    #[test]
    fn test_remove_group_removes_members() {
        let mut scene = Scene::new();
        scene.insert_spec(&circle("a", -1.0)).unwrap();
        scene.insert_spec(&circle("b", 1.0)).unwrap();
        scene.insert_spec(&circle("c", 3.0)).unwrap();
        scene
            .insert_group("world", &["a".to_string(), "b".to_string()])
            .unwrap();

        let removed = scene.remove("world").unwrap();
        assert_eq!(removed, vec!["world", "a", "b"]);
        assert_eq!(scene.ids(), &["c".to_string()]);
    }

    #[test]
    fn test_remove_member_updates_groups() {
        let mut scene = Scene::new();
        scene
            .insert_spec(&ObjectSpec::group("g", vec![circle("a", 0.0), circle("b", 2.0)]))
            .unwrap();
        scene.remove("a").unwrap();
        assert_eq!(scene.get("g").unwrap().members, vec!["b"]);
    }

    #[test]
    fn test_unknown_object() {
        let scene = Scene::new();
        assert!(matches!(scene.get("ghost"), Err(DirectorError::UnknownObject(_))));
        let mut scene = scene;
        assert!(scene.insert_group("g", &["ghost".to_string()]).is_err());
    }

    #[test]
    fn test_nested_group_leaves_dedup() {
        let mut scene = Scene::new();
        scene
            .insert_spec(&ObjectSpec::group("grid", vec![circle("c0", 0.0), circle("c1", 1.0)]))
            .unwrap();
        scene
            .insert_group("world", &["grid".to_string(), "c1".to_string()])
            .unwrap();
        assert_eq!(scene.leaves("world").unwrap(), vec!["c0", "c1"]);
    }

    #[test]
    fn test_patch_scales_about_pivot() {
        let attrs = Attributes::from_shape(&circle("a", 2.0).shape);
        let out = attrs.patched(&AttrPatch::default().scale(2.0), Vec2::ZERO);
        assert_eq!(out.position, Vec2::new(4.0, 0.0));
        assert_eq!(out.scale, 2.0);

        let moved = attrs.patched(&AttrPatch::default().move_to(Vec2::new(0.0, 1.0)), Vec2::new(2.0, 0.0));
        assert_eq!(moved.position, Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_overlay_respects_mask() {
        let base = Attributes::from_shape(&circle("a", 0.0).shape);
        let mut other = base.clone();
        other.opacity = 0.0;
        other.position = Vec2::new(5.0, 5.0);

        let mut out = base.clone();
        out.overlay(&other, PropertyMask::OPACITY);
        assert_eq!(out.opacity, 0.0);
        assert_eq!(out.position, Vec2::ZERO);
    }

    #[test]
    fn test_patch_mask() {
        let mask = patch_mask(&AttrPatch::default().scale(1.1).opacity(0.6));
        assert!(mask.contains(PropertyMask::SCALE));
        assert!(mask.contains(PropertyMask::POSITION));
        assert!(mask.contains(PropertyMask::OPACITY));
        assert!(!mask.contains(PropertyMask::COLOR));
    }
}
