//! Instancing Tests
//!
//! Tests for:
//! - Content hashing of link locations
//! - Copying a canonical subtree into its instances
//! - Name re-rooting and selection index registration
//! - Leaf sharing and subtree independence

use std::sync::Arc;

use glam::Vec3;

use scene_shape::preview::{BuildOptions, PreviewBuild, PreviewSceneBuilder, Primitive};
use scene_shape::scene::{
    AttributeValue, LINK_FILE_NAME_ATTRIBUTE, LINK_ROOT_ATTRIBUTE, LINK_TIME_ATTRIBUTE,
    LocationKey, MemorySceneBuilder, MeshPrimitive, PointsPrimitive, SceneHandle, SceneObject,
};
use scene_shape::utils::ObjectPool;

fn link(builder: &mut MemorySceneBuilder, key: LocationKey, file: &str, time: f64) {
    builder
        .set_attribute(key, LINK_FILE_NAME_ATTRIBUTE, 0.0, file)
        .set_attribute(
            key,
            LINK_ROOT_ATTRIBUTE,
            0.0,
            AttributeValue::StringVector(vec!["/".into()]),
        )
        .set_attribute(key, LINK_TIME_ATTRIBUTE, 0.0, time);
}

/// `/assetA` and `/assetB` link the same content; `/assetC` links it at a
/// different time. `/assetB/geo` is never read, its canonical is copied.
fn fixture() -> SceneHandle {
    let mut builder = MemorySceneBuilder::new();

    let a = builder.location("/assetA");
    link(&mut builder, a, "tree.scc", 0.0);
    let geo = builder.location("/assetA/geo");
    builder.set_object(geo, 0.0, SceneObject::Mesh(MeshPrimitive::plane(1.0)));
    let leaf = builder.location("/assetA/geo/leaf");
    builder.set_object(
        leaf,
        0.0,
        SceneObject::Points(PointsPrimitive::new(vec![Vec3::ZERO])),
    );

    let b = builder.location("/assetB");
    link(&mut builder, b, "tree.scc", 0.0);
    let stale = builder.location("/assetB/geo");
    builder.set_object(
        stale,
        0.0,
        SceneObject::Points(PointsPrimitive::new(vec![Vec3::ONE])),
    );

    let c = builder.location("/assetC");
    link(&mut builder, c, "tree.scc", 1.0);

    builder.build().handle()
}

fn build(root: &SceneHandle) -> PreviewBuild {
    let pool = ObjectPool::default();
    PreviewSceneBuilder::new(&BuildOptions::default(), 0.0, &pool)
        .build(root)
        .expect("preview build")
}

fn first_primitive(build: &PreviewBuild, name: &str) -> Arc<Primitive> {
    let outer = build.selection.group(name).unwrap();
    build
        .scene
        .depth_first()
        .into_iter()
        .filter(|key| build.scene.is_ancestor(outer, *key) || *key == outer)
        .find_map(|key| build.scene.group(key).unwrap().primitives().next().cloned())
        .unwrap()
}

// ============================================================================
// Naming
// ============================================================================

#[test]
fn instance_names_are_appended_after_build_order() {
    let build = build(&fixture());
    assert_eq!(
        build.selection.names(),
        &[
            "/".to_string(),
            "/assetA".into(),
            "/assetA/geo".into(),
            "/assetA/geo/leaf".into(),
            "/assetB".into(),
            "/assetC".into(),
            "/assetB/geo".into(),
            "/assetB/geo/leaf".into(),
        ]
    );
    assert_eq!(build.stats.instances, 1);
}

#[test]
fn instance_indices_round_trip() {
    let build = build(&fixture());
    for (i, name) in build.selection.names().iter().enumerate() {
        assert_eq!(build.selection.index_of(name), Some(i), "index of '{name}'");
    }
}

#[test]
fn different_link_time_is_not_an_instance() {
    let build = build(&fixture());
    let c = build.selection.group("/assetC").unwrap();
    assert!(build.selection.group("/assetC/geo").is_none());
    // Canonical with an empty target: nothing below but its own content group.
    assert_eq!(build.scene.primitive_count(c), 0);
}

// ============================================================================
// Sharing
// ============================================================================

#[test]
fn instance_shares_canonical_leaves() {
    let build = build(&fixture());
    let canonical = first_primitive(&build, "/assetA/geo");
    let copy = first_primitive(&build, "/assetB/geo");
    assert!(Arc::ptr_eq(&canonical, &copy));
    assert!(
        matches!(copy.as_ref(), Primitive::Mesh(_)),
        "the instance's own children are not read"
    );
}

#[test]
fn copied_groups_are_independent() {
    let mut build = build(&fixture());
    let canonical = build.selection.group("/assetA/geo").unwrap();
    let copy = build.selection.group("/assetB/geo").unwrap();
    assert_ne!(canonical, copy);
    let before = build.scene.primitive_count(canonical);

    build.scene.remove_group(copy);
    assert!(!build.scene.contains(copy));
    assert!(build.scene.contains(canonical));
    assert_eq!(build.scene.primitive_count(canonical), before);
}

#[test]
fn copied_transforms_match_canonical() {
    let build = build(&fixture());
    let canonical = build.selection.group("/assetA/geo/leaf").unwrap();
    let copy = build.selection.group("/assetB/geo/leaf").unwrap();
    assert_eq!(
        build.scene.group(canonical).unwrap().transform,
        build.scene.group(copy).unwrap().transform
    );
}

// ============================================================================
// Nesting
// ============================================================================

#[test]
fn instance_inside_its_canonical_is_skipped() {
    let mut builder = MemorySceneBuilder::new();
    let outer = builder.location("/outer");
    link(&mut builder, outer, "loop.scc", 0.0);
    let inner = builder.location("/outer/inner");
    link(&mut builder, inner, "loop.scc", 0.0);
    let root = builder.build().handle();

    let build = build(&root);
    assert_eq!(build.stats.instances, 0);
    assert_eq!(
        build.selection.names(),
        &["/".to_string(), "/outer".into(), "/outer/inner".into()]
    );
}
