//! Integration tests for materials, render items and their constant blocks.

use glam::{Mat4, Vec3, Vec4};

use waveframe_resources::{
    Material, MaterialLibrary, ObjectConstants, RenderItem, ResourceError,
};

const FRAMES: usize = 3;

fn library() -> MaterialLibrary {
    let mut library = MaterialLibrary::new();
    library
        .insert(Material::new("grass", 0, FRAMES).with_diffuse_albedo(Vec4::new(0.2, 0.6, 0.2, 1.0)))
        .unwrap();
    library
        .insert(
            Material::new("water", 1, FRAMES)
                .with_diffuse_albedo(Vec4::new(0.0, 0.2, 0.6, 0.5))
                .with_fresnel_r0(Vec3::splat(0.1))
                .with_roughness(0.0),
        )
        .unwrap();
    library
}

#[test]
fn test_library_keeps_insertion_order() {
    let library = library();
    let names: Vec<&str> = library.iter().map(Material::name).collect();
    assert_eq!(names, ["grass", "water"]);
    assert_eq!(library.len(), 2);
    assert_eq!(library.get("water").unwrap().cb_index(), 1);
}

#[test]
fn test_duplicate_and_unknown_names() {
    let mut library = library();
    assert_eq!(
        library.insert(Material::new("grass", 5, FRAMES)),
        Err(ResourceError::DuplicateMaterial("grass".into()))
    );
    assert_eq!(library.len(), 2);
    assert!(matches!(
        library.get_mut("lava"),
        Err(ResourceError::UnknownMaterial(name)) if name == "lava"
    ));
}

#[test]
fn test_only_changed_material_turns_dirty() {
    let mut library = library();
    for material in library.iter_mut() {
        while material.dirty_mut().consume() {}
    }

    library.get_mut("water").unwrap().scroll_texture(0.1, 0.0);
    let dirty: Vec<usize> = library.iter().map(|m| m.dirty().remaining()).collect();
    assert_eq!(dirty, [0, FRAMES]);
}

#[test]
fn test_render_item_constants_follow_setters() {
    let mut item = RenderItem::new(2, 1, FRAMES);
    while item.dirty_mut().consume() {}

    let world = Mat4::from_translation(Vec3::new(0.0, -2.0, 0.0));
    item.set_world(world);
    item.set_material_index(0);
    assert_eq!(item.dirty().remaining(), FRAMES);
    assert_eq!(
        item.constants(),
        ObjectConstants::new(world, Mat4::IDENTITY, 0)
    );
}
