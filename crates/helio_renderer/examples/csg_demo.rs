//! Boolean-solid showcase.
//!
//! Renders a hollow sphere, a lens, and a bitten sphere over a striped
//! floor, then writes the result to a PNG.

use helio_renderer::{
    render, BoolOp, BvhNode, Camera, Color, Csg, DirectionalLight, Mat4, Plane, PointLight,
    Primitive, RenderConfig, Scene, Shader, Solid, Sphere, Stripes, Vec3,
};
use std::path::Path;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let scene = build_scene();

    let mut camera = Camera::new()
        .with_resolution(800, 450)
        .with_position(
            Vec3::new(0.0, 2.5, 8.0),
            Vec3::new(0.0, 0.5, 0.0),
            Vec3::Y,
        )
        .with_lens(40.0);
    camera.initialize();

    let config = RenderConfig {
        samples_per_pixel: 16,
    };

    let image = render(&camera, &scene, &config);

    let filename = "csg_demo.png";
    image.save_png(Path::new(filename))?;
    println!("Saved to {filename}");

    Ok(())
}

fn build_scene() -> Scene {
    let red = Arc::new(Shader::flat(Color::new(0.8, 0.2, 0.2)).with_phong(0.1, 0.7, 0.3, 32.0));
    let blue = Arc::new(Shader::flat(Color::new(0.2, 0.3, 0.8)).with_phong(0.1, 0.7, 0.3, 32.0));
    let mirror = Arc::new(Shader::flat(Color::new(0.9, 0.9, 0.9)).with_reflection(0.6));

    let mut objects: Vec<Box<dyn Primitive>> = Vec::new();

    // Hollow sphere with a window cut into it, showing the inner wall
    let shell = Csg::new(
        one_sphere(Vec3::ZERO, 1.0, &red),
        one_sphere(Vec3::ZERO, 0.8, &red),
        BoolOp::Difference,
    );
    let mut carved = Csg::new(
        csg_solid(shell),
        one_sphere(Vec3::new(0.7, 0.4, 0.7), 0.6, &red),
        BoolOp::Difference,
    );
    carved.transform(&Mat4::from_translation(Vec3::new(-2.2, 1.0, 0.0)));
    objects.push(Box::new(carved));

    // Lens: the shared volume of two overlapping spheres
    let mut lens = Csg::new(
        one_sphere(Vec3::new(-0.4, 0.0, 0.0), 1.0, &blue),
        one_sphere(Vec3::new(0.4, 0.0, 0.0), 1.0, &blue),
        BoolOp::Intersection,
    );
    lens.transform(&Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0)));
    objects.push(Box::new(lens));

    // Mirrored sphere with a bite taken out
    let mut bitten = Csg::new(
        one_sphere(Vec3::ZERO, 1.0, &mirror),
        one_sphere(Vec3::new(0.8, 0.8, 0.4), 0.8, &mirror),
        BoolOp::Difference,
    );
    bitten.transform(&Mat4::from_translation(Vec3::new(2.2, 1.0, 0.0)));
    objects.push(Box::new(bitten));

    // Striped floor
    let floor = Arc::new(
        Shader::textured(Arc::new(Stripes::new(
            Color::new(0.9, 0.9, 0.9),
            Color::new(0.2, 0.2, 0.2),
            0.5,
        )))
        .with_phong(0.15, 0.85, 0.0, 0.0),
    );
    objects.push(Box::new(Plane::new(Vec3::ZERO, Vec3::Y, floor)));

    let mut scene =
        Scene::new(Box::new(BvhNode::new(objects))).with_background(Color::new(0.05, 0.05, 0.1));
    scene.add_light(Box::new(PointLight::new(
        Vec3::new(4.0, 6.0, 4.0),
        Color::splat(40.0),
    )));
    scene.add_light(Box::new(DirectionalLight::new(
        Vec3::new(-0.3, -1.0, -0.2),
        Color::splat(0.3),
    )));

    scene
}

fn one_sphere(center: Vec3, radius: f32, shader: &Arc<Shader>) -> Solid {
    let mut solid = Solid::new();
    solid.add(Box::new(Sphere::new(center, radius, Arc::clone(shader))));
    solid
}

fn csg_solid(csg: Csg) -> Solid {
    let mut solid = Solid::new();
    solid.add(Box::new(csg));
    solid
}
