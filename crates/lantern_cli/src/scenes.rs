//! Built-in demo scenes.

use std::f32::consts::PI;
use std::sync::Arc;

use lantern_renderer::{
    make_box, Color, Dielectric, DiffuseLight, HittableList, Lambertian, Material, Metal, Quad,
    RenderSettings, RotateY, Sphere, Translate, Vec3,
};

/// Scenes selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ScenePreset {
    /// Classic Cornell box with a rotated block and a glass sphere
    CornellBox,
    /// A red sphere on a grey ground plane under a sky
    SimpleSphere,
    /// Glass containment around a glowing core, orbiting chrome spheres
    QuantumLab,
}

impl ScenePreset {
    pub fn build(self) -> Scene {
        match self {
            ScenePreset::CornellBox => cornell_box(),
            ScenePreset::SimpleSphere => simple_sphere(),
            ScenePreset::QuantumLab => quantum_lab(),
        }
    }
}

/// Geometry to render, the light aggregate sampled for next-event
/// directions, and the settings the scene was framed for.
pub struct Scene {
    pub world: HittableList,
    pub lights: HittableList,
    pub settings: RenderSettings,
}

fn lambertian(r: f32, g: f32, b: f32) -> Arc<dyn Material> {
    Arc::new(Lambertian::new(Color::new(r, g, b)))
}

fn diffuse_light(r: f32, g: f32, b: f32) -> Arc<dyn Material> {
    Arc::new(DiffuseLight::new(Color::new(r, g, b)))
}

pub fn cornell_box() -> Scene {
    let mut world = HittableList::new();

    let red = lambertian(0.65, 0.05, 0.05);
    let white = lambertian(0.73, 0.73, 0.73);
    let green = lambertian(0.12, 0.45, 0.15);
    let light = diffuse_light(15.0, 15.0, 15.0);

    // Walls
    let walls = [
        (Vec3::new(555.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 555.0), Vec3::new(0.0, 555.0, 0.0), green),
        (Vec3::new(0.0, 0.0, 555.0), Vec3::new(0.0, 0.0, -555.0), Vec3::new(0.0, 555.0, 0.0), red),
        (Vec3::new(0.0, 555.0, 0.0), Vec3::new(555.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 555.0), white.clone()),
        (Vec3::new(0.0, 0.0, 555.0), Vec3::new(555.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -555.0), white.clone()),
        (Vec3::new(555.0, 0.0, 555.0), Vec3::new(-555.0, 0.0, 0.0), Vec3::new(0.0, 555.0, 0.0), white.clone()),
    ];
    for (q, u, v, material) in walls {
        world.add(Quad::new(q, u, v, material));
    }

    // Ceiling light
    world.add(Quad::new(
        Vec3::new(213.0, 554.0, 227.0),
        Vec3::new(130.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 105.0),
        light,
    ));

    let block = make_box(Vec3::ZERO, Vec3::new(165.0, 330.0, 165.0), white);
    let block = RotateY::new(block, 15.0);
    world.add(Translate::new(block, Vec3::new(265.0, 0.0, 295.0)));

    world.add(Sphere::new(Vec3::new(190.0, 90.0, 190.0), 90.0, Arc::new(Dielectric::new(1.5))));

    // Sample the light and the glass sphere
    let mut lights = HittableList::new();
    lights.add(Quad::light_target(
        Vec3::new(343.0, 554.0, 332.0),
        Vec3::new(-130.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, -105.0),
    ));
    lights.add(Sphere::light_target(Vec3::new(190.0, 90.0, 190.0), 90.0));

    let settings = RenderSettings::default()
        .with_resolution(600, 1.0)
        .with_quality(1000, 50)
        .with_position(
            Vec3::new(278.0, 278.0, -800.0),
            Vec3::new(278.0, 278.0, 0.0),
            Vec3::Y,
        )
        .with_lens(40.0, 0.0, 10.0)
        .with_background(Color::ZERO);

    Scene {
        world,
        lights,
        settings,
    }
}

pub fn simple_sphere() -> Scene {
    let mut world = HittableList::new();

    world.add(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0, lambertian(0.8, 0.2, 0.2)));
    world.add(Quad::new(
        Vec3::new(-50.0, 0.0, -50.0),
        Vec3::new(100.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 100.0),
        lambertian(0.5, 0.5, 0.5),
    ));

    // Invisible: steers bounces towards the sky above the sphere
    let mut lights = HittableList::new();
    lights.add(Quad::light_target(
        Vec3::new(-2.0, 4.0, -2.0),
        Vec3::new(4.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 4.0),
    ));

    let settings = RenderSettings::default()
        .with_resolution(800, 16.0 / 9.0)
        .with_quality(1000, 40)
        .with_position(Vec3::new(6.0, 4.0, 6.0), Vec3::ZERO, Vec3::Y)
        .with_lens(30.0, 0.0, 10.0)
        .with_background(Color::new(0.7, 0.8, 1.0));

    Scene {
        world,
        lights,
        settings,
    }
}

/// Flat strip of `width` on the floor from `start` to `end`.
fn floor_strip(start: Vec3, end: Vec3, width: f32, material: Arc<dyn Material>) -> Quad {
    let direction = end - start;
    let across = Vec3::Y.cross(direction).normalize() * width;
    Quad::new(start, direction, across, material)
}

pub fn quantum_lab() -> Scene {
    let mut world = HittableList::new();
    let mut lights = HittableList::new();

    let glass: Arc<dyn Material> = Arc::new(Dielectric::new(1.5));
    let tinted_glass: Arc<dyn Material> = Arc::new(Dielectric::new(1.7));
    let chrome: Arc<dyn Material> = Arc::new(Metal::new(Color::new(0.9, 0.9, 1.0), 0.1));
    let floor_metal: Arc<dyn Material> = Arc::new(Metal::new(Color::new(0.7, 0.7, 0.8), 0.1));
    let glow_blue = diffuse_light(0.2, 0.4, 15.0);
    let glow_white = diffuse_light(10.0, 10.0, 10.0);

    // Glass enclosure, six panels around the core
    let size = 7.0;
    let thickness = 0.2;
    let (bottom, top) = (5.0 - size, 5.0 + size);
    let panels = [
        (Vec3::new(-size, top, -size), Vec3::new(size, top + thickness, size)),
        (Vec3::new(-size, bottom, -size), Vec3::new(size, bottom + thickness, size)),
        (Vec3::new(-size, bottom, size), Vec3::new(size, top, size + thickness)),
        (Vec3::new(-size, bottom, -size - thickness), Vec3::new(size, top, -size)),
        (Vec3::new(-size - thickness, bottom, -size), Vec3::new(-size, top, size)),
        (Vec3::new(size, bottom, -size), Vec3::new(size + thickness, top, size)),
    ];
    for (a, b) in panels {
        world.add(make_box(a, b, glass.clone()));
    }

    // Nested shells around the glowing core
    let core = Vec3::new(0.0, 5.0, 0.0);
    world.add(Sphere::new(core, 5.0, glass.clone()));
    world.add(Sphere::new(core, 4.5, tinted_glass));
    world.add(Sphere::new(core, 3.5, glass));
    world.add(Sphere::new(core, 2.0, glow_blue));
    lights.add(Sphere::light_target(core, 2.0));

    // Orbiting chrome spheres, each circled by a ring of small lights
    let orbits = [
        (15.0, 8.0, PI / 6.0),
        (18.0, 12.0, 4.0 * PI / 3.0),
        (12.0, 15.0, 3.0 * PI / 4.0),
        (20.0, 6.0, 7.0 * PI / 4.0),
        (16.0, 10.0, 3.0 * PI / 2.0),
        (14.0, 5.0, PI / 2.0),
        (17.0, 7.0, PI),
        (19.0, 9.0, 5.0 * PI / 4.0),
    ];
    let ring_light = diffuse_light(3.0, 3.0, 3.5);
    let ring_segments = 20;
    for (radius, height, angle) in orbits {
        let center = Vec3::new(radius * angle.cos(), height, radius * angle.sin());
        world.add(Sphere::new(center, 1.5, floor_metal.clone()));

        for segment in 0..ring_segments {
            let theta = segment as f32 * 2.0 * PI / ring_segments as f32;
            let bead = center + 2.4 * Vec3::new(theta.cos(), 0.0, theta.sin());
            world.add(Sphere::new(bead, 0.2, ring_light.clone()));
            lights.add(Sphere::light_target(bead, 0.2));
        }
    }

    // Chrome pylons standing on glowing pads
    for i in 0..4 {
        let angle = i as f32 * PI / 2.0;
        let base = Vec3::new(10.0 * angle.cos(), 0.0, 10.0 * angle.sin());

        let pylon = make_box(Vec3::new(-0.5, -0.5, -0.5), Vec3::new(0.5, 8.0, 0.5), chrome.clone());
        world.add(Translate::new(pylon, base));

        let pad = make_box(Vec3::new(-1.0, -0.1, -1.0), Vec3::new(1.0, 0.0, 1.0), glow_white.clone());
        world.add(Translate::new(pad, base));
        lights.add(Quad::light_target(
            base - Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 2.0),
        ));
    }

    // Reflective platform with concentric rings and radial spokes
    world.add(Quad::new(
        Vec3::new(-15.0, -0.1, -15.0),
        Vec3::new(30.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 30.0),
        floor_metal,
    ));
    for ring in 1..=3 {
        let radius = ring as f32 * 4.0;
        let segments = 16 * ring;
        for i in 0..segments {
            let a1 = i as f32 * 2.0 * PI / segments as f32;
            let a2 = (i + 1) as f32 * 2.0 * PI / segments as f32;
            let p1 = Vec3::new(radius * a1.cos(), 0.01, radius * a1.sin());
            let p2 = Vec3::new(radius * a2.cos(), 0.01, radius * a2.sin());
            world.add(floor_strip(p1, p2, 0.2, chrome.clone()));
        }
    }
    for i in 0..8 {
        let angle = i as f32 * PI / 4.0;
        let start = Vec3::new(0.0, 0.02, 0.0);
        let end = Vec3::new(12.0 * angle.cos(), 0.02, 12.0 * angle.sin());
        world.add(floor_strip(start, end, 0.1, chrome.clone()));
    }

    let settings = RenderSettings::default()
        .with_resolution(800, 1.0)
        .with_quality(800, 40)
        .with_position(Vec3::new(25.0, 20.0, 25.0), Vec3::new(0.0, 10.0, 0.0), Vec3::Y)
        .with_lens(45.0, 0.4, 30.0)
        .with_background(Color::new(0.02, 0.02, 0.04));

    Scene {
        world,
        lights,
        settings,
    }
}
