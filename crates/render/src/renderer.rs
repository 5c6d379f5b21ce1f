use glam::Vec3;
use std::fmt::Write;
use walkabout_common::Color;
use walkabout_scene::{Scene, Shape};

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 1.6, 0.0),
            target: Vec3::new(0.0, 1.6, -1.0),
            fov_degrees: 75.0,
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the scene and a view, then produces output. It never
/// mutates the scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given scene and view.
    fn render(&self, scene: &Scene, view: &RenderView) -> Self::Output;
}

/// Produces a human-readable listing of the scene. Used by the CLI and in
/// tests, where no GPU is available.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

fn hex(color: Color) -> String {
    format!("#{:06x}", color.0)
}

fn describe(shape: &Shape) -> String {
    match *shape {
        Shape::Plane { width, depth } => format!("plane {width}x{depth}"),
        Shape::Box {
            width,
            height,
            depth,
        } => format!("box {width}x{height}x{depth}"),
        Shape::Cylinder { radius, height } => format!("cylinder r={radius} h={height}"),
        Shape::Cone { radius, height } => format!("cone r={radius} h={height}"),
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene, view: &RenderView) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(
            out,
            "=== Scene (objects={}, layout={:#018x}) ===",
            scene.object_count(),
            scene.layout_hash()
        );
        let _ = writeln!(out, "Background: {}", hex(scene.background));
        match scene.fog {
            Some(fog) => {
                let _ = writeln!(
                    out,
                    "Fog: {} near={:.1} far={:.1}",
                    hex(fog.color),
                    fog.near,
                    fog.far
                );
            }
            None => {
                let _ = writeln!(out, "Fog: none");
            }
        }
        let sun = scene.sun.position;
        let _ = writeln!(
            out,
            "Lights: ambient {:.2}, directional {:.2} from ({:.1}, {:.1}, {:.1})",
            scene.ambient.intensity, scene.sun.intensity, sun.x, sun.y, sun.z
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.2}, {:.2}, {:.2}) target=({:.2}, {:.2}, {:.2}) fov={:.0}",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.target.x,
            view.target.y,
            view.target.z,
            view.fov_degrees
        );

        for (id, object) in scene.objects() {
            let p = object.transform.position;
            let _ = writeln!(
                out,
                "  [{:>3}] {:<12} {:<22} pos=({:.2}, {:.2}, {:.2}) {}",
                id.0,
                object.name,
                describe(&object.shape),
                p.x,
                p.y,
                p.z,
                hex(object.color)
            );
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use walkabout_common::Transform;

    #[test]
    fn debug_renderer_empty_scene() {
        let scene = Scene::new();
        let output = DebugTextRenderer::new().render(&scene, &RenderView::default());

        assert!(output.contains("objects=0"));
        assert!(output.contains("Fog: none"));
    }

    #[test]
    fn debug_renderer_demo_scene() {
        let scene = Scene::demo(3);
        let output = DebugTextRenderer::new().render(&scene, &RenderView::default());

        assert!(output.contains("objects=45"));
        assert!(output.contains("Background: #87ceeb"));
        assert!(output.contains("near=10.0 far=100.0"));
        assert!(output.contains("plane 100x100"));
        assert!(output.contains("box 2x1x6"));
        assert!(output.contains("cone r=1 h=3"));
        assert_eq!(output.matches("tree trunk").count(), 20);
    }

    #[test]
    fn debug_renderer_lists_positions() {
        let mut scene = Scene::new();
        scene.spawn(
            "marker",
            Shape::Box {
                width: 1.0,
                height: 1.0,
                depth: 1.0,
            },
            Transform::from_position(Vec3::new(1.0, 2.0, 3.0)),
            Color::from_hex(0xff0000),
        );
        let output = DebugTextRenderer::new().render(&scene, &RenderView::default());
        assert!(output.contains("pos=(1.00, 2.00, 3.00)"));
        assert!(output.contains("#ff0000"));
    }

    #[test]
    fn render_view_default() {
        let view = RenderView::default();
        assert_eq!(view.fov_degrees, 75.0);
        assert_eq!(view.eye.y, 1.6);
    }
}
