use crate::camera::FirstPersonCamera;
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use std::collections::BTreeMap;
use std::f32::consts::TAU;
use std::ops::Range;
use wgpu::util::DeviceExt;
use walkabout_scene::{MeshKind, Scene};

/// Segments around cylinders and cones.
const RADIAL_SEGMENTS: u16 = 8;

const MESH_KINDS: [MeshKind; 4] = [
    MeshKind::Plane,
    MeshKind::Box,
    MeshKind::Cylinder,
    MeshKind::Cone,
];

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    eye: [f32; 4],
    sun: [f32; 4],
    sun_color: [f32; 4],
    ambient_color: [f32; 4],
    fog_color: [f32; 4],
    fog: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    color: [f32; 4],
}

/// Unit plane in XZ facing +Y.
fn plane_mesh() -> (Vec<Vertex>, Vec<u16>) {
    let p = 0.5_f32;
    let n = [0.0, 1.0, 0.0];
    #[rustfmt::skip]
    let vertices = vec![
        Vertex { position: [-p, 0.0, -p], normal: n },
        Vertex { position: [p, 0.0, -p], normal: n },
        Vertex { position: [p, 0.0, p], normal: n },
        Vertex { position: [-p, 0.0, p], normal: n },
    ];
    (vertices, vec![0, 3, 2, 2, 1, 0])
}

/// Generate unit cube vertices and indices.
fn cube_mesh() -> (Vec<Vertex>, Vec<u16>) {
    let p = 0.5_f32;
    #[rustfmt::skip]
    let vertices = vec![
        // +Z face
        Vertex { position: [-p, -p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [ p, -p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [ p,  p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [-p,  p,  p], normal: [0.0, 0.0, 1.0] },
        // -Z face
        Vertex { position: [ p, -p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [-p, -p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [-p,  p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [ p,  p, -p], normal: [0.0, 0.0, -1.0] },
        // +X face
        Vertex { position: [ p, -p,  p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p, -p, -p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p,  p, -p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p,  p,  p], normal: [1.0, 0.0, 0.0] },
        // -X face
        Vertex { position: [-p, -p, -p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p, -p,  p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p,  p,  p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p,  p, -p], normal: [-1.0, 0.0, 0.0] },
        // +Y face
        Vertex { position: [-p,  p,  p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [ p,  p,  p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [ p,  p, -p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [-p,  p, -p], normal: [0.0, 1.0, 0.0] },
        // -Y face
        Vertex { position: [-p, -p, -p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [ p, -p, -p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [ p, -p,  p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [-p, -p,  p], normal: [0.0, -1.0, 0.0] },
    ];
    #[rustfmt::skip]
    let indices: Vec<u16> = vec![
        0,1,2, 2,3,0,       // +Z
        4,5,6, 6,7,4,       // -Z
        8,9,10, 10,11,8,    // +X
        12,13,14, 14,15,12, // -X
        16,17,18, 18,19,16, // +Y
        20,21,22, 22,23,20, // -Y
    ];
    (vertices, indices)
}

/// Unit-height solid of revolution around Y, centred on the origin.
/// A zero `top_radius` gives a cone.
fn lathe_mesh(top_radius: f32, bottom_radius: f32, segments: u16) -> (Vec<Vertex>, Vec<u16>) {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    let (top, bottom) = (0.5_f32, -0.5_f32);
    // Side normal tilts up by the radius change over the unit height.
    let slope = bottom_radius - top_radius;

    for i in 0..=segments {
        let theta = i as f32 / segments as f32 * TAU;
        let (sin, cos) = theta.sin_cos();
        let len = (1.0 + slope * slope).sqrt();
        let normal = [cos / len, slope / len, sin / len];
        vertices.push(Vertex {
            position: [cos * bottom_radius, bottom, sin * bottom_radius],
            normal,
        });
        vertices.push(Vertex {
            position: [cos * top_radius, top, sin * top_radius],
            normal,
        });
    }
    for i in 0..segments {
        let (b0, t0, b1, t1) = (2 * i, 2 * i + 1, 2 * i + 2, 2 * i + 3);
        indices.extend_from_slice(&[b0, t0, b1, b1, t0, t1]);
    }

    let mut cap = |y: f32, radius: f32, up: bool| {
        let normal = [0.0, if up { 1.0 } else { -1.0 }, 0.0];
        let center = vertices.len() as u16;
        vertices.push(Vertex {
            position: [0.0, y, 0.0],
            normal,
        });
        for i in 0..segments {
            let theta = i as f32 / segments as f32 * TAU;
            let (sin, cos) = theta.sin_cos();
            vertices.push(Vertex {
                position: [cos * radius, y, sin * radius],
                normal,
            });
        }
        for i in 0..segments {
            let a = center + 1 + i;
            let b = center + 1 + (i + 1) % segments;
            if up {
                indices.extend_from_slice(&[center, b, a]);
            } else {
                indices.extend_from_slice(&[center, a, b]);
            }
        }
    };
    if top_radius > 0.0 {
        cap(top, top_radius, true);
    }
    if bottom_radius > 0.0 {
        cap(bottom, bottom_radius, false);
    }

    (vertices, indices)
}

fn mesh_data(kind: MeshKind) -> (Vec<Vertex>, Vec<u16>) {
    match kind {
        MeshKind::Plane => plane_mesh(),
        MeshKind::Box => cube_mesh(),
        MeshKind::Cylinder => lathe_mesh(1.0, 1.0, RADIAL_SEGMENTS),
        MeshKind::Cone => lathe_mesh(0.0, 1.0, RADIAL_SEGMENTS),
    }
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

/// Scene objects grouped by mesh, laid out contiguously for one instance buffer.
fn build_instances(
    scene: &Scene,
    max: usize,
) -> (Vec<InstanceData>, BTreeMap<MeshKind, Range<u32>>) {
    let mut grouped: BTreeMap<MeshKind, Vec<InstanceData>> = BTreeMap::new();
    for object in scene.objects().values().take(max) {
        let cols = object.model_matrix().to_cols_array_2d();
        grouped
            .entry(object.shape.mesh())
            .or_default()
            .push(InstanceData {
                model_0: cols[0],
                model_1: cols[1],
                model_2: cols[2],
                model_3: cols[3],
                color: object.color.to_linear_rgba(),
            });
    }

    let mut instances = Vec::new();
    let mut ranges = BTreeMap::new();
    for (kind, group) in grouped {
        let start = instances.len() as u32;
        instances.extend(group);
        ranges.insert(kind, start..instances.len() as u32);
    }
    (instances, ranges)
}

fn scene_uniforms(scene: &Scene, camera: &FirstPersonCamera) -> Uniforms {
    let eye = camera.position();
    let sun = scene.sun.direction();
    let [sr, sg, sb, _] = scene.sun.color.to_linear_rgba();
    let [ar, ag, ab, _] = scene.ambient.color.to_linear_rgba();
    let (fog_color, fog) = match scene.fog {
        Some(fog) => (fog.color.to_linear_rgba(), [fog.near, fog.far, 1.0, 0.0]),
        None => ([0.0; 4], [0.0; 4]),
    };
    Uniforms {
        view_proj: camera.view_projection().to_cols_array_2d(),
        eye: [eye.x, eye.y, eye.z, 1.0],
        sun: [sun.x, sun.y, sun.z, scene.sun.intensity],
        sun_color: [sr, sg, sb, scene.ambient.intensity],
        ambient_color: [ar, ag, ab, 1.0],
        fog_color,
        fog,
    }
}

/// wgpu-based scene renderer.
pub struct WgpuRenderer {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    meshes: BTreeMap<MeshKind, GpuMesh>,
    instance_buffer: wgpu::Buffer,
    max_instances: u32,
    depth_texture: wgpu::TextureView,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
                ..Uniforms::zeroed()
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SCENE_SHADER.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("scene_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![
                            0 => Float32x3,
                            1 => Float32x3,
                        ],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceData>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            2 => Float32x4,
                            3 => Float32x4,
                            4 => Float32x4,
                            5 => Float32x4,
                            6 => Float32x4,
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let mut meshes = BTreeMap::new();
        for kind in MESH_KINDS {
            let (verts, indices) = mesh_data(kind);
            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh_vertex_buffer"),
                contents: bytemuck::cast_slice(&verts),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh_index_buffer"),
                contents: bytemuck::cast_slice(&indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            meshes.insert(
                kind,
                GpuMesh {
                    vertex_buffer,
                    index_buffer,
                    index_count: indices.len() as u32,
                },
            );
        }

        // Instance buffer (pre-allocated)
        let max_instances = 10_000u32;
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: (max_instances as u64) * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_texture = Self::create_depth_texture(device, width, height);

        Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            meshes,
            instance_buffer,
            max_instances,
            depth_texture,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        tracing::debug!(width, height, "recreating depth buffer");
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    /// Render one frame of the scene from the camera.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        camera: &FirstPersonCamera,
        scene: &Scene,
    ) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&scene_uniforms(scene, camera)),
        );

        let (instances, ranges) = build_instances(scene, self.max_instances as usize);
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        let [r, g, b, _] = scene.background.to_linear_rgba();
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            for (kind, range) in ranges {
                let Some(mesh) = self.meshes.get(&kind) else {
                    continue;
                };
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..mesh.index_count, 0, range);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn check_indices(vertices: &[Vertex], indices: &[u16]) {
        assert_eq!(indices.len() % 3, 0);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    /// Every triangle should face the same way as its vertex normals.
    fn check_winding(vertices: &[Vertex], indices: &[u16]) {
        for tri in indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| vertices[i as usize]);
            let pa = Vec3::from(a.position);
            let face = (Vec3::from(b.position) - pa).cross(Vec3::from(c.position) - pa);
            let normal = Vec3::from(a.normal) + Vec3::from(b.normal) + Vec3::from(c.normal);
            if face.length_squared() > 1e-12 {
                assert!(face.dot(normal) > 0.0, "triangle {tri:?} faces inward");
            }
        }
    }

    #[test]
    fn meshes_are_well_formed() {
        for kind in MESH_KINDS {
            let (v, i) = mesh_data(kind);
            check_indices(&v, &i);
            check_winding(&v, &i);
        }
    }

    #[test]
    fn cone_has_no_top_cap() {
        let (cylinder, _) = lathe_mesh(1.0, 1.0, RADIAL_SEGMENTS);
        let (cone, _) = lathe_mesh(0.0, 1.0, RADIAL_SEGMENTS);
        let caps = RADIAL_SEGMENTS as usize + 1;
        assert_eq!(cylinder.len() - cone.len(), caps);
    }

    #[test]
    fn instances_grouped_by_mesh() {
        let scene = Scene::demo(11);
        let (instances, ranges) = build_instances(&scene, 10_000);
        assert_eq!(instances.len(), scene.object_count());
        assert_eq!(ranges[&MeshKind::Plane].len(), 1);
        assert_eq!(ranges[&MeshKind::Box].len(), 4);
        assert_eq!(ranges[&MeshKind::Cylinder].len(), 20);
        assert_eq!(ranges[&MeshKind::Cone].len(), 20);
        let covered: usize = ranges.values().map(|r| r.len()).sum();
        assert_eq!(covered, instances.len());
    }

    #[test]
    fn instance_cap_is_respected() {
        let scene = Scene::demo(11);
        let (instances, _) = build_instances(&scene, 5);
        assert_eq!(instances.len(), 5);
    }

    #[test]
    fn uniforms_carry_fog_and_lights() {
        let scene = Scene::demo(0);
        let camera = FirstPersonCamera::default();
        let u = scene_uniforms(&scene, &camera);
        assert_eq!(u.fog[..3], [10.0, 100.0, 1.0]);
        assert_eq!(u.sun[3], 0.8);
        assert_eq!(u.sun_color[3], 0.5);
        assert_eq!(u.eye[1], 1.6);

        let bare = scene_uniforms(&Scene::new(), &camera);
        assert_eq!(bare.fog[2], 0.0);
    }

    #[test]
    fn uniform_layout_is_aligned() {
        assert_eq!(std::mem::size_of::<Uniforms>() % 16, 0);
    }
}
