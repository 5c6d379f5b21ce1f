/// WGSL shader for instanced scene meshes: lambert lighting plus linear fog.
pub const SCENE_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    eye: vec4<f32>,
    // xyz: unit vector towards the sun, w: sun intensity
    sun: vec4<f32>,
    // rgb: sun colour, a: ambient intensity
    sun_color: vec4<f32>,
    ambient_color: vec4<f32>,
    fog_color: vec4<f32>,
    // x: near, y: far, z: 1 when fog is enabled
    fog: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_normal: vec3<f32>,
    @location(1) world_position: vec3<f32>,
    @location(2) color: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);
    // Dividing by the squared axis scale turns the TRS model matrix into
    // its inverse transpose for normals.
    let scale_sq = vec3<f32>(
        dot(instance.model_0.xyz, instance.model_0.xyz),
        dot(instance.model_1.xyz, instance.model_1.xyz),
        dot(instance.model_2.xyz, instance.model_2.xyz),
    );
    let world_normal = (model * vec4<f32>(vertex.normal / scale_sq, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world_pos;
    out.world_normal = normalize(world_normal);
    out.world_position = world_pos.xyz;
    out.color = instance.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let diffuse = max(dot(in.world_normal, uniforms.sun.xyz), 0.0) * uniforms.sun.w;
    let light = uniforms.ambient_color.rgb * uniforms.sun_color.a
        + uniforms.sun_color.rgb * diffuse;
    var rgb = in.color.rgb * light;

    if (uniforms.fog.z > 0.5) {
        let distance = length(in.world_position - uniforms.eye.xyz);
        let span = max(uniforms.fog.y - uniforms.fog.x, 0.0001);
        let f = clamp((distance - uniforms.fog.x) / span, 0.0, 1.0);
        rgb = mix(rgb, uniforms.fog_color.rgb, f);
    }
    return vec4<f32>(rgb, in.color.a);
}
"#;
