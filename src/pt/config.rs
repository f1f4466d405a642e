use super::*;

/// RON sidecar loaded alongside a scene's `.obj` (§3.1, §9.1): camera placement
/// and the material-name -> radiance bindings that turn OBJ materials into
/// area lights. Stands in for the original's XML scene description.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneConfig {
    pub camera: CameraConfig,
    #[serde(default)]
    pub lights: Vec<LightConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CameraConfig {
    pub eye: [f32; 3],
    pub lookat: [f32; 3],
    pub up: [f32; 3],
    pub fov_y_degrees: f32,
    pub width: u32,
    pub height: u32,
}

/// Binds every triangle carrying material `material` to an emitter of uniform
/// `radiance`, mirroring `createAreaLights`'s material-name matching.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LightConfig {
    pub material: String,
    pub radiance: [f32; 3],
}
