use std::path::Path;

use super::*;

/// A fully loaded, preprocessed scene (§3, §4.11): owns every mesh, material,
/// primitive, and light, plus the acceleration structure and reconstruction
/// filter built over them. Grounded in the original's `Scene::preprocess` /
/// `createPrimitives` / `createAreaLights`.
pub struct Scene {
    meshes: Vec<TriangleMesh>,
    materials: Vec<Material>,
    shapes: Vec<Triangle>,
    lights: Vec<AreaLight>,
    light_selector: UniformLightSelector,
    camera: Camera,
    bvh: Bvh,
    filter: GaussianFilter,
}

impl Scene {
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn filter(&self) -> &GaussianFilter {
        &self.filter
    }

    pub fn lights(&self) -> &[AreaLight] {
        &self.lights
    }

    pub fn light_selector(&self) -> &UniformLightSelector {
        &self.light_selector
    }

    pub fn material(&self, shape: u32) -> &Material {
        &self.materials[self.shapes[shape as usize].material as usize]
    }

    pub fn light(&self, shape: u32) -> Option<&AreaLight> {
        let light_id = self.shapes[shape as usize].area_light?;
        Some(&self.lights[light_id as usize])
    }

    fn positions(&self, shape: u32) -> [Point3; 3] {
        let tri = &self.shapes[shape as usize];
        self.meshes[tri.mesh as usize].face_positions(tri.face)
    }

    fn normals(&self, shape: u32) -> [Normal; 3] {
        let tri = &self.shapes[shape as usize];
        self.meshes[tri.mesh as usize].face_normals(tri.face)
    }

    fn tex_coords(&self, shape: u32) -> [Point2; 3] {
        let tri = &self.shapes[shape as usize];
        self.meshes[tri.mesh as usize].face_tex_coords(tri.face)
    }

    pub fn shape_area(&self, shape: u32) -> f32 {
        let tri = &self.shapes[shape as usize];
        self.meshes[tri.mesh as usize].face_area(tri.face)
    }

    /// Uniformly samples a point on a triangle primitive; pdf is with respect
    /// to area (§4.1, §4.5).
    pub fn sample_shape(&self, shape: u32, u: (f32, f32)) -> (Point3, Normal, f32) {
        let positions = self.positions(shape);
        let normals = self.normals(shape);
        let (b1, b2) = sampling::triangle_uniform(u.0, u.1);
        let b0 = 1.0 - b1 - b2;
        let p = Point3::from(b0 * positions[0].coords + b1 * positions[1].coords + b2 * positions[2].coords);
        let n = normal!(b0 * normals[0].into_inner() + b1 * normals[1].into_inner() + b2 * normals[2].into_inner());
        let area = self.shape_area(shape);
        (p, n, 1.0 / area)
    }

    /// Closest-hit query against the whole scene (§4.11), completing the
    /// winning triangle hit into a full [`Intersection`].
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        let hit = self.bvh.closest_hit(ray, |shape, ray| {
            let positions = self.positions(shape);
            triangle::intersect_triangle(ray, &positions).map(|(t, _)| t)
        })?;

        let (shape, t) = hit;
        let positions = self.positions(shape);
        let mut local_ray = *ray;
        local_ray.t_max = f32::INFINITY;
        let (_, bary) = triangle::intersect_triangle(&local_ray, &positions)?;

        let normals = self.normals(shape);
        let tex_coords = self.tex_coords(shape);

        let p = ray.at(t);
        let n = normal!(
            bary.x * normals[0].into_inner()
                + bary.y * normals[1].into_inner()
                + bary.z * normals[2].into_inner()
        );
        let ng = normal!((positions[1] - positions[0]).cross(&(positions[2] - positions[0])));
        let uv = Point2::from(
            bary.x * tex_coords[0].coords + bary.y * tex_coords[1].coords + bary.z * tex_coords[2].coords,
        );

        Some(Intersection {
            p,
            n,
            ng,
            uv,
            tangent: sampling::OrthonormalBasis::new(&n),
            shape,
            t,
        })
    }

    /// Shadow-ray query between two surface points, offset along their
    /// respective normals to avoid self-intersection (§4.11).
    pub fn unoccluded(&self, p0: &Point3, n0: &Normal, p1: &Point3, n1: &Normal) -> bool {
        let p0 = p0 + 1e-4 * n0.into_inner();
        let p1 = p1 + 1e-4 * n1.into_inner();
        let d = p1 - p0;
        let dist = d.norm();
        if dist < 1e-8 {
            return true;
        }
        let ray = Ray::with_range(p0, normal!(d / dist), 0.0, dist * (1.0 - 1e-4));
        !self.bvh.any_hit(&ray, |shape, ray| {
            let positions = self.positions(shape);
            triangle::intersect_triangle(ray, &positions).is_some()
        })
    }

    /// Loads `{scene_dir}/{name}.obj` (geometry + materials, via `tobj`) and
    /// `{scene_dir}/{name}.ron` (camera + area-light radiance sidecar), then
    /// builds the BVH and binds lights to their emitting triangles — the
    /// Rust-native counterpart of `loadOBJ` + `loadXML` + `preprocess`.
    pub fn load(scene_dir: &Path, name: &str) -> anyhow::Result<Self> {
        let obj_path = scene_dir.join(format!("{name}.obj"));
        let config_path = scene_dir.join(format!("{name}.ron"));

        let config: config::SceneConfig = {
            let text = std::fs::read_to_string(&config_path)
                .with_context(|| format!("reading scene config {}", config_path.display()))?;
            ron::from_str(&text)
                .with_context(|| format!("parsing scene config {}", config_path.display()))?
        };

        let (obj_models, obj_materials) = tobj::load_obj(
            &obj_path,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )
        .with_context(|| format!("loading OBJ {}", obj_path.display()))?;
        let obj_materials = obj_materials.context("loading OBJ materials")?;

        ensure!(!obj_models.is_empty(), "scene {name} contains no meshes");

        let materials = obj_materials
            .iter()
            .map(|m| {
                let diffuse = m.diffuse.unwrap_or([0.5, 0.5, 0.5]);
                let specular = m.specular.unwrap_or([0.0, 0.0, 0.0]);
                Material::new(
                    m.name.clone(),
                    ColorRgb::new(diffuse[0], diffuse[1], diffuse[2]),
                    ColorRgb::new(specular[0], specular[1], specular[2]),
                    m.shininess.unwrap_or(1.0).max(1.0),
                )
            })
            .collect::<Vec<_>>();

        let mut meshes = Vec::with_capacity(obj_models.len());
        let mut shapes = Vec::new();
        for (mesh_id, model) in obj_models.iter().enumerate() {
            let mesh = &model.mesh;
            ensure!(
                mesh.indices.len() % 3 == 0,
                "mesh {} has a non-triangulated face",
                model.name
            );

            let positions = mesh
                .positions
                .chunks_exact(3)
                .map(|p| point![p[0], p[1], p[2]])
                .collect::<Vec<_>>();
            let normals = if mesh.normals.is_empty() {
                vec![normal!(0.0, 1.0, 0.0); positions.len()]
            } else {
                mesh.normals
                    .chunks_exact(3)
                    .map(|n| normal!(n[0], n[1], n[2]))
                    .collect::<Vec<_>>()
            };
            let tex_coords = mesh
                .texcoords
                .chunks_exact(2)
                .map(|uv| point![uv[0], uv[1]])
                .collect::<Vec<_>>();
            let faces = mesh
                .indices
                .chunks_exact(3)
                .map(|f| [f[0], f[1], f[2]])
                .collect::<Vec<_>>();
            let face_count = faces.len();
            let material_ids = if mesh.material_id.is_some() {
                vec![mesh.material_id.unwrap() as u32; face_count]
            } else {
                vec![0; face_count]
            };

            for face in 0..face_count as u32 {
                shapes.push(Triangle {
                    mesh: mesh_id as u32,
                    face,
                    material: material_ids[face as usize],
                    area_light: None,
                });
            }

            meshes.push(TriangleMesh {
                positions,
                normals,
                tex_coords,
                faces,
                material_ids,
            });
        }

        // Bind area lights to every triangle whose material name matches a
        // light entry in the sidecar, mirroring `createAreaLights`.
        let mut lights = Vec::new();
        for light_config in &config.lights {
            let material_id = materials
                .iter()
                .position(|m| m.name == light_config.material)
                .with_context(|| format!("no material named {} for area light", light_config.material))?
                as u32;

            for (shape_id, shape) in shapes.iter_mut().enumerate() {
                if shape.material != material_id {
                    continue;
                }
                let area = meshes[shape.mesh as usize].face_area(shape.face);
                let light_id = lights.len() as u32;
                lights.push(AreaLight::new(
                    shape_id as u32,
                    ColorRgb::new(
                        light_config.radiance[0],
                        light_config.radiance[1],
                        light_config.radiance[2],
                    ),
                    area,
                ));
                shape.area_light = Some(light_id);
            }
        }

        let aabbs = shapes
            .iter()
            .map(|shape| {
                let positions = meshes[shape.mesh as usize].face_positions(shape.face);
                Aabb::from_points(&positions)
            })
            .collect::<Vec<_>>();
        let centers = aabbs.iter().map(Aabb::center).collect::<Vec<_>>();
        let bvh = bvh::build(&aabbs, &centers);

        let camera = Camera::new(
            point![config.camera.eye[0], config.camera.eye[1], config.camera.eye[2]],
            point![config.camera.lookat[0], config.camera.lookat[1], config.camera.lookat[2]],
            vector![config.camera.up[0], config.camera.up[1], config.camera.up[2]],
            config.camera.fov_y_degrees,
            config.camera.width,
            config.camera.height,
        );

        Ok(Self {
            meshes,
            materials,
            light_selector: UniformLightSelector::new(lights.len()),
            lights,
            shapes,
            camera,
            bvh,
            filter: GaussianFilter::default(),
        })
    }
}
