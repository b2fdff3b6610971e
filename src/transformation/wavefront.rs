use crate::input::InputMesh;
use crate::math::{Point, Real};
use crate::shape::ConvexHull;
use crate::DecompositionError;
use obj::{Group, IndexTuple, Obj, ObjData, ObjError, Object, SimplePolygon};
use std::path::Path;

impl ConvexHull {
    /// Outputs a Wavefront (`.obj`) file at the given path.
    ///
    /// This function is enabled by the `wavefront` feature flag.
    pub fn to_obj_file(&self, path: impl AsRef<Path>) -> Result<(), ObjError> {
        let mut file = std::fs::File::create(path).map_err(ObjError::Io)?;

        ObjData {
            position: self
                .points()
                .iter()
                .map(|v| [v.x as f32, v.y as f32, v.z as f32])
                .collect(),
            objects: vec![Object {
                groups: vec![Group {
                    polys: self
                        .indices()
                        .iter()
                        .map(|tri| {
                            SimplePolygon(vec![
                                IndexTuple(tri[0] as usize, None, None),
                                IndexTuple(tri[1] as usize, None, None),
                                IndexTuple(tri[2] as usize, None, None),
                            ])
                        })
                        .collect(),
                    name: "".to_string(),
                    index: 0,
                    material: None,
                }],
                name: "".to_string(),
            }],
            ..Default::default()
        }
        .write_to_buf(&mut file)
    }
}

impl InputMesh {
    /// Loads a mesh from a Wavefront (`.obj`) file.
    ///
    /// Polygons with more than three vertices are triangulated as fans, and every object
    /// and group of the file is merged into a single mesh.
    ///
    /// This function is enabled by the `wavefront` feature flag.
    pub fn from_obj_file(path: impl AsRef<Path>) -> Result<Self, DecompositionError> {
        let obj = Obj::load(path.as_ref()).map_err(|e| {
            DecompositionError::invalid_input(format!(
                "failed to load `{}`: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let points: Vec<Point<Real>> = obj
            .data
            .position
            .iter()
            .map(|p| Point::new(p[0] as Real, p[1] as Real, p[2] as Real))
            .collect();
        let mut triangles = Vec::new();

        for group in obj.data.objects.iter().flat_map(|o| &o.groups) {
            for poly in &group.polys {
                let Some((first, rest)) = poly.0.split_first() else {
                    continue;
                };

                for pair in rest.windows(2) {
                    triangles.push([first.0 as u32, pair[0].0 as u32, pair[1].0 as u32]);
                }
            }
        }

        InputMesh::new(points, triangles)
    }
}
