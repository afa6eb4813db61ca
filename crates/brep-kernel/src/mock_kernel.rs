//! MockKernel — deterministic test double implementing BrepKernel +
//! BrepIntrospect.
//!
//! Solids are axis-aligned rectangular plates; boolean operations record the
//! applied tool prisms and compute volumes analytically. Face handles and
//! overlap frames are derived deterministically from the plate geometry, so
//! identical inputs always produce identical handles, regions, and volumes.
//!
//! Assumes the tool prisms applied to one body are mutually disjoint, which
//! holds for finger patterns (segments partition the contact length).

use std::collections::HashMap;

use nalgebra::{Point2, Point3, Unit, Vector3};
use tracing::debug;

use crate::geom::{Plane, PlaneFrame, Polygon, LINEAR_TOL};
use crate::traits::{BrepIntrospect, BrepKernel};
use crate::types::{CornerRelief, FaceHandle, KernelError, SolidHandle, ToolSolid};
use tenon_types::FaceSelector;

/// Axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl Aabb {
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Self { min, max }
    }

    pub fn volume(&self) -> f64 {
        (0..3).map(|k| (self.max[k] - self.min[k]).max(0.0)).product()
    }

    /// Closed-box intersection; `None` when the boxes are strictly apart.
    pub fn intersect(&self, other: &Aabb) -> Option<Aabb> {
        let mut min = [0.0; 3];
        let mut max = [0.0; 3];
        for k in 0..3 {
            min[k] = self.min[k].max(other.min[k]);
            max[k] = self.max[k].min(other.max[k]);
            if max[k] < min[k] - LINEAR_TOL {
                return None;
            }
        }
        Some(Aabb { min, max })
    }

    fn center(&self, k: usize) -> f64 {
        (self.min[k] + self.max[k]) / 2.0
    }
}

/// A tool prism recorded against a plate by a boolean operation.
#[derive(Debug, Clone)]
pub struct AppliedTool {
    pub bbox: Aabb,
    pub reliefs: Vec<CornerRelief>,
}

#[derive(Debug, Clone)]
enum MockShape {
    Plate {
        base: Aabb,
        cuts: Vec<AppliedTool>,
        joins: Vec<AppliedTool>,
    },
    Tool {
        bbox: Aabb,
        reliefs: Vec<CornerRelief>,
    },
}

/// One of the six faces of a plate: `axis` is the normal axis, `positive`
/// its orientation.
#[derive(Debug, Clone, Copy)]
struct MockFace {
    solid: u64,
    axis: usize,
    positive: bool,
}

/// Deterministic test double for the geometry kernel.
pub struct MockKernel {
    next: u64,
    solids: HashMap<u64, MockShape>,
    faces: HashMap<u64, MockFace>,
    solid_faces: HashMap<u64, Vec<FaceHandle>>,
}

impl MockKernel {
    pub fn new() -> Self {
        Self {
            next: 1,
            solids: HashMap::new(),
            faces: HashMap::new(),
            solid_faces: HashMap::new(),
        }
    }

    /// Create an axis-aligned plate from corner to corner.
    pub fn create_plate(&mut self, min: [f64; 3], max: [f64; 3]) -> SolidHandle {
        let base = Aabb::new(min, max);
        self.register(MockShape::Plate {
            base,
            cuts: Vec::new(),
            joins: Vec::new(),
        })
    }

    /// Tool prisms subtracted from this revision, for test assertions.
    pub fn applied_cuts(&self, solid: &SolidHandle) -> &[AppliedTool] {
        match self.solids.get(&solid.id()) {
            Some(MockShape::Plate { cuts, .. }) => cuts,
            _ => &[],
        }
    }

    /// Tool prisms unioned into this revision, for test assertions.
    pub fn applied_joins(&self, solid: &SolidHandle) -> &[AppliedTool] {
        match self.solids.get(&solid.id()) {
            Some(MockShape::Plate { joins, .. }) => joins,
            _ => &[],
        }
    }

    fn alloc(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    fn register(&mut self, shape: MockShape) -> SolidHandle {
        let id = self.alloc();
        let is_plate = matches!(shape, MockShape::Plate { .. });
        self.solids.insert(id, shape);
        if is_plate {
            let mut handles = Vec::with_capacity(6);
            for axis in 0..3 {
                for positive in [false, true] {
                    let fid = self.alloc();
                    self.faces.insert(
                        fid,
                        MockFace {
                            solid: id,
                            axis,
                            positive,
                        },
                    );
                    handles.push(FaceHandle(fid));
                }
            }
            self.solid_faces.insert(id, handles);
        }
        SolidHandle(id)
    }

    fn shape(&self, solid: &SolidHandle) -> Result<&MockShape, KernelError> {
        self.solids
            .get(&solid.id())
            .ok_or(KernelError::EntityNotFound { id: solid.id() })
    }

    fn plate_base(&self, solid: &SolidHandle) -> Result<Aabb, KernelError> {
        match self.shape(solid)? {
            MockShape::Plate { base, .. } => Ok(*base),
            MockShape::Tool { .. } => Err(KernelError::NotSupported {
                operation: "face queries on tool solids".into(),
            }),
        }
    }

    fn face(&self, face: FaceHandle) -> Result<(MockFace, Aabb), KernelError> {
        let f = self
            .faces
            .get(&face.0)
            .copied()
            .ok_or(KernelError::EntityNotFound { id: face.0 })?;
        let base = self.plate_base(&SolidHandle(f.solid))?;
        Ok((f, base))
    }

    /// Outward normal of a plate face.
    fn face_normal(f: &MockFace) -> Vector3<f64> {
        let mut n = Vector3::zeros();
        n[f.axis] = if f.positive { 1.0 } else { -1.0 };
        n
    }

    /// In-plane axes of a plate face: the two world axes other than the
    /// normal axis, ordered so x cross y equals the outward normal.
    fn face_axes(f: &MockFace) -> (Vector3<f64>, Vector3<f64>) {
        let (i, j) = match f.axis {
            0 => (1, 2),
            1 => (2, 0),
            _ => (0, 1),
        };
        let mut x = Vector3::zeros();
        x[i] = 1.0;
        let n = Self::face_normal(f);
        let y = n.cross(&x);
        debug_assert_eq!(j, y.iamax());
        (x, y)
    }

    fn face_centroid(f: &MockFace, base: &Aabb) -> Point3<f64> {
        let mut c = [base.center(0), base.center(1), base.center(2)];
        c[f.axis] = if f.positive {
            base.max[f.axis]
        } else {
            base.min[f.axis]
        };
        Point3::new(c[0], c[1], c[2])
    }

    /// The face rectangle as a degenerate box on its plane.
    fn face_rect(f: &MockFace, base: &Aabb) -> Aabb {
        let mut min = base.min;
        let mut max = base.max;
        let coord = if f.positive {
            base.max[f.axis]
        } else {
            base.min[f.axis]
        };
        min[f.axis] = coord;
        max[f.axis] = coord;
        Aabb { min, max }
    }
}

impl Default for MockKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl BrepIntrospect for MockKernel {
    fn body_faces(&self, solid: &SolidHandle) -> Vec<FaceHandle> {
        self.solid_faces.get(&solid.id()).cloned().unwrap_or_default()
    }

    fn resolve_face(&self, solid: &SolidHandle, selector: &FaceSelector) -> Option<FaceHandle> {
        let handles = self.solid_faces.get(&solid.id())?;
        match selector {
            FaceSelector::OutwardNormal { direction } => {
                let dir = Vector3::new(direction[0], direction[1], direction[2]);
                let dir = Unit::try_new(dir, LINEAR_TOL)?;
                let mut best: Option<(f64, FaceHandle)> = None;
                for &h in handles {
                    let f = self.faces.get(&h.0)?;
                    let dot = Self::face_normal(f).dot(&dir);
                    if best.map_or(true, |(d, _)| dot > d) {
                        best = Some((dot, h));
                    }
                }
                best.filter(|(d, _)| *d > 0.99).map(|(_, h)| h)
            }
            FaceSelector::NearPoint { point } => {
                let p = Point3::new(point[0], point[1], point[2]);
                let base = self.plate_base(solid).ok()?;
                let mut best: Option<(f64, FaceHandle)> = None;
                for &h in handles {
                    let f = self.faces.get(&h.0)?;
                    let d = (Self::face_centroid(f, &base) - p).norm();
                    if best.map_or(true, |(bd, _)| d < bd) {
                        best = Some((d, h));
                    }
                }
                best.map(|(_, h)| h)
            }
        }
    }

    fn is_planar(&self, face: FaceHandle) -> bool {
        self.faces.contains_key(&face.0)
    }

    fn face_plane(&self, face: FaceHandle) -> Result<Plane, KernelError> {
        let (f, base) = self.face(face)?;
        Ok(Plane::new(
            Self::face_centroid(&f, &base),
            Self::face_normal(&f),
        ))
    }

    fn face_polygon(&self, face: FaceHandle) -> Result<(PlaneFrame, Polygon), KernelError> {
        let (f, base) = self.face(face)?;
        let (x, y) = Self::face_axes(&f);
        let frame = PlaneFrame::new(Self::face_centroid(&f, &base), x, y);
        let rect = Self::face_rect(&f, &base);
        let corners = [
            [rect.min[0], rect.min[1], rect.min[2]],
            [rect.max[0], rect.max[1], rect.max[2]],
        ];
        let a = frame.to_plane(&Point3::new(corners[0][0], corners[0][1], corners[0][2]));
        let b = frame.to_plane(&Point3::new(corners[1][0], corners[1][1], corners[1][2]));
        let min = Point2::new(a.x.min(b.x), a.y.min(b.y));
        let max = Point2::new(a.x.max(b.x), a.y.max(b.y));
        Ok((frame, Polygon::rectangle(min, max)))
    }

    fn adjacent_faces(&self, face: FaceHandle) -> Vec<FaceHandle> {
        let Some(f) = self.faces.get(&face.0) else {
            return Vec::new();
        };
        let Some(handles) = self.solid_faces.get(&f.solid) else {
            return Vec::new();
        };
        handles
            .iter()
            .copied()
            .filter(|h| {
                self.faces
                    .get(&h.0)
                    .is_some_and(|g| g.axis != f.axis)
            })
            .collect()
    }

    fn coplanar_overlap(
        &self,
        face_a: FaceHandle,
        face_b: FaceHandle,
    ) -> Result<Option<(PlaneFrame, Polygon)>, KernelError> {
        let (fa, base_a) = self.face(face_a)?;
        let (fb, base_b) = self.face(face_b)?;

        let plane_a = Plane::new(Self::face_centroid(&fa, &base_a), Self::face_normal(&fa));
        let plane_b = Plane::new(Self::face_centroid(&fb, &base_b), Self::face_normal(&fb));
        if !plane_a.is_mating(&plane_b) {
            return Ok(None);
        }

        let rect_a = Self::face_rect(&fa, &base_a);
        let rect_b = Self::face_rect(&fb, &base_b);
        let Some(overlap) = rect_a.intersect(&rect_b) else {
            return Ok(None);
        };

        // In-plane extents; the normal-axis extent of the overlap is zero.
        let (x, y) = Self::face_axes(&fa);
        let origin = Point3::new(overlap.center(0), overlap.center(1), overlap.center(2));
        let frame = PlaneFrame::new(origin, x, y);
        let lo = frame.to_plane(&Point3::new(overlap.min[0], overlap.min[1], overlap.min[2]));
        let hi = frame.to_plane(&Point3::new(overlap.max[0], overlap.max[1], overlap.max[2]));
        let min = Point2::new(lo.x.min(hi.x), lo.y.min(hi.y));
        let max = Point2::new(lo.x.max(hi.x), lo.y.max(hi.y));
        if (max.x - min.x) < LINEAR_TOL || (max.y - min.y) < LINEAR_TOL {
            return Ok(None);
        }
        Ok(Some((frame, Polygon::rectangle(min, max))))
    }

    fn volume(&self, solid: &SolidHandle) -> Result<f64, KernelError> {
        match self.shape(solid)? {
            MockShape::Tool { bbox, .. } => Ok(bbox.volume()),
            MockShape::Plate { base, cuts, joins } => {
                let mut v = base.volume();
                for cut in cuts {
                    if let Some(i) = cut.bbox.intersect(base) {
                        v -= i.volume();
                    }
                }
                for join in joins {
                    let inside = join
                        .bbox
                        .intersect(base)
                        .map(|i| i.volume())
                        .unwrap_or(0.0);
                    v += join.bbox.volume() - inside;
                }
                Ok(v)
            }
        }
    }
}

impl BrepKernel for MockKernel {
    fn make_tool_solid(&mut self, tool: &ToolSolid) -> Result<SolidHandle, KernelError> {
        let (a0, a1) = tool.axis_range;
        let (c0, c1) = tool.cross_range;
        if a1 - a0 < LINEAR_TOL || c1 - c0 < LINEAR_TOL || tool.depth < LINEAR_TOL {
            return Err(KernelError::Degenerate {
                reason: "zero-volume tool solid".into(),
            });
        }

        // The mock only materializes axis-aligned prisms.
        let axis_aligned = |v: &Vector3<f64>| v.abs().amax() > 1.0 - 1e-9;
        if !axis_aligned(tool.frame.x.as_ref()) || !axis_aligned(tool.frame.y.as_ref()) {
            return Err(KernelError::NotSupported {
                operation: "non-axis-aligned tool solid in MockKernel".into(),
            });
        }

        let n = tool.frame.normal();
        let corners = [
            tool.frame.to_world(&Point2::new(a0, c0)),
            tool.frame.to_world(&Point2::new(a1, c1)),
        ];
        let deep = [
            corners[0] - n.into_inner() * tool.depth,
            corners[1] - n.into_inner() * tool.depth,
        ];
        let mut min = [f64::INFINITY; 3];
        let mut max = [f64::NEG_INFINITY; 3];
        for p in corners.iter().chain(deep.iter()) {
            for k in 0..3 {
                min[k] = min[k].min(p[k]);
                max[k] = max[k].max(p[k]);
            }
        }

        Ok(self.register(MockShape::Tool {
            bbox: Aabb { min, max },
            reliefs: tool.reliefs.clone(),
        }))
    }

    fn boolean_subtract(
        &mut self,
        body: &SolidHandle,
        tool: &SolidHandle,
    ) -> Result<SolidHandle, KernelError> {
        let (tool_box, reliefs) = match self.shape(tool)? {
            MockShape::Tool { bbox, reliefs } => (*bbox, reliefs.clone()),
            MockShape::Plate { .. } => {
                return Err(KernelError::NotSupported {
                    operation: "subtracting a plate in MockKernel".into(),
                })
            }
        };
        let (base, mut cuts, joins) = match self.shape(body)? {
            MockShape::Plate { base, cuts, joins } => (*base, cuts.clone(), joins.clone()),
            MockShape::Tool { .. } => {
                return Err(KernelError::NotSupported {
                    operation: "cutting a tool solid in MockKernel".into(),
                })
            }
        };

        let mut removed = tool_box.intersect(&base).map(|i| i.volume()).unwrap_or(0.0);
        for cut in &cuts {
            if let Some(shared) = cut.bbox.intersect(&tool_box) {
                if let Some(inside) = shared.intersect(&base) {
                    removed -= inside.volume();
                }
            }
        }
        if removed < LINEAR_TOL {
            return Err(KernelError::BooleanFailed {
                reason: "subtraction removes no material".into(),
            });
        }

        debug!(body = body.id(), removed, "mock boolean subtract");
        cuts.push(AppliedTool {
            bbox: tool_box,
            reliefs,
        });
        Ok(self.register(MockShape::Plate { base, cuts, joins }))
    }

    fn boolean_union(
        &mut self,
        body: &SolidHandle,
        tool: &SolidHandle,
    ) -> Result<SolidHandle, KernelError> {
        let (tool_box, reliefs) = match self.shape(tool)? {
            MockShape::Tool { bbox, reliefs } => (*bbox, reliefs.clone()),
            MockShape::Plate { .. } => {
                return Err(KernelError::NotSupported {
                    operation: "unioning a plate in MockKernel".into(),
                })
            }
        };
        let (base, cuts, mut joins) = match self.shape(body)? {
            MockShape::Plate { base, cuts, joins } => (*base, cuts.clone(), joins.clone()),
            MockShape::Tool { .. } => {
                return Err(KernelError::NotSupported {
                    operation: "growing a tool solid in MockKernel".into(),
                })
            }
        };

        // A disjoint union would produce two lumps; the joint pipeline only
        // ever unions prisms that seat against the body.
        if tool_box.intersect(&base).is_none() {
            return Err(KernelError::BooleanFailed {
                reason: "union tool does not touch the target body".into(),
            });
        }
        let added = tool_box.volume()
            - tool_box.intersect(&base).map(|i| i.volume()).unwrap_or(0.0);
        if added < LINEAR_TOL {
            return Err(KernelError::BooleanFailed {
                reason: "union adds no material".into(),
            });
        }

        debug!(body = body.id(), added, "mock boolean union");
        joins.push(AppliedTool {
            bbox: tool_box,
            reliefs,
        });
        Ok(self.register(MockShape::Plate { base, cuts, joins }))
    }
}
