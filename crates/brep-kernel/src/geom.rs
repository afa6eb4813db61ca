//! Planes, plane frames, and 2-D polygons used at the contact interface.

use nalgebra::{Point2, Point3, Unit, Vector3};

/// Linear tolerance for coincidence tests, in millimeters.
pub const LINEAR_TOL: f64 = 1e-6;

/// Angular tolerance for parallelism tests, in radians.
pub const ANGULAR_TOL: f64 = 1e-9;

/// An oriented plane in 3-D space.
#[derive(Debug, Clone, Copy)]
pub struct Plane {
    pub point: Point3<f64>,
    pub normal: Unit<Vector3<f64>>,
}

impl Plane {
    pub fn new(point: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self {
            point,
            normal: Unit::new_normalize(normal),
        }
    }

    /// Signed distance from `p` to the plane, positive on the normal side.
    pub fn signed_distance(&self, p: &Point3<f64>) -> f64 {
        self.normal.dot(&(p - self.point))
    }

    /// True when the planes have parallel (or antiparallel) normals.
    pub fn is_parallel(&self, other: &Plane) -> bool {
        self.normal.cross(&other.normal).norm() < ANGULAR_TOL.sqrt()
    }

    /// True when the planes are parallel and occupy the same locus,
    /// regardless of normal orientation.
    pub fn is_coincident(&self, other: &Plane) -> bool {
        self.is_parallel(other) && self.signed_distance(&other.point).abs() < LINEAR_TOL
    }

    /// True when the planes are coincident with opposite outward normals,
    /// the configuration of two faces pressed together.
    pub fn is_mating(&self, other: &Plane) -> bool {
        self.is_coincident(other) && self.normal.dot(&other.normal) < 0.0
    }

    /// Angle between the planes' normals in degrees, in [0, 180].
    pub fn normal_angle_deg(&self, other: &Plane) -> f64 {
        self.normal
            .dot(&other.normal)
            .clamp(-1.0, 1.0)
            .acos()
            .to_degrees()
    }
}

/// An orthonormal 2-D coordinate frame embedded in a 3-D plane.
#[derive(Debug, Clone, Copy)]
pub struct PlaneFrame {
    pub origin: Point3<f64>,
    pub x: Unit<Vector3<f64>>,
    pub y: Unit<Vector3<f64>>,
}

impl PlaneFrame {
    pub fn new(origin: Point3<f64>, x: Vector3<f64>, y: Vector3<f64>) -> Self {
        Self {
            origin,
            x: Unit::new_normalize(x),
            y: Unit::new_normalize(y),
        }
    }

    pub fn normal(&self) -> Unit<Vector3<f64>> {
        Unit::new_normalize(self.x.cross(&self.y))
    }

    pub fn plane(&self) -> Plane {
        Plane {
            point: self.origin,
            normal: self.normal(),
        }
    }

    /// Map in-plane coordinates to a world point.
    pub fn to_world(&self, p: &Point2<f64>) -> Point3<f64> {
        self.origin + self.x.into_inner() * p.x + self.y.into_inner() * p.y
    }

    /// Project a world point into in-plane coordinates, dropping the
    /// out-of-plane component.
    pub fn to_plane(&self, p: &Point3<f64>) -> Point2<f64> {
        let d = p - self.origin;
        Point2::new(d.dot(&self.x), d.dot(&self.y))
    }
}

/// A simple (non-self-intersecting) polygon in plane coordinates,
/// counter-clockwise.
#[derive(Debug, Clone)]
pub struct Polygon(pub Vec<Point2<f64>>);

impl Polygon {
    pub fn rectangle(min: Point2<f64>, max: Point2<f64>) -> Self {
        Self(vec![
            min,
            Point2::new(max.x, min.y),
            max,
            Point2::new(min.x, max.y),
        ])
    }

    /// Shoelace area; counter-clockwise polygons are positive.
    pub fn signed_area(&self) -> f64 {
        let pts = &self.0;
        let n = pts.len();
        let mut acc = 0.0;
        for i in 0..n {
            let a = pts[i];
            let b = pts[(i + 1) % n];
            acc += a.x * b.y - b.x * a.y;
        }
        acc / 2.0
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    pub fn centroid(&self) -> Point2<f64> {
        let pts = &self.0;
        let n = pts.len();
        let a = self.signed_area();
        if a.abs() < LINEAR_TOL * LINEAR_TOL {
            // Degenerate; fall back to the vertex mean.
            let mut cx = 0.0;
            let mut cy = 0.0;
            for p in pts {
                cx += p.x;
                cy += p.y;
            }
            return Point2::new(cx / n as f64, cy / n as f64);
        }
        let mut cx = 0.0;
        let mut cy = 0.0;
        for i in 0..n {
            let p = pts[i];
            let q = pts[(i + 1) % n];
            let w = p.x * q.y - q.x * p.y;
            cx += (p.x + q.x) * w;
            cy += (p.y + q.y) * w;
        }
        Point2::new(cx / (6.0 * a), cy / (6.0 * a))
    }

    /// Axis-aligned bounds in plane coordinates.
    pub fn bounds(&self) -> (Point2<f64>, Point2<f64>) {
        let mut min = Point2::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in &self.0 {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        (min, max)
    }
}
