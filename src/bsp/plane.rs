// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Splitting planes and free-standing triangles

use nalgebra::{Point3, Vector3};

/// Side of a plane a point or facet lies on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceClass {
    /// Positive side
    Front,
    /// Negative side
    Back,
    /// Within the epsilon band
    Coplanar,
    /// Vertices on both sides
    Spanning,
}

/// Triangle carried by position rather than by index.
///
/// Splitting creates new points, so the partitioner works on facets and
/// only the final composition step goes back to an indexed mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Facet {
    pub positions: [Point3<f64>; 3],
}

impl Facet {
    pub fn new(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Self {
        Self {
            positions: [a, b, c],
        }
    }

    /// Unnormalized normal
    pub fn cross(&self) -> Vector3<f64> {
        let [a, b, c] = &self.positions;
        (b - a).cross(&(c - a))
    }

    pub fn area(&self) -> f64 {
        self.cross().norm() * 0.5
    }

    /// Unit normal, `None` for a degenerate facet
    pub fn normal(&self) -> Option<Vector3<f64>> {
        self.cross().try_normalize(f64::EPSILON)
    }

    pub fn centroid(&self) -> Point3<f64> {
        let [a, b, c] = &self.positions;
        Point3::from((a.coords + b.coords + c.coords) / 3.0)
    }

    /// Same facet with reversed winding
    pub fn flipped(&self) -> Self {
        let [a, b, c] = self.positions;
        Self::new(a, c, b)
    }
}

/// Plane `normal · p + offset = 0` with a unit normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vector3<f64>,
    pub offset: f64,
}

impl Plane {
    pub fn new(normal: Vector3<f64>, offset: f64) -> Self {
        Self { normal, offset }
    }

    /// Plane through three points, counter-clockwise seen from the front.
    ///
    /// Returns `None` when the cross product of the edge vectors is shorter
    /// than `min_cross` (collinear or coincident points).
    pub fn from_points(
        a: &Point3<f64>,
        b: &Point3<f64>,
        c: &Point3<f64>,
        min_cross: f64,
    ) -> Option<Self> {
        let cross = (b - a).cross(&(c - a));
        let len = cross.norm();
        if !(len >= min_cross && len > 0.0) {
            return None;
        }
        let normal = cross / len;
        Some(Self {
            normal,
            offset: -normal.dot(&a.coords),
        })
    }

    pub fn from_facet(facet: &Facet, min_cross: f64) -> Option<Self> {
        let [a, b, c] = &facet.positions;
        Self::from_points(a, b, c, min_cross)
    }

    /// Positive on the side the normal points to
    #[inline]
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) + self.offset
    }

    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            offset: -self.offset,
        }
    }

    pub fn classify_point(&self, point: &Point3<f64>, eps: f64) -> FaceClass {
        let d = self.signed_distance(point);
        if d > eps {
            FaceClass::Front
        } else if d < -eps {
            FaceClass::Back
        } else {
            FaceClass::Coplanar
        }
    }

    pub fn classify_facet(&self, facet: &Facet, eps: f64) -> FaceClass {
        let mut front = false;
        let mut back = false;
        for p in &facet.positions {
            match self.classify_point(p, eps) {
                FaceClass::Front => front = true,
                FaceClass::Back => back = true,
                _ => {}
            }
        }
        match (front, back) {
            (true, true) => FaceClass::Spanning,
            (true, false) => FaceClass::Front,
            (false, true) => FaceClass::Back,
            (false, false) => FaceClass::Coplanar,
        }
    }

    /// Cut a spanning facet into front and back fans.
    ///
    /// On-plane vertices go to both sides. A triangle cut by a plane yields
    /// at most a triangle and a quadrilateral, so fanning each side from its
    /// first vertex is exact. Fragments may be slivers; callers filter them.
    pub fn split_facet(&self, facet: &Facet, eps: f64) -> (Vec<Facet>, Vec<Facet>) {
        let distances = facet.positions.map(|p| self.signed_distance(&p));
        let sides = distances.map(|d| {
            if d > eps {
                FaceClass::Front
            } else if d < -eps {
                FaceClass::Back
            } else {
                FaceClass::Coplanar
            }
        });

        let mut front: Vec<Point3<f64>> = Vec::with_capacity(4);
        let mut back: Vec<Point3<f64>> = Vec::with_capacity(4);

        for i in 0..3 {
            let j = (i + 1) % 3;
            let (vi, vj) = (facet.positions[i], facet.positions[j]);
            let (si, sj) = (sides[i], sides[j]);

            if si != FaceClass::Back {
                front.push(vi);
            }
            if si != FaceClass::Front {
                back.push(vi);
            }

            let crosses = matches!(
                (si, sj),
                (FaceClass::Front, FaceClass::Back) | (FaceClass::Back, FaceClass::Front)
            );
            if crosses {
                let t = distances[i] / (distances[i] - distances[j]);
                let p = vi + (vj - vi) * t;
                front.push(p);
                back.push(p);
            }
        }

        (fan(&front), fan(&back))
    }
}

fn fan(polygon: &[Point3<f64>]) -> Vec<Facet> {
    if polygon.len() < 3 {
        return Vec::new();
    }
    (1..polygon.len() - 1)
        .map(|k| Facet::new(polygon[0], polygon[k], polygon[k + 1]))
        .collect()
}
