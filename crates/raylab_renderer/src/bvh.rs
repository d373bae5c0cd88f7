//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Uses a binary tree over triangle references. The tree owns no vertex
//! data: leaves name (shape, triangle) pairs and triangles are rebuilt from
//! the shared geometry on every visit. Once built the structure is never
//! mutated, so one `Arc<AccelerationStructure>` can serve several tracers.

use std::sync::Arc;

use raylab_core::{BuildError, SceneGeometry};
use raylab_math::{axis_component, Aabb, Interval, Ray, Vec3};

use crate::{AnyHit, Triangle};

/// Maximum primitives per leaf node before splitting.
const LEAF_MAX_SIZE: usize = 4;

/// Hits closer than this are self-intersections and are ignored.
pub const MIN_DISTANCE: f32 = 1e-3;

/// Hits within this distance of each other count as a tie.
pub const TIE_EPSILON: f32 = 1e-5;

/// A triangle reference stored in a leaf.
#[derive(Debug, Clone, Copy)]
struct TriangleRef {
    shape: u32,
    triangle: u32,
    /// Position in build order (shape order, then index-buffer order)
    order: u32,
    bbox: Aabb,
    centroid: Vec3,
}

/// BVH node - either a branch with two children or a leaf with primitives.
enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// Leaf node with a small number of primitives.
    Leaf { refs: Vec<TriangleRef>, bbox: Aabb },
    /// Empty node (scene without triangles).
    Empty,
}

/// Closest (or first accepted) intersection found by a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Ray parameter
    pub t: f32,
    /// Barycentric weights of vertices a, b and c
    pub bary: Vec3,
    /// Index of the shape in the scene
    pub shape: usize,
    /// Index of the triangle within the shape
    pub triangle: usize,
    /// Build-order rank used to break ties
    pub order: usize,
}

impl Hit {
    /// Whether `self` should replace `other` as the closest hit.
    ///
    /// Within [`TIE_EPSILON`] the triangle earlier in build order wins, so the
    /// answer does not depend on the order the tree is walked.
    fn beats(&self, other: &Hit) -> bool {
        if (self.t - other.t).abs() <= TIE_EPSILON {
            self.order < other.order
        } else {
            self.t < other.t
        }
    }
}

/// Spatial index over every triangle of a scene.
pub struct AccelerationStructure {
    geometry: Arc<SceneGeometry>,
    root: BvhNode,
    triangle_count: usize,
    degenerate_count: usize,
}

impl AccelerationStructure {
    /// Validate the geometry and build the tree.
    ///
    /// A scene with no shapes is legal and yields an empty structure. A shape
    /// with no triangles, a ragged index buffer or an out-of-range index is a
    /// [`BuildError`]. Zero-area triangles are left out of the tree.
    pub fn build(geometry: Arc<SceneGeometry>) -> Result<Self, BuildError> {
        geometry.validate()?;

        let mut refs = Vec::with_capacity(geometry.triangle_count());
        let mut degenerate_count = 0;
        let mut order = 0u32;

        for (shape_index, shape) in geometry.shapes().iter().enumerate() {
            for triangle_index in 0..shape.triangle_count() {
                let rank = order;
                order += 1;

                // validate() guarantees every triangle resolves
                let Some(triangle) = Triangle::fetch(shape, triangle_index) else {
                    continue;
                };
                if triangle.is_degenerate() {
                    degenerate_count += 1;
                    continue;
                }
                refs.push(TriangleRef {
                    shape: shape_index as u32,
                    triangle: triangle_index as u32,
                    order: rank,
                    bbox: triangle.bounding_box(),
                    centroid: triangle.centroid(),
                });
            }
        }

        let triangle_count = refs.len();
        let root = if refs.is_empty() {
            BvhNode::Empty
        } else {
            Self::build_node(refs)
        };

        log::info!(
            "Built acceleration structure: {} triangles in {} shapes ({} degenerate skipped)",
            triangle_count,
            geometry.shape_count(),
            degenerate_count
        );

        Ok(Self {
            geometry,
            root,
            triangle_count,
            degenerate_count,
        })
    }

    /// Recursive BVH construction.
    ///
    /// Median split: sort references by centroid on the longest centroid
    /// axis, split in half, recurse. Ties sort by build order so identical
    /// geometry always yields an identical tree.
    fn build_node(mut refs: Vec<TriangleRef>) -> BvhNode {
        let bbox = refs
            .iter()
            .fold(Aabb::EMPTY, |acc, r| Aabb::surrounding(&acc, &r.bbox));

        if refs.len() <= LEAF_MAX_SIZE {
            return BvhNode::Leaf { refs, bbox };
        }

        let centroid_bounds = refs.iter().fold(Aabb::EMPTY, |acc, r| {
            Aabb::surrounding(&acc, &Aabb::from_points(r.centroid, r.centroid))
        });
        let axis = centroid_bounds.longest_axis();

        refs.sort_by(|a, b| {
            axis_component(a.centroid, axis)
                .partial_cmp(&axis_component(b.centroid, axis))
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.order.cmp(&b.order))
        });

        let mid = refs.len() / 2;
        let right_refs = refs.split_off(mid);

        BvhNode::Branch {
            left: Box::new(Self::build_node(refs)),
            right: Box::new(Self::build_node(right_refs)),
            bbox,
        }
    }

    /// The geometry this structure indexes.
    pub fn geometry(&self) -> &Arc<SceneGeometry> {
        &self.geometry
    }

    /// Number of indexed (non-degenerate) triangles.
    pub fn triangle_count(&self) -> usize {
        self.triangle_count
    }

    /// Number of zero-area triangles left out at build time.
    pub fn degenerate_count(&self) -> usize {
        self.degenerate_count
    }

    pub fn is_empty(&self) -> bool {
        self.triangle_count == 0
    }

    pub fn bounding_box(&self) -> Aabb {
        match &self.root {
            BvhNode::Empty => Aabb::EMPTY,
            BvhNode::Leaf { bbox, .. } | BvhNode::Branch { bbox, .. } => *bbox,
        }
    }

    /// Rebuild the triangle a hit refers to.
    pub fn triangle(&self, hit: &Hit) -> Option<Triangle> {
        Triangle::fetch(self.geometry.shape(hit.shape)?, hit.triangle)
    }

    fn resolve(&self, r: &TriangleRef) -> Option<Triangle> {
        Triangle::fetch(self.geometry.shape(r.shape as usize)?, r.triangle as usize)
    }

    /// Closest hit with `MIN_DISTANCE < t < max_distance`.
    pub fn intersect(&self, ray: &Ray, max_distance: f32) -> Option<Hit> {
        self.intersect_filtered(ray, max_distance, |_, _| AnyHit::Accept)
    }

    /// Closest hit, consulting `filter` for every candidate that would become
    /// the new closest hit.
    ///
    /// `AnyHit::Ignore` discards the candidate; `AnyHit::Terminate` accepts it
    /// and stops the search.
    pub fn intersect_filtered<F>(&self, ray: &Ray, max_distance: f32, mut filter: F) -> Option<Hit>
    where
        F: FnMut(&Hit, &Triangle) -> AnyHit,
    {
        if !ray.is_valid() || !(max_distance > MIN_DISTANCE) {
            return None;
        }
        let mut best = None;
        self.closest_in(&self.root, ray, max_distance, &mut best, &mut filter);
        best
    }

    /// True if anything lies on the ray with `MIN_DISTANCE < t < max_distance`.
    ///
    /// Stops at the first hit found; used for occlusion queries.
    pub fn intersect_any(&self, ray: &Ray, max_distance: f32) -> bool {
        self.first_hit(ray, max_distance, |_, _| AnyHit::Accept).is_some()
    }

    /// First candidate `filter` does not ignore, in traversal order.
    pub fn first_hit<F>(&self, ray: &Ray, max_distance: f32, mut filter: F) -> Option<Hit>
    where
        F: FnMut(&Hit, &Triangle) -> AnyHit,
    {
        if !ray.is_valid() || !(max_distance > MIN_DISTANCE) {
            return None;
        }
        self.any_in(&self.root, ray, Interval::new(MIN_DISTANCE, max_distance), &mut filter)
    }

    /// Returns true when the filter asked to terminate.
    fn closest_in<F>(
        &self,
        node: &BvhNode,
        ray: &Ray,
        max_distance: f32,
        best: &mut Option<Hit>,
        filter: &mut F,
    ) -> bool
    where
        F: FnMut(&Hit, &Triangle) -> AnyHit,
    {
        // Nodes are only culled beyond the tie window so equal-distance
        // triangles elsewhere in the tree still get compared.
        let limit = best.map_or(max_distance, |b| (b.t + TIE_EPSILON).min(max_distance));

        match node {
            BvhNode::Empty => false,

            BvhNode::Leaf { refs, bbox } => {
                if !bbox.hit(ray, Interval::new(MIN_DISTANCE, limit)) {
                    return false;
                }

                let query = Interval::new(MIN_DISTANCE, max_distance);
                for r in refs {
                    let Some(triangle) = self.resolve(r) else {
                        continue;
                    };
                    let Some(tri_hit) = triangle.intersect(ray, query) else {
                        continue;
                    };

                    let hit = Hit {
                        t: tri_hit.t,
                        bary: tri_hit.bary,
                        shape: r.shape as usize,
                        triangle: r.triangle as usize,
                        order: r.order as usize,
                    };
                    if best.as_ref().is_some_and(|b| !hit.beats(b)) {
                        continue;
                    }

                    match filter(&hit, &triangle) {
                        AnyHit::Accept => *best = Some(hit),
                        AnyHit::Ignore => {}
                        AnyHit::Terminate => {
                            *best = Some(hit);
                            return true;
                        }
                    }
                }
                false
            }

            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray, Interval::new(MIN_DISTANCE, limit)) {
                    return false;
                }

                self.closest_in(left, ray, max_distance, best, filter)
                    || self.closest_in(right, ray, max_distance, best, filter)
            }
        }
    }

    fn any_in<F>(&self, node: &BvhNode, ray: &Ray, ray_t: Interval, filter: &mut F) -> Option<Hit>
    where
        F: FnMut(&Hit, &Triangle) -> AnyHit,
    {
        match node {
            BvhNode::Empty => None,

            BvhNode::Leaf { refs, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }

                refs.iter().find_map(|r| {
                    let triangle = self.resolve(r)?;
                    let tri_hit = triangle.intersect(ray, ray_t)?;
                    let hit = Hit {
                        t: tri_hit.t,
                        bary: tri_hit.bary,
                        shape: r.shape as usize,
                        triangle: r.triangle as usize,
                        order: r.order as usize,
                    };
                    match filter(&hit, &triangle) {
                        AnyHit::Ignore => None,
                        AnyHit::Accept | AnyHit::Terminate => Some(hit),
                    }
                })
            }

            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }

                self.any_in(left, ray, ray_t, filter)
                    .or_else(|| self.any_in(right, ray, ray_t, filter))
            }
        }
    }
}
