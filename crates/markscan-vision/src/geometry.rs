// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Planar geometry for table location: bounding boxes, closed-contour
// simplification, and the canonically ordered quadrilateral.

use imageproc::point::Point;

/// Closed boundary of a connected ink region, as traced pixel coordinates.
pub type Contour = Vec<Point<i32>>;

/// Four corners ordered top-left, top-right, bottom-right, bottom-left.
///
/// Ordering rule: the corner with the smallest `x + y` is top-left and the
/// largest `x + y` is bottom-right. Of the remaining two, the one with the
/// smaller `y - x` (further right, higher up) is top-right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadrilateral {
    corners: [(f32, f32); 4],
}

impl Quadrilateral {
    /// Order four arbitrary corner points canonically.
    pub fn from_unordered(points: [(f32, f32); 4]) -> Self {
        let sum = |i: usize| points[i].0 + points[i].1;
        let diff = |i: usize| points[i].1 - points[i].0;

        let tl = first_extreme(0..4, |a, b| sum(a) < sum(b));
        let br = first_extreme((0..4).filter(|&i| i != tl), |a, b| sum(a) > sum(b));

        let mut rest = (0..4).filter(|&i| i != tl && i != br);
        let (r1, r2) = match (rest.next(), rest.next()) {
            (Some(a), Some(b)) => (a, b),
            _ => unreachable!("four points minus two always leaves two"),
        };
        let (tr, bl) = if diff(r2) < diff(r1) {
            (r2, r1)
        } else {
            (r1, r2)
        };

        Self {
            corners: [points[tl], points[tr], points[br], points[bl]],
        }
    }

    /// Build from a simplified polygon. Returns `None` unless it has exactly
    /// four vertices.
    pub fn from_points(points: &[Point<i32>]) -> Option<Self> {
        let corners: [(f32, f32); 4] = points
            .iter()
            .map(|p| (p.x as f32, p.y as f32))
            .collect::<Vec<_>>()
            .try_into()
            .ok()?;
        Some(Self::from_unordered(corners))
    }

    /// Corners as `[top_left, top_right, bottom_right, bottom_left]`.
    pub fn corners(&self) -> [(f32, f32); 4] {
        self.corners
    }

    pub fn top_left(&self) -> (f32, f32) {
        self.corners[0]
    }

    pub fn top_right(&self) -> (f32, f32) {
        self.corners[1]
    }

    pub fn bottom_right(&self) -> (f32, f32) {
        self.corners[2]
    }

    pub fn bottom_left(&self) -> (f32, f32) {
        self.corners[3]
    }

    /// Size of the rectangle the quadrilateral is rectified into: the longer
    /// of each pair of opposite edges, truncated, and never below 1x1.
    pub fn target_size(&self) -> (u32, u32) {
        let [tl, tr, br, bl] = self.corners;
        let width = (distance(br, bl) as u32).max(distance(tr, tl) as u32);
        let height = (distance(tr, br) as u32).max(distance(tl, bl) as u32);
        (width.max(1), height.max(1))
    }

    /// Enclosed area (shoelace formula).
    pub fn area(&self) -> f32 {
        shoelace_area(&self.corners)
    }
}

/// Index of the first element for which `better(candidate, current)` never
/// holds afterwards. Ties keep the earliest index.
fn first_extreme(
    mut indices: impl Iterator<Item = usize>,
    better: impl Fn(usize, usize) -> bool,
) -> usize {
    let first = indices.next().unwrap_or(0);
    indices.fold(first, |best, i| if better(i, best) { i } else { best })
}

fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

/// Compute the area of a polygon given by ordered vertices using the
/// shoelace formula.
fn shoelace_area(corners: &[(f32, f32)]) -> f32 {
    let n = corners.len();
    let mut area = 0.0f32;
    for i in 0..n {
        let j = (i + 1) % n;
        area += corners[i].0 * corners[j].1;
        area -= corners[j].0 * corners[i].1;
    }
    area.abs() / 2.0
}

/// Axis-aligned bounding box of a contour as a quadrilateral.
///
/// The box spans one pixel past the maximum coordinate on each axis, so a
/// single pixel yields a 1x1 box.
pub fn bounding_quad(contour: &[Point<i32>]) -> Option<Quadrilateral> {
    let first = contour.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in contour {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    let (x0, y0) = (min_x as f32, min_y as f32);
    let (x1, y1) = ((max_x + 1) as f32, (max_y + 1) as f32);
    Some(Quadrilateral::from_unordered([
        (x0, y0),
        (x1, y0),
        (x1, y1),
        (x0, y1),
    ]))
}

/// Simplify a closed contour with the Douglas-Peucker algorithm.
///
/// The contour is split at its start point and the point farthest from it;
/// each half is simplified as an open chain. Every returned vertex lies on
/// the input, in input order, and no input point is further than `epsilon`
/// from the simplified outline.
pub fn approximate_closed_polygon(contour: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    let n = contour.len();
    if n < 3 {
        return contour.to_vec();
    }

    let start = contour[0];
    let far = first_extreme(1..n, |a, b| {
        squared_distance(start, contour[a]) > squared_distance(start, contour[b])
    });
    if squared_distance(start, contour[far]) == 0 {
        return vec![start];
    }

    let mut keep = vec![false; n];
    keep[0] = true;
    keep[far] = true;

    let forward: Vec<usize> = (0..=far).collect();
    let back: Vec<usize> = (far..n).chain(std::iter::once(0)).collect();
    mark_significant(contour, &forward, epsilon, &mut keep);
    mark_significant(contour, &back, epsilon, &mut keep);

    contour
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

/// Open-chain Douglas-Peucker over `chain` (indices into `points`), flagging
/// retained vertices in `keep`. Iterative so long contours cannot overflow
/// the stack.
fn mark_significant(points: &[Point<i32>], chain: &[usize], epsilon: f64, keep: &mut [bool]) {
    if chain.len() < 3 {
        return;
    }
    let mut stack = vec![(0usize, chain.len() - 1)];

    while let Some((start, end)) = stack.pop() {
        if end - start <= 1 {
            continue;
        }

        let a = points[chain[start]];
        let b = points[chain[end]];
        let mut max_dist = 0.0;
        let mut max_index = start;
        for i in (start + 1)..end {
            let d = distance_to_line(points[chain[i]], a, b);
            if d > max_dist {
                max_dist = d;
                max_index = i;
            }
        }

        if max_dist > epsilon {
            keep[chain[max_index]] = true;
            stack.push((start, max_index));
            stack.push((max_index, end));
        }
    }
}

/// Perpendicular distance from `p` to the line through `a` and `b`, or the
/// plain distance to `a` when the two coincide.
fn distance_to_line(p: Point<i32>, a: Point<i32>, b: Point<i32>) -> f64 {
    let (dx, dy) = ((b.x - a.x) as f64, (b.y - a.y) as f64);
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        return point_distance(p, a);
    }
    ((p.x - a.x) as f64 * dy - (p.y - a.y) as f64 * dx).abs() / len
}

fn point_distance(a: Point<i32>, b: Point<i32>) -> f64 {
    (squared_distance(a, b) as f64).sqrt()
}

fn squared_distance(a: Point<i32>, b: Point<i32>) -> i64 {
    let dx = (a.x - b.x) as i64;
    let dy = (a.y - b.y) as i64;
    dx * dx + dy * dy
}
