// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Region locator: find the quadrilateral outline of the answer table in an
// ink mask.
//
// Detection is an ordered list of strategies, stopping at the first success:
//
// 1. Polygon: for each of the largest contours (by enclosed area), simplify
//    at increasing tolerances until a four-vertex polygon appears.
// 2. Bounding box: the axis-aligned box around the largest contour.

use imageproc::geometry::{arc_length, contour_area};
use imageproc::point::Point;
use markscan_core::LocateStrategy;
use markscan_core::error::{MarkscanError, Result};
use tracing::{debug, info, instrument, warn};

use crate::capability::{ApproxPolygon, FindContours};
use crate::geometry::{self, Contour, Quadrilateral};
use crate::mask::BinaryMask;

/// The table outline and how it was found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocatedTable {
    pub quad: Quadrilateral,
    pub strategy: LocateStrategy,
}

/// Locate the answer table.
///
/// Fails with `NoTableFound` only when the mask has no contours at all; any
/// contour guarantees at least the bounding-box fallback.
#[instrument(skip_all, fields(width = mask.width(), height = mask.height()))]
pub fn locate_table<B: FindContours + ApproxPolygon>(
    backend: &B,
    mask: &BinaryMask,
    max_candidates: usize,
    epsilon_fractions: &[f64],
) -> Result<LocatedTable> {
    let contours = rank_by_area(backend.find_external_contours(mask));
    let Some(largest) = contours.first() else {
        warn!("Table contour not found");
        return Err(MarkscanError::NoTableFound);
    };
    debug!(
        contour_count = contours.len(),
        largest_area = contour_area(largest),
        "External contours ranked"
    );

    if let Some(found) = polygon_strategy(backend, &contours, max_candidates, epsilon_fractions) {
        info!(
            strategy = ?found.strategy,
            area = found.quad.area(),
            "Table outline located"
        );
        return Ok(found);
    }

    warn!("No four-sided outline among candidates; using bounding box fallback");
    bounding_box_strategy(largest).ok_or(MarkscanError::NoTableFound)
}

/// Sort contours largest area first. Equal areas keep discovery order.
pub fn rank_by_area(contours: Vec<Contour>) -> Vec<Contour> {
    let mut ranked: Vec<(f64, Contour)> = contours
        .into_iter()
        .map(|c| (contour_area(&c), c))
        .collect();
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
    ranked.into_iter().map(|(_, c)| c).collect()
}

/// Try the first `max_candidates` contours in order; the first one that
/// simplifies to four vertices wins.
pub fn polygon_strategy<B: ApproxPolygon>(
    backend: &B,
    ranked: &[Contour],
    max_candidates: usize,
    epsilon_fractions: &[f64],
) -> Option<LocatedTable> {
    ranked
        .iter()
        .take(max_candidates)
        .enumerate()
        .find_map(|(candidate, contour)| {
            let (quad, epsilon_fraction) = approximate_quad(backend, contour, epsilon_fractions)?;
            Some(LocatedTable {
                quad,
                strategy: LocateStrategy::Polygon {
                    candidate,
                    epsilon_fraction,
                },
            })
        })
}

/// Simplify one contour at each tolerance (a fraction of its perimeter),
/// smallest first, returning the first four-vertex result.
pub fn approximate_quad<B: ApproxPolygon>(
    backend: &B,
    contour: &[Point<i32>],
    epsilon_fractions: &[f64],
) -> Option<(Quadrilateral, f64)> {
    let perimeter = arc_length(contour, true);
    epsilon_fractions.iter().find_map(|&fraction| {
        let polygon = backend.approx_polygon(contour, fraction * perimeter);
        debug!(fraction, vertices = polygon.len(), "Polygon approximation");
        Quadrilateral::from_points(&polygon).map(|quad| (quad, fraction))
    })
}

/// Axis-aligned bounding box of a contour.
pub fn bounding_box_strategy(contour: &[Point<i32>]) -> Option<LocatedTable> {
    geometry::bounding_quad(contour).map(|quad| LocatedTable {
        quad,
        strategy: LocateStrategy::BoundingBoxFallback,
    })
}
