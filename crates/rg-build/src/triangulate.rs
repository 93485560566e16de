//! Delaunay edge extraction over geographic points.
//!
//! Points are projected onto a local plane (equirectangular about the mean
//! latitude, metres, centred on the centroid) before triangulating, so the
//! triangulation sees true local angles instead of degree-space ones.

use delaunator::{EMPTY, Point as DPoint, next_halfedge, triangulate};

use rg_core::GeoPoint;
use rg_core::geo::EARTH_RADIUS_M;

/// Project `points` to local planar metres.
fn project(points: &[GeoPoint]) -> Vec<DPoint> {
    let n = points.len() as f64;
    let lat0 = points.iter().map(|p| p.lat).sum::<f64>() / n;
    let lon0 = points.iter().map(|p| p.lon).sum::<f64>() / n;
    let k = lat0.to_radians().cos();
    points
        .iter()
        .map(|p| DPoint {
            x: (p.lon - lon0).to_radians() * k * EARTH_RADIUS_M,
            y: (p.lat - lat0).to_radians() * EARTH_RADIUS_M,
        })
        .collect()
}

/// Undirected Delaunay edges as sorted `(i, j)` index pairs with `i < j`.
///
/// Two points give one edge.  If the input is degenerate (all points on
/// one line) the points are chained in order along that line instead.
pub fn delaunay_edges(points: &[GeoPoint]) -> Vec<(usize, usize)> {
    match points.len() {
        0 | 1 => return Vec::new(),
        2 => return vec![(0, 1)],
        _ => {}
    }

    let planar = project(points);
    let tri = triangulate(&planar);
    if tri.triangles.is_empty() {
        return chain_along_line(&planar);
    }

    let mut pairs: Vec<(usize, usize)> = (0..tri.triangles.len())
        .filter(|&e| tri.halfedges[e] == EMPTY || e < tri.halfedges[e])
        .map(|e| {
            let a = tri.triangles[e];
            let b = tri.triangles[next_halfedge(e)];
            (a.min(b), a.max(b))
        })
        .collect();
    pairs.sort_unstable();
    pairs.dedup();
    pairs
}

/// Sort collinear points along their principal axis and connect neighbours.
fn chain_along_line(planar: &[DPoint]) -> Vec<(usize, usize)> {
    let n = planar.len() as f64;
    let mx = planar.iter().map(|p| p.x).sum::<f64>() / n;
    let my = planar.iter().map(|p| p.y).sum::<f64>() / n;
    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for p in planar {
        let (dx, dy) = (p.x - mx, p.y - my);
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    let theta = 0.5 * (2.0 * sxy).atan2(sxx - syy);
    let (c, s) = (theta.cos(), theta.sin());

    let mut order: Vec<usize> = (0..planar.len()).collect();
    order.sort_by(|&a, &b| {
        let ta = planar[a].x * c + planar[a].y * s;
        let tb = planar[b].x * c + planar[b].y * s;
        ta.total_cmp(&tb).then(a.cmp(&b))
    });
    order
        .windows(2)
        .map(|w| (w[0].min(w[1]), w[0].max(w[1])))
        .collect()
}
