//! Polygon helpers for contour shape tests

use imageproc::point::Point;

/// Simplify a closed contour with the Douglas-Peucker algorithm.
///
/// The curve is split at two mutually distant points, which always survive,
/// and each half is simplified on its own. No point of the input contour
/// lies farther than `epsilon` from the returned polygon.
pub fn approximate_closed_polygon(points: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let a = farthest_from(points, points[0]);
    let b = farthest_from(points, points[a]);
    if a == b {
        return vec![points[a]];
    }

    let (first, second) = if a < b { (a, b) } else { (b, a) };

    // first -> second, then second -> (wrap) -> first
    let forward = &points[first..=second];
    let backward: Vec<Point<i32>> = points[second..]
        .iter()
        .chain(points[..=first].iter())
        .copied()
        .collect();

    let mut polygon = simplify_open(forward, epsilon);
    let closing = simplify_open(&backward, epsilon);

    polygon.pop();
    polygon.extend_from_slice(&closing[..closing.len() - 1]);
    polygon
}

/// Douglas-Peucker over an open chain, endpoints always kept
fn simplify_open(points: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let last = points.len() - 1;
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[last] = true;

    let mut stack = vec![(0, last)];
    while let Some((start, end)) = stack.pop() {
        if end - start <= 1 {
            continue;
        }

        let (index, distance) = ((start + 1)..end)
            .map(|i| (i, distance_to_line(points[i], points[start], points[end])))
            .fold((start, 0.0), |best, cur| if cur.1 > best.1 { cur } else { best });

        if distance > epsilon {
            keep[index] = true;
            stack.push((start, index));
            stack.push((index, end));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(point, kept)| kept.then_some(*point))
        .collect()
}

fn farthest_from(points: &[Point<i32>], origin: Point<i32>) -> usize {
    points
        .iter()
        .enumerate()
        .fold((0, -1i64), |best, (i, p)| {
            let dx = (p.x - origin.x) as i64;
            let dy = (p.y - origin.y) as i64;
            let d = dx * dx + dy * dy;
            if d > best.1 {
                (i, d)
            } else {
                best
            }
        })
        .0
}

/// Distance from `p` to the line through `a` and `b` (or to `a` if they coincide)
fn distance_to_line(p: Point<i32>, a: Point<i32>, b: Point<i32>) -> f64 {
    let (px, py) = (p.x as f64, p.y as f64);
    let (ax, ay) = (a.x as f64, a.y as f64);
    let (bx, by) = (b.x as f64, b.y as f64);

    let dx = bx - ax;
    let dy = by - ay;
    let length = (dx * dx + dy * dy).sqrt();
    if length == 0.0 {
        return ((px - ax).powi(2) + (py - ay).powi(2)).sqrt();
    }

    ((px - ax) * dy - (py - ay) * dx).abs() / length
}

/// Axis-aligned bounds as (x, y, width, height), edges inclusive
pub fn bounding_rect(points: &[Point<i32>]) -> Option<(i32, i32, i32, i32)> {
    let first = points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Some((min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}
