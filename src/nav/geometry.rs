//! Integer polygon predicates on the ground plane.
//!
//! Orientation follows the mesh convention: triangles wind clockwise when
//! seen from +Y, which makes `area2` of an interior point against every
//! directed edge non-positive. Coordinates are expected within
//! `±COORD_LIMIT` raw units so that every signed area fits in an `i64`.

use super::fixed_math::{FixedVec2, FixedVec3, RationalFactor};

/// Twice the signed ground-plane area of `a`, `b`, `c`.
pub fn area2(a: FixedVec3, b: FixedVec3, c: FixedVec3) -> i64 {
    (b.x as i64 - a.x as i64) * (c.z as i64 - a.z as i64)
        - (c.x as i64 - a.x as i64) * (b.z as i64 - a.z as i64)
}

/// `c` lies on the inner side of the directed line `a -> b`, or on it.
pub fn is_clockwise_or_colinear(a: FixedVec3, b: FixedVec3, c: FixedVec3) -> bool {
    area2(a, b, c) <= 0
}

pub fn is_clockwise(a: FixedVec3, b: FixedVec3, c: FixedVec3) -> bool {
    area2(a, b, c) < 0
}

pub fn is_colinear(a: FixedVec3, b: FixedVec3, c: FixedVec3) -> bool {
    area2(a, b, c) == 0
}

/// Inclusive test for segments `a-b` and `a2-b2` crossing each other.
pub fn segments_intersect(a: FixedVec3, b: FixedVec3, a2: FixedVec3, b2: FixedVec3) -> bool {
    is_clockwise_or_colinear(a, b, a2) != is_clockwise_or_colinear(a, b, b2)
        && is_clockwise_or_colinear(a2, b2, a) != is_clockwise_or_colinear(a2, b2, b)
}

/// Where two lines cross, with the exact parameter along each.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineCrossing {
    /// Point on the first line, height interpolated along it.
    pub point: FixedVec3,
    pub along_first: RationalFactor,
    pub along_second: RationalFactor,
}

/// Exact parameters of the crossing of the lines through `start1-end1` and
/// `start2-end2`, along each line. `None` when they are parallel.
fn crossing_parameters(
    start1: FixedVec3,
    end1: FixedVec3,
    start2: FixedVec3,
    end2: FixedVec3,
) -> Option<(RationalFactor, RationalFactor)> {
    let d1 = end1 - start1;
    let d2 = end2 - start2;
    let den = d1.cross_xz(d2);
    if den == 0 {
        return None;
    }
    let offset = start2 - start1;
    Some((RationalFactor::new(offset.cross_xz(d2), den), RationalFactor::new(offset.cross_xz(d1), den)))
}

fn crossing_at(start1: FixedVec3, end1: FixedVec3, along_first: RationalFactor, along_second: RationalFactor) -> Option<LineCrossing> {
    let point = start1.checked_offset(end1 - start1, along_first.numerator(), along_first.denominator())?;
    Some(LineCrossing { point, along_first, along_second })
}

/// Intersection of the infinite lines through `start1-end1` and
/// `start2-end2`. Parallel lines have none, and neither do lines that meet
/// too far away for the crossing to fit an `i32`.
pub fn line_crossing(
    start1: FixedVec3,
    end1: FixedVec3,
    start2: FixedVec3,
    end2: FixedVec3,
) -> Option<LineCrossing> {
    let (along_first, along_second) = crossing_parameters(start1, end1, start2, end2)?;
    crossing_at(start1, end1, along_first, along_second)
}

/// Intersection restricted to both segments, endpoints included.
///
/// Both parameters are checked before the point is built, so nearly
/// parallel segments that miss never produce an out-of-range point.
pub fn segment_crossing(
    start1: FixedVec3,
    end1: FixedVec3,
    start2: FixedVec3,
    end2: FixedVec3,
) -> Option<LineCrossing> {
    let (along_first, along_second) = crossing_parameters(start1, end1, start2, end2)?;
    if !along_first.in_unit_interval() || !along_second.in_unit_interval() {
        return None;
    }
    crossing_at(start1, end1, along_first, along_second)
}

/// Closest point to `p` on segment `a-b` in the ground plane.
pub fn closest_point_on_segment_xz(a: FixedVec3, b: FixedVec3, p: FixedVec3) -> FixedVec3 {
    let dir = b - a;
    let len_sq = dir.xz_sqr_magnitude();
    if len_sq == 0 {
        return a;
    }
    let t = (p - a).dot_xz(dir);
    if t <= 0 {
        a
    } else if t >= len_sq {
        b
    } else {
        a + dir.mul_div(t, len_sq)
    }
}

/// Exact overlap of segment `start-end` with the closed rectangle
/// `min..=max` in the ground plane.
pub fn segment_overlaps_rect(start: FixedVec3, end: FixedVec3, min: FixedVec2, max: FixedVec2) -> bool {
    let lo = start.min_xz(end);
    let hi = start.max_xz(end);
    if hi.x < min.x || lo.x > max.x || hi.y < min.y || lo.y > max.y {
        return false;
    }
    let corners = [
        FixedVec3::ground(min.x, min.y),
        FixedVec3::ground(max.x, min.y),
        FixedVec3::ground(max.x, max.y),
        FixedVec3::ground(min.x, max.y),
    ];
    let sides = corners.map(|c| area2(start, end, c).signum());
    !(sides.iter().all(|&s| s > 0) || sides.iter().all(|&s| s < 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, z: i32) -> FixedVec3 {
        FixedVec3::ground(x, z)
    }

    #[test]
    fn test_area2_sign_matches_clockwise_winding() {
        assert!(area2(p(0, 0), p(0, 10), p(10, 10)) < 0, "clockwise seen from +Y");
        assert!(area2(p(0, 0), p(10, 10), p(0, 10)) > 0);
        assert!(is_colinear(p(0, 0), p(5, 5), p(-3, -3)));
    }

    #[test]
    fn test_segments_intersect_crossing_and_disjoint() {
        assert!(segments_intersect(p(0, 0), p(10, 10), p(0, 10), p(10, 0)));
        assert!(!segments_intersect(p(0, 0), p(1, 1), p(5, 0), p(5, 10)));
    }

    #[test]
    fn test_line_crossing_parallel_is_none() {
        assert!(line_crossing(p(0, 0), p(10, 0), p(0, 5), p(10, 5)).is_none());
    }

    #[test]
    fn test_line_crossing_point_and_parameters() {
        let c = line_crossing(p(10, 10), p(10, 0), p(1, 1), p(21, 1)).expect("lines cross");
        assert_eq!(c.point, p(10, 1));
        assert_eq!(c.along_first, RationalFactor::new(9, 10));
        assert_eq!(c.along_second, RationalFactor::new(9, 20));
    }

    #[test]
    fn test_segment_crossing_rejects_beyond_segment() {
        assert!(segment_crossing(p(0, 0), p(4, 0), p(5, -5), p(5, 5)).is_none());
        let hit = segment_crossing(p(0, 0), p(10, 0), p(5, -5), p(5, 5)).expect("segments cross");
        assert_eq!(hit.point, p(5, 0));
    }

    #[test]
    fn test_nearly_parallel_long_segments_do_not_overflow() {
        // The lines meet five segment lengths past `start`, far outside i32.
        let start = p(1000, 0);
        let end = p(1000 + (1 << 29), 1);
        let other = (p(1000, -5), p(1000 + (1 << 29), -3));
        assert!(segment_crossing(start, end, other.0, other.1).is_none());
        assert!(line_crossing(start, end, other.0, other.1).is_none());
    }

    #[test]
    fn test_closest_point_on_segment_clamps() {
        assert_eq!(closest_point_on_segment_xz(p(0, 0), p(10, 0), p(-5, 3)), p(0, 0));
        assert_eq!(closest_point_on_segment_xz(p(0, 0), p(10, 0), p(4, 3)), p(4, 0));
        assert_eq!(closest_point_on_segment_xz(p(0, 0), p(10, 0), p(14, -3)), p(10, 0));
    }

    #[test]
    fn test_segment_overlaps_rect() {
        let min = FixedVec2::new(0, 0);
        let max = FixedVec2::new(10, 10);
        assert!(segment_overlaps_rect(p(-5, 5), p(15, 5), min, max));
        assert!(segment_overlaps_rect(p(2, 2), p(3, 3), min, max), "fully inside");
        assert!(!segment_overlaps_rect(p(-5, 12), p(15, 30), min, max));
        assert!(!segment_overlaps_rect(p(8, 25), p(25, 8), min, max), "bbox overlaps but line misses");
    }
}
