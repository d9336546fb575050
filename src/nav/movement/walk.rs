use bevy::prelude::*;

use super::{MoveScratch, MovementResolver};
use crate::nav::fixed_math::{isqrt, FixedVec3, RationalFactor};
use crate::nav::geometry::{area2, is_colinear, line_crossing};
use crate::nav::mesh::{FanMember, TriangleRef};

/// Length edge and fan directions are normalized to.
const DIRECTION_SCALE: i32 = 1000;
/// `DIRECTION_SCALE` squared: dot products of two normalized directions and
/// projections onto one are in these units.
const DIRECTION_SCALE_SQ: i64 = 1_000_000;

/// Edges to test when walking a triangle: `count` edges from `start`.
pub(super) type EdgeSpan = Option<(usize, usize)>;

/// Resolver state between steps.
#[derive(Clone, Copy, Debug)]
enum Step {
    /// Follow `src -> dest` through `triangle`.
    Walk {
        triangle: TriangleRef,
        span: EdgeSpan,
        src: FixedVec3,
        dest: FixedVec3,
    },
    /// Project `src -> dest` onto `edge` of `triangle`.
    Slide {
        triangle: TriangleRef,
        edge: usize,
        src: FixedVec3,
        dest: FixedVec3,
        try_adjacent: bool,
    },
}

impl Step {
    fn position(&self) -> (FixedVec3, TriangleRef) {
        match *self {
            Step::Walk { triangle, src, .. } | Step::Slide { triangle, src, .. } => (src, triangle),
        }
    }
}

enum Flow {
    Next(Step),
    Done(Resolved),
}

#[derive(Clone, Copy, Debug)]
pub(super) struct Resolved {
    pub point: FixedVec3,
    pub triangle: TriangleRef,
}

impl<'a> MovementResolver<'a> {
    /// Drive the walk/slide state machine from `start` until it settles.
    pub(super) fn run(
        &self,
        start: TriangleRef,
        span: EdgeSpan,
        src: FixedVec3,
        dest: FixedVec3,
        scratch: &mut MoveScratch,
    ) -> Resolved {
        let mut step = Step::Walk { triangle: start, span, src, dest };
        for _ in 0..self.settings.max_move_steps {
            let flow = match step {
                Step::Walk { triangle, span, src, dest } => self.walk(triangle, span, src, dest, scratch),
                Step::Slide { triangle, edge, src, dest, try_adjacent } => {
                    self.slide(triangle, edge, src, dest, try_adjacent, scratch)
                }
            };
            match flow {
                Flow::Next(next) => step = next,
                Flow::Done(resolved) => return resolved,
            }
        }

        let (point, triangle) = step.position();
        warn!(
            "[NAV_MOVE] Movement {:?} -> {:?} did not settle within {} steps, stopping at {:?}",
            src, dest, self.settings.max_move_steps, point
        );
        Resolved { point, triangle }
    }

    fn walk(
        &self,
        mut triangle: TriangleRef,
        mut span: EdgeSpan,
        src: FixedVec3,
        dest: FixedVec3,
        scratch: &mut MoveScratch,
    ) -> Flow {
        let Some(mesh) = self.registry.get(triangle.mesh) else {
            return Flow::Done(Resolved { point: src, triangle });
        };
        let Some(tri) = mesh.triangle(triangle.index) else {
            return Flow::Done(Resolved { point: src, triangle });
        };
        let mut shape = mesh.shape_of(tri);

        if let Some(corner) = shape.vertex_at(src) {
            let vertex = tri.vertices[corner];
            mesh.collect_fan(triangle.index, vertex, &mut scratch.fan_visited, &mut scratch.fan);

            let wedge = scratch
                .fan
                .iter()
                .find(|m| !scratch.is_checked(m.triangle) && wedge_contains(m, dest));
            if let Some((member, member_shape)) = wedge.and_then(|m| Some((m, mesh.shape(m.triangle)?))) {
                triangle = mesh.triangle_ref(member.triangle);
                shape = member_shape;
                span = Some(((member.corner + 1) % 3, 1));
            } else {
                let mut best: Option<(RationalFactor, u32, usize)> = None;
                let mut best_cosine = RationalFactor::integer(-2);
                for member in scratch.fan.iter().filter(|m| !scratch.is_checked(m.triangle)) {
                    let (cosine, edge) = fan_edge_cosine(member, dest);
                    if cosine > best_cosine {
                        best_cosine = cosine;
                        best = Some((cosine, member.triangle, edge));
                    }
                }
                if let Some((_, index, edge)) = best {
                    return Flow::Next(Step::Slide {
                        triangle: mesh.triangle_ref(index),
                        edge,
                        src,
                        dest,
                        try_adjacent: true,
                    });
                }
            }
        }

        let (first, count) = span.unwrap_or((0, 3));
        match shape.edge_intersect(src, dest, first, count) {
            None => {
                if shape.contains_point(dest) {
                    let point = dest.with_y(shape.height_at(dest));
                    Flow::Done(Resolved { point, triangle })
                } else if let Some(edge) = shape.colinear_edge(src, dest) {
                    Flow::Next(Step::Slide { triangle, edge, src, dest, try_adjacent: true })
                } else {
                    Flow::Done(Resolved { point: src, triangle })
                }
            }
            Some(edge) => match self.registry.neighbor_across(triangle, edge) {
                Some((next, entry)) => Flow::Next(Step::Walk {
                    triangle: next,
                    span: Some(((entry + 1) % 3, 2)),
                    src,
                    dest,
                }),
                None => Flow::Next(Step::Slide { triangle, edge, src, dest, try_adjacent: true }),
            },
        }
    }

    fn slide(
        &self,
        triangle: TriangleRef,
        edge: usize,
        src: FixedVec3,
        dest: FixedVec3,
        try_adjacent: bool,
        scratch: &mut MoveScratch,
    ) -> Flow {
        let Some(shape) = self.registry.shape(triangle) else {
            return Flow::Done(Resolved { point: src, triangle });
        };
        let (v0, v1) = shape.edge(edge);
        let dir = (v1 - v0).normalize_xz_to(DIRECTION_SCALE);
        let along = dir.dot_xz((dest - src).with_y(0));

        let anchor = match line_crossing(v0, v1, src, dest) {
            Some(crossing) => clamp_to_edge(crossing.point, v0, v1, crossing.along_first),
            None if is_colinear(v0, v1, src) && is_colinear(v0, v1, dest) => src,
            None => return Flow::Done(Resolved { point: src, triangle }),
        };

        let back = -(isqrt(v0.xz_sqr_distance(anchor) as u128 * DIRECTION_SCALE_SQ as u128) as i64);
        let ahead = isqrt(v1.xz_sqr_distance(anchor) as u128 * DIRECTION_SCALE_SQ as u128) as i64;

        if (back..=ahead).contains(&along) {
            let mut point = anchor + dir.mul_div(along, DIRECTION_SCALE_SQ);
            if !shape.contains_point(point) {
                match self.nudge_into(&shape, point) {
                    Some(inside) => point = inside,
                    None => return Flow::Done(Resolved { point: src, triangle }),
                }
            }
            let point = point.with_y(shape.height_at(point));
            return Flow::Done(Resolved { point, triangle });
        }

        // Overshot an end of the edge: carry on from that vertex.
        let (overshoot, next_edge, corner) = if along < back {
            (along - back, (edge + 2) % 3, v0)
        } else {
            (along - ahead, (edge + 1) % 3, v1)
        };
        let remaining = dir.mul_div(overshoot, DIRECTION_SCALE_SQ);
        let next_dest = corner + remaining;

        if let Some((next, entry)) = self.registry.neighbor_across(triangle, next_edge) {
            scratch.mark_checked(triangle);
            return Flow::Next(Step::Walk {
                triangle: next,
                span: Some((entry, 2)),
                src: corner,
                dest: next_dest,
            });
        }

        if try_adjacent {
            let toward_inside = (shape.point(edge + 2) - corner).normalize_xz_to(DIRECTION_SCALE);
            if toward_inside.dot_xz(remaining) > 0 {
                scratch.mark_checked(triangle);
                return Flow::Next(Step::Slide {
                    triangle,
                    edge: next_edge,
                    src: corner,
                    dest: next_dest,
                    try_adjacent: false,
                });
            }
        }
        Flow::Done(Resolved { point: corner, triangle })
    }
}

/// `dest` lies in the wedge spanned at the fan vertex by this member.
fn wedge_contains(member: &FanMember, dest: FixedVec3) -> bool {
    let [v0, v1, v2] = member.points;
    area2(v0, v2, dest) >= 0 && area2(v0, v1, dest) <= 0
}

/// Cosine between the direction to `dest` and the closer of the member's
/// two edges at the fan vertex, with that edge's index.
fn fan_edge_cosine(member: &FanMember, dest: FixedVec3) -> (RationalFactor, usize) {
    let [v0, v1, v2] = member.points;
    let toward = (dest - v0).normalize_xz_to(DIRECTION_SCALE);
    let first = toward.dot_xz((v1 - v0).normalize_xz_to(DIRECTION_SCALE));
    let second = toward.dot_xz((v2 - v0).normalize_xz_to(DIRECTION_SCALE));
    if first > second {
        (RationalFactor::new(first, DIRECTION_SCALE_SQ), member.corner)
    } else {
        (RationalFactor::new(second, DIRECTION_SCALE_SQ), (member.corner + 2) % 3)
    }
}

/// Keep a line crossing on the edge segment itself.
fn clamp_to_edge(point: FixedVec3, v0: FixedVec3, v1: FixedVec3, along_edge: RationalFactor) -> FixedVec3 {
    if along_edge.is_negative() {
        v0
    } else if along_edge > RationalFactor::ONE {
        v1
    } else {
        point
    }
}
