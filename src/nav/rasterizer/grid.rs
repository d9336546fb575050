use super::NavRasterizer;
use crate::nav::fixed_math::{FixedVec2, FixedVec3, RationalFactor};
use crate::nav::geometry::segment_overlaps_rect;

impl NavRasterizer {
    /// Unclamped cell coordinates; may lie outside the grid.
    pub(crate) fn cell_of(&self, p: FixedVec2) -> (i64, i64) {
        let cs = self.cell_size as i64;
        (
            (p.x as i64 - self.origin.x as i64).div_euclid(cs),
            (p.y as i64 - self.origin.y as i64).div_euclid(cs),
        )
    }

    /// Cell containing `p`, clamped into the grid. Only meaningful on a
    /// non-empty grid.
    pub fn clamped_cell_of(&self, p: FixedVec2) -> (usize, usize) {
        let (x, y) = self.cell_of(p);
        (
            x.clamp(0, self.cols.saturating_sub(1) as i64) as usize,
            y.clamp(0, self.rows.saturating_sub(1) as i64) as usize,
        )
    }

    /// Cell holding the point at parameter `t` of `start-end`, unclamped.
    pub(crate) fn cell_along(&self, start: FixedVec3, end: FixedVec3, t: RationalFactor) -> (i64, i64) {
        let (num, den) = (t.numerator() as i128, t.denominator() as i128);
        let span = self.cell_size as i128 * den;
        let axis = |from: i32, to: i32, origin: i32| {
            let offset = (from as i128 - origin as i128) * den + (to as i128 - from as i128) * num;
            offset.div_euclid(span) as i64
        };
        (axis(start.x, end.x, self.origin.x), axis(start.z, end.z, self.origin.y))
    }

    /// Parameters at which `start-end` enters and leaves the grid rectangle,
    /// within `0..=1`. `None` when the segment misses the grid.
    pub(crate) fn clip_segment(&self, start: FixedVec3, end: FixedVec3) -> Option<(RationalFactor, RationalFactor)> {
        let mut enter = RationalFactor::ZERO;
        let mut leave = RationalFactor::ONE;
        let axes = [
            (start.x as i64, end.x as i64, self.column_start(0), self.column_start(self.cols as i64)),
            (start.z as i64, end.z as i64, self.row_start(0), self.row_start(self.rows as i64)),
        ];
        for (from, to, lo, hi) in axes {
            let delta = to - from;
            if delta == 0 {
                if from < lo || from > hi {
                    return None;
                }
                continue;
            }
            let at_lo = RationalFactor::new(lo - from, delta);
            let at_hi = RationalFactor::new(hi - from, delta);
            let (near, far) = if delta > 0 { (at_lo, at_hi) } else { (at_hi, at_lo) };
            enter = enter.max(near);
            leave = leave.min(far);
        }
        (enter <= leave).then_some((enter, leave))
    }

    pub(crate) fn in_grid(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as u64) < self.cols as u64 && (y as u64) < self.rows as u64
    }

    /// Lower-left X (or Z for rows) of cell column `index`.
    pub(crate) fn column_start(&self, index: i64) -> i64 {
        self.origin.x as i64 + index * self.cell_size as i64
    }

    pub(crate) fn row_start(&self, index: i64) -> i64 {
        self.origin.y as i64 + index * self.cell_size as i64
    }

    /// Closed ground-plane rectangle of cell `(cx, cy)`.
    pub fn cell_bounds(&self, cx: usize, cy: usize) -> (FixedVec2, FixedVec2) {
        let x0 = self.column_start(cx as i64);
        let y0 = self.row_start(cy as i64);
        let cs = self.cell_size as i64;
        let clamp = |v: i64| v.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
        (
            FixedVec2::new(clamp(x0), clamp(y0)),
            FixedVec2::new(clamp(x0 + cs), clamp(y0 + cs)),
        )
    }

    /// Whether segment `start-end` passes through cell `(cx, cy)`.
    pub fn segment_overlaps_cell(&self, start: FixedVec3, end: FixedVec3, cx: usize, cy: usize) -> bool {
        let (min, max) = self.cell_bounds(cx, cy);
        segment_overlaps_rect(start, end, min, max)
    }

    /// Smallest possible squared distance from `p` to any cell at Chebyshev
    /// ring `k` or beyond around `(cx, cy)`. `None` once no such cell exists.
    pub(crate) fn ring_lower_bound_sq(&self, p: FixedVec3, cx: usize, cy: usize, k: usize) -> Option<i64> {
        let (cx, cy, k) = (cx as i64, cy as i64, k as i64);
        let (px, pz) = (p.x as i64, p.z as i64);
        let mut bound: Option<i64> = None;
        let mut consider = |gap: i64| {
            let gap = gap.max(0);
            bound = Some(bound.map_or(gap, |b| b.min(gap)));
        };
        if cx + k < self.cols as i64 {
            consider(self.column_start(cx + k) - px);
        }
        if cx - k >= 0 {
            consider(px - self.column_start(cx - k + 1));
        }
        if cy + k < self.rows as i64 {
            consider(self.row_start(cy + k) - pz);
        }
        if cy - k >= 0 {
            consider(pz - self.row_start(cy - k + 1));
        }
        bound.map(|b| b.saturating_mul(b))
    }

    /// Cells at Chebyshev distance exactly `k` from `(cx, cy)` that lie in
    /// the grid: left column, right column, bottom row, top row.
    pub(crate) fn ring_cells(&self, cx: usize, cy: usize, k: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        let (cx, cy, k) = (cx as i64, cy as i64, k as i64);
        let last_col = self.cols as i64 - 1;
        let last_row = self.rows as i64 - 1;
        let y_span = (cy - k).max(0)..=(cy + k).min(last_row);
        let x_span = (cx - k + 1).max(0)..=(cx + k - 1).min(last_col);

        let columns = [cx - k, cx + k]
            .into_iter()
            .filter(move |&x| x >= 0 && x <= last_col)
            .flat_map(move |x| y_span.clone().map(move |y| (x, y)));
        let rows = [cy - k, cy + k]
            .into_iter()
            .filter(move |&y| y >= 0 && y <= last_row)
            .flat_map(move |y| x_span.clone().map(move |x| (x, y)));

        columns.chain(rows).map(|(x, y)| (x as usize, y as usize))
    }
}
