//! Bilinear interpolation over a fingerprint grid
//!
//! The grid is regular, so a bespoke bilinear routine is simpler than a
//! scattered-data dependency. Cells can be unavailable; when any corner of
//! the bracketing rectangle is missing, the nearest available cell (in
//! range-normalized axis space) answers instead.

use crate::fingerprint::Fingerprint;

/// Interpolated value at a continuous grid point, if any cell can answer
///
/// `ttc_secs` is clamped into the tabulated range; `threshold_pct` must lie
/// within the threshold axis range (callers handle the edges).
pub(crate) fn value_at(fp: &Fingerprint, ttc_secs: f64, threshold_pct: f64) -> Option<f64> {
    let ttc_axis = fp.axes().ttc_secs();
    let thr_axis = fp.axes().thresholds_pct();

    let ttc = ttc_secs.clamp(ttc_axis[0] as f64, *ttc_axis.last().unwrap() as f64);

    let (ti_lo, ti_hi, tw) = bracket(&axis_f64(ttc_axis), ttc);
    let (mi_lo, mi_hi, mw) = bracket(thr_axis, threshold_pct);

    let corners = [
        fp.cell(ti_lo, mi_lo),
        fp.cell(ti_lo, mi_hi),
        fp.cell(ti_hi, mi_lo),
        fp.cell(ti_hi, mi_hi),
    ];

    if let [Some(c00), Some(c01), Some(c10), Some(c11)] = corners {
        let lo = c00 + (c01 - c00) * mw;
        let hi = c10 + (c11 - c10) * mw;
        return Some(lo + (hi - lo) * tw);
    }

    // Degenerate neighborhood: nearest available cell
    nearest_available(fp, ttc, threshold_pct)
}

/// Nearest available cell in range-normalized (ttc, threshold) space
pub(crate) fn nearest_available(
    fp: &Fingerprint,
    ttc_secs: f64,
    threshold_pct: f64,
) -> Option<f64> {
    let ttc_axis = fp.axes().ttc_secs();
    let thr_axis = fp.axes().thresholds_pct();

    let ttc_span = (*ttc_axis.last().unwrap() - ttc_axis[0]).max(1) as f64;
    let thr_span = (thr_axis.last().unwrap() - thr_axis[0]).max(f64::MIN_POSITIVE);

    let mut best: Option<(f64, f64)> = None;
    for (ti, ttc) in ttc_axis.iter().enumerate() {
        for (mi, thr) in thr_axis.iter().enumerate() {
            if let Some(value) = fp.cell(ti, mi) {
                let dt = (*ttc as f64 - ttc_secs) / ttc_span;
                let dm = (thr - threshold_pct) / thr_span;
                let dist = dt * dt + dm * dm;
                if best.map(|(d, _)| dist < d).unwrap_or(true) {
                    best = Some((dist, value));
                }
            }
        }
    }
    best.map(|(_, value)| value)
}

fn axis_f64(axis: &[u64]) -> Vec<f64> {
    axis.iter().map(|v| *v as f64).collect()
}

/// Bracketing indices and interpolation weight for `x` on a sorted axis
///
/// Returns `(lo, hi, w)` with `w ∈ [0, 1]`; `lo == hi` at exact grid points
/// and beyond the axis ends.
fn bracket(axis: &[f64], x: f64) -> (usize, usize, f64) {
    if x <= axis[0] {
        return (0, 0, 0.0);
    }
    let last = axis.len() - 1;
    if x >= axis[last] {
        return (last, last, 0.0);
    }
    let hi = axis.partition_point(|v| *v < x);
    let lo = hi - 1;
    if (axis[hi] - axis[lo]).abs() < f64::EPSILON {
        return (lo, lo, 0.0);
    }
    let w = (x - axis[lo]) / (axis[hi] - axis[lo]);
    (lo, hi, w)
}
