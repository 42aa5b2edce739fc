// Copyright 2026 Modular Cultures Contributors
// SPDX-License-Identifier: Apache-2.0

//! ISI histogram on a log axis, lowess smoothing, and peak finding.

/// Density histogram of inter-spike intervals over log10-spaced bins.
#[derive(Debug, Clone)]
pub struct IsiHistogram {
    /// Bin edges in milliseconds, `density.len() + 1` entries.
    pub edges_ms: Vec<f64>,
    /// Probability density per bin (counts normalized by total and width).
    pub density: Vec<f64>,
}

/// Builds the log-spaced ISI histogram of a spike train (times in seconds).
///
/// Intervals shorter than 1 ms are discarded; bins run from 1 ms to the
/// next full decade above the largest interval, 10 edges per decade.
/// Returns `None` when no interval survives the 1 ms floor.
pub fn isi_histogram(train_s: &[f64]) -> Option<IsiHistogram> {
    let isis_ms: Vec<f64> = train_s
        .windows(2)
        .map(|w| (w[1] - w[0]) * 1000.0)
        .filter(|&isi| isi >= 1.0)
        .collect();
    if isis_ms.is_empty() {
        return None;
    }

    let max_isi = isis_ms.iter().cloned().fold(f64::MIN, f64::max);
    let decades = max_isi.log10().ceil().max(1.0);
    let num_edges = (10.0 * decades) as usize;
    let edges_ms: Vec<f64> = (0..num_edges)
        .map(|k| 10f64.powf(decades * k as f64 / (num_edges - 1) as f64))
        .collect();

    let num_bins = edges_ms.len() - 1;
    let mut counts = vec![0usize; num_bins];
    for &isi in &isis_ms {
        // last bin is closed on the right, matching numpy's convention
        let bin = match edges_ms.iter().rposition(|&e| e <= isi) {
            Some(b) if b < num_bins => b,
            Some(_) => num_bins - 1,
            None => continue,
        };
        if isi <= edges_ms[num_bins] {
            counts[bin] += 1;
        }
    }

    let total = isis_ms.len() as f64;
    let density = counts
        .iter()
        .zip(edges_ms.windows(2))
        .map(|(&c, e)| c as f64 / (total * (e[1] - e[0])))
        .collect();

    Some(IsiHistogram { edges_ms, density })
}

/// Locally weighted linear regression over evenly spaced samples.
///
/// Tricube distance weights, three robustifying iterations with bisquare
/// residual weights. `frac` is the fraction of samples in each local window
/// (at least two).
pub fn lowess_smooth(values: &[f64], frac: f64) -> Vec<f64> {
    let n = values.len();
    if n < 3 {
        return values.to_vec();
    }
    let window = ((frac * n as f64).ceil() as usize).clamp(2, n);
    let mut robustness = vec![1.0; n];
    let mut fitted = values.to_vec();

    for _ in 0..=3 {
        for i in 0..n {
            // nearest `window` samples around i; samples are evenly spaced
            // so the window is just centered and clamped to the ends
            let left = i.saturating_sub((window - 1) / 2).min(n - window);
            let right = left + window;

            let d_max = (i - left).max(right - 1 - i) as f64;
            let (mut sw, mut swx, mut swxx, mut swy, mut swxy) = (0.0, 0.0, 0.0, 0.0, 0.0);
            for j in left..right {
                let d = (j as f64 - i as f64).abs();
                let tri = if d_max > 0.0 {
                    let t = (d / d_max).min(1.0);
                    (1.0 - t * t * t).powi(3)
                } else {
                    1.0
                };
                let w = tri * robustness[j];
                let x = j as f64;
                sw += w;
                swx += w * x;
                swxx += w * x * x;
                swy += w * values[j];
                swxy += w * x * values[j];
            }
            if sw <= 0.0 {
                fitted[i] = values[i];
                continue;
            }
            let denom = sw * swxx - swx * swx;
            fitted[i] = if denom.abs() > 1e-12 * sw * swxx.max(1.0) {
                let slope = (sw * swxy - swx * swy) / denom;
                let intercept = (swy - slope * swx) / sw;
                intercept + slope * i as f64
            } else {
                swy / sw
            };
        }

        // bisquare reweighting by residual size
        let mut abs_res: Vec<f64> = values
            .iter()
            .zip(&fitted)
            .map(|(&y, &f)| (y - f).abs())
            .collect();
        abs_res.sort_by(|a, b| a.total_cmp(b));
        let s = if n % 2 == 0 {
            (abs_res[n / 2 - 1] + abs_res[n / 2]) / 2.0
        } else {
            abs_res[n / 2]
        };
        if s <= 1e-12 {
            break;
        }
        for (r, (&y, &f)) in robustness.iter_mut().zip(values.iter().zip(&fitted)) {
            let u = (y - f).abs() / (6.0 * s);
            *r = if u < 1.0 { (1.0 - u * u).powi(2) } else { 0.0 };
        }
    }

    fitted
}

/// Indices of local maxima with non-negative height.
///
/// A sample at the left edge counts as a peak when it exceeds its right
/// neighbor; plateaus report their middle sample. The final sample never
/// counts (it has no right neighbor).
pub fn find_peaks(values: &[f64]) -> Vec<usize> {
    let n = values.len();
    let mut peaks = Vec::new();
    let mut i = 0;
    while i < n {
        let left = if i == 0 { f64::NEG_INFINITY } else { values[i - 1] };
        if values[i] > left {
            let mut j = i;
            while j + 1 < n && values[j + 1] == values[i] {
                j += 1;
            }
            if j + 1 < n && values[j + 1] < values[i] {
                let mid = (i + j) / 2;
                if values[mid] >= 0.0 {
                    peaks.push(mid);
                }
            }
            i = j + 1;
        } else {
            i += 1;
        }
    }
    peaks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_spans_decades() {
        // isis of 10 ms and 1000 ms -> three decades of bins
        let train = vec![0.0, 0.010, 1.010, 1.020, 2.020];
        let h = isi_histogram(&train).unwrap();
        assert_eq!(h.edges_ms.len(), 30);
        assert!((h.edges_ms[0] - 1.0).abs() < 1e-12);
        assert!((h.edges_ms[29] - 1000.0).abs() < 1e-6);
        assert_eq!(h.density.len(), 29);
        // density integrates to one
        let mass: f64 = h
            .density
            .iter()
            .zip(h.edges_ms.windows(2))
            .map(|(&d, e)| d * (e[1] - e[0]))
            .sum();
        assert!((mass - 1.0).abs() < 1e-9);
    }

    #[test]
    fn histogram_drops_sub_millisecond_intervals() {
        let train = vec![0.0, 0.0001, 0.0002, 0.0003];
        assert!(isi_histogram(&train).is_none());
    }

    #[test]
    fn lowess_preserves_a_line() {
        let y: Vec<f64> = (0..50).map(|i| 2.0 * i as f64 + 1.0).collect();
        let s = lowess_smooth(&y, 0.3);
        for (a, b) in y.iter().zip(&s) {
            assert!((a - b).abs() < 1e-6, "{a} vs {b}");
        }
    }

    #[test]
    fn lowess_flattens_an_outlier() {
        let mut y = vec![1.0; 40];
        y[20] = 100.0;
        let s = lowess_smooth(&y, 0.25);
        assert!(s[20] < 50.0);
        assert!((s[0] - 1.0).abs() < 0.5);
    }

    #[test]
    fn peaks_interior_and_edges() {
        let h = [5.0, 1.0, 0.0, 3.0, 1.0, 2.0];
        // index 0 exceeds its right neighbor, 3 is interior, 5 has no right
        assert_eq!(find_peaks(&h), vec![0, 3]);
    }

    #[test]
    fn peaks_plateau_reports_middle() {
        let h = [0.0, 2.0, 2.0, 2.0, 0.0];
        assert_eq!(find_peaks(&h), vec![2]);
    }

    #[test]
    fn peaks_skip_negative_maxima() {
        let h = [-3.0, -1.0, -2.0];
        assert!(find_peaks(&h).is_empty());
    }
}
