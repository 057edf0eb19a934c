use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};

/// p-value thresholds (inclusive) and their significance symbols; anything
/// above the last threshold is not significant.
pub const SIGNIFICANCE_LEVELS: [(f64, &str); 4] = [
    (0.0001, "****"),
    (0.001, "***"),
    (0.01, "**"),
    (0.05, "*"),
];

pub fn significance_symbol(p_value: f64) -> &'static str {
    for (threshold, symbol) in SIGNIFICANCE_LEVELS {
        if p_value <= threshold {
            return symbol;
        }
    }
    "ns"
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupComparison {
    pub group_a: String,
    pub group_b: String,
    pub p_value: f64,
    pub symbol: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub kruskal_wallis_p: Option<f64>,
    pub pairwise: Vec<GroupComparison>,
}

/// Kruskal-Wallis across all groups plus pairwise Mann-Whitney tests with
/// significance symbols.
pub fn compare_groups(groups: &[(String, Vec<f64>)]) -> ComparisonReport {
    let kruskal_wallis_p = (groups.len() >= 2)
        .then(|| kruskal_wallis(&groups.iter().map(|(_, v)| v.clone()).collect::<Vec<_>>()));

    let mut pairwise = Vec::new();
    for i in 0..groups.len() {
        for j in i + 1..groups.len() {
            let p_value = mann_whitney_u(&groups[i].1, &groups[j].1);
            pairwise.push(GroupComparison {
                group_a: groups[i].0.clone(),
                group_b: groups[j].0.clone(),
                p_value,
                symbol: significance_symbol(p_value).to_string(),
            });
        }
    }

    ComparisonReport {
        kruskal_wallis_p,
        pairwise,
    }
}

/// Two-sided Mann-Whitney U via the normal approximation with tie and
/// continuity corrections. Degenerate inputs (empty samples, all values
/// tied) report p = 1.
pub fn mann_whitney_u(a: &[f64], b: &[f64]) -> f64 {
    let n1 = a.len();
    let n2 = b.len();
    if n1 == 0 || n2 == 0 {
        return 1.0;
    }
    let pooled: Vec<f64> = a.iter().chain(b).copied().collect();
    let (ranks, tie_sizes) = rank_with_ties(&pooled);

    let r1: f64 = ranks[..n1].iter().sum();
    let u1 = r1 - (n1 * (n1 + 1)) as f64 / 2.0;
    let n = (n1 + n2) as f64;
    let mu = (n1 * n2) as f64 / 2.0;
    let tie_term: f64 = tie_sizes
        .iter()
        .map(|&t| (t * t * t - t) as f64)
        .sum::<f64>()
        / (n * (n - 1.0));
    let variance = (n1 * n2) as f64 / 12.0 * ((n + 1.0) - tie_term);
    if variance <= 0.0 {
        return 1.0;
    }
    let z = ((u1 - mu).abs() - 0.5).max(0.0) / variance.sqrt();
    let Ok(normal) = Normal::new(0.0, 1.0) else {
        return 1.0;
    };
    (2.0 * (1.0 - normal.cdf(z))).clamp(0.0, 1.0)
}

/// Kruskal-Wallis H test across two or more groups, chi-squared p-value with
/// tie correction. Degenerate inputs report p = 1.
pub fn kruskal_wallis(groups: &[Vec<f64>]) -> f64 {
    let k = groups.len();
    let n_total: usize = groups.iter().map(Vec::len).sum();
    if k < 2 || n_total < 2 || groups.iter().any(Vec::is_empty) {
        return 1.0;
    }
    let pooled: Vec<f64> = groups.iter().flatten().copied().collect();
    let (ranks, tie_sizes) = rank_with_ties(&pooled);

    let n = n_total as f64;
    let mut h = 0.0;
    let mut offset = 0;
    for group in groups {
        let r: f64 = ranks[offset..offset + group.len()].iter().sum();
        h += r * r / group.len() as f64;
        offset += group.len();
    }
    h = 12.0 / (n * (n + 1.0)) * h - 3.0 * (n + 1.0);

    let tie_sum: f64 = tie_sizes.iter().map(|&t| (t * t * t - t) as f64).sum();
    let correction = 1.0 - tie_sum / (n * n * n - n);
    if correction <= 0.0 {
        return 1.0;
    }
    h /= correction;

    let Ok(chi) = ChiSquared::new((k - 1) as f64) else {
        return 1.0;
    };
    (1.0 - chi.cdf(h.max(0.0))).clamp(0.0, 1.0)
}

/// Average ranks for the pooled values in their given order, plus the size
/// of every tie run.
fn rank_with_ties(pooled: &[f64]) -> (Vec<f64>, Vec<usize>) {
    let mut order: Vec<usize> = (0..pooled.len()).collect();
    order.sort_by(|&i, &j| pooled[i].partial_cmp(&pooled[j]).unwrap_or(std::cmp::Ordering::Equal));

    let mut ranks = vec![0.0; pooled.len()];
    let mut tie_sizes = Vec::new();
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && pooled[order[end]] == pooled[order[start]] {
            end += 1;
        }
        // Tied values share the average of the ranks they span.
        let rank = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = rank;
        }
        if end - start > 1 {
            tie_sizes.push(end - start);
        }
        start = end;
    }
    (ranks, tie_sizes)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage6_compare.rs"]
mod tests;
