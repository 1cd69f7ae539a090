use ndarray::{Array1, Array2, ArrayView1, Axis};

/// Cosine similarity of `query` against every row of `table`.
///
/// A zero-norm query or row scores 0 against everything.
pub fn cosine_against_rows(query: ArrayView1<f64>, table: &Array2<f64>) -> Array1<f64> {
    let query_norm = query.dot(&query).sqrt();
    if query_norm == 0.0 {
        return Array1::zeros(table.nrows());
    }
    table
        .axis_iter(Axis(0))
        .map(|row| {
            let row_norm = row.dot(&row).sqrt();
            if row_norm == 0.0 {
                0.0
            } else {
                row.dot(&query) / (row_norm * query_norm)
            }
        })
        .collect()
}

/// Indices of the `k` largest scores, best first. Ties keep the lower index
/// first.
pub fn top_k_indices(scores: &Array1<f64>, k: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));
    order.truncate(k);
    order
}
