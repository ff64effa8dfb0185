use std::sync::LazyLock;

use prometheus::*;

static METRIC_SEARCH_COUNT: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!("codress_search_count", "count of text searches", &["kind"])
        .expect("failed to register metric")
});

static METRIC_SEARCH_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    register_histogram_vec!(
        "codress_search_duration",
        "duration of the text search in seconds",
        &["kind"]
    )
    .expect("failed to register metric")
});

static METRIC_SEARCH_BEST_SCORE: LazyLock<HistogramVec> = LazyLock::new(|| {
    register_histogram_vec!(
        "codress_search_best_score",
        "similarity of the best search result",
        &["kind"],
        (0..=20).map(|x| x as f64 * 0.05).collect()
    )
    .expect("failed to register metric")
});

static METRIC_UPLOAD_COUNT: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!("codress_upload_count", "count of image uploads", &["outcome"])
        .expect("failed to register metric")
});

/// 记录一次搜索
pub fn inc_search(kind: &str, duration: f32, best_score: Option<f32>) {
    METRIC_SEARCH_COUNT.with_label_values(&[kind]).inc();
    METRIC_SEARCH_DURATION.with_label_values(&[kind]).observe(duration as f64);
    if let Some(score) = best_score {
        METRIC_SEARCH_BEST_SCORE.with_label_values(&[kind]).observe(score as f64);
    }
}

/// 记录一次上传，`outcome` 为 ok 或失败原因
pub fn inc_upload(outcome: &str) {
    METRIC_UPLOAD_COUNT.with_label_values(&[outcome]).inc();
}
