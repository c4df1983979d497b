/// Average token confidence, 0–100, rounded to two decimals.
///
/// Values ≤ 0 are skipped: -1 marks positions without text and zero-confidence
/// tokens carry no signal. Returns 0.0 when nothing qualifies.
pub fn score_confidence(token_confidences: &[f64]) -> f64 {
    let (sum, count) = token_confidences
        .iter()
        .filter(|conf| **conf > 0.0)
        .fold((0.0, 0usize), |(sum, count), conf| (sum + conf, count + 1));

    if count == 0 {
        return 0.0;
    }

    round2(sum / count as f64)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
