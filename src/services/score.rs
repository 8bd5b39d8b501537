/// Derived ranking score: `((speed * accuracy - misses) * accuracy) + speed`.
///
/// Accuracy is applied twice so it compounds; misses are subtracted once
/// before the second accuracy factor. Every stored score, on insert and on
/// correction, goes through this function.
pub fn derive(speed: i64, accuracy: f64, miss_type_count: i64) -> f64 {
    let speed = speed as f64;
    ((speed * accuracy - miss_type_count as f64) * accuracy) + speed
}
