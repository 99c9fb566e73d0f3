use rand::Rng;

///
/// Picks the item with the highest value in a single pass.
///
/// Ties are broken uniformly: the k-th item found equal to the running best replaces it with
/// probability 1/k. NaN values are never picked over a real value.
///
pub fn best_with_random_ties<T, R: Rng + ?Sized>(
    items: impl IntoIterator<Item = (T, f64)>,
    rng: &mut R,
) -> Option<T> {
    let mut best: Option<(T, f64)> = None;
    let mut num_best_found = 0u32;
    for (item, value) in items {
        match best.as_ref().map(|(_, best_value)| *best_value) {
            Some(best_value) if value < best_value || value.is_nan() => {}
            Some(best_value) if value == best_value => {
                num_best_found += 1;
                if rng.gen_range(0..num_best_found) == 0 {
                    best = Some((item, value));
                }
            }
            _ => {
                best = Some((item, value));
                num_best_found = 1;
            }
        }
    }
    best.map(|(item, _)| item)
}
