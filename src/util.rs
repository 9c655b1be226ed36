use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

/// math_rand_alpha generates a mathematical random alphanumeric string of the
/// requested length. Used for track, stream and session identifiers.
pub(crate) fn math_rand_alpha(n: usize) -> String {
    let rng = thread_rng();
    rng.sample_iter(&Alphanumeric)
        .take(n)
        .map(char::from)
        .collect()
}
