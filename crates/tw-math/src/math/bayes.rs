//! Two-hypothesis Bayes update in linear probability space.

/// P(A | x) from the likelihoods of x under A and B and the prior P(A).
///
/// `None` when the evidence denominator `p_a·prior + p_b·(1 − prior)` is
/// zero or not finite, e.g. when both likelihoods underflow far in the tails.
pub fn two_state_posterior(p_a: f64, p_b: f64, prior: f64) -> Option<f64> {
    let joint_a = p_a * prior;
    let evidence = joint_a + p_b * (1.0 - prior);
    if evidence == 0.0 || !evidence.is_finite() {
        return None;
    }
    Some(joint_a / evidence)
}
