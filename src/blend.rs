use crate::game::{Decision, DecisionOrigin, PolicyDecision};

/// Hands after which the exploit read is fully trusted.
pub const FULL_CONFIDENCE_HANDS: u32 = 30;
const LOW_CONFIDENCE_HANDS: u32 = 5;
const EXPLOIT_THRESHOLD: f32 = 0.5;

/// `sample_size / 30`, capped at 1.
pub fn confidence(sample_size: u32) -> f32 {
    (sample_size as f32 / FULL_CONFIDENCE_HANDS as f32).min(1.0)
}

pub fn confidence_label(sample_size: u32) -> String {
    let level = if sample_size < LOW_CONFIDENCE_HANDS {
        "Low"
    } else if sample_size < FULL_CONFIDENCE_HANDS {
        "Medium"
    } else {
        "High"
    };
    format!("{level} confidence ({sample_size} hands)")
}

/// Clamps λ into `[0, 1]`; NaN counts as pure GTO.
pub fn clamp_lambda(lambda: f32) -> f32 {
    if lambda.is_nan() {
        0.0
    } else {
        lambda.clamp(0.0, 1.0)
    }
}

/// Picks between the GTO and exploit lines. The exploit branch wins only
/// when `λ × confidence` reaches one half, so thin samples fall back to GTO
/// regardless of λ.
pub fn blend(
    gto: &PolicyDecision,
    exploit: &PolicyDecision,
    lambda: f32,
    sample_size: u32,
) -> Decision {
    let confidence = confidence(sample_size);
    let effective_lambda = clamp_lambda(lambda) * confidence;
    let label = confidence_label(sample_size);

    let (chosen, reasoning) = if effective_lambda >= EXPLOIT_THRESHOLD {
        (exploit, format!("{} {label}.", exploit.reasoning))
    } else {
        (gto, format!("{}. {label}.", gto.reasoning))
    };

    Decision {
        action: chosen.action,
        sizing: chosen.sizing.clone(),
        reasoning,
        confidence,
        effective_lambda,
        gto_action: gto.label(),
        exploit_action: exploit.label(),
        origin: DecisionOrigin::RuleBased,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_sample_buckets() {
        assert_eq!(confidence_label(0), "Low confidence (0 hands)");
        assert_eq!(confidence_label(5), "Medium confidence (5 hands)");
        assert_eq!(confidence_label(30), "High confidence (30 hands)");
    }

    #[test]
    fn lambda_is_clamped() {
        assert_eq!(clamp_lambda(f32::NAN), 0.0);
        assert_eq!(clamp_lambda(-0.3), 0.0);
        assert_eq!(clamp_lambda(7.0), 1.0);
        assert_eq!(clamp_lambda(0.4), 0.4);
    }

    #[test]
    fn confidence_saturates() {
        assert_eq!(confidence(15), 0.5);
        assert_eq!(confidence(300), 1.0);
    }
}
