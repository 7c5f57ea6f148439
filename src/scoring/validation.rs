use super::rules::RuleSet;

/// Highest rounding precision a rule set may ask for.
pub const MAX_PRECISION: u32 = 6;

/// Validate a rule set before scoring with it.
/// Returns all validation errors at once (not just the first).
pub fn validate_rules(rules: &RuleSet) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    let prefix = if rules.name.trim().is_empty() {
        errors.push("rule set name: must not be empty".to_string());
        "rules".to_string()
    } else {
        format!("rules.{}", rules.name)
    };

    for (infraction, weight) in rules.weights.iter() {
        if !weight.is_finite() {
            errors.push(format!(
                "{}.weights.{}: must be a finite number",
                prefix,
                infraction.key()
            ));
        } else if weight < 0.0 {
            errors.push(format!(
                "{}.weights.{}: must be non-negative, got {}",
                prefix,
                infraction.key(),
                weight
            ));
        }
    }

    let bounds_finite = rules.scale_min.is_finite() && rules.scale_max.is_finite();
    if !bounds_finite {
        errors.push(format!("{}.scale: bounds must be finite numbers", prefix));
    } else if rules.scale_min >= rules.scale_max {
        errors.push(format!(
            "{}.scale: scale_min ({}) must be below scale_max ({})",
            prefix, rules.scale_min, rules.scale_max
        ));
    }

    if rules.precision > MAX_PRECISION {
        errors.push(format!(
            "{}.precision: at most {} decimal places, got {}",
            prefix, MAX_PRECISION, rules.precision
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
