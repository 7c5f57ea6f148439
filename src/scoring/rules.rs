use super::infraction::Infraction;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Name of the built-in rule set.
pub const BRASILIA: &str = "brasilia";

/// Championship points for placements 1 through 10 under the built-in rules.
pub const BRASILIA_PLACEMENT_POINTS: [u32; 10] = [15, 13, 11, 9, 7, 5, 4, 3, 2, 1];

/// Values within this many ULPs below a rounding midpoint are treated as the
/// midpoint, so that a typed `7.005` rounds like the decimal it was meant to
/// be rather than its binary approximation. Anything further below rounds down.
const MIDPOINT_ULPS: f64 = 8.0;

static BUILTIN_BRASILIA: LazyLock<RuleSet> = LazyLock::new(RuleSet::brasilia);

/// A complete scoring rule set.
///
/// Example YAML:
/// ```yaml
/// name: brasilia
/// scale_min: 0
/// scale_max: 10
/// precision: 2
/// weights:
///   strange_notes: 0.25
///   grouped_calls: 0.25
///   return: 0.5
///   rasgada_return: 0.5
///   remontagem: 1.0
///   start_without_entry: 0.5
///   omission: 0.1
///   invalid_chant: 0.25
/// placement_points: [15, 13, 11, 9, 7, 5, 4, 3, 2, 1]
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RuleSet {
    pub name: String,

    /// Lowest possible stage score (default: 0)
    #[serde(default = "default_scale_min")]
    pub scale_min: f64,

    /// Highest possible stage score (default: 10)
    #[serde(default = "default_scale_max")]
    pub scale_max: f64,

    /// Decimal places kept in stage scores and totals (default: 2)
    #[serde(default = "default_precision")]
    pub precision: u32,

    /// Per-occurrence deduction for every infraction category
    pub weights: DeductionWeights,

    /// Championship points by placement, first place first.
    /// Placements past the end of the list earn 0.
    #[serde(default)]
    pub placement_points: Vec<u32>,
}

fn default_scale_min() -> f64 {
    0.0
}

fn default_scale_max() -> f64 {
    10.0
}

fn default_precision() -> u32 {
    2
}

/// Per-occurrence deduction weights, one per infraction category.
///
/// All categories are required so a rule set never relies on a guessed weight.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DeductionWeights {
    pub strange_notes: f64,
    pub grouped_calls: f64,
    pub r#return: f64,
    pub rasgada_return: f64,
    pub remontagem: f64,
    pub start_without_entry: f64,
    pub omission: f64,
    pub invalid_chant: f64,
}

impl DeductionWeights {
    pub const BRASILIA: DeductionWeights = DeductionWeights {
        strange_notes: 0.25,
        grouped_calls: 0.25,
        r#return: 0.50,
        rasgada_return: 0.50,
        remontagem: 1.00,
        start_without_entry: 0.50,
        omission: 0.10,
        invalid_chant: 0.25,
    };

    pub fn weight(&self, infraction: Infraction) -> f64 {
        match infraction {
            Infraction::StrangeNotes => self.strange_notes,
            Infraction::GroupedCalls => self.grouped_calls,
            Infraction::Return => self.r#return,
            Infraction::RasgadaReturn => self.rasgada_return,
            Infraction::Remontagem => self.remontagem,
            Infraction::StartWithoutEntry => self.start_without_entry,
            Infraction::Omission => self.omission,
            Infraction::InvalidChant => self.invalid_chant,
        }
    }

    /// `(category, weight)` pairs in score-sheet order.
    pub fn iter(&self) -> impl Iterator<Item = (Infraction, f64)> + '_ {
        Infraction::ALL.into_iter().map(|i| (i, self.weight(i)))
    }
}

impl RuleSet {
    /// The Brasília rule set: 0-10 scale, two decimals, fixed deduction table.
    pub fn brasilia() -> Self {
        Self {
            name: BRASILIA.to_string(),
            scale_min: 0.0,
            scale_max: 10.0,
            precision: 2,
            weights: DeductionWeights::BRASILIA,
            placement_points: BRASILIA_PLACEMENT_POINTS.to_vec(),
        }
    }

    /// Shared instance of [`RuleSet::brasilia`], built once.
    pub fn builtin_brasilia() -> &'static RuleSet {
        &BUILTIN_BRASILIA
    }

    /// Look up a built-in rule set by name (case-insensitive).
    pub fn builtin(name: &str) -> Option<Self> {
        if name.trim().eq_ignore_ascii_case(BRASILIA) {
            Some(Self::brasilia())
        } else {
            None
        }
    }

    /// Round to this rule set's precision.
    pub fn round(&self, value: f64) -> f64 {
        round_half_up(value, self.precision)
    }

    /// Restrict a value to `[scale_min, scale_max]`.
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.scale_min).min(self.scale_max)
    }

    /// Championship points earned by a 1-based placement.
    pub fn points_for(&self, placement: usize) -> u32 {
        placement
            .checked_sub(1)
            .and_then(|idx| self.placement_points.get(idx))
            .copied()
            .unwrap_or(0)
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::brasilia()
    }
}

/// Round `value` to `precision` decimal places, halves going up.
pub fn round_half_up(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    let scaled = value * factor;
    let nudged = scaled + scaled.abs() * MIDPOINT_ULPS * f64::EPSILON;
    let rounded = (nudged + 0.5).floor() / factor;
    // Avoid handing out -0.0
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}
