use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// Number of discrete weight positions on the actuarial slider (0%, 10%, ... 100%).
pub const SLIDER_STEPS: usize = 11;

/// Actuarial overlay block attached to every record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActuarialBlock {
    /// Loss-risk index before refinement (0-100).
    pub base: i32,
    /// Heuristic score the slider delta is applied to.
    pub pre_actuarial_score: i32,
    pub slider_deltas: SliderDeltas,
    /// Delta at 100% weight.
    #[serde(default)]
    pub full_delta: i32,
    /// Base analysis already sits at the ceiling; the overlay is not applied.
    #[serde(default)]
    pub show_max_risk_message: bool,
}

/// Signed score deltas keyed by slider step index (0..=10).
///
/// Upstream exports either an 11-element array or an object keyed by the
/// step index as a string. Both shapes are accepted; `null` entries are
/// dropped so lookups fall back to zero. Serializes as an object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SliderDeltas(BTreeMap<u8, i32>);

impl SliderDeltas {
    pub fn new(deltas: impl IntoIterator<Item = (u8, i32)>) -> Self {
        Self(deltas.into_iter().collect())
    }

    /// Delta for a step, or 0 when the table has no entry.
    pub fn get(&self, step: u8) -> i32 {
        self.0.get(&step).copied().unwrap_or(0)
    }

    pub fn contains(&self, step: u8) -> bool {
        self.0.contains_key(&step)
    }

    /// Explicitly present step indices, ascending.
    pub fn steps(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDeltas {
    List(Vec<Option<i32>>),
    Map(BTreeMap<String, Option<i32>>),
}

impl<'de> Deserialize<'de> for SliderDeltas {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut out = BTreeMap::new();
        match RawDeltas::deserialize(deserializer)? {
            RawDeltas::List(values) => {
                for (idx, value) in values.into_iter().enumerate() {
                    let step = u8::try_from(idx)
                        .map_err(|_| de::Error::custom("slider_deltas array is too long"))?;
                    if let Some(v) = value {
                        out.insert(step, v);
                    }
                }
            }
            RawDeltas::Map(entries) => {
                for (key, value) in entries {
                    let step: u8 = key
                        .trim()
                        .parse()
                        .map_err(|_| de::Error::custom(InvalidStepKey(&key)))?;
                    if let Some(v) = value {
                        out.insert(step, v);
                    }
                }
            }
        }
        Ok(Self(out))
    }
}

struct InvalidStepKey<'a>(&'a str);

impl fmt::Display for InvalidStepKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid slider step key {:?}", self.0)
    }
}
