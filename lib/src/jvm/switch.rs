//! Lowering of multi-way branches on `int` keys
//!
//! The JVM has two instructions for this: `tableswitch` indexes into a dense table of jump
//! targets, while `lookupswitch` searches a sorted list of key-target pairs. Both are
//! observationally the same, so the choice is purely one of cost, made the same way `javac`
//! makes it.

use super::Error;
use std::collections::BTreeMap;
use std::fmt;

/// A lowered `switch`
#[derive(Clone, Debug, PartialEq)]
pub enum Switch<T> {
    /// Dense jump table (`tableswitch`)
    Table {
        /// Key associated with the first target
        low: i32,

        /// Targets for keys `low`, `low + 1`, ... (gaps are filled with `default`)
        targets: Vec<T>,

        /// Target if the key is outside the table
        default: T,
    },

    /// Sorted search (`lookupswitch`)
    Lookup {
        /// Targets, sorted so that the keys are ascending
        targets: Vec<(i32, T)>,

        /// Target if there is no matching key
        default: T,
    },
}

impl<T: Clone> Switch<T> {
    /// Pick the cheaper of a table or a lookup for these cases
    ///
    /// Costs follow `javac`: space is measured in words of instruction, time in comparisons,
    /// and time is weighted three times more than space.
    pub fn lower(
        cases: impl IntoIterator<Item = (i32, T)>,
        default: T,
    ) -> Result<Switch<T>, Error> {
        let mut sorted: BTreeMap<i32, T> = BTreeMap::new();
        for (key, target) in cases {
            if sorted.insert(key, target).is_some() {
                return Err(Error::DuplicateSwitchKey(key));
            }
        }

        let (low, high) = match (sorted.keys().next(), sorted.keys().next_back()) {
            (Some(low), Some(high)) => (*low, *high),
            _ => {
                return Ok(Switch::Lookup {
                    targets: vec![],
                    default,
                })
            }
        };

        let count = sorted.len() as i64;
        let table_space_cost = 4 + (high as i64 - low as i64 + 1);
        let table_time_cost = 3;
        let lookup_space_cost = 3 + 2 * count;
        let lookup_time_cost = count;
        let use_table = table_space_cost + 3 * table_time_cost
            <= lookup_space_cost + 3 * lookup_time_cost;

        log::trace!(
            "Lowering switch on {} keys in [{}, {}] to a {}",
            count,
            low,
            high,
            if use_table { "table" } else { "lookup" }
        );

        if use_table {
            let mut targets = Vec::with_capacity((high as i64 - low as i64 + 1) as usize);
            for key in low..=high {
                targets.push(sorted.get(&key).unwrap_or(&default).clone());
            }
            Ok(Switch::Table {
                low,
                targets,
                default,
            })
        } else {
            Ok(Switch::Lookup {
                targets: sorted.into_iter().collect(),
                default,
            })
        }
    }
}

impl<T> Switch<T> {
    /// Find the target for a key
    pub fn select(&self, key: i32) -> &T {
        match self {
            Switch::Table {
                low,
                targets,
                default,
            } => {
                let index = key as i64 - *low as i64;
                if index < 0 {
                    default
                } else {
                    targets.get(index as usize).unwrap_or(default)
                }
            }
            Switch::Lookup { targets, default } => {
                match targets.binary_search_by_key(&key, |(k, _)| *k) {
                    Ok(found) => &targets[found].1,
                    Err(_) => default,
                }
            }
        }
    }

    pub fn is_table(&self) -> bool {
        matches!(self, Switch::Table { .. })
    }
}

/// Renders the instruction with its operands, one case per line
impl<T: fmt::Display> fmt::Display for Switch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Switch::Table {
                low,
                targets,
                default,
            } => {
                let high = *low as i64 + targets.len() as i64 - 1;
                writeln!(f, "tableswitch low = {}, high = {}", low, high)?;
                for (offset, target) in targets.iter().enumerate() {
                    writeln!(f, "  {}: {}", *low as i64 + offset as i64, target)?;
                }
                write!(f, "  default: {}", default)
            }
            Switch::Lookup { targets, default } => {
                writeln!(f, "lookupswitch npairs {}", targets.len())?;
                for (key, target) in targets {
                    writeln!(f, "  {} : {}", key, target)?;
                }
                write!(f, "  default: {}", default)
            }
        }
    }
}
