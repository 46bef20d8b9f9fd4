//! Filter catalog for the range-builder panel.
//!
//! Every filter the external site exposes is a closed set of values, each
//! rendered as a clickable row carrying a `data-tst` attribute. The tables
//! here are the only place those value sets and attribute tokens live; the
//! executor never hardcodes a selector for a specific value.

use serde::Deserialize;

use crate::error::{RangepilotError, Result};

/// One selectable value of a filter: the caller-facing string, the site's
/// `data-tst` attribute token, and the text rendered on the control when it
/// differs from the value itself.
#[derive(Debug)]
pub struct FilterValue {
    pub value: &'static str,
    pub site_token: &'static str,
    pub label: Option<&'static str>,
}

impl FilterValue {
    /// Text shown on the control, used by the text-based locator strategies
    pub fn display_text(&self) -> &'static str {
        self.label.unwrap_or(self.value)
    }
}

/// A named filter and its closed value set, in declaration order
#[derive(Debug)]
pub struct FilterDef {
    pub name: &'static str,
    pub values: &'static [FilterValue],
}

impl FilterDef {
    pub fn lookup(&self, value: &str) -> Option<&'static FilterValue> {
        self.values.iter().find(|v| v.value == value)
    }

    /// Comma-separated allowed values, for error messages
    pub fn allowed(&self) -> String {
        self.values
            .iter()
            .map(|v| v.value)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn require(&self, value: &str) -> Result<&'static FilterValue> {
        self.lookup(value)
            .ok_or_else(|| RangepilotError::InvalidFilterValue {
                filter: self.name,
                value: value.to_string(),
                allowed: self.allowed(),
            })
    }
}

const fn v(value: &'static str, site_token: &'static str) -> FilterValue {
    FilterValue {
        value,
        site_token,
        label: None,
    }
}

const fn labeled(
    value: &'static str,
    site_token: &'static str,
    label: &'static str,
) -> FilterValue {
    FilterValue {
        value,
        site_token,
        label: Some(label),
    }
}

pub static SOLUTIONS: FilterDef = FilterDef {
    name: "solutions",
    values: &[
        v("Cash", "chrow_cash"),
        v("MTT", "chrow_mtt"),
        v("Spin & Go", "chrow_spins"),
        v("Hu SnG", "chrow_husng"),
    ],
};

pub static CASH_TYPE: FilterDef = FilterDef {
    name: "cash_type",
    values: &[
        v("Classic", "chrow_classic"),
        v("Short", "chrow_shortstack"),
        v("Ante", "chrow_ante"),
        v("Straddle", "chrow_straddle"),
        v("Straddle+Ante", "chrow_ante_straddle"),
        v("DoubleStraddle", "chrow_double_straddle"),
        v("MississippiStraddle", "chrow_mississippi_straddle"),
    ],
};

pub static CASH_PLAYERS: FilterDef = FilterDef {
    name: "cash_players",
    values: &[
        v("Heads-up", "chrow_hu"),
        v("6max", "chrow_6max"),
        v("8max", "chrow_8max"),
        v("9max", "chrow_9max"),
    ],
};

pub static AVAILABLE_SPOTS: FilterDef = FilterDef {
    name: "available_spots",
    values: &[
        labeled("postflop_included", "chrow_all_spots", "Postflop included"),
        labeled("preflop_only", "chrow_preflop_only", "Preflop only"),
    ],
};

pub static CASH_STACKS: FilterDef = FilterDef {
    name: "cash_stacks",
    values: &[
        v("Any", "chrow_any"),
        v("200", "chrow_200"),
        v("150", "chrow_150"),
        v("100", "chrow_100"),
        v("75", "chrow_75"),
        v("50", "chrow_50"),
        v("40", "chrow_40"),
        v("20", "chrow_20"),
    ],
};

pub static BET_SIZES: FilterDef = FilterDef {
    name: "bet_sizes",
    values: &[
        v("General", "chrow_general"),
        v("Simplified", "chrow_simplified"),
        v("Complex", "chrow_complex"),
    ],
};

pub static RAKE: FilterDef = FilterDef {
    name: "rake",
    values: &[
        v("NL50", "chrow_nl50"),
        v("NL500", "chrow_nl500"),
        labeled("NoRake", "chrow_no_rake", "No rake"),
    ],
};

pub static CASH_OPEN_SIZE: FilterDef = FilterDef {
    name: "cash_open_size",
    values: &[
        v("2x", "chrow_open_2x"),
        v("2.5x", "chrow_open_25x"),
        v("3x", "chrow_open_3x"),
    ],
};

pub static CASH_3BET_SIZE: FilterDef = FilterDef {
    name: "cash_3bet_size",
    values: &[
        v("Small", "chrow_3bet_small"),
        v("Medium", "chrow_3bet_medium"),
        v("Large", "chrow_3bet_large"),
    ],
};

pub static HERO: FilterDef = FilterDef {
    name: "hero",
    values: &[
        v("UTG", "chrow_utg"),
        v("HJ", "chrow_hj"),
        v("CO", "chrow_co"),
        v("BTN", "chrow_btn"),
        v("SB", "chrow_sb"),
        v("BB", "chrow_bb"),
    ],
};

/// Fixed application order. Later filters are attempted even when an
/// earlier one in the same request failed.
pub static ALL_FILTERS: [&FilterDef; 10] = [
    &SOLUTIONS,
    &CASH_TYPE,
    &CASH_PLAYERS,
    &AVAILABLE_SPOTS,
    &CASH_STACKS,
    &BET_SIZES,
    &RAKE,
    &CASH_OPEN_SIZE,
    &CASH_3BET_SIZE,
    &HERO,
];

/// The optional filter fields of a get-range request. Blank or
/// whitespace-only values count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterSelection {
    pub solutions: Option<String>,
    pub cash_type: Option<String>,
    pub cash_players: Option<String>,
    pub available_spots: Option<String>,
    pub cash_stacks: Option<String>,
    pub bet_sizes: Option<String>,
    pub rake: Option<String>,
    pub cash_open_size: Option<String>,
    pub cash_3bet_size: Option<String>,
    pub hero: Option<String>,
}

impl FilterSelection {
    fn field(&self, name: &str) -> Option<&str> {
        let raw = match name {
            "solutions" => &self.solutions,
            "cash_type" => &self.cash_type,
            "cash_players" => &self.cash_players,
            "available_spots" => &self.available_spots,
            "cash_stacks" => &self.cash_stacks,
            "bet_sizes" => &self.bet_sizes,
            "rake" => &self.rake,
            "cash_open_size" => &self.cash_open_size,
            "cash_3bet_size" => &self.cash_3bet_size,
            "hero" => &self.hero,
            _ => &None,
        };
        raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Supplied (filter, value) pairs in the fixed application order
    pub fn supplied(&self) -> Vec<(&'static FilterDef, &str)> {
        ALL_FILTERS
            .iter()
            .filter_map(|def| self.field(def.name).map(|value| (*def, value)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.supplied().is_empty()
    }

    /// Check every supplied value against its closed set before anything
    /// touches the page
    pub fn validate(&self) -> Result<()> {
        for (def, value) in self.supplied() {
            def.require(value)?;
        }
        Ok(())
    }
}

/// Normalize a filter value into its action token: lowercase, `&` -> `and`,
/// `+` -> `plus`, spaces and dashes -> `_`, all other punctuation dropped.
pub fn action_token(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.to_lowercase().chars() {
        match c {
            '&' => out.push_str("and"),
            '+' => out.push_str("plus"),
            ' ' | '-' => out.push('_'),
            c if c.is_ascii_alphanumeric() || c == '_' => out.push(c),
            _ => {}
        }
    }
    out
}
