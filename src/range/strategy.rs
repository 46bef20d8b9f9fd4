//! Locator strategies for controls on the externally-owned page.
//!
//! The site ships no stable automation contract, so each control carries an
//! ordered, most-specific-first list of ways to find it. The lists live here
//! as data; the executor only knows "try in order, first visible wins".

use std::fmt;

use crate::filters::FilterValue;

/// Class chain the site styles its filter-row buttons with
const ROW_BUTTON_CLASSES: &str =
    "div.gw_btn.gw_btn_text.gw_loading_text.cherow_row_checkbox.cherow_row_checkbox_item";

/// One way of locating a control
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Plain CSS selector match
    Css(String),
    /// CSS selector narrowed to elements whose trimmed text contains `text`
    CssText { css: String, text: String },
    /// Exact trimmed-text match over clickable elements
    Text(String),
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Css(css) => write!(f, "css={css}"),
            Strategy::CssText { css, text } => write!(f, "css={css} text={text}"),
            Strategy::Text(text) => write!(f, "text={text}"),
        }
    }
}

/// Strategies for the range-selector overlay that opens the builder panel
pub fn panel_strategies() -> Vec<Strategy> {
    [
        "div.gmfover.text-noselect.gw_loading_text",
        "div.gmfover",
        "div[class*='gmfover']",
        "div[class*='gw_loading_text']",
    ]
    .iter()
    .map(|s| Strategy::Css((*s).to_string()))
    .collect()
}

/// Ordered strategies for one filter value: attribute match, attribute plus
/// text, pure text, styled row class plus text
pub fn filter_strategies(value: &FilterValue) -> Vec<Strategy> {
    let attr = format!("div[data-tst='{}']", value.site_token);
    let text = value.display_text().to_string();
    vec![
        Strategy::Css(attr.clone()),
        Strategy::CssText {
            css: attr,
            text: text.clone(),
        },
        Strategy::Text(text.clone()),
        Strategy::CssText {
            css: ROW_BUTTON_CLASSES.to_string(),
            text,
        },
    ]
}

/// Selector that confirms a control reached its selected visual state
pub fn active_state_selector(site_token: &str) -> String {
    format!("div[data-tst='{site_token}'].gw_btn_active")
}
