//! Ordered-fallback executor for the range-builder panel.
//!
//! One run opens the builder overlay, then walks the supplied filters in
//! their fixed order. Each filter tries its strategy list most-specific
//! first and stops at the first visible hit; failures are collected per
//! filter rather than aborting the sequence, and nothing already clicked is
//! rolled back.

pub mod strategy;

use chromiumoxide::Page;
use serde::Serialize;

use crate::browser::PageDriver;
use crate::config::ExecutorSettings;
use crate::error::{RangepilotError, Result};
use crate::filters::{action_token, FilterDef, FilterSelection, FilterValue};
use strategy::{active_state_selector, filter_strategies, panel_strategies};

/// One filter that could not be applied
#[derive(Debug, Clone, Serialize)]
pub struct FilterFailure {
    pub filter: String,
    pub value: String,
    pub error: String,
}

/// Outcome of one get-range run
#[derive(Debug, Clone)]
pub struct RangeReport {
    pub message: String,
    pub action_performed: String,
    pub failures: Vec<FilterFailure>,
}

pub struct RangeExecutor<'a> {
    driver: PageDriver<'a>,
    settings: &'a ExecutorSettings,
}

impl<'a> RangeExecutor<'a> {
    pub fn new(page: &'a Page, settings: &'a ExecutorSettings) -> Self {
        Self {
            driver: PageDriver::new(page, settings.poll_interval()),
            settings,
        }
    }

    pub async fn run(&self, selection: &FilterSelection) -> RangeReport {
        // Opening the overlay is advisory: the panel may already be open
        // from an earlier request on the same session.
        let panel_open = self.open_panel().await;
        if !panel_open {
            tracing::warn!("range selector overlay not found; continuing with filters");
        }

        let mut applied: Vec<(&'static FilterDef, &'static FilterValue)> = Vec::new();
        let mut failures: Vec<FilterFailure> = Vec::new();

        for (def, raw) in selection.supplied() {
            let value = match def.require(raw) {
                Ok(value) => value,
                Err(e) => {
                    failures.push(FilterFailure {
                        filter: def.name.to_string(),
                        value: raw.to_string(),
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            match self.apply_filter(def, value).await {
                Ok(()) => applied.push((def, value)),
                Err(e) => {
                    tracing::warn!(filter = def.name, value = value.value, error = %e, "filter not applied");
                    failures.push(FilterFailure {
                        filter: def.name.to_string(),
                        value: value.value.to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        build_report(panel_open, &applied, failures)
    }

    /// Try the overlay strategies in order; true once one clicks
    async fn open_panel(&self) -> bool {
        for strategy in panel_strategies() {
            let Some(point) = self
                .driver
                .locate_visible(&strategy, self.settings.locate_timeout())
                .await
            else {
                tracing::debug!(%strategy, "range selector strategy found nothing");
                continue;
            };

            match self.driver.click_at(point).await {
                Ok(()) => {
                    tracing::info!(%strategy, "opened range selector overlay");
                    return true;
                }
                Err(e) => {
                    tracing::debug!(%strategy, error = %e, "range selector click failed");
                }
            }
        }
        false
    }

    /// Apply one filter value: first strategy that locates a visible
    /// control wins; the post-click state check never fails the filter.
    async fn apply_filter(&self, def: &FilterDef, value: &FilterValue) -> Result<()> {
        for strategy in filter_strategies(value) {
            let Some(point) = self
                .driver
                .locate_visible(&strategy, self.settings.locate_timeout())
                .await
            else {
                tracing::debug!(filter = def.name, %strategy, "strategy found nothing");
                continue;
            };

            if let Err(e) = self.driver.click_at(point).await {
                tracing::debug!(filter = def.name, %strategy, error = %e, "click failed");
                continue;
            }

            tracing::info!(
                filter = def.name,
                value = value.value,
                %strategy,
                "clicked filter control"
            );

            tokio::time::sleep(self.settings.settle()).await;

            let active = self
                .driver
                .selector_present(
                    &active_state_selector(value.site_token),
                    self.settings.verify_timeout(),
                )
                .await;
            if active {
                tracing::debug!(filter = def.name, value = value.value, "control reports active state");
            } else {
                // Click success is trusted over confirmation
                tracing::warn!(
                    filter = def.name,
                    value = value.value,
                    "could not confirm active state after click"
                );
            }

            return Ok(());
        }

        Err(RangepilotError::ControlNotFound {
            control: def.name.to_string(),
            value: value.value.to_string(),
        })
    }
}

/// Assemble the human-readable message and the composite action tag
fn build_report(
    panel_open: bool,
    applied: &[(&'static FilterDef, &'static FilterValue)],
    failures: Vec<FilterFailure>,
) -> RangeReport {
    let mut parts: Vec<String> = Vec::new();
    if panel_open {
        parts.push("Successfully clicked on range selector div".to_string());
    } else {
        parts.push("Range selector div could not be opened".to_string());
    }

    let mut tokens: Vec<String> = Vec::new();
    for (def, value) in applied {
        tokens.push(format!("clicked_{}", action_token(value.value)));
        parts.push(format!("{} {} button", value.value, def.name));
    }

    let action_performed = if !tokens.is_empty() {
        tokens.join("_and_")
    } else if panel_open {
        "clicked_range_selector".to_string()
    } else {
        "no_action".to_string()
    };

    RangeReport {
        message: parts.join(" and "),
        action_performed,
        failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{CASH_PLAYERS, SOLUTIONS};

    #[test]
    fn report_concatenates_tokens_and_message_parts() {
        let applied = vec![
            (&SOLUTIONS, SOLUTIONS.lookup("Cash").unwrap()),
            (&CASH_PLAYERS, CASH_PLAYERS.lookup("6max").unwrap()),
        ];

        let report = build_report(true, &applied, Vec::new());

        assert_eq!(report.action_performed, "clicked_cash_and_clicked_6max");
        assert_eq!(
            report.message,
            "Successfully clicked on range selector div and Cash solutions button and 6max cash_players button"
        );
        assert!(report.failures.is_empty());
    }

    #[test]
    fn report_without_filters_names_the_range_selector() {
        let report = build_report(true, &[], Vec::new());

        assert_eq!(report.action_performed, "clicked_range_selector");
        assert_eq!(report.message, "Successfully clicked on range selector div");
    }

    #[test]
    fn report_with_nothing_clicked_says_so() {
        let report = build_report(false, &[], Vec::new());

        assert_eq!(report.action_performed, "no_action");
        assert!(report.message.contains("could not be opened"));
    }

    #[test]
    fn report_keeps_successes_alongside_failures() {
        let applied = vec![(&SOLUTIONS, SOLUTIONS.lookup("MTT").unwrap())];
        let failures = vec![FilterFailure {
            filter: "cash_players".to_string(),
            value: "6max".to_string(),
            error: "Could not find or click the cash_players control for '6max'".to_string(),
        }];

        let report = build_report(true, &applied, failures);

        assert_eq!(report.action_performed, "clicked_mtt");
        assert!(report.message.contains("MTT solutions button"));
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].filter, "cash_players");
    }

    #[test]
    fn panel_failure_does_not_hide_applied_filters() {
        let applied = vec![(&SOLUTIONS, SOLUTIONS.lookup("Spin & Go").unwrap())];

        let report = build_report(false, &applied, Vec::new());

        assert_eq!(report.action_performed, "clicked_spin_and_go");
        assert!(report.message.starts_with("Range selector div could not be opened"));
        assert!(report.message.contains("Spin & Go solutions button"));
    }
}
