use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::config::BrowserSettings;
use crate::error::{RangepilotError, Result};

/// Everything a live session owns, in acquisition order: the browser
/// process, the page on it, and the task draining CDP events.
#[derive(Debug)]
pub struct BrowserHandles {
    pub browser: Browser,
    pub page: Page,
    pub event_task: JoinHandle<()>,
}

/// Builds and launches a browser from the `[browser]` configuration section
pub struct BrowserLauncher {
    settings: BrowserSettings,
}

impl BrowserLauncher {
    pub fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }

    fn build_config(&self) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(self.settings.window_width, self.settings.window_height)
            .args(self.build_args());

        if !self.settings.headless {
            builder = builder.with_head();
        }
        if let Some(path) = self.settings.expanded_executable() {
            builder = builder.chrome_executable(path);
        }
        if let Some(dir) = self.settings.expanded_user_data_dir() {
            builder = builder.user_data_dir(dir);
        }

        builder.build().map_err(RangepilotError::BrowserLaunchFailed)
    }

    fn build_args(&self) -> Vec<String> {
        vec![
            "--disable-blink-features=AutomationControlled".to_string(),
            "--disable-infobars".to_string(),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            format!("--user-agent={}", self.settings.user_agent),
        ]
    }

    /// Launch the browser, open the target page, and wait for the initial
    /// navigation. Cleans up the half-built browser if page setup fails.
    pub async fn launch(&self, url: &str) -> Result<BrowserHandles> {
        let config = self.build_config()?;

        tracing::info!(
            headless = self.settings.headless,
            executable = ?self.settings.executable,
            "launching browser"
        );

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RangepilotError::BrowserLaunchFailed(e.to_string()))?;

        let event_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "browser event error");
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                event_task.abort();
                return Err(RangepilotError::NavigationFailed(e.to_string()));
            }
        };

        let navigated = match page.goto(url).await {
            Ok(page) => page.wait_for_navigation().await.map(|_| ()),
            Err(e) => Err(e),
        };
        if let Err(e) = navigated {
            let _ = browser.close().await;
            event_task.abort();
            return Err(RangepilotError::NavigationFailed(e.to_string()));
        }

        tracing::info!(url, "browser page ready");

        Ok(BrowserHandles {
            browser,
            page,
            event_task,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_args_hide_automation_and_carry_the_user_agent() {
        let launcher = BrowserLauncher::new(BrowserSettings::default());
        let args = launcher.build_args();

        assert!(args.contains(&"--disable-blink-features=AutomationControlled".to_string()));
        assert!(args.contains(&"--no-first-run".to_string()));
        assert!(args.iter().any(|a| a.starts_with("--user-agent=Mozilla/5.0")));
    }

    #[test]
    fn config_builds_from_default_settings() {
        let launcher = BrowserLauncher::new(BrowserSettings {
            executable: Some("/usr/bin/chromium".to_string()),
            headless: true,
            ..BrowserSettings::default()
        });

        assert!(launcher.build_config().is_ok());
    }

    #[tokio::test]
    async fn launch_fails_cleanly_for_a_missing_executable() {
        let launcher = BrowserLauncher::new(BrowserSettings {
            executable: Some("/nonexistent/definitely-not-a-browser".to_string()),
            headless: true,
            ..BrowserSettings::default()
        });

        let err = launcher.launch("about:blank").await.unwrap_err();
        assert!(matches!(err, RangepilotError::BrowserLaunchFailed(_)));
    }
}
