//! Looks for the terminal bars driven by [`BarListener`](super::BarListener).

use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE_PERCENT: &str = "{spinner:.green} {percent:>3}% {msg}";
const TEMPLATE_BYTES: &str =
    "{bar:40.green/black} {bytes:>11.green}/{total_bytes:<11.green} {bytes_per_sec:>13.red} {msg}";
const CHARS_LINE: &str = "━╾╴─";

/// How a [`BarListener`](super::BarListener) draws its transfer.
#[derive(Debug, Clone, Copy)]
pub struct ProgressBarOpts {
    template: &'static str,
    progress_chars: Option<&'static str>,
    visible: bool,
    pub(crate) clear: bool,
}

impl Default for ProgressBarOpts {
    fn default() -> Self {
        Self::bytes()
    }
}

impl ProgressBarOpts {
    /// Spinner and percentage, like a text view next to an image.
    ///
    /// `⠙ 42% Seehorn.jpg`
    pub fn percent_only() -> Self {
        Self {
            template: TEMPLATE_PERCENT,
            progress_chars: None,
            visible: true,
            clear: true,
        }
    }

    /// Full-width bar with byte counts and throughput.
    pub fn bytes() -> Self {
        Self {
            template: TEMPLATE_BYTES,
            progress_chars: Some(CHARS_LINE),
            visible: true,
            clear: true,
        }
    }

    /// Nothing is drawn; the bar still tracks position and length.
    pub fn hidden() -> Self {
        Self {
            visible: false,
            ..Self::default()
        }
    }

    /// Leave the finished bar on screen instead of clearing it.
    pub fn keep_on_finish(mut self) -> Self {
        self.clear = false;
        self
    }

    pub(crate) fn to_progress_bar(self) -> ProgressBar {
        if !self.visible {
            return ProgressBar::hidden();
        }
        let style = match ProgressStyle::default_bar().template(self.template) {
            Ok(style) => style,
            Err(e) => {
                tracing::warn!("Ignoring invalid progress template {:?}: {}", self.template, e);
                ProgressStyle::default_bar()
            }
        };
        let style = match self.progress_chars {
            Some(chars) => style.progress_chars(chars),
            None => style,
        };
        ProgressBar::new(0).with_style(style)
    }
}
