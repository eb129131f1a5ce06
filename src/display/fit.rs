//! Fits labels into a rendering width budget.
//! Strategy: full text, then word truncation that keeps the last word
//! visible, then plain character truncation.

const ELLIPSIS: &str = "…";

/// Width measurement contract. Shells provide the metrics of wherever the
/// text ends up being rendered.
pub trait TextMeasure {
    fn width(&self, text: &str) -> f64;
}

/// Metrics for fixed-advance rendering, like a terminal cell grid.
#[derive(Debug, Clone, Copy)]
pub struct MonospaceMetrics {
    advance: f64,
}

impl MonospaceMetrics {
    pub fn new(advance: f64) -> Self {
        Self { advance }
    }

    /// One column per character.
    pub fn terminal() -> Self {
        Self { advance: 1.0 }
    }
}

impl TextMeasure for MonospaceMetrics {
    fn width(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.advance
    }
}

/// Returns a display string whose rendered width stays within `max_width`.
/// Multi-word text keeps its leading words plus the last word around an
/// ellipsis, so the tail of the label stays recognizable.
pub fn fit(text: &str, max_width: f64, metrics: &impl TextMeasure) -> String {
    if metrics.width(text) <= max_width {
        return text.to_string();
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() > 2 {
        let last_word = words[words.len() - 1];
        for keep_count in (1..=words.len() - 2).rev() {
            let prefix = words[..keep_count].join(" ");
            let candidate = format!("{prefix} {ELLIPSIS} {last_word}");
            if metrics.width(&candidate) <= max_width {
                return candidate;
            }
        }
    }

    truncate_by_width(text, max_width, metrics)
}

/// Drops characters off the end until the text plus an ellipsis fits.
/// Terminates even for unbreakable single-word strings, bottoming out at the
/// bare ellipsis.
fn truncate_by_width(text: &str, max_width: f64, metrics: &impl TextMeasure) -> String {
    let mut truncated = text.to_string();

    while !truncated.is_empty() {
        truncated.pop();
        let candidate = format!("{truncated}{ELLIPSIS}");
        if metrics.width(&candidate) <= max_width {
            return candidate;
        }
    }

    ELLIPSIS.to_string()
}

/// Truncates by character count instead of rendered width. Used for labels
/// with a fixed character budget, where measuring is unnecessary.
pub fn truncate_by_count(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let prefix: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{prefix}{ELLIPSIS}")
}

#[cfg(test)]
mod tests {
    use super::{fit, truncate_by_count, MonospaceMetrics, TextMeasure};

    const METRICS: MonospaceMetrics = MonospaceMetrics { advance: 1.0 };

    #[test]
    fn test_fit_returns_short_text_unchanged() {
        assert_eq!(fit("short", 40.0, &METRICS), "short");
        assert_eq!(fit("exactly ten", 11.0, &METRICS), "exactly ten");
    }

    #[test]
    fn test_fit_keeps_leading_words_and_last_word() {
        let text = "deploying the staging environment today";

        let fitted = fit(text, 30.0, &METRICS);

        assert_eq!(fitted, "deploying the staging … today");
        assert!(METRICS.width(&fitted) <= 30.0);
    }

    #[test]
    fn test_fit_shrinks_to_one_leading_word() {
        let text = "deploying the staging environment today";

        let fitted = fit(text, 20.0, &METRICS);

        assert_eq!(fitted, "deploying … today");
        assert!(METRICS.width(&fitted) <= 20.0);
    }

    #[test]
    fn test_fit_falls_back_to_characters_for_single_word() {
        let fitted = fit("antidisestablishmentarianism", 10.0, &METRICS);

        assert_eq!(fitted, "antidises…");
        assert!(METRICS.width(&fitted) <= 10.0);
    }

    #[test]
    fn test_fit_falls_back_to_characters_for_two_words() {
        let fitted = fit("hello world", 8.0, &METRICS);

        assert_eq!(fitted, "hello w…");
    }

    #[test]
    fn test_fit_falls_back_when_no_word_candidate_fits() {
        // Even the shortest word candidate "incomprehensibilities … now" is
        // too wide, so characters win.
        let fitted = fit("incomprehensibilities of it now", 12.0, &METRICS);

        assert_eq!(fitted, "incomprehen…");
    }

    #[test]
    fn test_fit_bottoms_out_at_bare_ellipsis() {
        assert_eq!(fit("hi", 0.5, &METRICS), "…");
    }

    #[test]
    fn test_truncate_by_count() {
        assert_eq!(truncate_by_count("hello world", 5), "hell…");
        assert_eq!(truncate_by_count("hello", 5), "hello");
        assert_eq!(truncate_by_count("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_by_count_result_length() {
        let truncated = truncate_by_count("hello world", 5);
        assert_eq!(truncated.chars().count(), 5);
        assert!(truncated.ends_with('…'));
    }

    #[test]
    fn test_truncate_by_count_zero_budget() {
        assert_eq!(truncate_by_count("hello", 0), "…");
    }
}
