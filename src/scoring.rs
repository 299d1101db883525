/// Characters that make up one word in WPM calculations.
pub const CHARS_PER_WORD: f64 = 5.0;

/// Live statistics for an attempt. Always derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    pub correct_chars: usize,
    pub incorrect_chars: usize,
    /// Percentage in `0..=100`.
    pub accuracy: u32,
    pub wpm: u32,
    /// Can exceed 100 while the typed text is longer than the source.
    pub progress: u32,
    pub total_typed: usize,
}

impl Stats {
    pub fn display_progress(&self) -> u32 {
        self.progress.min(100)
    }
}

/// Count positions where the typed char matches the source char at the same index.
pub fn correct_chars(source: &str, typed: &str) -> usize {
    typed
        .chars()
        .zip(source.chars())
        .filter(|(t, s)| t == s)
        .count()
}

pub fn compute_stats(source: &str, typed: &str, elapsed_secs: u64) -> Stats {
    let total_typed = typed.chars().count();
    let source_len = source.chars().count();
    let correct = correct_chars(source, typed);
    let incorrect = total_typed - correct;

    let accuracy = if total_typed > 0 {
        (100.0 * correct as f64 / total_typed as f64).round() as u32
    } else {
        100
    };

    let minutes = elapsed_secs as f64 / 60.0;
    let words = correct as f64 / CHARS_PER_WORD;
    let wpm = if elapsed_secs > 0 {
        (words / minutes).round() as u32
    } else {
        0
    };

    let progress = if source_len > 0 {
        (100.0 * total_typed as f64 / source_len as f64).round() as u32
    } else {
        0
    };

    Stats {
        correct_chars: correct,
        incorrect_chars: incorrect,
        accuracy,
        wpm,
        progress,
        total_typed,
    }
}

/// Format whole seconds as `m:ss`.
pub fn format_clock(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_scenario() {
        let stats = compute_stats("cat", "cat", 6);

        assert_eq!(stats.correct_chars, 3);
        assert_eq!(stats.incorrect_chars, 0);
        assert_eq!(stats.wpm, 6);
        assert_eq!(stats.accuracy, 100);
        assert_eq!(stats.progress, 100);
        assert_eq!(stats.total_typed, 3);
    }

    #[test]
    fn test_empty_input_has_full_accuracy() {
        let stats = compute_stats("hello", "", 10);

        assert_eq!(stats.accuracy, 100);
        assert_eq!(stats.wpm, 0);
        assert_eq!(stats.progress, 0);
        assert_eq!(stats.incorrect_chars, 0);
    }

    #[test]
    fn test_zero_elapsed_has_zero_wpm() {
        let stats = compute_stats("hello", "hello", 0);
        assert_eq!(stats.wpm, 0);
    }

    #[test]
    fn test_accuracy_rounds() {
        // 2 of 3 correct -> 66.67 -> 67
        let stats = compute_stats("abc", "abx", 1);
        assert_eq!(stats.accuracy, 67);
        assert_eq!(stats.incorrect_chars, 1);
    }

    #[test]
    fn test_typed_longer_than_source() {
        let stats = compute_stats("ab", "abcd", 60);

        assert_eq!(stats.correct_chars, 2);
        assert_eq!(stats.incorrect_chars, 2);
        assert_eq!(stats.accuracy, 50);
        assert_eq!(stats.progress, 200);
        assert_eq!(stats.display_progress(), 100);
    }

    #[test]
    fn test_empty_source_has_zero_progress() {
        let stats = compute_stats("", "abc", 5);

        assert_eq!(stats.progress, 0);
        assert_eq!(stats.correct_chars, 0);
        assert_eq!(stats.accuracy, 0);
    }

    #[test]
    fn test_wpm_uses_correct_chars_only() {
        // 50 correct chars in 60s -> 10 words per minute, errors don't count
        let source = "a".repeat(60);
        let typed = format!("{}{}", "a".repeat(50), "b".repeat(10));
        let stats = compute_stats(&source, &typed, 60);

        assert_eq!(stats.wpm, 10);
        assert_eq!(stats.correct_chars, 50);
    }

    #[test]
    fn test_cyrillic_compares_per_char() {
        let stats = compute_stats("привет", "прив", 12);

        assert_eq!(stats.correct_chars, 4);
        assert_eq!(stats.total_typed, 4);
        assert_eq!(stats.progress, 67);
        assert_eq!(stats.wpm, 4);
    }

    #[test]
    fn test_accuracy_always_in_range() {
        let cases = [
            ("", ""),
            ("abc", "xyz"),
            ("abc", "abcabc"),
            ("hello world", "hello"),
            ("x", "xxxxxxxx"),
        ];
        for (source, typed) in cases {
            let stats = compute_stats(source, typed, 30);
            assert!(stats.accuracy <= 100, "{source:?} / {typed:?}");
        }
    }

    #[test]
    fn test_compute_stats_is_deterministic() {
        let a = compute_stats("the quick brown fox", "the quack", 7);
        let b = compute_stats("the quick brown fox", "the quack", 7);
        assert_eq!(a, b);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "0:00");
        assert_eq!(format_clock(9), "0:09");
        assert_eq!(format_clock(75), "1:15");
        assert_eq!(format_clock(600), "10:00");
    }
}
