//! Text progress bar.

const FILLED: char = '█';
const EMPTY: char = '░';

/// Fixed-width bar, re-rendered only when the whole percentage changes.
#[derive(Debug, Clone)]
pub struct ProgressBar {
    width: usize,
    append_percent: bool,
    cached: Option<(u32, String)>,
}

impl ProgressBar {
    pub fn new(width: usize, append_percent: bool) -> Self {
        Self {
            width,
            append_percent,
            cached: None,
        }
    }

    /// Bar for `current` of `total`. An empty batch counts as complete.
    pub fn render(&mut self, current: usize, total: usize) -> &str {
        let fraction = if total == 0 {
            1.0
        } else {
            current.min(total) as f64 / total as f64
        };
        let percent = (fraction * 100.0).round() as u32;

        let stale = !matches!(&self.cached, Some((p, _)) if *p == percent);
        if stale {
            let filled = ((self.width as f64) * fraction).round() as usize;
            let mut bar = String::with_capacity(self.width * 3 + 4);
            bar.extend(std::iter::repeat(FILLED).take(filled));
            bar.extend(std::iter::repeat(EMPTY).take(self.width - filled));
            if self.append_percent {
                bar.push_str(&format!("{percent}%"));
            }
            self.cached = Some((percent, bar));
        }
        self.cached.as_ref().map(|(_, s)| s.as_str()).unwrap_or("")
    }
}
