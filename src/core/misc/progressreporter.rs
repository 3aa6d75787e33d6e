use indicatif::*;

/// Terminal progress bar for long estimation runs. Shareable across worker
/// threads; a quiet reporter draws nothing.
pub struct ProgressReporter {
    pb: ProgressBar,
}

impl ProgressReporter {
    pub fn new(total_work: usize, title: &str, quiet: bool) -> Self {
        if quiet {
            return ProgressReporter {
                pb: ProgressBar::hidden(),
            };
        }
        let pb = ProgressBar::new(total_work as u64);
        let template = format!("{{spinner:.bold.green}} {}: ", title)
            + "[{wide_bar:.cyan}]  ({elapsed_precise}|{eta_precise}) ";
        let style = match ProgressStyle::with_template(&template) {
            Ok(style) => style.progress_chars("█▇▆▅▄▃▂▁  "),
            Err(_) => ProgressStyle::default_bar(),
        };
        pb.set_style(style);
        pb.tick();
        ProgressReporter { pb }
    }

    pub fn update(&self, num: usize) {
        if num != 0 {
            self.pb.inc(num as u64);
        }
    }

    pub fn done(&self) {
        self.pb.finish();
    }
}
