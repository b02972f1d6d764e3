use std::time::Instant;

// Logs stage duration on drop, with throughput if a count was set.
pub struct ScopedTimer {
    name: String,
    start: Instant,
    count: Option<usize>,
}

impl ScopedTimer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: Instant::now(),
            count: None,
        }
    }

    pub fn set_count(&mut self, count: usize) {
        self.count = Some(count);
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        match self.count {
            Some(n) if n > 0 => log::info!(
                "{} took {:?} ({} items, {:.1}/s)",
                self.name,
                elapsed,
                n,
                n as f64 / elapsed.as_secs_f64().max(1e-9)
            ),
            _ => log::info!("{} took {:?}", self.name, elapsed),
        }
    }
}
