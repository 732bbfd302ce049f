/// Closed time interval `[start, end]` in epoch milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Span {
    pub start: i64,
    pub end: i64,
}

impl Span {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, t: i64) -> bool {
        self.start <= t && t <= self.end
    }
}

/// Sorted, non-overlapping cover of the times during which at least one track is active.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpanList {
    spans: Vec<Span>,
}

impl SpanList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[Span] {
        &self.spans
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn contains(&self, t: i64) -> bool {
        // Spans are sorted and disjoint: the candidate is the last span starting at or before `t`.
        let idx = self.spans.partition_point(|s| s.start <= t);
        idx > 0 && self.spans[idx - 1].contains(t)
    }

    /// Merge `[start, end]` into the list.
    ///
    /// Every existing span is visited once, in order:
    /// - a new span inside an existing one is swallowed,
    /// - an existing span inside the new one is dropped,
    /// - an existing span holding the new end (or start) is absorbed and the new span stretched
    ///   to cover it.
    pub fn merge(&mut self, start: i64, end: i64) {
        let (mut start, mut end) = if start <= end {
            (start, end)
        } else {
            (end, start)
        };

        let mut i = 0;
        while i < self.spans.len() {
            let existing = self.spans[i];
            if existing.start <= start && end <= existing.end {
                return;
            }
            if start <= existing.start && existing.end <= end {
                self.spans.remove(i);
                continue;
            }
            if existing.contains(end) {
                end = existing.end;
                self.spans.remove(i);
                continue;
            }
            if existing.contains(start) {
                start = existing.start;
                self.spans.remove(i);
                continue;
            }
            i += 1;
        }

        let at = self.spans.partition_point(|s| s.start < start);
        self.spans.insert(at, Span::new(start, end));
    }
}

/// Split an ordered run of timestamps into active runs separated by gaps longer than `idle_gap`.
pub fn active_runs(times: impl IntoIterator<Item = i64>, idle_gap: i64) -> Vec<Span> {
    let mut runs = Vec::new();
    let mut current: Option<Span> = None;
    for t in times {
        current = match current {
            None => Some(Span::new(t, t)),
            Some(run) if t - run.end > idle_gap => {
                runs.push(run);
                Some(Span::new(t, t))
            }
            Some(run) => Some(Span::new(run.start, t)),
        };
    }
    runs.extend(current);
    runs
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/spans.rs"]
mod tests;
