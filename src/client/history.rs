//! Small utilities to manage bounded history buffers for charts.

use std::collections::VecDeque;

use super::surface::SeriesView;
use crate::models::NetworkUtilization;

/// Samples kept per time series.
pub const HISTORY_CAPACITY: usize = 20;

pub fn push_capped<T>(dq: &mut VecDeque<T>, v: T, cap: usize) {
    if dq.len() == cap {
        dq.pop_front();
    }
    dq.push_back(v);
}

/// Upload/download history (KB/s) with one time label per sample; oldest evicted first.
#[derive(Debug, Clone)]
pub struct NetworkHistory {
    labels: VecDeque<String>,
    upload: VecDeque<f64>,
    download: VecDeque<f64>,
    cap: usize,
}

impl Default for NetworkHistory {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}

impl NetworkHistory {
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            labels: VecDeque::with_capacity(cap),
            upload: VecDeque::with_capacity(cap),
            download: VecDeque::with_capacity(cap),
            cap,
        }
    }

    pub fn push(&mut self, label: impl Into<String>, sample: NetworkUtilization) {
        push_capped(&mut self.labels, label.into(), self.cap);
        push_capped(&mut self.upload, sample.upload, self.cap);
        push_capped(&mut self.download, sample.download, self.cap);
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn labels(&self) -> &VecDeque<String> {
        &self.labels
    }

    pub fn upload(&self) -> &VecDeque<f64> {
        &self.upload
    }

    pub fn download(&self) -> &VecDeque<f64> {
        &self.download
    }

    pub fn to_series(&self) -> SeriesView {
        SeriesView {
            labels: self.labels.iter().cloned().collect(),
            upload: self.upload.iter().copied().collect(),
            download: self.download.iter().copied().collect(),
        }
    }
}
