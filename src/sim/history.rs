//! Bounded history of induction readouts for live plotting
//!
//! Entries are appended once per running frame and the oldest are evicted
//! past capacity. The buffer also tracks the value axis for the selected
//! quantity: it grows to fit new samples but never shrinks within a run.

use std::collections::VecDeque;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Default number of retained samples
pub const DEFAULT_HISTORY_CAPACITY: usize = 5000;
/// Axis padding as a fraction of the value span
pub const PLOT_PADDING: f64 = 0.18;
/// Smallest value span the axis will show
pub const MIN_PLOT_SPAN: f64 = 0.15;

/// One plotted sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub t: f64,
    pub current: f64,
    pub emf: f64,
    pub flux: f64,
    pub force: f64,
    pub x: f64,
}

/// Quantity shown on the value axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlotQuantity {
    #[default]
    Current,
    Emf,
    Flux,
    Force,
    Position,
}

impl PlotQuantity {
    pub const ALL: [PlotQuantity; 5] = [
        PlotQuantity::Current,
        PlotQuantity::Emf,
        PlotQuantity::Flux,
        PlotQuantity::Force,
        PlotQuantity::Position,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            PlotQuantity::Current => "current",
            PlotQuantity::Emf => "emf",
            PlotQuantity::Flux => "flux",
            PlotQuantity::Force => "force",
            PlotQuantity::Position => "x",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            PlotQuantity::Current => "A",
            PlotQuantity::Emf => "V",
            PlotQuantity::Flux => "Wb",
            PlotQuantity::Force => "N",
            PlotQuantity::Position => "m",
        }
    }

    /// Pick this quantity out of an entry
    pub fn value(&self, entry: &HistoryEntry) -> f64 {
        match self {
            PlotQuantity::Current => entry.current,
            PlotQuantity::Emf => entry.emf,
            PlotQuantity::Flux => entry.flux,
            PlotQuantity::Force => entry.force,
            PlotQuantity::Position => entry.x,
        }
    }
}

impl FromStr for PlotQuantity {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "current" | "i" => Ok(PlotQuantity::Current),
            "emf" | "e" => Ok(PlotQuantity::Emf),
            "flux" | "phi" => Ok(PlotQuantity::Flux),
            "force" | "f" => Ok(PlotQuantity::Force),
            "x" | "position" => Ok(PlotQuantity::Position),
            _ => Err(SimError::UnknownPlotQuantity(s.to_string())),
        }
    }
}

/// Padded value-axis range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotBounds {
    pub min: f64,
    pub max: f64,
}

impl PlotBounds {
    /// Pad a raw [lo, hi] range, widening degenerate spans first
    pub fn padded(lo: f64, hi: f64) -> Self {
        let (mut lo, mut hi) = (lo, hi);
        if hi - lo < MIN_PLOT_SPAN {
            let mid = (lo + hi) / 2.0;
            lo = mid - MIN_PLOT_SPAN / 2.0;
            hi = mid + MIN_PLOT_SPAN / 2.0;
        }
        let pad = (hi - lo) * PLOT_PADDING;
        Self {
            min: lo - pad,
            max: hi + pad,
        }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Smallest range covering both
    pub fn union(&self, other: &PlotBounds) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Position of `value` within the range: 0 at `min`, 1 at `max`
    pub fn normalize(&self, value: f64) -> f64 {
        (value - self.min) / self.span().max(f64::EPSILON)
    }
}

impl Default for PlotBounds {
    fn default() -> Self {
        Self::padded(0.0, 0.0)
    }
}

/// Ring log of readouts with a monotone value axis
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
    quantity: PlotQuantity,
    /// Raw min/max of the selected quantity seen since the last full recompute
    seen: Option<(f64, f64)>,
    bounds: Option<PlotBounds>,
}

impl HistoryBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            quantity: PlotQuantity::default(),
            seen: None,
            bounds: None,
        }
    }

    /// Append a sample, evicting the oldest past capacity
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.observe(self.quantity.value(&entry));
    }

    /// Drop all samples and forget the axis
    pub fn clear(&mut self) {
        self.entries.clear();
        self.seen = None;
        self.bounds = None;
    }

    /// Change the plotted quantity; the axis is rebuilt from retained samples
    pub fn set_quantity(&mut self, quantity: PlotQuantity) {
        if quantity == self.quantity {
            return;
        }
        self.quantity = quantity;
        self.recompute_bounds();
    }

    pub fn quantity(&self) -> PlotQuantity {
        self.quantity
    }

    /// Current value-axis range
    pub fn bounds(&self) -> PlotBounds {
        self.bounds.unwrap_or_default()
    }

    /// Upper end of the time axis
    pub fn time_axis_max(&self, min_time: f64) -> f64 {
        self.latest().map_or(min_time, |e| e.t.max(min_time))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    /// Oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Ordered copy of the retained samples
    pub fn snapshot(&self) -> Vec<HistoryEntry> {
        self.entries.iter().copied().collect()
    }

    fn observe(&mut self, value: f64) {
        let (lo, hi) = match self.seen {
            Some((lo, hi)) => (lo.min(value), hi.max(value)),
            None => (value, value),
        };
        self.seen = Some((lo, hi));
        let fitted = PlotBounds::padded(lo, hi);
        self.bounds = Some(match self.bounds {
            Some(current) => current.union(&fitted),
            None => fitted,
        });
    }

    fn recompute_bounds(&mut self) {
        self.seen = None;
        self.bounds = None;
        let quantity = self.quantity;
        let values: Vec<f64> = self.entries.iter().map(|e| quantity.value(e)).collect();
        for value in values {
            self.observe(value);
        }
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(t: f64, current: f64) -> HistoryEntry {
        HistoryEntry {
            t,
            current,
            emf: current * 2.0,
            flux: 0.0,
            force: 0.0,
            x: t,
        }
    }

    #[test]
    fn test_evicts_oldest_first() {
        let mut history = HistoryBuffer::new(3);
        for i in 0..5 {
            history.push(entry(i as f64, 0.0));
        }
        assert_eq!(history.len(), 3);
        let times: Vec<f64> = history.iter().map(|e| e.t).collect();
        assert_eq!(times, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_degenerate_span_is_floored() {
        let mut history = HistoryBuffer::new(10);
        history.push(entry(0.0, 1.0));
        history.push(entry(0.1, 1.0));
        let bounds = history.bounds();
        let expected = MIN_PLOT_SPAN * (1.0 + 2.0 * PLOT_PADDING);
        assert!((bounds.span() - expected).abs() < 1e-12);
        assert!((bounds.normalize(1.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_bounds_grow_but_never_shrink() {
        let mut history = HistoryBuffer::new(2);
        history.push(entry(0.0, -5.0));
        history.push(entry(1.0, 5.0));
        let wide = history.bounds();
        assert!(wide.min < -5.0 && wide.max > 5.0);

        // Both extreme samples get evicted; the axis keeps its range
        history.push(entry(2.0, 0.0));
        history.push(entry(3.0, 0.1));
        assert_eq!(history.bounds(), wide);
    }

    #[test]
    fn test_quantity_change_recomputes() {
        let mut history = HistoryBuffer::new(10);
        history.push(entry(0.0, 1.0));
        history.push(entry(1.0, 3.0));
        let current_bounds = history.bounds();

        history.set_quantity(PlotQuantity::Emf);
        let emf_bounds = history.bounds();
        assert_eq!(emf_bounds, PlotBounds::padded(2.0, 6.0));
        assert_ne!(emf_bounds, current_bounds);
    }

    #[test]
    fn test_clear_resets_axes() {
        let mut history = HistoryBuffer::new(10);
        history.push(entry(7.0, 4.0));
        assert_eq!(history.time_axis_max(5.0), 7.0);
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.bounds(), PlotBounds::default());
        assert_eq!(history.time_axis_max(5.0), 5.0);
    }

    #[test]
    fn test_parse_plot_quantity() {
        assert_eq!("EMF".parse::<PlotQuantity>().unwrap(), PlotQuantity::Emf);
        assert_eq!("phi".parse::<PlotQuantity>().unwrap(), PlotQuantity::Flux);
        for q in PlotQuantity::ALL {
            assert_eq!(q.key().parse::<PlotQuantity>().unwrap(), q);
        }
        assert!(matches!(
            "voltage".parse::<PlotQuantity>(),
            Err(SimError::UnknownPlotQuantity(_))
        ));
    }
}
