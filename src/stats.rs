use alloc::vec::Vec;

/// Debug statistics for hash table analysis.
///
/// Compiled under `cfg(test)` or with the `stats` feature.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugStats {
    /// Number of keys currently in the table
    pub populated: usize,
    /// Number of key slots allocated (array slots, or buckets times bucket
    /// size for the bucket-based tables)
    pub total_slots: usize,
    /// Number of directory entries, or array slots for the flat tables
    pub addressable: usize,
    /// Number of distinct storage units: slots for the flat tables, buckets
    /// for the bucket-based ones
    pub storage_units: usize,
    /// Keys not stored at their first-choice position
    pub displaced: usize,
    /// Slot utilization (populated / total_slots)
    pub load_factor: f64,
}

impl DebugStats {
    pub(crate) fn new(
        populated: usize,
        total_slots: usize,
        addressable: usize,
        storage_units: usize,
        displaced: usize,
    ) -> Self {
        Self {
            populated,
            total_slots,
            addressable,
            storage_units,
            displaced,
            load_factor: if total_slots == 0 {
                0.0
            } else {
                populated as f64 / total_slots as f64
            },
        }
    }

    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% load factor)",
            self.populated,
            self.total_slots,
            self.load_factor * 100.0
        );
        println!(
            "Addressing: {} entries over {} storage units",
            self.addressable, self.storage_units
        );
        println!(
            "Displaced: {} keys ({:.02}%)",
            self.displaced,
            if self.populated == 0 {
                0.0
            } else {
                (self.displaced as f64 / self.populated as f64) * 100.0
            }
        );
    }
}

/// A labelled histogram, e.g. linear probe distances or bucket local depths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    label: &'static str,
    bins: Vec<usize>,
}

impl Histogram {
    pub(crate) fn new(label: &'static str) -> Self {
        Self {
            label,
            bins: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, bin: usize) {
        if self.bins.len() <= bin {
            self.bins.resize(bin + 1, 0);
        }
        self.bins[bin] += 1;
    }

    /// Counts per bin; trailing bins with no entries are not stored.
    pub fn bins(&self) -> &[usize] {
        &self.bins
    }

    /// Sum of all bins.
    pub fn total(&self) -> usize {
        self.bins.iter().sum()
    }

    /// Pretty-prints the histogram horizontally using stdout.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        let max = self.bins.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("{} histogram: empty", self.label);
            return;
        }

        let max_bar = 60usize;
        let total_units = max_bar * 8;
        println!("{} histogram ({} entries):", self.label, self.total());

        let make_bar = |count: usize| -> std::string::String {
            if count == 0 {
                return std::string::String::new();
            }
            let units = ((count as u128 * total_units as u128).div_ceil(max as u128)) as usize;
            let mut bar = "█".repeat(units / 8);
            let partial = match units % 8 {
                1 => Some('▏'),
                2 => Some('▎'),
                3 => Some('▍'),
                4 => Some('▌'),
                5 => Some('▋'),
                6 => Some('▊'),
                7 => Some('▉'),
                _ => None,
            };
            bar.extend(partial);
            bar
        };

        for (bin, &count) in self.bins.iter().enumerate() {
            println!("{:>3} | {} ({})", bin, make_bar(count), count);
        }
    }
}
