//! Step-by-step algorithm overlay.
//!
//! [`OverlayState`] is the whole state machine; presentation only reads
//! [`OverlayState::step`] and asks [`OverlayContent`] what to show.

use std::path::{Path, PathBuf};

/// Number of steps in the bucket sort walkthrough.
pub const STEP_COUNT: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverlayState {
    /// `None` while closed.
    step: Option<u8>,
}

impl OverlayState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open at step 1.
    pub fn start(&mut self) {
        self.step = Some(1);
    }

    /// Open at `step`, clamped into `1..=STEP_COUNT`.
    pub fn set_step(&mut self, step: u8) {
        self.step = Some(step.clamp(1, STEP_COUNT));
    }

    /// Advance one step. No-op on the last step or while closed.
    pub fn next(&mut self) -> bool {
        match self.step {
            Some(step) if step < STEP_COUNT => {
                self.step = Some(step + 1);
                true
            }
            _ => false,
        }
    }

    /// Go back one step. No-op on the first step or while closed.
    pub fn previous(&mut self) -> bool {
        match self.step {
            Some(step) if step > 1 => {
                self.step = Some(step - 1);
                true
            }
            _ => false,
        }
    }

    pub fn close(&mut self) {
        self.step = None;
    }

    pub fn is_open(&self) -> bool {
        self.step.is_some()
    }

    pub fn step(&self) -> Option<u8> {
        self.step
    }

    pub fn can_go_next(&self) -> bool {
        matches!(self.step, Some(s) if s < STEP_COUNT)
    }

    pub fn can_go_previous(&self) -> bool {
        matches!(self.step, Some(s) if s > 1)
    }
}

/// Built-in text for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepText {
    pub title: &'static str,
    pub lines: &'static [&'static str],
}

/// What to show for a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayPage {
    Image(PathBuf),
    Text(&'static StepText),
}

impl OverlayPage {
    pub fn title(&self) -> &str {
        match self {
            OverlayPage::Image(path) => path.file_stem().and_then(|s| s.to_str()).unwrap_or("image"),
            OverlayPage::Text(text) => text.title,
        }
    }
}

static STEPS: [StepText; STEP_COUNT as usize] = [
    StepText {
        title: "Bucket Sort: Introduction",
        lines: &[
            "Bucket Sort is a distribution-based sorting algorithm.",
            "1. Divide the range into equal-sized buckets",
            "2. Distribute elements into appropriate buckets",
            "3. Sort elements within each bucket (using another algorithm)",
            "4. Concatenate the buckets in order",
            "Best suited for uniformly distributed data over a range.",
            "Time Complexity: O(n + k), where n is the number of elements and k is the number of buckets",
            "Space Complexity: O(n + k)",
        ],
    },
    StepText {
        title: "Step 1: Creating Buckets & Distribution",
        lines: &[
            "Create n buckets, each representing a range of values.",
            "For each element x: calculate the bucket index floor(n * x) and place it there.",
            "Distribution formula: bucketIndex = floor(n * element)",
            "Example: 0.42 with 5 buckets: floor(5 * 0.42) = floor(2.1) = 2",
        ],
    },
    StepText {
        title: "Step 2: Elements in Buckets",
        lines: &[
            "Bucket 0 (0-0.2): [0.18]",
            "Bucket 1 (0.2-0.4): [0.32, 0.24]",
            "Bucket 2 (0.4-0.6): [0.42]",
            "Bucket 3 (0.6-0.8): [0.73, 0.65]",
            "Bucket 4 (0.8-1.0): [0.85, 0.91]",
            "Elements within buckets are still unsorted.",
        ],
    },
    StepText {
        title: "Step 3: Sorting Within Buckets",
        lines: &[
            "Bucket 0 (0-0.2): [0.18]",
            "Bucket 1 (0.2-0.4): [0.24, 0.32]",
            "Bucket 2 (0.4-0.6): [0.42]",
            "Bucket 3 (0.6-0.8): [0.65, 0.73]",
            "Bucket 4 (0.8-1.0): [0.85, 0.91]",
            "Insertion sort is usually used; it is efficient for small arrays.",
        ],
    },
    StepText {
        title: "Step 4: Concatenate Buckets",
        lines: &[
            "Combine elements from all buckets in order, first bucket first.",
            "Final sorted array: [0.18, 0.24, 0.32, 0.42, 0.65, 0.73, 0.85, 0.91]",
            "Concatenation keeps the order established within each bucket.",
        ],
    },
    StepText {
        title: "Bucket Sort: Analysis & Applications",
        lines: &[
            "Best case: O(n+k) when data is uniformly distributed",
            "Average case: O(n+k)",
            "Worst case: O(n^2) when all elements land in the same bucket",
            "Space complexity: O(n+k)",
            "Best used for uniformly distributed floats and limited input ranges.",
            "Applications: postal codes, numerical data analysis, simulation results.",
        ],
    },
];

/// Built-in text for `step`, if it is in range.
pub fn step_text(step: u8) -> Option<&'static StepText> {
    STEPS.get(usize::from(step).checked_sub(1)?)
}

/// Resolves overlay pages, preferring an image on disk.
#[derive(Debug, Clone)]
pub struct OverlayContent {
    dir: PathBuf,
}

impl OverlayContent {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn image_path(&self, step: u8) -> PathBuf {
        self.dir.join(format!("{}.png", step))
    }

    /// Page for `step`. A missing or unreadable image falls back to text.
    pub fn page(&self, step: u8) -> Option<OverlayPage> {
        let path = self.image_path(step);
        if probe_image(&path) {
            return Some(OverlayPage::Image(path));
        }
        step_text(step).map(OverlayPage::Text)
    }
}

fn probe_image(path: &Path) -> bool {
    match image::image_dimensions(path) {
        Ok((w, h)) => w > 0 && h > 0,
        Err(e) => {
            log::debug!("No overlay image at {:?}: {}", path, e);
            false
        }
    }
}
