use std::collections::BTreeSet;

use crate::{markup::ElementId, render::PresentationIntent};

/// One-way fade-in of page sections as they scroll into view.
#[derive(Debug, Clone)]
pub struct RevealTracker {
    threshold: f64,
    observed: BTreeSet<ElementId>,
    revealed: BTreeSet<ElementId>,
}

impl RevealTracker {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            observed: BTreeSet::new(),
            revealed: BTreeSet::new(),
        }
    }

    pub fn observe(&mut self, element: ElementId) {
        if !self.revealed.contains(&element) {
            self.observed.insert(element);
        }
    }

    /// Intersection update from the host. Sections are revealed once.
    pub fn intersection(&mut self, element: &ElementId, ratio: f64) -> Option<PresentationIntent> {
        if ratio < self.threshold || !self.observed.remove(element) {
            return None;
        }
        self.revealed.insert(element.clone());
        Some(PresentationIntent::RevealSection {
            element: element.clone(),
        })
    }

    pub fn is_revealed(&self, element: &ElementId) -> bool {
        self.revealed.contains(element)
    }

    /// Sections still waiting to come into view.
    pub fn pending(&self) -> usize {
        self.observed.len()
    }
}
