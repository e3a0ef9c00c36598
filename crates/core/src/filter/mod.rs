use crate::{
    markup::{ElementAttributes, ElementId},
    render::PresentationIntent,
};

/// Filter value that shows every portfolio item.
pub const ALL: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterButton {
    pub element: ElementId,
    pub filter: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioItem {
    pub element: ElementId,
    pub category: String,
    /// Gallery collection opened when the item is clicked.
    pub gallery: Option<String>,
}

/// Category filter over the portfolio grid.
#[derive(Debug, Clone, Default)]
pub struct PortfolioFilter {
    buttons: Vec<FilterButton>,
    items: Vec<PortfolioItem>,
    active: Option<String>,
}

impl PortfolioFilter {
    pub fn new(buttons: Vec<FilterButton>, items: Vec<PortfolioItem>) -> Self {
        Self {
            buttons,
            items,
            active: None,
        }
    }

    /// Reads `data-filter` buttons and `data-category` items; elements
    /// without the attribute are ignored.
    pub fn from_markup(buttons: &[ElementAttributes], items: &[ElementAttributes]) -> Self {
        let buttons = buttons
            .iter()
            .filter_map(|button| {
                Some(FilterButton {
                    element: button.id.clone(),
                    filter: button.value("data-filter")?.to_string(),
                })
            })
            .collect();
        let items = items
            .iter()
            .filter_map(|item| {
                Some(PortfolioItem {
                    element: item.id.clone(),
                    category: item.value("data-category")?.to_string(),
                    gallery: item.value("data-gallery").map(str::to_string),
                })
            })
            .collect();
        Self::new(buttons, items)
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Whether some button selects `filter`.
    pub fn has_button(&self, filter: &str) -> bool {
        self.buttons.iter().any(|button| button.filter == filter)
    }

    pub fn items(&self) -> &[PortfolioItem] {
        &self.items
    }

    pub fn is_visible(&self, item: &PortfolioItem) -> bool {
        match self.active.as_deref() {
            None | Some(ALL) => true,
            Some(filter) => item.category == filter,
        }
    }

    /// Applies a filter and returns button and item state for every element.
    pub fn select(&mut self, filter: &str) -> Vec<PresentationIntent> {
        self.active = Some(filter.to_string());
        let buttons = self.buttons.iter().map(|button| PresentationIntent::FilterButton {
            element: button.element.clone(),
            pressed: button.filter == filter,
        });
        let items = self.items.iter().map(|item| PresentationIntent::ItemVisibility {
            element: item.element.clone(),
            visible: self.is_visible(item),
        });
        buttons.chain(items).collect()
    }

    /// Selects the button's filter; unknown buttons are ignored.
    pub fn click_button(&mut self, element: &ElementId) -> Vec<PresentationIntent> {
        let Some(filter) = self
            .buttons
            .iter()
            .find(|button| &button.element == element)
            .map(|button| button.filter.clone())
        else {
            return Vec::new();
        };
        self.select(&filter)
    }

    /// Gallery key to open for a click on an item, if the item is visible.
    pub fn gallery_for(&self, element: &ElementId) -> Option<&str> {
        let item = self.items.iter().find(|item| &item.element == element)?;
        if !self.is_visible(item) {
            return None;
        }
        item.gallery.as_deref()
    }
}
