use crate::{breakpoint::BreakpointState, render::PresentationIntent};

/// Third-party popup form service.
pub trait PopupService {
    fn is_available(&self) -> bool;

    fn open(&mut self, form: &str);
}

#[derive(Debug, Clone, PartialEq)]
pub enum PopupOutcome {
    Opened,
    Fallback(PresentationIntent),
}

/// Opens the popup form, or navigates to `fallback_url` when the service is
/// missing or the viewport is compact.
pub fn launch(
    service: Option<&mut dyn PopupService>,
    form: &str,
    fallback_url: &str,
    breakpoint: &BreakpointState,
) -> PopupOutcome {
    match service {
        Some(service) if service.is_available() && !breakpoint.is_mobile => {
            service.open(form);
            PopupOutcome::Opened
        }
        _ => {
            tracing::debug!(form, "popup service unavailable, following link");
            PopupOutcome::Fallback(PresentationIntent::NavigateTo {
                url: fallback_url.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeService {
        available: bool,
        opened: Vec<String>,
    }

    impl PopupService for FakeService {
        fn is_available(&self) -> bool {
            self.available
        }

        fn open(&mut self, form: &str) {
            self.opened.push(form.to_string());
        }
    }

    #[test]
    fn opens_when_available_on_desktop() {
        let mut service = FakeService {
            available: true,
            ..Default::default()
        };
        let outcome = launch(Some(&mut service), "booking", "/book", &BreakpointState::default());

        assert_eq!(outcome, PopupOutcome::Opened);
        assert_eq!(service.opened, vec!["booking"]);
    }

    #[test]
    fn falls_back_on_mobile_or_missing_service() {
        let mobile = BreakpointState {
            is_mobile: true,
            ..Default::default()
        };
        let mut service = FakeService {
            available: true,
            ..Default::default()
        };
        let expected = PopupOutcome::Fallback(PresentationIntent::NavigateTo {
            url: "/book".into(),
        });

        assert_eq!(launch(Some(&mut service), "booking", "/book", &mobile), expected);
        assert!(service.opened.is_empty());
        assert_eq!(launch(None, "booking", "/book", &BreakpointState::default()), expected);
    }
}
