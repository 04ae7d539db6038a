use super::math::ViewTransform;

/// Scales within this distance count as equal when classifying zoom.
pub const ZOOM_TOLERANCE: f64 = 0.01;

/// Zoom classification, also the toggle-zoom cycle position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoomMode {
    OneToOne,
    Fit,
    Custom,
}

impl ZoomMode {
    /// Next mode in the toggle cycle: 1:1 -> Fit -> Custom -> 1:1.
    pub fn next(self) -> Self {
        match self {
            ZoomMode::OneToOne => ZoomMode::Fit,
            ZoomMode::Fit => ZoomMode::Custom,
            ZoomMode::Custom => ZoomMode::OneToOne,
        }
    }

    pub fn classify(scale: f64, fit_scale: f64) -> Self {
        if (scale - 1.0).abs() < ZOOM_TOLERANCE {
            ZoomMode::OneToOne
        } else if (scale - fit_scale).abs() < ZOOM_TOLERANCE {
            ZoomMode::Fit
        } else {
            ZoomMode::Custom
        }
    }
}

/// The committed view of the current image.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    /// View drawn for the current image.
    pub view: ViewTransform,
    /// Fit view for the current image and screen.
    pub last_fit: ViewTransform,
    pub zoom_mode: ZoomMode,
    /// Scaled past fit; enables panning.
    pub is_zoomed: bool,
}

impl ViewState {
    pub fn new(view: ViewTransform, fit: ViewTransform) -> Self {
        let mut state = Self {
            view,
            last_fit: fit,
            zoom_mode: ZoomMode::Fit,
            is_zoomed: false,
        };
        state.reclassify();
        state
    }

    /// Recompute zoom mode and the zoomed flag from the current scale.
    pub fn reclassify(&mut self) {
        self.zoom_mode = ZoomMode::classify(self.view.scale, self.last_fit.scale);
        self.is_zoomed = self.view.scale > self.last_fit.scale + 1e-6;
    }

    /// Replace the view and reclassify.
    pub fn set_view(&mut self, view: ViewTransform) {
        self.view = view;
        self.reclassify();
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(ViewTransform::default(), ViewTransform::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_cycle() {
        assert_eq!(ZoomMode::OneToOne.next(), ZoomMode::Fit);
        assert_eq!(ZoomMode::Fit.next(), ZoomMode::Custom);
        assert_eq!(ZoomMode::Custom.next(), ZoomMode::OneToOne);
    }

    #[test]
    fn test_classification() {
        assert_eq!(ZoomMode::classify(1.004, 0.5), ZoomMode::OneToOne);
        assert_eq!(ZoomMode::classify(0.505, 0.5), ZoomMode::Fit);
        assert_eq!(ZoomMode::classify(2.0, 0.5), ZoomMode::Custom);
        // 1:1 wins when fit is also ~1
        assert_eq!(ZoomMode::classify(1.0, 1.0), ZoomMode::OneToOne);
    }

    #[test]
    fn test_is_zoomed_past_fit() {
        let fit = ViewTransform::new(0.5, 10.0, 10.0);
        let mut state = ViewState::new(fit, fit);
        assert!(!state.is_zoomed);
        assert_eq!(state.zoom_mode, ZoomMode::Fit);

        state.set_view(ViewTransform::new(0.8, 0.0, 0.0));
        assert!(state.is_zoomed);
        assert_eq!(state.zoom_mode, ZoomMode::Custom);
    }
}
