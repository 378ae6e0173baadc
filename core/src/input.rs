//! Gesture bindings that turn pointer input into tile swaps.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRequest {
    pub from: usize,
    pub to: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Gesture {
    Selected(usize),
    Deselected,
    Swap(SwapRequest),
    Ignored,
}

/// A way of picking two slots to exchange.
pub trait SwapInput {
    fn press(&mut self, index: usize) -> Gesture;
    fn release(&mut self, index: usize) -> Gesture;
    fn selected(&self) -> Option<usize>;
    fn clear(&mut self);
}

/// Tap one tile, then tap another to exchange them. Tapping the selected tile
/// again deselects it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapToSwap {
    selected: Option<usize>,
}

impl SwapInput for TapToSwap {
    fn press(&mut self, index: usize) -> Gesture {
        match self.selected.take() {
            None => {
                self.selected = Some(index);
                Gesture::Selected(index)
            }
            Some(selected) if selected == index => Gesture::Deselected,
            Some(selected) => Gesture::Swap(SwapRequest {
                from: selected,
                to: index,
            }),
        }
    }

    fn release(&mut self, _index: usize) -> Gesture {
        Gesture::Ignored
    }

    fn selected(&self) -> Option<usize> {
        self.selected
    }

    fn clear(&mut self) {
        self.selected = None;
    }
}

/// Grab a tile on press and drop it on another on release.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragToSwap {
    grabbed: Option<usize>,
}

impl SwapInput for DragToSwap {
    fn press(&mut self, index: usize) -> Gesture {
        self.grabbed = Some(index);
        Gesture::Selected(index)
    }

    fn release(&mut self, index: usize) -> Gesture {
        match self.grabbed.take() {
            None => Gesture::Ignored,
            Some(grabbed) if grabbed == index => Gesture::Deselected,
            Some(grabbed) => Gesture::Swap(SwapRequest {
                from: grabbed,
                to: index,
            }),
        }
    }

    fn selected(&self) -> Option<usize> {
        self.grabbed
    }

    fn clear(&mut self) {
        self.grabbed = None;
    }
}

/// The input binding a session is played with.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputMode {
    Tap(TapToSwap),
    Drag(DragToSwap),
}

impl InputMode {
    pub fn tap() -> Self {
        Self::Tap(TapToSwap::default())
    }

    pub fn drag() -> Self {
        Self::Drag(DragToSwap::default())
    }

    fn binding(&mut self) -> &mut dyn SwapInput {
        match self {
            Self::Tap(input) => input,
            Self::Drag(input) => input,
        }
    }
}

impl Default for InputMode {
    fn default() -> Self {
        Self::tap()
    }
}

impl SwapInput for InputMode {
    fn press(&mut self, index: usize) -> Gesture {
        self.binding().press(index)
    }

    fn release(&mut self, index: usize) -> Gesture {
        self.binding().release(index)
    }

    fn selected(&self) -> Option<usize> {
        match self {
            Self::Tap(input) => input.selected(),
            Self::Drag(input) => input.selected(),
        }
    }

    fn clear(&mut self) {
        self.binding().clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tap_select_swap_and_deselect() {
        let mut input = TapToSwap::default();
        assert_eq!(input.press(3), Gesture::Selected(3));
        assert_eq!(input.selected(), Some(3));
        assert_eq!(input.press(3), Gesture::Deselected);
        assert_eq!(input.selected(), None);

        input.press(1);
        assert_eq!(
            input.press(7),
            Gesture::Swap(SwapRequest { from: 1, to: 7 })
        );
        assert_eq!(input.selected(), None);
        assert_eq!(input.release(7), Gesture::Ignored);
    }

    #[test]
    fn drag_swaps_on_release() {
        let mut input = DragToSwap::default();
        assert_eq!(input.release(2), Gesture::Ignored);
        assert_eq!(input.press(2), Gesture::Selected(2));
        assert_eq!(
            input.release(5),
            Gesture::Swap(SwapRequest { from: 2, to: 5 })
        );
        input.press(4);
        assert_eq!(input.release(4), Gesture::Deselected);
        assert_eq!(input.selected(), None);
    }

    #[test]
    fn mode_delegates() {
        let mut mode = InputMode::drag();
        mode.press(0);
        assert_eq!(mode.selected(), Some(0));
        mode.clear();
        assert_eq!(mode.selected(), None);
    }
}
