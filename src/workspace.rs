use x11rb::protocol::xproto::Window;

/// The tiling state: one main window on the left and a column of side
/// windows on the right, stacked in arrival order.
///
/// Side windows never exist without a main window, and no window appears
/// twice. Handlers are responsible for calling a reflow after mutating.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Workspace {
    main: Option<Window>,
    side_windows: Vec<Window>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn main(&self) -> Option<Window> {
        self.main
    }

    pub fn side_windows(&self) -> &[Window] {
        &self.side_windows
    }

    /// Main window first, then side windows top to bottom.
    pub fn windows(&self) -> impl Iterator<Item = Window> + '_ {
        self.main.into_iter().chain(self.side_windows.iter().copied())
    }

    pub fn contains(&self, window: Window) -> bool {
        self.main == Some(window) || self.side_windows.contains(&window)
    }

    /// Index of the first side window matching `window`.
    pub fn position_of_side(&self, window: Window) -> Option<usize> {
        let mut matches = self
            .side_windows
            .iter()
            .enumerate()
            .filter(|&(_, &w)| w == window)
            .map(|(i, _)| i);
        let first = matches.next();
        debug_assert!(
            matches.next().is_none(),
            "window {} listed twice in side windows",
            window
        );
        first
    }

    pub fn append_side(&mut self, window: Window) {
        debug_assert!(self.main.is_some(), "side window without a main window");
        self.side_windows.push(window);
    }

    pub fn remove_side_at(&mut self, index: usize) -> Window {
        self.side_windows.remove(index)
    }

    pub fn adopt_as_main(&mut self, window: Window) {
        debug_assert!(self.main.is_none(), "main window already set");
        self.main = Some(window);
    }

    pub fn clear_main(&mut self) -> Option<Window> {
        self.main.take()
    }

    /// Moves the first side window into the (vacant) main slot.
    pub fn promote_first_side_to_main(&mut self) -> Option<Window> {
        if self.side_windows.is_empty() {
            return None;
        }
        let window = self.side_windows.remove(0);
        self.main = Some(window);
        Some(window)
    }

    /// Both layout invariants hold.
    pub fn is_consistent(&self) -> bool {
        if self.main.is_none() && !self.side_windows.is_empty() {
            return false;
        }
        let mut seen: Vec<Window> = self.windows().collect();
        let total = seen.len();
        seen.sort_unstable();
        seen.dedup();
        seen.len() == total
    }
}
