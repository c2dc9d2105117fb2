/// A user intent coming from the toolbar, the page field or a key binding
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerAction {
    // === Page navigation ===
    PrevPage,
    NextPage,
    FirstPage,
    LastPage,
    GoToPage(usize),

    // === Zoom ===
    ZoomIn,
    ZoomOut,
    ResetZoom,
    /// Arbitrary zoom delta, e.g. from a pinch or ctrl+wheel
    Zoom(f64),

    // === Page-number field ===
    PageInput(String),
    CommitPageInput,
    CancelPageInput,
}

impl ViewerAction {
    /// Map a key name (as reported by the toolkit) to an action.
    ///
    /// Only keys that make sense while the page field does not have focus.
    pub fn for_key(name: &str, ctrl: bool) -> Option<Self> {
        let action = match (name, ctrl) {
            ("plus" | "equal" | "KP_Add", true) => ViewerAction::ZoomIn,
            ("minus" | "KP_Subtract", true) => ViewerAction::ZoomOut,
            ("0" | "KP_0", true) => ViewerAction::ResetZoom,
            ("Page_Up" | "Left", false) => ViewerAction::PrevPage,
            ("Page_Down" | "Right", false) => ViewerAction::NextPage,
            ("Home", _) => ViewerAction::FirstPage,
            ("End", _) => ViewerAction::LastPage,
            _ => return None,
        };
        Some(action)
    }
}
