use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageInputError {
    #[error("no page number entered")]
    Empty,
}

/// State of the page-number field.
///
/// While `Idle` the field mirrors the current page; `Editing` holds the digits
/// the user typed until they are confirmed or discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageInput {
    #[default]
    Idle,
    Editing(String),
}

impl PageInput {
    /// Keep only the digits of `raw`; nothing left means back to `Idle`
    pub fn from_raw(raw: &str) -> Self {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            PageInput::Idle
        } else {
            PageInput::Editing(digits)
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, PageInput::Editing(_))
    }

    /// Typed digits, empty while idle
    pub fn pending(&self) -> &str {
        match self {
            PageInput::Idle => "",
            PageInput::Editing(digits) => digits,
        }
    }

    /// Text shown in the page-number field
    pub fn display(&self, current_page: usize) -> String {
        match self {
            PageInput::Idle => current_page.to_string(),
            PageInput::Editing(digits) => digits.clone(),
        }
    }

    /// Parse the typed digits. Values too large for `usize` saturate.
    pub fn parse(&self) -> Result<usize, PageInputError> {
        match self {
            PageInput::Idle => Err(PageInputError::Empty),
            PageInput::Editing(digits) => Ok(digits.parse().unwrap_or(usize::MAX)),
        }
    }
}

/// Clamp a requested page into `[1, page_count]`; an unknown count acts as 1
pub fn clamp_page(page: usize, page_count: Option<usize>) -> usize {
    page.clamp(1, page_count.unwrap_or(1).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_strips_non_digits() {
        assert_eq!(PageInput::from_raw("1a2-3"), PageInput::Editing("123".to_string()));
        assert_eq!(PageInput::from_raw(" 7 "), PageInput::Editing("7".to_string()));
        assert_eq!(PageInput::from_raw("abc"), PageInput::Idle);
        assert_eq!(PageInput::from_raw(""), PageInput::Idle);
    }

    #[test]
    fn test_display() {
        assert_eq!(PageInput::Idle.display(4), "4");
        assert_eq!(PageInput::from_raw("12").display(4), "12");
    }

    #[test]
    fn test_parse() {
        assert_eq!(PageInput::Idle.parse(), Err(PageInputError::Empty));
        assert_eq!(PageInput::from_raw("007").parse(), Ok(7));
        assert_eq!(
            PageInput::from_raw("99999999999999999999999999").parse(),
            Ok(usize::MAX)
        );
    }

    #[test]
    fn test_clamp_page() {
        assert_eq!(clamp_page(0, Some(10)), 1);
        assert_eq!(clamp_page(999, Some(10)), 10);
        assert_eq!(clamp_page(3, Some(10)), 3);
        assert_eq!(clamp_page(3, None), 1);
        assert_eq!(clamp_page(3, Some(0)), 1);
    }

    proptest! {
        #[test]
        fn pending_input_is_digits_only(raw in ".*") {
            let input = PageInput::from_raw(&raw);
            prop_assert!(input.pending().chars().all(|c| c.is_ascii_digit()));
        }
    }
}
