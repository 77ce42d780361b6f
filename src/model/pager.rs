use serde::{Deserialize, Serialize};

/// 1-based page window derived from a LIMIT clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pager {
    pub page_size: u64,
    pub page_number: u64,
}

impl Pager {
    pub fn new(page_size: u64, page_number: u64) -> Self {
        Self { page_size, page_number: page_number.max(1) }
    }

    /// `page_number = floor(offset / page_size) + 1`; a zero page size always
    /// lands on the first page.
    pub fn from_limit(page_size: u64, offset: u64) -> Self {
        let page_number = match page_size {
            0 => 1,
            size => offset / size + 1,
        };
        Self { page_size, page_number }
    }

    /// Row offset of the page, clamped to `u64::MAX` for windows past it.
    pub fn offset(&self) -> u64 {
        self.page_size.saturating_mul(self.page_number.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use crate::model::Pager;

    #[test]
    pub fn test_from_limit() {
        assert_eq!(Pager::from_limit(10, 0), Pager::new(10, 1));
        assert_eq!(Pager::from_limit(10, 25), Pager::new(10, 3));
        assert_eq!(Pager::from_limit(0, 25), Pager::new(0, 1));
    }

    #[test]
    pub fn test_offset() {
        assert_eq!(Pager::new(20, 3).offset(), 40);
        assert_eq!(Pager::new(20, 1).offset(), 0);
    }

    #[test]
    pub fn test_offset_past_u64_is_clamped() {
        assert_eq!(Pager::new(u64::MAX, 3).offset(), u64::MAX);
        assert_eq!(Pager::new(2, u64::MAX).offset(), u64::MAX);
        assert_eq!(Pager::new(0, u64::MAX).offset(), 0);
    }
}
