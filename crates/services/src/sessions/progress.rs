/// Aggregated view of session progress, useful for front ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    pub is_complete: bool,
}

impl SessionProgress {
    /// 1-based position of the question being asked, capped at `total`.
    #[must_use]
    pub fn position(&self) -> usize {
        (self.answered + 1).min(self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_is_one_based_and_capped() {
        let mut p = SessionProgress {
            total: 5,
            answered: 0,
            remaining: 5,
            is_complete: false,
        };
        assert_eq!(p.position(), 1);
        p.answered = 5;
        assert_eq!(p.position(), 5);
    }
}
