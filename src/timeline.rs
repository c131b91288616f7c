//! Age range to zero-based period index mapping

use serde::{Deserialize, Serialize};

use crate::error::TimelineError;

/// Projection timeline: one period per year of age starting at `start_age`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    start_age: u32,
    period_count: usize,
}

impl Timeline {
    /// Create a timeline with `period_count` annual periods
    pub fn new(start_age: u32, period_count: usize) -> Result<Self, TimelineError> {
        if period_count == 0 {
            return Err(TimelineError::Empty { start_age, period_count });
        }
        // The last age must fit in a u32
        u32::try_from(period_count - 1)
            .ok()
            .and_then(|last| start_age.checked_add(last))
            .ok_or(TimelineError::TooLong { start_age, period_count })?;
        Ok(Self { start_age, period_count })
    }

    /// Create a timeline covering `start_age..=end_age`
    pub fn from_age_range(start_age: u32, end_age: u32) -> Result<Self, TimelineError> {
        if end_age < start_age {
            return Err(TimelineError::Inverted { start_age, end_age });
        }
        Self::new(start_age, (end_age - start_age) as usize + 1)
    }

    pub fn start_age(&self) -> u32 {
        self.start_age
    }

    /// Last age covered (inclusive)
    pub fn end_age(&self) -> u32 {
        self.start_age + (self.period_count - 1) as u32
    }

    pub fn len(&self) -> usize {
        self.period_count
    }

    /// Always false; a timeline has at least one period
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Period index for an age, if the age is on the timeline
    pub fn index_of(&self, age: u32) -> Option<usize> {
        let index = age.checked_sub(self.start_age)? as usize;
        (index < self.period_count).then_some(index)
    }

    /// Age at a period index, if the index is on the timeline
    pub fn age_at(&self, index: usize) -> Option<u32> {
        (index < self.period_count).then(|| self.start_age + index as u32)
    }

    pub fn contains_age(&self, age: u32) -> bool {
        self.index_of(age).is_some()
    }

    /// Iterate over every age on the timeline
    pub fn ages(&self) -> impl Iterator<Item = u32> {
        self.start_age..=self.end_age()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_mapping() {
        let timeline = Timeline::new(30, 5).unwrap();
        assert_eq!(timeline.end_age(), 34);
        assert_eq!(timeline.index_of(30), Some(0));
        assert_eq!(timeline.index_of(34), Some(4));
        assert_eq!(timeline.index_of(35), None);
        assert_eq!(timeline.index_of(29), None);
        assert_eq!(timeline.age_at(2), Some(32));
        assert_eq!(timeline.age_at(5), None);
        assert_eq!(timeline.ages().collect::<Vec<_>>(), vec![30, 31, 32, 33, 34]);
    }

    #[test]
    fn test_from_age_range_is_inclusive() {
        let timeline = Timeline::from_age_range(40, 40).unwrap();
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.end_age(), 40);
    }

    #[test]
    fn test_invalid_timelines() {
        assert_eq!(
            Timeline::new(30, 0),
            Err(TimelineError::Empty { start_age: 30, period_count: 0 })
        );
        assert_eq!(
            Timeline::from_age_range(50, 49),
            Err(TimelineError::Inverted { start_age: 50, end_age: 49 })
        );
    }

    #[test]
    fn test_end_age_must_be_representable() {
        assert_eq!(
            Timeline::new(30, usize::MAX),
            Err(TimelineError::TooLong { start_age: 30, period_count: usize::MAX })
        );
        assert_eq!(
            Timeline::new(u32::MAX, 2),
            Err(TimelineError::TooLong { start_age: u32::MAX, period_count: 2 })
        );

        let widest = Timeline::new(u32::MAX - 4, 5).unwrap();
        assert_eq!(widest.end_age(), u32::MAX);
    }
}
