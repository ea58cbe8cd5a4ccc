//! The fixed default project timeline.
//!
//! Every project gets the same six delivery steps, seeded once when its
//! payment plan is first created.

/// One step of the default timeline template.
#[derive(Debug, Clone, Copy)]
pub struct TimelineStep {
    pub title: &'static str,
    pub description: &'static str,
}

/// The six default steps, in delivery order.
pub const DEFAULT_TIMELINE: [TimelineStep; 6] = [
    TimelineStep {
        title: "Analysis",
        description: "Requirements gathering and scope definition",
    },
    TimelineStep {
        title: "Design",
        description: "Architecture and UI/UX design",
    },
    TimelineStep {
        title: "Development phase 1",
        description: "Core functionality implementation",
    },
    TimelineStep {
        title: "Development phase 2",
        description: "Feature completion and integrations",
    },
    TimelineStep {
        title: "Testing",
        description: "Quality assurance and acceptance testing",
    },
    TimelineStep {
        title: "Final delivery",
        description: "Deployment and handover",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_has_six_ordered_steps() {
        assert_eq!(DEFAULT_TIMELINE.len(), 6);
        assert_eq!(DEFAULT_TIMELINE[0].title, "Analysis");
        assert_eq!(DEFAULT_TIMELINE[5].title, "Final delivery");
    }
}
