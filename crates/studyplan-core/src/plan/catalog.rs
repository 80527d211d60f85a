//! Class levels and streams a plan may be created for.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassCategory {
    Primary,
    Middle,
    Secondary,
    HigherSecondary,
    Competitive,
    College,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ClassLevel {
    pub value: &'static str,
    pub label: &'static str,
    pub category: ClassCategory,
}

impl ClassLevel {
    /// Class 11 and 12 pick a stream (PCM, PCB, commerce, arts).
    pub fn needs_stream(&self) -> bool {
        self.category == ClassCategory::HigherSecondary
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Stream {
    pub value: &'static str,
    pub label: &'static str,
}

const fn level(value: &'static str, label: &'static str, category: ClassCategory) -> ClassLevel {
    ClassLevel {
        value,
        label,
        category,
    }
}

pub const CLASS_LEVELS: &[ClassLevel] = &[
    level("class-1", "Class 1", ClassCategory::Primary),
    level("class-2", "Class 2", ClassCategory::Primary),
    level("class-3", "Class 3", ClassCategory::Primary),
    level("class-4", "Class 4", ClassCategory::Primary),
    level("class-5", "Class 5", ClassCategory::Primary),
    level("class-6", "Class 6", ClassCategory::Middle),
    level("class-7", "Class 7", ClassCategory::Middle),
    level("class-8", "Class 8", ClassCategory::Middle),
    level("class-9", "Class 9", ClassCategory::Secondary),
    level("class-10", "Class 10", ClassCategory::Secondary),
    level("class-11", "Class 11", ClassCategory::HigherSecondary),
    level("class-12", "Class 12", ClassCategory::HigherSecondary),
    level("jee", "JEE (Engineering)", ClassCategory::Competitive),
    level("neet", "NEET (Medical)", ClassCategory::Competitive),
    level("upsc", "UPSC", ClassCategory::Competitive),
    level("cat", "CAT (MBA)", ClassCategory::Competitive),
    level("gate", "GATE", ClassCategory::Competitive),
    level("undergraduate", "Undergraduate", ClassCategory::College),
    level("postgraduate", "Postgraduate", ClassCategory::College),
];

pub const STREAMS: &[Stream] = &[
    Stream {
        value: "science-pcm",
        label: "Science (PCM)",
    },
    Stream {
        value: "science-pcb",
        label: "Science (PCB)",
    },
    Stream {
        value: "commerce",
        label: "Commerce",
    },
    Stream {
        value: "arts",
        label: "Arts/Humanities",
    },
];

pub fn class_level(value: &str) -> Option<&'static ClassLevel> {
    CLASS_LEVELS.iter().find(|c| c.value == value)
}

pub fn stream(value: &str) -> Option<&'static Stream> {
    STREAMS.iter().find(|s| s.value == value)
}

/// Default plan title, e.g. "Class 12 (science-pcm) Study Plan".
pub fn plan_title(class_value: &str, stream: Option<&str>) -> String {
    let label = class_level(class_value)
        .map(|c| c.label)
        .unwrap_or(class_value);
    match stream {
        Some(s) => format!("{label} ({s}) Study Plan"),
        None => format!("{label} Study Plan"),
    }
}
