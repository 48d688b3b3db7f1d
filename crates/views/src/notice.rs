use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

/// The single dismissible inline message a view shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoticeSlot(Option<Notice>);

impl NoticeSlot {
    pub fn error(&mut self, message: impl Into<String>) {
        self.0 = Some(Notice {
            severity: Severity::Error,
            message: message.into(),
        });
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.0 = Some(Notice {
            severity: Severity::Success,
            message: message.into(),
        });
    }

    pub fn dismiss(&mut self) {
        self.0 = None;
    }

    pub fn current(&self) -> Option<&Notice> {
        self.0.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.0
            .as_ref()
            .filter(|n| n.severity == Severity::Error)
            .map(|n| n.message.as_str())
    }
}
