/// Holds the last rendering fault until the user asks to try again
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FaultBoundary {
    fault: Option<String>,
}

impl FaultBoundary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn catch(&mut self, message: impl Into<String>) {
        self.fault = Some(message.into());
    }

    pub fn fault(&self) -> Option<&str> {
        self.fault.as_deref()
    }

    pub fn is_tripped(&self) -> bool {
        self.fault.is_some()
    }

    /// Returns whether a fault was cleared
    pub fn reset(&mut self) -> bool {
        self.fault.take().is_some()
    }
}
