use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// A wrapper for sensitive data that masks its value in Debug output and can be customized for Serialization.
#[derive(Clone, Deserialize)]
pub struct Masked<T>(pub T);

impl<T: fmt::Display> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T: fmt::Display> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // In logs, we want to mask patient identity, but API responses need the real value.
        // This wrapper is primarily for preventing accidental leakage in log macros like tracing::info!("{:?}", event).
        self.0.serialize(serializer)
    }
}

impl<T> Masked<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_output_is_masked() {
        let name = Masked("Jane Citizen".to_string());
        assert_eq!(format!("{:?}", name), "********");
        assert_eq!(format!("{}", name), "********");
    }

    #[test]
    fn test_serialize_passes_through() {
        let name = Masked("Jane Citizen".to_string());
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"Jane Citizen\"");
    }
}
