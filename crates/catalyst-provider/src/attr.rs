//! Tri-state attribute values
//!
//! An attribute is either absent from configuration ([`Attr::Unset`]), still
//! to be computed during apply ([`Attr::Unknown`]) or a concrete value
//! ([`Attr::Known`]). Persisted state never holds `Unknown`: it serialises as
//! `null`, exactly like `Unset`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attr<T> {
    Unset,
    Unknown,
    Known(T),
}

impl<T> Default for Attr<T> {
    fn default() -> Self {
        Attr::Unset
    }
}

impl<T> Attr<T> {
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Attr::Known(v),
            None => Attr::Unset,
        }
    }

    pub fn known(&self) -> Option<&T> {
        match self {
            Attr::Known(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Attr::Known(_))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Attr::Unknown)
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Attr::Unset)
    }

    /// Keep a known value; anything else becomes `Unknown`.
    pub fn or_unknown(self) -> Self {
        match self {
            Attr::Known(v) => Attr::Known(v),
            _ => Attr::Unknown,
        }
    }

    /// Keep a known value; otherwise take `fallback`.
    pub fn or(self, fallback: Attr<T>) -> Self {
        match self {
            Attr::Known(v) => Attr::Known(v),
            _ => fallback,
        }
    }

    /// Drop an unresolved `Unknown` after apply.
    pub fn settle(&mut self) {
        if self.is_unknown() {
            *self = Attr::Unset;
        }
    }
}

impl<T: Clone> Attr<T> {
    pub fn cloned_known(&self) -> Option<T> {
        self.known().cloned()
    }
}

impl<T> From<T> for Attr<T> {
    fn from(value: T) -> Self {
        Attr::Known(value)
    }
}

impl<T: std::fmt::Display> std::fmt::Display for Attr<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Attr::Unset => write!(f, "(unset)"),
            Attr::Unknown => write!(f, "(known after apply)"),
            Attr::Known(v) => write!(f, "{}", v),
        }
    }
}

impl<T: Serialize> Serialize for Attr<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.known().serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Attr<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Attr::from_option)
    }
}

/// A secret produced once by the server and never re-fetchable.
///
/// The only way to set a value is [`WriteOnce::capture`], which refuses to
/// replace a value that is already known. State mappers therefore cannot
/// clobber it on refresh.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct WriteOnce<T>(Attr<T>);

impl<T> WriteOnce<T> {
    pub fn unset() -> Self {
        WriteOnce(Attr::Unset)
    }

    pub fn unknown() -> Self {
        WriteOnce(Attr::Unknown)
    }

    /// Store the value if none has been captured yet.
    ///
    /// Returns `false` and leaves the stored value untouched otherwise.
    pub fn capture(&mut self, value: T) -> bool {
        if self.0.is_known() {
            return false;
        }
        self.0 = Attr::Known(value);
        true
    }

    pub fn get(&self) -> Option<&T> {
        self.0.known()
    }

    pub fn attr(&self) -> &Attr<T> {
        &self.0
    }

    pub fn is_known(&self) -> bool {
        self.0.is_known()
    }

    pub fn is_unknown(&self) -> bool {
        self.0.is_unknown()
    }

    pub fn settle(&mut self) {
        self.0.settle();
    }
}

impl<T> std::fmt::Debug for WriteOnce<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Attr::Unset => write!(f, "Unset"),
            Attr::Unknown => write!(f, "Unknown"),
            Attr::Known(_) => write!(f, "Known(<sensitive>)"),
        }
    }
}

impl<T> std::fmt::Display for WriteOnce<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Attr::Unset => write!(f, "(unset)"),
            Attr::Unknown => write!(f, "(known after apply)"),
            Attr::Known(_) => write!(f, "(sensitive value)"),
        }
    }
}

impl<T: Serialize> Serialize for WriteOnce<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for WriteOnce<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Attr::deserialize(deserializer).map(WriteOnce)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_is_never_persisted() {
        let value: Attr<String> = Attr::Unknown;
        assert_eq!(serde_json::to_value(&value).unwrap(), serde_json::Value::Null);

        let back: Attr<String> = serde_json::from_value(serde_json::Value::Null).unwrap();
        assert!(back.is_unset());
    }

    #[test]
    fn test_or_unknown_keeps_known_values() {
        assert_eq!(Attr::Known(1).or_unknown(), Attr::Known(1));
        assert_eq!(Attr::<i32>::Unset.or_unknown(), Attr::Unknown);
    }

    #[test]
    fn test_write_once_refuses_overwrite() {
        let mut token = WriteOnce::unknown();
        assert!(token.capture("first".to_string()));
        assert!(!token.capture("second".to_string()));
        assert_eq!(token.get().map(String::as_str), Some("first"));
    }

    #[test]
    fn test_write_once_debug_redacts() {
        let mut token = WriteOnce::unset();
        token.capture("jt-secret".to_string());
        assert!(!format!("{:?}", token).contains("jt-secret"));
        assert!(!token.to_string().contains("jt-secret"));
    }

    #[test]
    fn test_write_once_round_trips_through_state() {
        let mut token = WriteOnce::unset();
        token.capture("jt-1".to_string());

        let json = serde_json::to_string(&token).unwrap();
        let back: WriteOnce<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, token);
    }
}
